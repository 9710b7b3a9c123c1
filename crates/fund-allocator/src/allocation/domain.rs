use serde::{Deserialize, Serialize};

/// Identifier wrapper for incoming funding applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for registered fund accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FundAccountId(pub String);

/// Latitude/longitude pair in decimal degrees.
///
/// Deserializes from either `{"latitude": .., "longitude": ..}` or the
/// registry's `[lat, lon]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "GeoPointWire")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self::new(latitude, longitude)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GeoPointWire {
    Pair([f64; 2]),
    Fields { latitude: f64, longitude: f64 },
}

impl From<GeoPointWire> for GeoPoint {
    fn from(wire: GeoPointWire) -> Self {
        match wire {
            GeoPointWire::Pair(pair) => GeoPoint::from(pair),
            GeoPointWire::Fields {
                latitude,
                longitude,
            } => GeoPoint::new(latitude, longitude),
        }
    }
}

/// Funding application as handed over by the intake pipeline.
///
/// Either location hint may be missing; areas that depend on the missing hint
/// simply do not match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    #[serde(default)]
    pub full_address: Option<String>,
    #[serde(default)]
    pub latlong: Option<GeoPoint>,
}

impl Application {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ApplicationId(id.into()),
            full_address: None,
            latlong: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.full_address = Some(address.into());
        self
    }

    pub fn with_latlong(mut self, point: GeoPoint) -> Self {
        self.latlong = Some(point);
        self
    }

    /// Address text, ignoring blank values.
    pub fn address(&self) -> Option<&str> {
        self.full_address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }
}

/// Data-integrity fault in a fund account's catchment definition.
///
/// These errors mean the registry handed over something that cannot be
/// evaluated; they are never downgraded to a "no match".
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unexpected location match type '{0}'")]
    UnknownAreaType(String),
    #[error("polygon needs at least 3 vertices, found {vertices}")]
    DegeneratePolygon { vertices: usize },
    #[error("{area_type} location match is missing option '{option}'")]
    MissingOption {
        area_type: &'static str,
        option: &'static str,
    },
    #[error("{area_type} location match has an invalid '{option}' option: {detail}")]
    InvalidOption {
        area_type: &'static str,
        option: &'static str,
        detail: String,
    },
    #[error("coordinate ({latitude}, {longitude}) is outside the valid latitude/longitude range")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("circle radius must be a finite, non-negative number of meters, got {0}")]
    InvalidRadius(f64),
    #[error("unable to build region pattern: {source}")]
    RegionPattern {
        #[source]
        source: regex::Error,
    },
}
