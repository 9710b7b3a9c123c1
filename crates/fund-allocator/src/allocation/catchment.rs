use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::domain::{Application, ConfigurationError, GeoPoint};
use super::geometry::{point_in_circle, point_in_polygon, DistanceMetric, RegionMatcher};

const CIRCLE: &str = "circle";
const POLYGON: &str = "polygon";
const REGION: &str = "region";

/// Geographic or textual area within which a fund accepts applications.
#[derive(Debug, Clone, PartialEq)]
pub enum CatchmentArea {
    Circle { center: GeoPoint, radius_meters: f64 },
    Polygon { vertices: Vec<GeoPoint> },
    Region(RegionMatcher),
}

impl CatchmentArea {
    pub fn circle(center: GeoPoint, radius_meters: f64) -> Result<Self, ConfigurationError> {
        ensure_coordinate(center)?;
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(ConfigurationError::InvalidRadius(radius_meters));
        }

        Ok(Self::Circle {
            center,
            radius_meters,
        })
    }

    pub fn polygon(vertices: Vec<GeoPoint>) -> Result<Self, ConfigurationError> {
        if vertices.len() < 3 {
            return Err(ConfigurationError::DegeneratePolygon {
                vertices: vertices.len(),
            });
        }
        for vertex in &vertices {
            ensure_coordinate(*vertex)?;
        }

        Ok(Self::Polygon { vertices })
    }

    /// Named-region area; the whole-word pattern is compiled here.
    pub fn region<I, S>(names: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RegionMatcher::new(names).map(Self::Region)
    }

    /// Region that accepts every application carrying an address.
    pub fn wildcard() -> Self {
        Self::Region(RegionMatcher::wildcard())
    }

    pub const fn type_label(&self) -> &'static str {
        match self {
            CatchmentArea::Circle { .. } => CIRCLE,
            CatchmentArea::Polygon { .. } => POLYGON,
            CatchmentArea::Region(_) => REGION,
        }
    }

    /// Whether the application falls inside this area.
    ///
    /// Missing coordinates or address text make the dependent variants return
    /// `Ok(false)`; only malformed area definitions produce an error.
    pub fn contains(
        &self,
        application: &Application,
        metric: &dyn DistanceMetric,
    ) -> Result<bool, ConfigurationError> {
        match self {
            CatchmentArea::Circle {
                center,
                radius_meters,
            } => Ok(application
                .latlong
                .is_some_and(|point| point_in_circle(metric, *center, *radius_meters, point))),
            CatchmentArea::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(ConfigurationError::DegeneratePolygon {
                        vertices: vertices.len(),
                    });
                }
                match application.latlong {
                    Some(point) => point_in_polygon(vertices, point),
                    None => Ok(false),
                }
            }
            CatchmentArea::Region(regions) => {
                Ok(application.address().is_some_and(|address| regions.matches(address)))
            }
        }
    }

    pub fn priority(&self) -> MatchPriority {
        match self {
            CatchmentArea::Circle { .. } | CatchmentArea::Polygon { .. } => MatchPriority::Shape,
            CatchmentArea::Region(regions) if regions.is_wildcard() => {
                MatchPriority::WildcardRegion
            }
            CatchmentArea::Region(_) => MatchPriority::NamedRegion,
        }
    }
}

/// Precedence tier of a catchment area.
///
/// The numeric tier grows with specificity: the wildcard catch-all sits at 0,
/// named regions at 1, and coordinate shapes at 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPriority {
    WildcardRegion = 0,
    NamedRegion = 1,
    Shape = 2,
}

impl MatchPriority {
    pub const fn tier(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            MatchPriority::WildcardRegion => "wildcard_region",
            MatchPriority::NamedRegion => "named_region",
            MatchPriority::Shape => "shape",
        }
    }
}

/// Registry wire shape: `{"type": "...", "options": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMatchRecord {
    #[serde(rename = "type")]
    pub area_type: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl TryFrom<LocationMatchRecord> for CatchmentArea {
    type Error = ConfigurationError;

    fn try_from(record: LocationMatchRecord) -> Result<Self, Self::Error> {
        let options = &record.options;
        match record.area_type.trim().to_ascii_lowercase().as_str() {
            CIRCLE => {
                let center = parse_point(required(options, CIRCLE, "centre")?, CIRCLE, "centre")?;
                let radius = required(options, CIRCLE, "radius")?
                    .as_f64()
                    .ok_or_else(|| invalid(CIRCLE, "radius", "expected a number of meters"))?;
                CatchmentArea::circle(center, radius)
            }
            POLYGON => {
                let points = required(options, POLYGON, "points")?
                    .as_array()
                    .ok_or_else(|| invalid(POLYGON, "points", "expected a list of [lat, lon]"))?;
                let vertices = points
                    .iter()
                    .map(|point| parse_point(point, POLYGON, "points"))
                    .collect::<Result<Vec<_>, _>>()?;
                CatchmentArea::polygon(vertices)
            }
            REGION => {
                let regions = required(options, REGION, "regions")?
                    .as_array()
                    .ok_or_else(|| invalid(REGION, "regions", "expected a list of names"))?;
                let names = regions
                    .iter()
                    .map(|name| {
                        name.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| invalid(REGION, "regions", "region names must be text"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                CatchmentArea::region(names)
            }
            _ => Err(ConfigurationError::UnknownAreaType(record.area_type)),
        }
    }
}

impl From<&CatchmentArea> for LocationMatchRecord {
    fn from(area: &CatchmentArea) -> Self {
        let options = match area {
            CatchmentArea::Circle {
                center,
                radius_meters,
            } => json!({
                "centre": [center.latitude, center.longitude],
                "radius": radius_meters,
            }),
            CatchmentArea::Polygon { vertices } => json!({
                "points": vertices
                    .iter()
                    .map(|vertex| [vertex.latitude, vertex.longitude])
                    .collect::<Vec<_>>(),
            }),
            CatchmentArea::Region(regions) => json!({ "regions": regions.names() }),
        };

        Self {
            area_type: area.type_label().to_string(),
            options: match options {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }
}

fn required<'a>(
    options: &'a Map<String, Value>,
    area_type: &'static str,
    option: &'static str,
) -> Result<&'a Value, ConfigurationError> {
    options
        .get(option)
        .filter(|value| !value.is_null())
        .ok_or(ConfigurationError::MissingOption { area_type, option })
}

fn invalid(area_type: &'static str, option: &'static str, detail: &str) -> ConfigurationError {
    ConfigurationError::InvalidOption {
        area_type,
        option,
        detail: detail.to_string(),
    }
}

fn parse_point(
    value: &Value,
    area_type: &'static str,
    option: &'static str,
) -> Result<GeoPoint, ConfigurationError> {
    let pair = value
        .as_array()
        .filter(|pair| pair.len() == 2)
        .ok_or_else(|| invalid(area_type, option, "expected a [lat, lon] pair"))?;
    let latitude = pair[0]
        .as_f64()
        .ok_or_else(|| invalid(area_type, option, "latitude must be a number"))?;
    let longitude = pair[1]
        .as_f64()
        .ok_or_else(|| invalid(area_type, option, "longitude must be a number"))?;

    let point = GeoPoint::from([latitude, longitude]);
    ensure_coordinate(point)?;
    Ok(point)
}

fn ensure_coordinate(point: GeoPoint) -> Result<(), ConfigurationError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidCoordinate {
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }
}
