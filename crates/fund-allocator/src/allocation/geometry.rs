//! Point-in-geometry predicates used by catchment areas.

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use super::domain::{ConfigurationError, GeoPoint};

/// Region set entry that matches every non-blank address.
pub const WILDCARD_REGION: &str = "*";

/// Mean Earth radius (IUGG) in meters.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Tolerance, in degrees, for treating a point as lying on a polygon edge.
const EDGE_TOLERANCE_DEG: f64 = 1e-12;

/// Distance collaborator used by circle catchment areas.
pub trait DistanceMetric: Send + Sync {
    /// Distance between two points in meters.
    fn distance_meters(&self, from: GeoPoint, to: GeoPoint) -> f64;
}

/// Haversine distance over a spherical Earth.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCircle;

impl DistanceMetric for GreatCircle {
    fn distance_meters(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        let lat1 = from.latitude.to_radians();
        let lat2 = to.latitude.to_radians();
        let delta_lat = (to.latitude - from.latitude).to_radians();
        let delta_lon = (to.longitude - from.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_M * c
    }
}

/// Equirectangular approximation; cheaper, accurate for city-sized radii.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planar;

impl DistanceMetric for Planar {
    fn distance_meters(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        let mean_lat = ((from.latitude + to.latitude) / 2.0).to_radians();
        let x = (to.longitude - from.longitude).to_radians() * mean_lat.cos();
        let y = (to.latitude - from.latitude).to_radians();

        EARTH_RADIUS_M * x.hypot(y)
    }
}

/// Selects which [`DistanceMetric`] backs circle matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    #[default]
    GreatCircle,
    Planar,
}

impl DistanceMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "great_circle" | "great-circle" | "haversine" => Some(Self::GreatCircle),
            "planar" | "equirectangular" => Some(Self::Planar),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DistanceMode::GreatCircle => "great_circle",
            DistanceMode::Planar => "planar",
        }
    }

    pub fn metric(self) -> Box<dyn DistanceMetric> {
        match self {
            DistanceMode::GreatCircle => Box::new(GreatCircle),
            DistanceMode::Planar => Box::new(Planar),
        }
    }
}

/// Boundary-inclusive circle test.
pub fn point_in_circle(
    metric: &dyn DistanceMetric,
    center: GeoPoint,
    radius_meters: f64,
    point: GeoPoint,
) -> bool {
    metric.distance_meters(center, point) <= radius_meters
}

/// Ray-casting containment over an implicitly closed ring.
///
/// Latitude is treated as the y axis and longitude as the x axis. Points on a
/// vertex or an edge count as inside.
pub fn point_in_polygon(
    vertices: &[GeoPoint],
    point: GeoPoint,
) -> Result<bool, ConfigurationError> {
    if vertices.len() < 3 {
        return Err(ConfigurationError::DegeneratePolygon {
            vertices: vertices.len(),
        });
    }

    let (px, py) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut previous = vertices[vertices.len() - 1];

    for &current in vertices {
        if on_segment(point, previous, current) {
            return Ok(true);
        }

        let (ax, ay) = (current.longitude, current.latitude);
        let (bx, by) = (previous.longitude, previous.latitude);
        if (ay > py) != (by > py) {
            let crossing = (bx - ax) * (py - ay) / (by - ay) + ax;
            if px < crossing {
                inside = !inside;
            }
        }

        previous = current;
    }

    Ok(inside)
}

fn on_segment(point: GeoPoint, start: GeoPoint, end: GeoPoint) -> bool {
    let (px, py) = (point.longitude, point.latitude);
    let (ax, ay) = (start.longitude, start.latitude);
    let (bx, by) = (end.longitude, end.latitude);

    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
    if cross.abs() > EDGE_TOLERANCE_DEG {
        return false;
    }

    px >= ax.min(bx) - EDGE_TOLERANCE_DEG
        && px <= ax.max(bx) + EDGE_TOLERANCE_DEG
        && py >= ay.min(by) - EDGE_TOLERANCE_DEG
        && py <= ay.max(by) + EDGE_TOLERANCE_DEG
}

/// True when the set is exactly the wildcard marker.
pub fn is_wildcard(names: &BTreeSet<String>) -> bool {
    names.len() == 1 && names.contains(WILDCARD_REGION)
}

/// Region names paired with their compiled whole-word pattern.
///
/// The pattern is built once, when the catchment area is constructed, so a
/// name set that cannot compile is rejected before any selection runs.
#[derive(Debug, Clone)]
pub struct RegionMatcher {
    names: BTreeSet<String>,
    pattern: Option<Regex>,
}

impl RegionMatcher {
    pub fn new<I, S>(names: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        let pattern = if is_wildcard(&names) {
            None
        } else {
            compile_alternation(&names)?
        };

        Ok(Self { names, pattern })
    }

    pub fn wildcard() -> Self {
        Self {
            names: BTreeSet::from([WILDCARD_REGION.to_string()]),
            pattern: None,
        }
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn is_wildcard(&self) -> bool {
        is_wildcard(&self.names)
    }

    /// Blank addresses never match, not even the wildcard.
    pub fn matches(&self, address: &str) -> bool {
        if address.trim().is_empty() {
            return false;
        }
        if self.is_wildcard() {
            return true;
        }
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(address))
    }
}

impl PartialEq for RegionMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

fn compile_alternation(names: &BTreeSet<String>) -> Result<Option<Regex>, ConfigurationError> {
    let alternatives: Vec<String> = names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    // `\b` would require a word character next to names that begin or end with
    // punctuation ("St.", "C++"), so the edges are matched explicitly.
    let pattern = format!(r"(?:^|\W)(?:{})(?:\W|$)", alternatives.join("|"));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|source| ConfigurationError::RegionPattern { source })
}

/// Whole-word, case-insensitive match of any region name inside the address.
///
/// Region names are escaped before being joined into the pattern. Blank
/// addresses and empty name sets never match.
pub fn address_matches_regions(
    address: &str,
    names: &BTreeSet<String>,
) -> Result<bool, ConfigurationError> {
    let matcher = RegionMatcher::new(names.iter().cloned())?;
    Ok(matcher.matches(address))
}
