//! Geodesy helpers for pedestrian-scale routing.
//!
//! Everything here is a pure function of its inputs. Distances are great-circle
//! (haversine) meters, bearings are initial compass bearings in degrees.

pub mod compass;

use serde::{Deserialize, Serialize};

pub use compass::CompassDirection;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Lateral offset (degrees) applied at the middle of a synthesized curve.
pub const CURVE_OFFSET_DEG: f64 = 0.0001;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another coordinate in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance(*self, *other)
    }

    /// Initial bearing towards another coordinate.
    pub fn bearing_to(&self, other: &Coordinate) -> f64 {
        bearing(*self, *other)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = String;

    /// Parses `"lat,lon"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'lat,lon', got '{}'", s))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("invalid latitude '{}': {}", lat, e))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|e| format!("invalid longitude '{}': {}", lon, e))?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("coordinate out of range: {}", s));
        }

        Ok(Coordinate::new(latitude, longitude))
    }
}

/// Geographic bounding box, serialized as `[minLon, minLat, maxLon, maxLat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Smallest box containing every coordinate. `None` for an empty slice.
    pub fn from_coordinates(coordinates: &[Coordinate]) -> Option<Self> {
        let first = coordinates.first()?;

        let mut bbox = BoundingBox {
            min_lon: first.longitude,
            min_lat: first.latitude,
            max_lon: first.longitude,
            max_lat: first.latitude,
        };

        for coord in &coordinates[1..] {
            bbox.min_lon = bbox.min_lon.min(coord.longitude);
            bbox.min_lat = bbox.min_lat.min(coord.latitude);
            bbox.max_lon = bbox.max_lon.max(coord.longitude);
            bbox.max_lat = bbox.max_lat.max(coord.latitude);
        }

        Some(bbox)
    }

    /// Whether the coordinate lies inside the box (edges inclusive).
    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.latitude)
            && (self.min_lon..=self.max_lon).contains(&coord.longitude)
    }

    /// Geometric center of the box.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self {
            min_lon: v[0],
            min_lat: v[1],
            max_lon: v[2],
            max_lat: v[3],
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.min_lon, b.min_lat, b.max_lon, b.max_lat]
    }
}

/// Haversine distance between two coordinates in meters.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial compass bearing from `a` to `b`, in `[0, 360)`.
pub fn bearing(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    let degrees = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Linear interpolation in degree space. Fine at walking distances.
pub fn interpolate(a: Coordinate, b: Coordinate, ratio: f64) -> Coordinate {
    Coordinate::new(
        a.latitude + (b.latitude - a.latitude) * ratio,
        a.longitude + (b.longitude - a.longitude) * ratio,
    )
}

/// Interpolated point pushed sideways by `sin(ratio * PI) * CURVE_OFFSET_DEG`.
///
/// The offset is zero at both ends, so a path built from these points still
/// starts and ends exactly on `a` and `b`.
pub fn curved_point(a: Coordinate, b: Coordinate, ratio: f64) -> Coordinate {
    let base = interpolate(a, b, ratio);
    let offset = (ratio * std::f64::consts::PI).sin() * CURVE_OFFSET_DEG;
    Coordinate::new(base.latitude + offset, base.longitude + offset)
}

/// Total length of a polyline in meters.
pub fn path_length(coordinates: &[Coordinate]) -> f64 {
    coordinates
        .windows(2)
        .map(|pair| distance(pair[0], pair[1]))
        .sum()
}
