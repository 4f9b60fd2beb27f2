//! GeoJSON geometries and the spherical helpers seed selection needs.
//!
//! Distances are great-circle distances on a sphere of radius
//! [`EARTH_RADIUS_KM`]. Containment is planar ray casting on lon/lat, which
//! is accurate enough at hexagon scale.

use serde::{Deserialize, Serialize};
use spider_types::Coord;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.008_8;

/// The GeoJSON geometry types the map can send or the dataset can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position.
    Point {
        /// The position.
        coordinates: Coord,
    },
    /// Several positions.
    MultiPoint {
        /// The positions.
        coordinates: Vec<Coord>,
    },
    /// A polyline.
    LineString {
        /// Vertices in drawing order.
        coordinates: Vec<Coord>,
    },
    /// Several polylines.
    MultiLineString {
        /// One vertex list per line.
        coordinates: Vec<Vec<Coord>>,
    },
    /// A polygon; the first ring is the outer boundary.
    Polygon {
        /// Rings, outer first.
        coordinates: Vec<Vec<Coord>>,
    },
    /// Several polygons.
    MultiPolygon {
        /// One ring list per polygon.
        coordinates: Vec<Vec<Vec<Coord>>>,
    },
}

impl Geometry {
    /// The GeoJSON type name.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Point { .. } => "Point",
            Self::MultiPoint { .. } => "MultiPoint",
            Self::LineString { .. } => "LineString",
            Self::MultiLineString { .. } => "MultiLineString",
            Self::Polygon { .. } => "Polygon",
            Self::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Outer ring of a polygon, or of the first polygon of a multipolygon.
    ///
    /// Returns `None` for point and line geometries.
    pub fn outer_ring(&self) -> Option<&[Coord]> {
        match self {
            Self::Polygon { coordinates } => coordinates.first().map(Vec::as_slice),
            Self::MultiPolygon { coordinates } => coordinates
                .first()
                .and_then(|polygon| polygon.first())
                .map(Vec::as_slice),
            _ => None,
        }
    }
}

/// Great-circle distance between two positions, in kilometres.
pub fn haversine_km(a: Coord, b: Coord) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Total length of a polyline, in kilometres.
pub fn line_length_km(line: &[Coord]) -> f64 {
    line.windows(2)
        .map(|pair| match pair {
            [a, b] => haversine_km(*a, *b),
            _ => 0.0,
        })
        .sum()
}

/// Position `distance_km` along a polyline.
///
/// Distances past the end clamp to the last vertex; an empty line yields
/// `None`. Within a segment the position is interpolated linearly in
/// lon/lat by the fraction of the segment's great-circle length.
pub fn point_along(line: &[Coord], distance_km: f64) -> Option<Coord> {
    let first = *line.first()?;
    if distance_km <= 0.0 {
        return Some(first);
    }

    let mut travelled = 0.0;
    for pair in line.windows(2) {
        let [a, b] = pair else { continue };
        let segment = haversine_km(*a, *b);
        if travelled + segment >= distance_km && segment > 0.0 {
            let t = (distance_km - travelled) / segment;
            return Some(Coord::new(
                (b.lon - a.lon).mul_add(t, a.lon),
                (b.lat - a.lat).mul_add(t, a.lat),
            ));
        }
        travelled += segment;
    }

    line.last().copied()
}

/// Sample a polyline every `spacing_km`, always including both ends.
///
/// A non-positive or non-finite spacing returns the vertices unchanged.
pub fn sample_line(line: &[Coord], spacing_km: f64) -> Vec<Coord> {
    if !spacing_km.is_finite() || spacing_km <= 0.0 {
        return line.to_vec();
    }
    let length = line_length_km(line);
    let mut samples = Vec::new();
    let mut at = 0.0;
    while at < length {
        if let Some(p) = point_along(line, at) {
            samples.push(p);
        }
        at += spacing_km;
    }
    if let Some(last) = line.last() {
        samples.push(*last);
    }
    samples
}

/// Whether `point` lies inside the closed ring (even-odd rule).
///
/// Rings with fewer than three vertices contain nothing.
pub fn ring_contains(ring: &[Coord], point: Coord) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut previous = ring.last().copied().unwrap_or(point);
    for &current in ring {
        let crosses = (current.lat > point.lat) != (previous.lat > point.lat);
        if crosses {
            let x = (previous.lon - current.lon) * (point.lat - current.lat)
                / (previous.lat - current.lat)
                + current.lon;
            if point.lon < x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}
