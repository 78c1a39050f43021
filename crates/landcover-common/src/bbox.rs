//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// For geographic frames the axes are longitude (west/east) and latitude
/// (south/north) in degrees. For projected frames they are easting and
/// northing in the frame's units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Smallest box containing every finite point, or `None` if there is none.
    pub fn enclosing(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let mut bounds: Option<GeoBounds> = None;
        for (&x, &y) in xs.iter().zip(ys) {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                None => GeoBounds::new(x, y, x, y),
                Some(b) => GeoBounds::new(b.west.min(x), b.south.min(y), b.east.max(x), b.north.max(y)),
            });
        }
        bounds
    }

    /// Width of the box in coordinate units.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the box in coordinate units.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// A box is valid when all edges are finite and it is not inverted.
    pub fn is_valid(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite())
            && self.west <= self.east
            && self.south <= self.north
    }

    /// Check if a point is contained within this box (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.west && x <= self.east && y >= self.south && y <= self.north
    }

    /// Corner pair in the `[[south, west], [north, east]]` order map image
    /// overlays expect.
    pub fn to_corner_pairs(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }

    /// Center as `(lat, lon)` for geographic boxes.
    pub fn center_lat_lon(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }
}
