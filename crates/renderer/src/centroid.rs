//! Area-weighted centroid of zone polygons, for centering the map.

use landcover_common::ZoneRecord;
use serde_json::Value;

/// Accumulated `(area, area * x, area * y)`.
#[derive(Debug, Default, Clone, Copy)]
struct Moments {
    area: f64,
    mx: f64,
    my: f64,
}

impl Moments {
    fn add(&mut self, other: Moments, sign: f64) {
        self.area += sign * other.area;
        self.mx += sign * other.mx;
        self.my += sign * other.my;
    }
}

/// Shoelace moments of one ring, unsigned.
fn ring_moments(ring: &[Value]) -> Moments {
    let points: Vec<(f64, f64)> = ring
        .iter()
        .filter_map(|p| {
            let p = p.as_array()?;
            Some((p.first()?.as_f64()?, p.get(1)?.as_f64()?))
        })
        .collect();
    if points.len() < 3 {
        return Moments::default();
    }

    let (mut a, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for i in 0..points.len() {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % points.len()];
        let cross = x0 * y1 - x1 * y0;
        a += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    let area = a / 2.0;
    if area == 0.0 {
        return Moments::default();
    }
    // Centroid is (cx / 6A, cy / 6A); moments are area * centroid
    let sign = area.signum();
    Moments {
        area: area.abs(),
        mx: sign * cx / 6.0,
        my: sign * cy / 6.0,
    }
}

/// Exterior ring minus holes.
fn polygon_moments(rings: &[Value]) -> Moments {
    let mut total = Moments::default();
    for (i, ring) in rings.iter().enumerate() {
        if let Some(ring) = ring.as_array() {
            total.add(ring_moments(ring), if i == 0 { 1.0 } else { -1.0 });
        }
    }
    total
}

fn geometry_moments(geometry: &Value) -> Moments {
    let coords = geometry.get("coordinates").and_then(Value::as_array);
    let mut total = Moments::default();
    match (geometry.get("type").and_then(Value::as_str), coords) {
        (Some("Polygon"), Some(rings)) => total.add(polygon_moments(rings), 1.0),
        (Some("MultiPolygon"), Some(polygons)) => {
            for polygon in polygons.iter().filter_map(Value::as_array) {
                total.add(polygon_moments(polygon), 1.0);
            }
        }
        _ => {}
    }
    total
}

/// Area-weighted centroid of all zone polygons as `(lat, lon)`.
///
/// Returns `None` when no zone has a polygon with positive area.
pub fn zones_centroid(zones: &[ZoneRecord]) -> Option<(f64, f64)> {
    let mut total = Moments::default();
    for geometry in zones.iter().filter_map(|z| z.geometry.as_ref()) {
        total.add(geometry_moments(geometry), 1.0);
    }
    if total.area <= 0.0 || !total.area.is_finite() {
        return None;
    }
    Some((total.my / total.area, total.mx / total.area))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zone(id: i64, geometry: Value) -> ZoneRecord {
        let mut z = ZoneRecord::new(id, None, None);
        z.geometry = Some(geometry);
        z
    }

    fn square(x0: f64, y0: f64, size: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[x0, y0], [x0 + size, y0], [x0 + size, y0 + size], [x0, y0 + size], [x0, y0]]]
        })
    }

    #[test]
    fn test_single_square() {
        let (lat, lon) = zones_centroid(&[zone(1, square(-71.0, -34.0, 1.0))]).unwrap();
        assert!((lat + 33.5).abs() < 1e-12);
        assert!((lon + 70.5).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_by_area() {
        // Unit square at x 0..1 and a 2x2 square at x 2..4
        let zs = [zone(1, square(0.0, 0.0, 1.0)), zone(2, square(2.0, 0.0, 2.0))];
        let (lat, lon) = zones_centroid(&zs).unwrap();
        assert!((lon - (0.5 * 1.0 + 3.0 * 4.0) / 5.0).abs() < 1e-12);
        assert!((lat - (0.5 * 1.0 + 1.0 * 4.0) / 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_clockwise_ring_and_hole() {
        let with_hole = json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [0.0, 4.0], [4.0, 4.0], [4.0, 0.0], [0.0, 0.0]],
                [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]
            ]
        });
        let (lat, lon) = zones_centroid(&[zone(1, with_hole)]).unwrap();
        // L-shape: 16 at (2,2) minus 4 at (1,1)
        let expected = (16.0 * 2.0 - 4.0 * 1.0) / 12.0;
        assert!((lat - expected).abs() < 1e-12);
        assert!((lon - expected).abs() < 1e-12);
    }

    #[test]
    fn test_multipolygon() {
        let multi = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]],
                [[[2.0, 0.0], [3.0, 0.0], [3.0, 1.0], [2.0, 1.0]]]
            ]
        });
        let (lat, lon) = zones_centroid(&[zone(1, multi)]).unwrap();
        assert!((lat - 0.5).abs() < 1e-12);
        assert!((lon - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_or_missing() {
        assert!(zones_centroid(&[]).is_none());
        assert!(zones_centroid(&[ZoneRecord::new(1, Some(1.0), None)]).is_none());
        let line = json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]});
        assert!(zones_centroid(&[zone(1, line)]).is_none());
    }
}
