//! Densified bounding-box transform.

use landcover_common::GeoBounds;

use crate::{PointTransformer, ProjectionError};

/// Interior samples added along each edge before transforming.
pub const DEFAULT_DENSIFY_POINTS: usize = 21;

/// Sample the perimeter of `bounds`.
///
/// Walks bottom (west to east), right (south to north), top (east to west)
/// and left (north to south). Each edge contributes its starting corner plus
/// `interior` evenly spaced points, so the ring has `4 * (interior + 1)`
/// distinct points and every corner appears once.
pub fn densify_edges(bounds: &GeoBounds, interior: usize) -> (Vec<f64>, Vec<f64>) {
    let corners = [
        (bounds.west, bounds.south),
        (bounds.east, bounds.south),
        (bounds.east, bounds.north),
        (bounds.west, bounds.north),
    ];
    let steps = interior + 1;
    let mut xs = Vec::with_capacity(4 * steps);
    let mut ys = Vec::with_capacity(4 * steps);

    for edge in 0..4 {
        let (x0, y0) = corners[edge];
        let (x1, y1) = corners[(edge + 1) % 4];
        for i in 0..steps {
            let t = i as f64 / steps as f64;
            xs.push(x0 + (x1 - x0) * t);
            ys.push(y0 + (y1 - y0) * t);
        }
    }

    (xs, ys)
}

/// Transform `bounds` through `transformer`, densifying each edge with
/// `densify_pts` interior samples, and return the enclosing box of every
/// finite result.
pub fn transform_bounds<T>(
    transformer: &T,
    bounds: &GeoBounds,
    densify_pts: usize,
) -> Result<GeoBounds, ProjectionError>
where
    T: PointTransformer + ?Sized,
{
    let (mut xs, mut ys) = densify_edges(bounds, densify_pts);
    transformer.transform_points(&mut xs, &mut ys)?;
    GeoBounds::enclosing(&xs, &ys).ok_or(ProjectionError::NoFinitePoints)
}
