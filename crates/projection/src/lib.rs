//! Reprojection of raster extents into geographic coordinates.
//!
//! Map overlays are draped in longitude/latitude, so every raster extent has
//! to be expressed in WGS84 before it leaves the renderer. Straight edges in
//! a projected frame become curves in lon/lat; transforming only the corners
//! under-bounds them, so edges are densified before transforming.

pub mod densify;
pub mod error;
pub mod gdal_transform;

pub use densify::{densify_edges, transform_bounds, DEFAULT_DENSIFY_POINTS};
pub use error::ProjectionError;
pub use gdal_transform::{GdalReprojector, GdalTransformer};

use landcover_common::{GeoBounds, SourceCrs};

/// Converts points from some source frame into WGS84 lon/lat.
///
/// Points that cannot be transformed are set to a non-finite value rather
/// than failing the whole batch.
pub trait PointTransformer {
    fn transform_points(&self, xs: &mut [f64], ys: &mut [f64]) -> Result<(), ProjectionError>;
}

/// Resolves a raster's native extent into geographic bounds.
pub trait BoundsReprojector {
    fn to_geographic(&self, crs: &SourceCrs, native: GeoBounds) -> Result<GeoBounds, ProjectionError>;
}

/// Reprojector for inputs known to be geographic already.
///
/// Undeclared and WGS84 extents pass through untouched; anything else is an
/// error because there is nothing to transform with.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeographicOnly;

impl BoundsReprojector for GeographicOnly {
    fn to_geographic(&self, crs: &SourceCrs, native: GeoBounds) -> Result<GeoBounds, ProjectionError> {
        match crs {
            SourceCrs::Undeclared | SourceCrs::Geographic => Ok(native),
            SourceCrs::Projected { definition } => Err(ProjectionError::UnsupportedCrs(definition.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geographic_passthrough_is_identity() {
        let native = GeoBounds::new(-70.95, -33.52, -70.71, -33.36);
        let out = GeographicOnly.to_geographic(&SourceCrs::Geographic, native).unwrap();
        assert_eq!(out, native);
        let out = GeographicOnly.to_geographic(&SourceCrs::Undeclared, native).unwrap();
        assert_eq!(out, native);
    }

    #[test]
    fn test_geographic_only_rejects_projected() {
        let crs = SourceCrs::Projected {
            definition: "EPSG:32719".to_string(),
        };
        let err = GeographicOnly
            .to_geographic(&crs, GeoBounds::new(0.0, 0.0, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, ProjectionError::UnsupportedCrs(_)));
    }
}
