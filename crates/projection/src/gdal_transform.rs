//! GDAL/PROJ-backed transforms into WGS84.

use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use landcover_common::crs::WGS84_EPSG;
use landcover_common::{GeoBounds, SourceCrs};
use tracing::debug;

use crate::densify::{transform_bounds, DEFAULT_DENSIFY_POINTS};
use crate::{BoundsReprojector, PointTransformer, ProjectionError};

/// Point transformer from an arbitrary CRS definition into lon/lat.
///
/// Both ends use traditional GIS axis order so x is always easting or
/// longitude regardless of the authority's declared axis order.
pub struct GdalTransformer {
    transform: CoordTransform,
}

impl GdalTransformer {
    /// Build a transformer from a WKT, PROJ string or `EPSG:n` definition.
    pub fn to_wgs84(definition: &str) -> Result<Self, ProjectionError> {
        let mut source = SpatialRef::from_definition(definition)
            .map_err(|e| ProjectionError::UnsupportedCrs(format!("{}: {}", definition, e)))?;
        source.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

        let mut target = SpatialRef::from_epsg(WGS84_EPSG)?;
        target.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

        let transform = CoordTransform::new(&source, &target)?;
        Ok(Self { transform })
    }
}

impl PointTransformer for GdalTransformer {
    fn transform_points(&self, xs: &mut [f64], ys: &mut [f64]) -> Result<(), ProjectionError> {
        if xs.len() != ys.len() {
            return Err(ProjectionError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let mut zs = vec![0.0; xs.len()];
        self.transform.transform_coords(xs, ys, &mut zs)?;
        Ok(())
    }
}

/// Reprojector used for real rasters.
///
/// Undeclared frames keep their stored bounds, WGS84 is an identity, and
/// every other frame goes through a densified PROJ transform.
#[derive(Debug, Clone, Copy)]
pub struct GdalReprojector {
    pub densify_pts: usize,
}

impl Default for GdalReprojector {
    fn default() -> Self {
        Self {
            densify_pts: DEFAULT_DENSIFY_POINTS,
        }
    }
}

impl BoundsReprojector for GdalReprojector {
    fn to_geographic(&self, crs: &SourceCrs, native: GeoBounds) -> Result<GeoBounds, ProjectionError> {
        match crs {
            SourceCrs::Undeclared | SourceCrs::Geographic => Ok(native),
            SourceCrs::Projected { definition } => {
                let transformer = GdalTransformer::to_wgs84(definition)?;
                let bounds = transform_bounds(&transformer, &native, self.densify_pts)?;
                debug!(
                    west = bounds.west,
                    south = bounds.south,
                    east = bounds.east,
                    north = bounds.north,
                    "Reprojected raster extent to WGS84"
                );
                Ok(bounds)
            }
        }
    }
}
