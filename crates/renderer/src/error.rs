//! Error types for overlay rendering.

use landcover_common::DashboardError;
use projection::ProjectionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// No finite, non-sentinel pixel in the band.
    #[error("Raster {source_name} has no valid pixels")]
    EmptyRaster { source_name: String },

    #[error("Reprojection of {source_name} failed: {source}")]
    Reprojection {
        source_name: String,
        #[source]
        source: ProjectionError,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<RenderError> for DashboardError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::EmptyRaster { source_name } => DashboardError::EmptyRaster(source_name),
            RenderError::Reprojection { .. } => DashboardError::Reprojection(err.to_string()),
            RenderError::Encode(message) => DashboardError::Render(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_raster_maps_to_422() {
        let err: DashboardError = RenderError::EmptyRaster {
            source_name: "ndvi_pudahuel_2017.tif".to_string(),
        }
        .into();
        assert_eq!(err.http_status_code(), 422);
        assert!(err.to_string().contains("ndvi_pudahuel_2017.tif"));
    }

    #[test]
    fn test_reprojection_keeps_cause() {
        let err: DashboardError = RenderError::Reprojection {
            source_name: "delta_ndvi_2017_2024.tif".to_string(),
            source: ProjectionError::NoFinitePoints,
        }
        .into();
        assert_eq!(err.error_code(), "reprojection_failed");
        assert!(err.to_string().contains("delta_ndvi_2017_2024.tif"));
    }
}
