//! Error types for reprojection.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Unsupported or invalid source CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Coordinate transform failed: {0}")]
    TransformFailed(String),

    #[error("No edge point of the extent could be transformed")]
    NoFinitePoints,

    #[error("Coordinate arrays differ in length ({xs} vs {ys})")]
    LengthMismatch { xs: usize, ys: usize },
}

impl From<gdal::errors::GdalError> for ProjectionError {
    fn from(err: gdal::errors::GdalError) -> Self {
        ProjectionError::TransformFailed(err.to_string())
    }
}
