//! Error types for the dashboard crates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using DashboardError.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Primary error type surfaced to dashboard panels.
///
/// Every variant is local to one request: the caller shows it as an inline
/// notice and renders the affected panel empty.
#[derive(Debug, Error)]
pub enum DashboardError {
    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Municipality not found: {0}")]
    MunicipalityNotFound(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    // === Data Errors ===
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A side-by-side view needs both rasters.
    #[error("Comparison needs both {} and {}", before.display(), after.display())]
    ComparisonUnavailable { before: PathBuf, after: PathBuf },

    #[error("Empty raster or no valid data: {0}")]
    EmptyRaster(String),

    #[error("Reprojection failed: {0}")]
    Reprojection(String),

    #[error("Failed to read data: {0}")]
    DataRead(String),

    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        DashboardError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the notice payload.
    pub fn error_code(&self) -> &'static str {
        match self {
            DashboardError::InvalidParameter { .. } => "invalid_parameter",
            DashboardError::MunicipalityNotFound(_) => "municipality_not_found",
            DashboardError::LayerNotFound(_) => "layer_not_found",
            DashboardError::ZoneNotFound(_) => "zone_not_found",
            DashboardError::FileNotFound(_) | DashboardError::ComparisonUnavailable { .. } => "file_not_found",
            DashboardError::EmptyRaster(_) => "empty_raster",
            DashboardError::Reprojection(_) => "reprojection_failed",
            DashboardError::DataRead(_) => "data_read_error",
            DashboardError::MissingColumn { .. } => "missing_column",
            DashboardError::Render(_) => "render_error",
            DashboardError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            DashboardError::InvalidParameter { .. } => 400,

            DashboardError::MunicipalityNotFound(_)
            | DashboardError::LayerNotFound(_)
            | DashboardError::ZoneNotFound(_)
            | DashboardError::FileNotFound(_)
            | DashboardError::ComparisonUnavailable { .. } => 404,

            DashboardError::EmptyRaster(_) | DashboardError::MissingColumn { .. } => 422,

            _ => 500,
        }
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::DataRead(err.to_string())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Internal(format!("JSON error: {}", err))
    }
}
