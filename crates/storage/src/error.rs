//! Storage error types.

use std::path::PathBuf;

use landcover_common::DashboardError;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("GDAL failed on {}: {message}", path.display())]
    Gdal { path: PathBuf, message: String },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid GeoJSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing column '{column}' in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report file '{0}' is not served")]
    NotServed(String),
}

impl StorageError {
    pub(crate) fn gdal(path: &std::path::Path, err: gdal::errors::GdalError) -> Self {
        StorageError::Gdal {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return StorageError::NotFound(path.to_path_buf());
        }
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<StorageError> for DashboardError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => DashboardError::FileNotFound(path),
            StorageError::MissingColumn { column, path } => DashboardError::MissingColumn {
                column,
                source_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            },
            StorageError::NotServed(name) => DashboardError::FileNotFound(PathBuf::from(name)),
            other => DashboardError::DataRead(other.to_string()),
        }
    }
}
