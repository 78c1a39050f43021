//! Earth Engine helper errors.

use std::path::PathBuf;

use thiserror::Error;

pub type EeResult<T> = Result<T, EeError>;

#[derive(Debug, Error)]
pub enum EeError {
    #[error("Earth Engine initialization failed for project '{project}': {message}")]
    Initialize { project: String, message: String },

    #[error("Earth Engine authentication failed: {0}")]
    Authenticate(String),

    #[error("Invalid credentials file {}: {message}", path.display())]
    Credentials { path: PathBuf, message: String },

    #[error("QA band {band} out of range (image has {count} bands)")]
    QaBandOutOfRange { band: usize, count: usize },

    #[error("Image has no bands besides the QA band")]
    NoDataBands,

    #[error("Band {band} has {actual} values, expected {expected}")]
    BandSize {
        band: usize,
        expected: usize,
        actual: usize,
    },

    #[error("GDAL failed on {}: {message}", path.display())]
    Gdal { path: PathBuf, message: String },
}

impl EeError {
    pub(crate) fn gdal(path: &std::path::Path, err: gdal::errors::GdalError) -> Self {
        EeError::Gdal {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
