//! Byte-for-byte file downloads.

use std::path::Path;

use bytes::Bytes;

use crate::error::{StorageError, StorageResult};
use crate::layout::require_file;

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const GPKG_CONTENT_TYPE: &str = "application/geopackage+sqlite3";
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// File contents plus what the client should call them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

impl Download {
    /// `Content-Disposition` value for an attachment.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name.replace('"', ""))
    }
}

/// Read `path` unchanged.
pub async fn read_download(path: &Path, file_name: impl Into<String>, content_type: &'static str) -> StorageResult<Download> {
    require_file(path)?;
    let bytes = tokio::fs::read(path).await.map_err(|e| StorageError::io(path, e))?;
    Ok(Download {
        file_name: file_name.into(),
        content_type,
        bytes: Bytes::from(bytes),
    })
}
