//! Read-only access to the change-detection pipeline's artifacts.
//!
//! Provides:
//! - The fixed data-root layout and file existence checks
//! - GeoTIFF band reading and zone polygons (GDAL)
//! - Report tables, prediction GeoJSON and figures
//! - Byte-for-byte downloads

pub mod downloads;
pub mod error;
pub mod layout;
pub mod raster;
pub mod reports;
pub mod zones;

pub use downloads::{read_download, Download};
pub use error::{StorageError, StorageResult};
pub use layout::{file_ok, require_file, DataLayout, LayerEntry};
pub use raster::read_raster;
pub use reports::{read_csv_table, read_feature_collection, CsvTable, ModelScore, ReportFigure};
pub use zones::{read_zones, ZoneSet};
