//! Fixed file layout of the pipeline's outputs under a data root.
//!
//! ```text
//! <root>/data/processed/            (or <root>/data when absent)
//!     ndvi_<slug>_<year>.tif
//!     ndbi_<slug>_<year>.tif
//!     delta_ndvi_<first>_<last>.tif
//!     delta_ndbi_<first>_<last>.tif
//!     cambios_por_zona.gpkg
//! <root>/outputs/
//!     cambios_por_zona_<slug>.csv
//!     reports/
//!         ml_metrics.csv, ml_results.geojson, final_metrics.csv, *.png
//! ```

use std::path::{Path, PathBuf};

use landcover_common::{IndexKind, LayerId, LayerKind};
use serde::Serialize;

use crate::error::{StorageError, StorageResult};

pub const ZONES_GPKG: &str = "cambios_por_zona.gpkg";

/// True when `path` exists and is a regular file.
pub fn file_ok(path: &Path) -> bool {
    path.is_file()
}

/// `path` itself when it is a regular file, otherwise `NotFound`.
pub fn require_file(path: &Path) -> StorageResult<&Path> {
    if file_ok(path) {
        Ok(path)
    } else {
        Err(StorageError::NotFound(path.to_path_buf()))
    }
}

/// Resolved directories of one data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub root: PathBuf,
    /// Rasters and the zones GeoPackage.
    pub processed: PathBuf,
    /// Download mirrors.
    pub outputs: PathBuf,
    /// Report tables and figures.
    pub reports: PathBuf,
}

impl DataLayout {
    /// Standard layout under `root`.
    ///
    /// `data/processed` is used when it exists, otherwise `data`.
    pub fn resolve(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data = root.join("data");
        let processed = if data.join("processed").is_dir() {
            data.join("processed")
        } else {
            data
        };
        let outputs = root.join("outputs");
        let reports = outputs.join("reports");
        Self {
            root,
            processed,
            outputs,
            reports,
        }
    }

    pub fn index_raster(&self, slug: &str, index: IndexKind, year: u16) -> PathBuf {
        self.processed.join(format!("{}_{}_{}.tif", index, slug, year))
    }

    /// Delta raster of `last` minus `first`.
    pub fn delta_raster(&self, index: IndexKind, first: u16, last: u16) -> PathBuf {
        self.processed.join(format!("delta_{}_{}_{}.tif", index, first, last))
    }

    pub fn layer_path(&self, slug: &str, layer: &LayerId) -> PathBuf {
        match *layer {
            LayerId::Year { index, year } => self.index_raster(slug, index, year),
            LayerId::Delta { index, from, to } => self.delta_raster(index, from, to),
        }
    }

    pub fn zones_gpkg(&self) -> PathBuf {
        self.processed.join(ZONES_GPKG)
    }

    pub fn zones_csv(&self, slug: &str) -> PathBuf {
        self.outputs.join(zones_csv_name(slug))
    }

    pub fn report(&self, file_name: &str) -> PathBuf {
        self.reports.join(file_name)
    }

    /// Every layer of a municipality with its path and availability.
    ///
    /// Year layers come first in index then year order, deltas last.
    pub fn catalog(&self, slug: &str, years: &[u16]) -> Vec<LayerEntry> {
        let mut entries = Vec::new();
        for index in IndexKind::ALL {
            for &year in years {
                entries.push(self.entry(slug, LayerId::Year { index, year }));
            }
        }
        if let (Some(&first), Some(&last)) = (years.first(), years.last()) {
            for index in IndexKind::ALL {
                entries.push(self.entry(
                    slug,
                    LayerId::Delta {
                        index,
                        from: first,
                        to: last,
                    },
                ));
            }
        }
        entries
    }

    fn entry(&self, slug: &str, id: LayerId) -> LayerEntry {
        let path = self.layer_path(slug, &id);
        LayerEntry {
            kind: id.kind(),
            name: id.display_name(),
            available: file_ok(&path),
            id,
            path,
        }
    }
}

pub fn zones_csv_name(slug: &str) -> String {
    format!("cambios_por_zona_{}.csv", slug)
}

/// One row of the layer catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerEntry {
    pub id: LayerId,
    pub kind: LayerKind,
    pub name: String,
    pub path: PathBuf,
    pub available: bool,
}
