//! Single-band GeoTIFF reading through GDAL.

use std::path::Path;

use gdal::raster::Buffer;
use gdal::Dataset;
use landcover_common::{Raster, SourceCrs};
use tracing::{debug, instrument};

use crate::error::{StorageError, StorageResult};
use crate::layout::require_file;

/// Read band 1 of `path` as `f64`.
///
/// The dataset is closed before returning. The band's no-data sentinel and
/// the dataset's CRS travel with the values; masking is left to consumers.
#[instrument(level = "debug", fields(path = %path.display()))]
pub fn read_raster(path: &Path) -> StorageResult<Raster> {
    require_file(path)?;
    let dataset = Dataset::open(path).map_err(|e| StorageError::gdal(path, e))?;
    let band = dataset.rasterband(1).map_err(|e| StorageError::gdal(path, e))?;
    let (width, height) = band.size();
    let nodata = band.no_data_value();

    let buffer: Buffer<f64> = band
        .read_as((0, 0), (width, height), (width, height), None)
        .map_err(|e| StorageError::gdal(path, e))?;
    let values = buffer.data().to_vec();

    let geo_transform = dataset.geo_transform().map_err(|e| StorageError::gdal(path, e))?;
    let crs = source_crs(&dataset);

    debug!(width, height, ?nodata, crs = %crs, "Read raster band");

    Ok(Raster::new(path, width, height, values, nodata, crs, geo_transform))
}

/// Classify the dataset's CRS for the reprojector.
fn source_crs(dataset: &Dataset) -> SourceCrs {
    let wkt = dataset.projection();
    let epsg = dataset
        .spatial_ref()
        .ok()
        .and_then(|srs| srs.auth_code().ok())
        .and_then(|code| u32::try_from(code).ok());
    SourceCrs::from_definition(&wkt, if wkt.trim().is_empty() { None } else { epsg })
}
