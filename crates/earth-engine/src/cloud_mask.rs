//! Sentinel-2 QA60 cloud masking.
//!
//! Bit 10 of the QA60 band flags opaque clouds and bit 11 cirrus. A pixel
//! with either bit set is masked in every band; the rest are scaled from
//! digital numbers to surface reflectance.

use std::path::Path;

use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::{EeError, EeResult};

pub const OPAQUE_CLOUD_BIT: u32 = 10;
pub const CIRRUS_BIT: u32 = 11;
pub const CLOUD_BITS: u32 = (1 << OPAQUE_CLOUD_BIT) | (1 << CIRRUS_BIT);

/// Sentinel-2 L2A digital numbers per unit reflectance.
pub const REFLECTANCE_SCALE: f64 = 10_000.0;

/// A multi-band image with a shared grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    /// Row-major values, one vector per band.
    pub bands: Vec<Vec<f64>>,
    pub nodata: Vec<Option<f64>>,
    pub geo_transform: Option<[f64; 6]>,
    /// WKT, empty when undeclared.
    pub projection: String,
}

impl Image {
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn is_missing(&self, band: usize, value: f64) -> bool {
        !value.is_finite() || self.nodata.get(band).copied().flatten() == Some(value)
    }
}

/// True when the QA value flags cloud or cirrus, or is itself missing.
pub fn is_cloudy(qa: f64) -> bool {
    if !qa.is_finite() || qa < 0.0 {
        return true;
    }
    (qa as u32) & CLOUD_BITS != 0
}

/// Mask cloudy pixels and scale to reflectance.
///
/// `qa_band` is 1-based, as GDAL numbers bands. The QA band is dropped from
/// the output; masked pixels are NaN, which is also the output no-data.
pub fn mask_clouds(image: &Image, qa_band: usize) -> EeResult<Image> {
    let count = image.band_count();
    if qa_band == 0 || qa_band > count {
        return Err(EeError::QaBandOutOfRange { band: qa_band, count });
    }
    if count < 2 {
        return Err(EeError::NoDataBands);
    }
    let expected = image.width * image.height;
    for (i, band) in image.bands.iter().enumerate() {
        if band.len() != expected {
            return Err(EeError::BandSize {
                band: i + 1,
                expected,
                actual: band.len(),
            });
        }
    }

    let qa_index = qa_band - 1;
    let cloudy: Vec<bool> = image.bands[qa_index]
        .iter()
        .map(|&qa| image.is_missing(qa_index, qa) || is_cloudy(qa))
        .collect();

    let bands: Vec<Vec<f64>> = image
        .bands
        .par_iter()
        .enumerate()
        .filter(|(i, _)| *i != qa_index)
        .map(|(i, values)| {
            values
                .iter()
                .zip(&cloudy)
                .map(|(&v, &masked)| {
                    if masked || image.is_missing(i, v) {
                        f64::NAN
                    } else {
                        v / REFLECTANCE_SCALE
                    }
                })
                .collect()
        })
        .collect();

    let masked = cloudy.iter().filter(|&&c| c).count();
    debug!(masked, total = expected, bands = bands.len(), "Applied QA60 mask");

    Ok(Image {
        width: image.width,
        height: image.height,
        nodata: vec![Some(f64::NAN); bands.len()],
        bands,
        geo_transform: image.geo_transform,
        projection: image.projection.clone(),
    })
}

/// Read every band of a raster as `f64`.
#[instrument(level = "debug", fields(path = %path.display()))]
pub fn read_image(path: &Path) -> EeResult<Image> {
    let gdal_err = |e| EeError::gdal(path, e);
    let dataset = Dataset::open(path).map_err(gdal_err)?;
    let (width, height) = dataset.raster_size();

    let mut bands = Vec::new();
    let mut nodata = Vec::new();
    for index in 1..=dataset.raster_count() {
        let band = dataset.rasterband(index).map_err(gdal_err)?;
        let buffer: Buffer<f64> = band
            .read_as((0, 0), (width, height), (width, height), None)
            .map_err(gdal_err)?;
        bands.push(buffer.data().to_vec());
        nodata.push(band.no_data_value());
    }

    Ok(Image {
        width,
        height,
        bands,
        nodata,
        geo_transform: dataset.geo_transform().ok(),
        projection: dataset.projection(),
    })
}

/// Write `image` as a float64 GeoTIFF.
#[instrument(level = "debug", skip(image), fields(path = %path.display()))]
pub fn write_image(path: &Path, image: &Image) -> EeResult<()> {
    let gdal_err = |e| EeError::gdal(path, e);
    let driver = DriverManager::get_driver_by_name("GTiff").map_err(gdal_err)?;
    let mut dataset = driver
        .create_with_band_type::<f64, _>(path, image.width, image.height, image.band_count())
        .map_err(gdal_err)?;
    if let Some(gt) = &image.geo_transform {
        dataset.set_geo_transform(gt).map_err(gdal_err)?;
    }
    if !image.projection.is_empty() {
        dataset.set_projection(&image.projection).map_err(gdal_err)?;
    }

    for (i, values) in image.bands.iter().enumerate() {
        let mut band = dataset.rasterband(i + 1).map_err(gdal_err)?;
        if let Some(nd) = image.nodata.get(i).copied().flatten() {
            band.set_no_data_value(Some(nd)).map_err(gdal_err)?;
        }
        let mut buffer = Buffer::new((image.width, image.height), values.clone());
        band.write((0, 0), (image.width, image.height), &mut buffer)
            .map_err(gdal_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(bands: Vec<Vec<f64>>) -> Image {
        let n = bands.len();
        Image {
            width: 2,
            height: 2,
            bands,
            nodata: vec![None; n],
            geo_transform: None,
            projection: String::new(),
        }
    }

    #[test]
    fn test_is_cloudy() {
        assert!(!is_cloudy(0.0));
        assert!(is_cloudy(1024.0));
        assert!(is_cloudy(2048.0));
        assert!(is_cloudy(3072.0));
        // Other bits do not mask
        assert!(!is_cloudy(512.0));
        assert!(!is_cloudy(4096.0));
        assert!(is_cloudy(f64::NAN));
    }

    #[test]
    fn test_mask_and_scale() {
        let img = image(vec![
            vec![1000.0, 2000.0, 3000.0, 4000.0],
            vec![0.0, 1024.0, 2048.0, 512.0],
        ]);
        let out = mask_clouds(&img, 2).unwrap();
        assert_eq!(out.band_count(), 1);
        let band = &out.bands[0];
        assert_eq!(band[0], 0.1);
        assert!(band[1].is_nan());
        assert!(band[2].is_nan());
        assert_eq!(band[3], 0.4);
    }

    #[test]
    fn test_qa_band_position_is_respected() {
        let img = image(vec![
            vec![2048.0, 0.0, 0.0, 0.0],
            vec![10.0, 20.0, 30.0, 40.0],
            vec![5.0, 5.0, 5.0, 5.0],
        ]);
        let out = mask_clouds(&img, 1).unwrap();
        assert_eq!(out.band_count(), 2);
        assert!(out.bands[0][0].is_nan() && out.bands[1][0].is_nan());
        assert_eq!(out.bands[0][1], 0.002);
    }

    #[test]
    fn test_source_nodata_stays_missing() {
        let mut img = image(vec![vec![-1.0, 100.0, 100.0, 100.0], vec![0.0; 4]]);
        img.nodata[0] = Some(-1.0);
        let out = mask_clouds(&img, 2).unwrap();
        assert!(out.bands[0][0].is_nan());
        assert_eq!(out.bands[0][1], 0.01);
    }

    #[test]
    fn test_invalid_qa_band() {
        let img = image(vec![vec![0.0; 4], vec![0.0; 4]]);
        assert!(matches!(mask_clouds(&img, 0), Err(EeError::QaBandOutOfRange { .. })));
        assert!(matches!(mask_clouds(&img, 3), Err(EeError::QaBandOutOfRange { .. })));
        let single = image(vec![vec![0.0; 4]]);
        assert!(matches!(mask_clouds(&single, 1), Err(EeError::NoDataBands)));
    }

    #[test]
    fn test_band_size_mismatch() {
        let img = image(vec![vec![0.0; 3], vec![0.0; 4]]);
        assert!(matches!(mask_clouds(&img, 2), Err(EeError::BandSize { band: 1, .. })));
    }
}
