//! Single-band raster as read from the pipeline's GeoTIFFs.

use std::path::{Path, PathBuf};

use crate::{GeoBounds, SourceCrs};

/// GDAL-style affine transform:
/// `x = gt[0] + col * gt[1] + row * gt[2]`, `y = gt[3] + col * gt[4] + row * gt[5]`.
pub type GeoTransform = [f64; 6];

/// A single-band grid of floating-point measurements.
///
/// Values are row-major, row 0 first. The raster is immutable once read and
/// lives for one render request.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub source: PathBuf,
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
    pub nodata: Option<f64>,
    pub crs: SourceCrs,
    pub geo_transform: GeoTransform,
}

impl Raster {
    pub fn new(
        source: impl Into<PathBuf>,
        width: usize,
        height: usize,
        values: Vec<f64>,
        nodata: Option<f64>,
        crs: SourceCrs,
        geo_transform: GeoTransform,
    ) -> Self {
        debug_assert_eq!(values.len(), width * height);
        Self {
            source: source.into(),
            width,
            height,
            values,
            nodata,
            crs,
            geo_transform,
        }
    }

    /// File name of the source, used in error notices.
    pub fn source_name(&self) -> String {
        file_name_of(&self.source)
    }

    /// True when `value` is the declared sentinel or not finite.
    ///
    /// Bands stored as float32 carry a sentinel that may not be exactly
    /// representable, so the float32-rounded sentinel also matches.
    pub fn is_missing(&self, value: f64) -> bool {
        if !value.is_finite() {
            return true;
        }
        match self.nodata {
            Some(nd) => value == nd || value == (nd as f32) as f64,
            None => false,
        }
    }

    /// Copy of the band with the sentinel replaced by NaN.
    pub fn masked_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|&v| if self.is_missing(v) { f64::NAN } else { v })
            .collect()
    }

    /// Finite, non-sentinel values in storage order.
    pub fn valid_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .copied()
            .filter(|&v| !self.is_missing(v))
            .collect()
    }

    pub fn has_valid_pixel(&self) -> bool {
        self.values.iter().any(|&v| !self.is_missing(v))
    }

    /// Bounds in the raster's own frame, from the four grid corners.
    pub fn native_bounds(&self) -> GeoBounds {
        let gt = &self.geo_transform;
        let (w, h) = (self.width as f64, self.height as f64);
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];
        let xs: Vec<f64> = corners.iter().map(|(c, r)| gt[0] + c * gt[1] + r * gt[2]).collect();
        let ys: Vec<f64> = corners.iter().map(|(c, r)| gt[3] + c * gt[4] + r * gt[5]).collect();
        GeoBounds::enclosing(&xs, &ys).unwrap_or_else(|| GeoBounds::new(gt[0], gt[3], gt[0], gt[3]))
    }

    /// Row 0 holds the northern edge.
    pub fn is_north_up(&self) -> bool {
        self.geo_transform[5] <= 0.0
    }

    /// Column 0 holds the western edge.
    pub fn is_west_first(&self) -> bool {
        self.geo_transform[1] >= 0.0
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
