//! Raster to geo-referenced RGBA overlay.

use landcover_common::{GeoBounds, Raster};
use projection::BoundsReprojector;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::RenderError;
use crate::gradient::{normalize, ramp_color};
use crate::png::create_png_auto;
use crate::stats::percentiles;

/// Default clip percentiles when bounds are not given.
pub const DEFAULT_LOWER_PERCENTILE: f64 = 2.0;
pub const DEFAULT_UPPER_PERCENTILE: f64 = 98.0;

/// Optional explicit clip bounds for a render request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipBounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl ClipBounds {
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    pub fn explicit(lower: f64, upper: f64) -> Self {
        Self::new(Some(lower), Some(upper))
    }

    /// The first explicit bound that is NaN or infinite, by name.
    pub fn non_finite(&self) -> Option<(&'static str, f64)> {
        [("lower", self.lower), ("upper", self.upper)]
            .into_iter()
            .find_map(|(name, bound)| bound.filter(|v| !v.is_finite()).map(|v| (name, v)))
    }

    /// Bit-exact key component, so `-0.0` and `0.0` stay distinct.
    pub fn key_bits(&self) -> (Option<u64>, Option<u64>) {
        (self.lower.map(f64::to_bits), self.upper.map(f64::to_bits))
    }
}

/// The bounds actually used for the rescale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedClip {
    pub lower: f64,
    pub upper: f64,
}

impl ResolvedClip {
    /// Fill missing bounds from the p2/p98 of `valid` values.
    ///
    /// Bounds are used as given, even when `lower > upper`; every pixel then
    /// saturates to the upper end of the ramp. `None` when `valid` is empty
    /// and a default is needed.
    fn resolve(clip: ClipBounds, valid: &[f64]) -> Option<Self> {
        let (lower, upper) = match (clip.lower, clip.upper) {
            (Some(lower), Some(upper)) => (lower, upper),
            (lower, upper) => {
                let [p_lo, p_hi] = percentiles(valid, [DEFAULT_LOWER_PERCENTILE, DEFAULT_UPPER_PERCENTILE])?;
                (lower.unwrap_or(p_lo), upper.unwrap_or(p_hi))
            }
        };
        Some(Self { lower, upper })
    }
}

/// RGBA grid draped over a lon/lat box.
///
/// Row 0 is the northern edge and column 0 the western edge, so the top-left
/// pixel sits at `(north, west)` and the bottom-right at `(south, east)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub width: usize,
    pub height: usize,
    #[serde(skip)]
    pub pixels: Vec<u8>,
    pub bounds: GeoBounds,
    pub clip: ResolvedClip,
    pub source: String,
}

impl Overlay {
    /// `[[south, west], [north, east]]`.
    pub fn corner_pairs(&self) -> [[f64; 2]; 2] {
        self.bounds.to_corner_pairs()
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        create_png_auto(&self.pixels, self.width, self.height).map_err(|e| RenderError::Encode(e.to_string()))
    }
}

/// Render a raster into a Normalized Overlay.
///
/// Missing pixels (sentinel or non-finite) are transparent. Omitted clip
/// bounds default to the 2nd/98th percentiles of the valid pixels. The
/// result depends only on the raster contents and `clip`.
pub fn render_overlay(
    raster: &Raster,
    clip: ClipBounds,
    reprojector: &dyn BoundsReprojector,
) -> Result<Overlay, RenderError> {
    let valid = raster.valid_values();
    let empty = || RenderError::EmptyRaster {
        source_name: raster.source_name(),
    };
    if valid.is_empty() {
        return Err(empty());
    }
    let resolved = ResolvedClip::resolve(clip, &valid).ok_or_else(empty)?;

    let bounds = reprojector
        .to_geographic(&raster.crs, raster.native_bounds())
        .map_err(|source| RenderError::Reprojection {
            source_name: raster.source_name(),
            source,
        })?;

    let (width, height) = (raster.width, raster.height);
    let flip_rows = !raster.is_north_up();
    let flip_cols = !raster.is_west_first();

    let mut pixels = vec![0u8; width * height * 4];
    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(out_row, row_px)| {
            let src_row = if flip_rows { height - 1 - out_row } else { out_row };
            for out_col in 0..width {
                let src_col = if flip_cols { width - 1 - out_col } else { out_col };
                let value = raster.values[src_row * width + src_col];
                let norm = if raster.is_missing(value) {
                    f64::NAN
                } else {
                    normalize(value, resolved.lower, resolved.upper)
                };
                row_px[out_col * 4..out_col * 4 + 4].copy_from_slice(&ramp_color(norm).to_rgba());
            }
        });

    debug!(
        source = %raster.source.display(),
        width,
        height,
        lower = resolved.lower,
        upper = resolved.upper,
        valid = valid.len(),
        "Rendered overlay"
    );

    Ok(Overlay {
        width,
        height,
        pixels,
        bounds,
        clip: resolved,
        source: raster.source_name(),
    })
}
