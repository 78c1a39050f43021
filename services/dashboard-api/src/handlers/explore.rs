//! Layer overlays and per-year statistics.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::Response,
    Json,
};
use landcover_common::{DashboardError, IndexKind, LayerId, LayerKind};
use renderer::{ClipBounds, ResolvedClip, YearStats};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::png_response;
use crate::error::ApiResult;
use crate::overlay_cache::CachedOverlay;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayParams {
    /// `ndvi`, `ndbi`, `delta_ndvi` or `delta_ndbi`.
    pub layer: String,
    /// Defaults to the last analysis year; ignored for deltas.
    pub year: Option<u16>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl OverlayParams {
    pub fn clip(&self) -> Result<ClipBounds, DashboardError> {
        clip_bounds(self.lower, self.upper)
    }
}

/// Explicit clip bounds from query parameters.
///
/// Only NaN and infinities are refused; inverted or out-of-range bounds
/// still render, saturated.
pub fn clip_bounds(lower: Option<f64>, upper: Option<f64>) -> Result<ClipBounds, DashboardError> {
    let clip = ClipBounds::new(lower, upper);
    match clip.non_finite() {
        Some((name, value)) => Err(DashboardError::invalid_parameter(
            name,
            format!("{} bound {} is not finite", name, value),
        )),
        None => Ok(clip),
    }
}

/// Where and how to drape an overlay.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayResponse {
    pub layer: LayerId,
    pub name: String,
    /// `[[south, west], [north, east]]`.
    pub bounds: [[f64; 2]; 2],
    pub width: usize,
    pub height: usize,
    pub clip: ResolvedClip,
    pub source: String,
    pub image_url: String,
}

impl OverlayResponse {
    pub fn new(slug: &str, layer: LayerId, cached: &CachedOverlay, clip: ClipBounds) -> Self {
        let overlay = &cached.overlay;
        Self {
            name: layer.display_name(),
            bounds: overlay.corner_pairs(),
            width: overlay.width,
            height: overlay.height,
            clip: overlay.clip,
            source: overlay.source.clone(),
            image_url: image_url(slug, &layer, clip),
            layer,
        }
    }
}

/// URL of the PNG for the same layer and bounds.
pub fn image_url(slug: &str, layer: &LayerId, clip: ClipBounds) -> String {
    let mut url = format!("/api/municipalities/{}/overlay.png?layer={}", slug, layer.kind());
    if let LayerId::Year { year, .. } = layer {
        url.push_str(&format!("&year={}", year));
    }
    if let Some(lower) = clip.lower {
        url.push_str(&format!("&lower={}", lower));
    }
    if let Some(upper) = clip.upper {
        url.push_str(&format!("&upper={}", upper));
    }
    url
}

async fn render(state: &AppState, slug: &str, params: &OverlayParams) -> ApiResult<(LayerId, Arc<CachedOverlay>)> {
    let municipality = state.municipality(slug)?;
    let kind: LayerKind = params.layer.parse()?;
    let layer = municipality.layer(kind, params.year)?;
    let path = state.layer_path(municipality, &layer);
    let cached = state.overlay(&layer, path, params.clip()?).await?;
    Ok((layer, cached))
}

/// GET /api/municipalities/:slug/overlay
#[instrument(skip(state))]
pub async fn overlay_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<OverlayParams>,
) -> ApiResult<Json<OverlayResponse>> {
    let (layer, cached) = render(&state, &slug, &params).await?;
    Ok(Json(OverlayResponse::new(&slug, layer, &cached, params.clip()?)))
}

/// GET /api/municipalities/:slug/overlay.png
#[instrument(skip(state))]
pub async fn overlay_png_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<OverlayParams>,
) -> ApiResult<Response> {
    let (_, cached) = render(&state, &slug, &params).await?;
    Ok(png_response(cached.png.clone()))
}

#[derive(Debug, Serialize)]
pub struct YearStatsResponse {
    pub municipality: String,
    pub index: IndexKind,
    pub years: Vec<YearStats>,
}

/// GET /api/municipalities/:slug/stats/:index
///
/// Mean, std, min and max of each available year, oldest first.
pub async fn year_stats_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((slug, index)): Path<(String, String)>,
) -> ApiResult<Json<YearStatsResponse>> {
    let municipality = state.municipality(&slug)?;
    let index: IndexKind = index.parse()?;
    let stats = state.year_stats(municipality, index).await?;
    Ok(Json(YearStatsResponse {
        municipality: municipality.slug.clone(),
        index,
        years: stats.as_ref().clone(),
    }))
}
