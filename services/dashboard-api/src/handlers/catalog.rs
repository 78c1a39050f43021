//! Municipalities and their layer catalogs.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Serialize;
use storage::LayerEntry;

use crate::config::MunicipalityConfig;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/municipalities
pub async fn municipalities_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<MunicipalityConfig>> {
    Json(state.config.municipalities.clone())
}

#[derive(Debug, Serialize)]
pub struct LayersResponse {
    pub municipality: String,
    pub layers: Vec<LayerEntry>,
}

/// GET /api/municipalities/:slug/layers
///
/// Every layer with its resolved path and whether the file is there.
pub async fn layers_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<LayersResponse>> {
    let municipality = state.municipality(&slug)?;
    let layers = state.layout.catalog(&municipality.slug, &municipality.years);
    Ok(Json(LayersResponse {
        municipality: municipality.slug.clone(),
        layers,
    }))
}
