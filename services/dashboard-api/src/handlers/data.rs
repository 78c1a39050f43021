//! Output file downloads.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
};
use storage::downloads::{CSV_CONTENT_TYPE, GPKG_CONTENT_TYPE};
use storage::layout::{zones_csv_name, ZONES_GPKG};
use storage::read_download;
use tracing::instrument;

use super::download_response;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/municipalities/:slug/downloads/zones.csv
#[instrument(skip(state))]
pub async fn zones_csv_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Response> {
    let municipality = state.municipality(&slug)?;
    let path = state.layout.zones_csv(&municipality.slug);
    let download = read_download(&path, zones_csv_name(&municipality.slug), CSV_CONTENT_TYPE).await?;
    Ok(download_response(download))
}

/// GET /api/downloads/zones.gpkg
#[instrument(skip(state))]
pub async fn zones_gpkg_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Response> {
    let path = state.layout.zones_gpkg();
    let download = read_download(&path, ZONES_GPKG, GPKG_CONTENT_TYPE).await?;
    Ok(download_response(download))
}
