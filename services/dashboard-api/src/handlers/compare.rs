//! Side-by-side comparison of one index between two years.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use landcover_common::{DashboardError, IndexKind, LayerId};
use serde::{Deserialize, Serialize};
use storage::file_ok;
use tracing::instrument;

use super::explore::{clip_bounds, OverlayResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct CompareParams {
    pub index: String,
    /// Defaults to the first analysis year.
    pub before: Option<u16>,
    /// Defaults to the last analysis year.
    pub after: Option<u16>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub municipality: String,
    pub before: OverlayResponse,
    pub after: OverlayResponse,
}

/// GET /api/municipalities/:slug/compare
///
/// Both sides or nothing: a missing raster on either side fails the whole
/// request with both paths named.
#[instrument(skip(state))]
pub async fn compare_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<CompareParams>,
) -> ApiResult<Json<CompareResponse>> {
    let municipality = state.municipality(&slug)?;
    let index: IndexKind = params.index.parse()?;
    let clip = clip_bounds(params.lower, params.upper)?;
    let (first, last) = match (municipality.first_year(), municipality.last_year()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(DashboardError::LayerNotFound(format!("{} has no years", municipality.slug)).into()),
    };
    let before_year = municipality.require_year(params.before.unwrap_or(first))?;
    let after_year = municipality.require_year(params.after.unwrap_or(last))?;

    let before = LayerId::Year {
        index,
        year: before_year,
    };
    let after = LayerId::Year {
        index,
        year: after_year,
    };
    let before_path = state.layer_path(municipality, &before);
    let after_path = state.layer_path(municipality, &after);
    if !file_ok(&before_path) || !file_ok(&after_path) {
        return Err(DashboardError::ComparisonUnavailable {
            before: before_path,
            after: after_path,
        }
        .into());
    }

    let (before_overlay, after_overlay) = tokio::try_join!(
        state.overlay(&before, before_path, clip),
        state.overlay(&after, after_path, clip),
    )?;

    Ok(Json(CompareResponse {
        municipality: municipality.slug.clone(),
        before: OverlayResponse::new(&slug, before, &before_overlay, clip),
        after: OverlayResponse::new(&slug, after, &after_overlay, clip),
    }))
}
