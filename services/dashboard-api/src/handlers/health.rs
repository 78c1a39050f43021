//! Health checks and metrics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::state::AppState;

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /ready - Readiness check (data root exists)
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
    }
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(handle): Extension<PrometheusHandle>,
) -> Response {
    let mut output = handle.render();

    let stats = state.overlay_cache.stats();
    output.push_str(&format!(
        "# HELP overlay_cache_entries Current overlay cache entries\n# TYPE overlay_cache_entries gauge\noverlay_cache_entries {}\n",
        stats.entry_count.load(Ordering::Relaxed)
    ));
    output.push_str(&format!(
        "# HELP overlay_cache_evictions_total Overlays evicted from the cache\n# TYPE overlay_cache_evictions_total counter\noverlay_cache_evictions_total {}\n",
        stats.evictions.load(Ordering::Relaxed)
    ));
    output.push_str(&format!(
        "# HELP overlay_cache_hit_rate Overlay cache hit rate (percent)\n# TYPE overlay_cache_hit_rate gauge\noverlay_cache_hit_rate {:.2}\n",
        stats.hit_rate()
    ));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        output,
    )
        .into_response()
}
