//! Dashboard API Service Library
//!
//! HTTP backend for the land-cover change dashboards: geo-referenced index
//! overlays, zone choropleths, downloads and model reports.

pub mod config;
pub mod error;
pub mod geo_env;
pub mod handlers;
pub mod metrics;
pub mod overlay_cache;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// All routes with their middleware.
pub fn build_router(state: Arc<AppState>, prometheus: PrometheusHandle) -> Router {
    Router::new()
        // Municipalities and layers
        .route("/api/municipalities", get(handlers::catalog::municipalities_handler))
        .route("/api/municipalities/:slug/layers", get(handlers::catalog::layers_handler))
        // Explore
        .route("/api/municipalities/:slug/overlay", get(handlers::explore::overlay_handler))
        .route(
            "/api/municipalities/:slug/overlay.png",
            get(handlers::explore::overlay_png_handler),
        )
        .route(
            "/api/municipalities/:slug/stats/:index",
            get(handlers::explore::year_stats_handler),
        )
        // Compare
        .route("/api/municipalities/:slug/compare", get(handlers::compare::compare_handler))
        // Zones
        .route("/api/zones", get(handlers::zones::zones_handler))
        .route("/api/zones/kpis", get(handlers::zones::kpis_handler))
        .route("/api/zones/table", get(handlers::zones::table_handler))
        .route("/api/zones/:zone_id", get(handlers::zones::zone_handler))
        // Downloads
        .route(
            "/api/municipalities/:slug/downloads/zones.csv",
            get(handlers::data::zones_csv_handler),
        )
        .route("/api/downloads/zones.gpkg", get(handlers::data::zones_gpkg_handler))
        // Reports
        .route("/api/reports/ml", get(handlers::reports::ml_report_handler))
        .route("/api/reports/ml/predictions", get(handlers::reports::predictions_handler))
        .route("/api/reports/synthesis", get(handlers::reports::synthesis_handler))
        .route("/api/reports/figures/:file", get(handlers::reports::figure_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
