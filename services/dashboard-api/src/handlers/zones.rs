//! Zone choropleth, KPIs, attribute table and single-zone panel.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use landcover_common::{DashboardError, FeatureCollection, ZoneMetric};
use renderer::choropleth::{tooltip_fields, BUCKET_COLORS};
use renderer::{zone_kpis, Choropleth, MetricKpi};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::ApiResult;
use crate::state::AppState;

pub const ZONES_LAYER_NAME: &str = "Zonas (intensidad cambio construido)";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZonesParams {
    /// Metric driving the fill color; `perc_gain_built` when absent.
    pub metric: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TooltipField {
    pub field: &'static str,
    pub alias: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ZonesResponse {
    pub name: &'static str,
    pub metric: ZoneMetric,
    /// Bucket boundaries; `None` when no zone carries the metric.
    pub boundaries: Option<[f64; 4]>,
    /// Fill colors, lightest bucket first.
    pub legend: Vec<String>,
    pub tooltip: Vec<TooltipField>,
    /// `(lat, lon)`.
    pub center: [f64; 2],
    pub features: FeatureCollection,
}

/// GET /api/zones
#[instrument(skip(state))]
pub async fn zones_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ZonesParams>,
) -> ApiResult<Json<ZonesResponse>> {
    let metric = match params.metric.as_deref() {
        Some(name) => name.parse()?,
        None => ZoneMetric::PercGainBuilt,
    };
    let zones = state.zones().await?;
    let choropleth = Choropleth::from_zones(&zones.zones, metric);
    let features = choropleth
        .map(|c| c.styled_features(&zones.zones))
        .unwrap_or_default();
    let (lat, lon) = state.zone_center(&zones);

    Ok(Json(ZonesResponse {
        name: ZONES_LAYER_NAME,
        metric,
        boundaries: choropleth.map(|c| c.boundaries),
        legend: BUCKET_COLORS.iter().map(|c| c.to_hex()).collect(),
        tooltip: tooltip_fields()
            .into_iter()
            .map(|(field, alias)| TooltipField { field, alias })
            .collect(),
        center: [lat, lon],
        features,
    }))
}

#[derive(Debug, Serialize)]
pub struct KpisResponse {
    /// `None` when the zones carry neither metric.
    pub kpis: Option<Vec<MetricKpi>>,
}

/// GET /api/zones/kpis
pub async fn kpis_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<KpisResponse>> {
    let zones = state.zones().await?;
    Ok(Json(KpisResponse {
        kpis: zone_kpis(&zones.zones),
    }))
}

#[derive(Debug, Serialize)]
pub struct ZoneTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// GET /api/zones/table
///
/// Attribute columns in file order, geometry left out.
pub async fn table_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<ZoneTable>> {
    let zones = state.zones().await?;
    let rows = zones
        .zones
        .iter()
        .map(|zone| {
            zones
                .columns
                .iter()
                .map(|c| zone.attributes.get(c).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Ok(Json(ZoneTable {
        columns: zones.columns.clone(),
        rows,
    }))
}

#[derive(Debug, Serialize)]
pub struct BarValue {
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct ZoneDetail {
    pub zone_id: i64,
    pub perc_loss_veg: Option<f64>,
    pub perc_gain_built: Option<f64>,
    /// Two-bar comparison, present only when both metrics are.
    pub series: Option<Vec<BarValue>>,
    pub zone_ids: Vec<i64>,
}

/// GET /api/zones/:zone_id
pub async fn zone_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(zone_id): Path<String>,
) -> ApiResult<Json<ZoneDetail>> {
    let id: i64 = zone_id
        .trim()
        .parse()
        .map_err(|_| DashboardError::invalid_parameter("zone_id", format!("'{}' is not an integer", zone_id)))?;
    let zones = state.zones().await?;
    let zone = zones
        .find(id)
        .ok_or_else(|| DashboardError::ZoneNotFound(id.to_string()))?;

    let loss = zone.metric(ZoneMetric::PercLossVeg);
    let gain = zone.metric(ZoneMetric::PercGainBuilt);
    let series = loss.zip(gain).map(|(loss, gain)| {
        vec![
            BarValue {
                label: "% pérdida veg",
                value: loss,
            },
            BarValue {
                label: "% aumento construido",
                value: gain,
            },
        ]
    });

    Ok(Json(ZoneDetail {
        zone_id: zone.zone_id,
        perc_loss_veg: loss,
        perc_gain_built: gain,
        series,
        zone_ids: zones.zone_ids(),
    }))
}
