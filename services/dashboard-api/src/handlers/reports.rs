//! Model and synthesis reports produced offline by the modelling notebooks.
//!
//! Display only: tables, summaries and figures are read as written.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::Response,
    Json,
};
use landcover_common::{DashboardError, FeatureCollection};
use renderer::gradient::normalize;
use renderer::{viridis_color, SeriesSummary};
use serde::{Deserialize, Serialize};
use serde_json::json;
use storage::downloads::PNG_CONTENT_TYPE;
use storage::reports::{
    figure, model_scores, FINAL_METRICS_CSV, ML_FIGURES, ML_METRICS_CSV, ML_RESULTS_GEOJSON, PREDICTION_COLUMNS,
    SYNTHESIS_FIGURES,
};
use storage::{file_ok, read_csv_table, read_download, read_feature_collection, CsvTable, ModelScore, ReportFigure};
use tracing::{instrument, warn};

use super::png_response;
use crate::error::{join_error, ApiResult};
use crate::state::AppState;

pub const CONCLUSIONS: [&str; 3] = [
    "Los modelos de machine learning logran capturar patrones espaciales relevantes en Cerrillos.",
    "La geoestadística permite analizar la variación espacial de variables clave.",
    "La combinación de ESDA, geoestadística y ML entrega una base cuantitativa robusta para apoyar decisiones territoriales.",
];

/// A figure that exists on disk, with the URL serving it.
#[derive(Debug, Serialize)]
pub struct FigureEntry {
    pub file: &'static str,
    pub caption: &'static str,
    pub url: String,
}

fn present_figures(state: &AppState, figures: &[ReportFigure]) -> Vec<FigureEntry> {
    figures
        .iter()
        .filter(|f| file_ok(&state.layout.report(f.file)))
        .map(|f| FigureEntry {
            file: f.file,
            caption: f.caption,
            url: format!("/api/reports/figures/{}", f.file),
        })
        .collect()
}

/// Summary of one prediction column.
#[derive(Debug, Serialize)]
pub struct PredictionColumn {
    pub column: &'static str,
    pub model: &'static str,
    pub present: bool,
    pub summary: Option<SeriesSummary>,
}

impl PredictionColumn {
    fn from_collection(collection: &FeatureCollection, column: &'static str, model: &'static str) -> Self {
        let present = collection.has_property(column);
        let values: Vec<f64> = collection.features.iter().filter_map(|f| f.number(column)).collect();
        Self {
            column,
            model,
            present,
            summary: if present { SeriesSummary::from_values(&values) } else { None },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MlReport {
    /// `ml_metrics.csv` as written; `None` when the predictions are empty.
    pub metrics: Option<CsvTable>,
    pub scores: Vec<ModelScore>,
    pub predictions: Vec<PredictionColumn>,
    pub figures: Vec<FigureEntry>,
    pub warnings: Vec<String>,
}

/// GET /api/reports/ml
///
/// Either input failing to load fails the report. An empty prediction set
/// is reported as a warning with nothing else.
#[instrument(skip(state))]
pub async fn ml_report_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<MlReport>> {
    let metrics_path = state.layout.report(ML_METRICS_CSV);
    let results_path = state.layout.report(ML_RESULTS_GEOJSON);
    let (metrics, buildings) = tokio::task::spawn_blocking(move || -> Result<_, DashboardError> {
        Ok((read_csv_table(&metrics_path)?, read_feature_collection(&results_path)?))
    })
    .await
    .map_err(join_error)??;

    if buildings.is_empty() {
        return Ok(Json(MlReport {
            metrics: None,
            scores: Vec::new(),
            predictions: Vec::new(),
            figures: Vec::new(),
            warnings: vec![format!(
                "El archivo `{}` está vacío. Revisa el guardado en el notebook 04.",
                ML_RESULTS_GEOJSON
            )],
        }));
    }

    let mut warnings = Vec::new();
    let scores = match model_scores(&metrics, &state.layout.report(ML_METRICS_CSV)) {
        Ok(scores) => scores,
        Err(e) => {
            warn!(error = %e, "Model scores unavailable");
            warnings.push(e.to_string());
            Vec::new()
        }
    };
    let predictions = PREDICTION_COLUMNS
        .iter()
        .map(|&(column, model)| PredictionColumn::from_collection(&buildings, column, model))
        .collect();

    Ok(Json(MlReport {
        metrics: Some(metrics),
        scores,
        predictions,
        figures: present_figures(&state, &ML_FIGURES),
        warnings,
    }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionParams {
    /// `pred_rf` or `pred_xgb`.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    PREDICTION_COLUMNS[0].0.to_string()
}

/// GET /api/reports/ml/predictions
///
/// Buildings with a viridis `fill_color` stretched over the column's range.
#[instrument(skip(state))]
pub async fn predictions_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<PredictionParams>,
) -> ApiResult<Json<FeatureCollection>> {
    let column = PREDICTION_COLUMNS
        .iter()
        .map(|&(column, _)| column)
        .find(|&c| c == params.model)
        .ok_or_else(|| DashboardError::invalid_parameter("model", format!("unknown prediction column '{}'", params.model)))?;

    let path = state.layout.report(ML_RESULTS_GEOJSON);
    let mut buildings = tokio::task::spawn_blocking(move || read_feature_collection(&path))
        .await
        .map_err(join_error)??;
    if !buildings.has_property(column) {
        return Err(DashboardError::MissingColumn {
            column: column.to_string(),
            source_name: ML_RESULTS_GEOJSON.to_string(),
        }
        .into());
    }

    let values: Vec<f64> = buildings.features.iter().filter_map(|f| f.number(column)).collect();
    let range = SeriesSummary::from_values(&values).map(|s| (s.min, s.max));
    for feature in &mut buildings.features {
        let fill = match (feature.number(column), range) {
            (Some(v), Some((lo, hi))) => json!(viridis_color(normalize(v, lo, hi)).to_hex()),
            _ => json!(null),
        };
        feature.properties.insert("fill_color".into(), fill);
    }
    Ok(Json(buildings))
}

#[derive(Debug, Serialize)]
pub struct SynthesisReport {
    pub metrics: Option<CsvTable>,
    pub figures: Vec<FigureEntry>,
    /// Informational notes for figures that are not there.
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub conclusions: [&'static str; 3],
}

/// GET /api/reports/synthesis
///
/// Nothing here is fatal: an unreadable metrics table becomes a warning.
#[instrument(skip(state))]
pub async fn synthesis_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<SynthesisReport>> {
    let path = state.layout.report(FINAL_METRICS_CSV);
    let table = tokio::task::spawn_blocking(move || read_csv_table(&path))
        .await
        .map_err(join_error)?;

    let mut warnings = Vec::new();
    let metrics = match table {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(error = %e, "Final metrics unavailable");
            warnings.push(format!("No se pudo cargar `{}`: {}", FINAL_METRICS_CSV, e));
            None
        }
    };

    let notes = SYNTHESIS_FIGURES
        .iter()
        .filter(|f| !file_ok(&state.layout.report(f.file)))
        .map(|f| format!("No se encontró `{}` en outputs/reports", f.file))
        .collect();

    Ok(Json(SynthesisReport {
        metrics,
        figures: present_figures(&state, &SYNTHESIS_FIGURES),
        notes,
        warnings,
        conclusions: CONCLUSIONS,
    }))
}

/// GET /api/reports/figures/:file
///
/// Only the known report figures are served.
pub async fn figure_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(file): Path<String>,
) -> ApiResult<Response> {
    let known = figure(&file)?;
    let path: PathBuf = state.layout.report(known.file);
    let download = read_download(&path, known.file, PNG_CONTENT_TYPE).await?;
    Ok(png_response(download.bytes))
}
