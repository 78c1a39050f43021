//! Report artifacts from the offline modelling notebooks.
//!
//! Everything here is display-only: tables are returned as read, figures as
//! bytes, and nothing is recomputed beyond per-column summaries.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use landcover_common::FeatureCollection;
use serde::Serialize;
use tracing::instrument;

use crate::error::{StorageError, StorageResult};
use crate::layout::require_file;

pub const ML_METRICS_CSV: &str = "ml_metrics.csv";
pub const ML_RESULTS_GEOJSON: &str = "ml_results.geojson";
pub const FINAL_METRICS_CSV: &str = "final_metrics.csv";

pub const MODEL_COLUMN: &str = "Modelo";
pub const RMSE_COLUMN: &str = "RMSE";
pub const R2_COLUMN: &str = "R²";

/// A pre-rendered figure and its caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportFigure {
    pub file: &'static str,
    pub caption: &'static str,
}

pub const ML_FIGURES: [ReportFigure; 2] = [
    ReportFigure {
        file: "ml_comparacion.png",
        caption: "Comparación visual de métricas de modelos",
    },
    ReportFigure {
        file: "ml_mapas_predicciones.png",
        caption: "Mapas de predicciones (resumen)",
    },
];

pub const SYNTHESIS_FIGURES: [ReportFigure; 2] = [
    ReportFigure {
        file: "final_maps.png",
        caption: "Mapas comparativos (real vs modelos)",
    },
    ReportFigure {
        file: "final_metrics_plot.png",
        caption: "Comparación visual de métricas finales",
    },
];

/// Prediction columns of `ml_results.geojson` and their model names.
pub const PREDICTION_COLUMNS: [(&str, &str); 2] = [("pred_rf", "Random Forest"), ("pred_xgb", "XGBoost")];

/// Look up a servable figure by file name.
pub fn figure(file_name: &str) -> StorageResult<ReportFigure> {
    ML_FIGURES
        .iter()
        .chain(SYNTHESIS_FIGURES.iter())
        .find(|f| f.file == file_name)
        .copied()
        .ok_or_else(|| StorageError::NotServed(file_name.to_string()))
}

/// A CSV file as headers plus string cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CsvTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// Cells of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.get(idx).map(String::as_str).unwrap_or("")).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[instrument(level = "debug", fields(path = %path.display()))]
pub fn read_csv_table(path: &Path) -> StorageResult<CsvTable> {
    require_file(path)?;
    let csv_err = |source| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path).map_err(csv_err)?;

    let columns: Vec<String> = reader.headers().map_err(csv_err)?.iter().map(str::to_string).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(csv_err)?.iter().map(str::to_string).collect());
    }
    Ok(CsvTable { columns, rows })
}

/// Error and fit measures of one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelScore {
    pub model: String,
    pub rmse: Option<f64>,
    pub r2: Option<f64>,
}

/// `(Modelo, RMSE, R²)` series from the metrics table.
///
/// Cells that do not parse as numbers become `None`.
pub fn model_scores(table: &CsvTable, path: &Path) -> StorageResult<Vec<ModelScore>> {
    let require = |column: &str| {
        table.column(column).ok_or_else(|| StorageError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })
    };
    let models = require(MODEL_COLUMN)?;
    let rmse = require(RMSE_COLUMN)?;
    let r2 = require(R2_COLUMN)?;

    Ok(models
        .iter()
        .zip(rmse.iter().zip(r2.iter()))
        .map(|(model, (rmse, r2))| ModelScore {
            model: model.to_string(),
            rmse: rmse.trim().parse().ok(),
            r2: r2.trim().parse().ok(),
        })
        .collect())
}

/// Parse a GeoJSON FeatureCollection.
#[instrument(level = "debug", fields(path = %path.display()))]
pub fn read_feature_collection(path: &Path) -> StorageResult<FeatureCollection> {
    require_file(path)?;
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}
