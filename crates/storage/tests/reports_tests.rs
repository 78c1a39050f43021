//! Report tables, prediction GeoJSON and the data-root catalog.

use landcover_common::{IndexKind, LayerId};
use storage::reports::{figure, model_scores, FINAL_METRICS_CSV, ML_METRICS_CSV, ML_RESULTS_GEOJSON};
use storage::{read_csv_table, read_download, read_feature_collection, DataLayout, StorageError};
use test_utils::{write_report_files, DataRoot, FAKE_PNG};

#[test]
fn test_ml_reports_from_populated_root() {
    let root = DataRoot::populated("cerrillos");
    let layout = DataLayout::resolve(root.root());

    let path = layout.report(ML_METRICS_CSV);
    let table = read_csv_table(&path).unwrap();
    assert_eq!(table.columns, vec!["Modelo", "RMSE", "R²"]);
    let scores = model_scores(&table, &path).unwrap();
    assert_eq!(scores[0].model, "Random Forest");
    assert_eq!(scores[1].r2, Some(0.797));

    let predictions = read_feature_collection(&layout.report(ML_RESULTS_GEOJSON)).unwrap();
    assert_eq!(predictions.features.len(), 3);
    assert!(predictions.has_property("pred_rf"));
    assert!(predictions.has_property("pred_xgb"));
}

#[test]
fn test_final_metrics_keeps_all_columns() {
    let dir = tempfile::tempdir().unwrap();
    write_report_files(dir.path());
    let table = read_csv_table(&dir.path().join(FINAL_METRICS_CSV)).unwrap();
    assert_eq!(table.columns.len(), 4);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.column("MAE").unwrap(), vec!["0.101", "0.090"]);
}

#[test]
fn test_invalid_geojson() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(ML_RESULTS_GEOJSON);
    std::fs::write(&path, "{\"type\": \"FeatureCollection\"").unwrap();
    assert!(matches!(read_feature_collection(&path), Err(StorageError::Json { .. })));
}

#[tokio::test]
async fn test_figure_bytes_are_served_unchanged() {
    let root = DataRoot::populated("cerrillos");
    let layout = DataLayout::resolve(root.root());
    let fig = figure("ml_comparacion.png").unwrap();

    let download = read_download(&layout.report(fig.file), fig.file, "image/png").await.unwrap();
    assert_eq!(&download.bytes[..], FAKE_PNG);
}

#[test]
fn test_catalog_availability() {
    let root = DataRoot::populated("pudahuel");
    let layout = DataLayout::resolve(root.root());
    assert_eq!(layout.processed, root.processed());

    std::fs::remove_file(root.index_raster("ndbi", 2019)).unwrap();
    let catalog = layout.catalog("pudahuel", &root.years);
    assert_eq!(catalog.len(), 10);

    let missing: Vec<&LayerId> = catalog.iter().filter(|e| !e.available).map(|e| &e.id).collect();
    assert_eq!(
        missing,
        vec![&LayerId::Year {
            index: IndexKind::Ndbi,
            year: 2019
        }]
    );
    assert_eq!(catalog[9].name, "ΔNDBI 2024-2017");
}
