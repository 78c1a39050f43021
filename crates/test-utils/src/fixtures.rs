//! On-disk fixtures shaped like the change-detection pipeline's outputs.
//!
//! Everything is written with GDAL so the readers under test see real
//! GeoTIFF and GeoPackage files.

use std::fs;
use std::path::{Path, PathBuf};

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{Feature, FieldValue, Geometry, LayerAccess, LayerOptions, OGRFieldType, OGRwkbGeometryType};
use gdal::DriverManager;
use serde_json::json;

use crate::generators::{create_delta_band, create_gradient_band};

/// Sentinel used by the fixture delta rasters.
pub const DELTA_NODATA: f64 = -9999.0;

/// Fixture years, oldest first.
pub const YEARS: [u16; 4] = [2017, 2019, 2021, 2024];

/// Common geotransforms for testing.
pub mod transforms {
    /// 0.01 degree pixels over western Santiago, north-up.
    pub const SANTIAGO_GEOGRAPHIC: [f64; 6] = [-70.85, 0.01, 0.0, -33.40, 0.0, -0.01];

    /// 30 m pixels in UTM 19S over the same area, north-up.
    pub const SANTIAGO_UTM19S: [f64; 6] = [330_000.0, 30.0, 0.0, 6_300_000.0, 0.0, -30.0];

    /// South-up variant: row 0 is the southern edge.
    pub const SANTIAGO_SOUTH_UP: [f64; 6] = [-70.85, 0.01, 0.0, -33.48, 0.0, 0.01];
}

pub const EPSG_WGS84: u32 = 4326;
pub const EPSG_UTM19S: u32 = 32719;

/// What to write into a single-band GeoTIFF.
#[derive(Debug, Clone, PartialEq)]
pub struct TiffSpec {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
    pub nodata: Option<f64>,
    pub geo_transform: [f64; 6],
    pub epsg: Option<u32>,
}

impl TiffSpec {
    /// WGS84 band over [`transforms::SANTIAGO_GEOGRAPHIC`].
    pub fn geographic(width: usize, height: usize, values: Vec<f64>) -> Self {
        Self {
            width,
            height,
            values,
            nodata: None,
            geo_transform: transforms::SANTIAGO_GEOGRAPHIC,
            epsg: Some(EPSG_WGS84),
        }
    }

    /// UTM 19S band over [`transforms::SANTIAGO_UTM19S`].
    pub fn projected(width: usize, height: usize, values: Vec<f64>) -> Self {
        Self {
            geo_transform: transforms::SANTIAGO_UTM19S,
            epsg: Some(EPSG_UTM19S),
            ..Self::geographic(width, height, values)
        }
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn with_geo_transform(mut self, geo_transform: [f64; 6]) -> Self {
        self.geo_transform = geo_transform;
        self
    }

    /// No CRS at all.
    pub fn without_crs(mut self) -> Self {
        self.epsg = None;
        self
    }
}

/// Write `spec` as a float64 GeoTIFF at `path`.
pub fn write_geotiff(path: &Path, spec: &TiffSpec) {
    assert_eq!(spec.values.len(), spec.width * spec.height, "band size mismatch");

    let driver = DriverManager::get_driver_by_name("GTiff").expect("GTiff driver");
    let mut dataset = driver
        .create_with_band_type::<f64, _>(path, spec.width, spec.height, 1)
        .expect("Failed to create GeoTIFF");
    dataset
        .set_geo_transform(&spec.geo_transform)
        .expect("Failed to set geotransform");
    if let Some(epsg) = spec.epsg {
        let srs = SpatialRef::from_epsg(epsg).expect("Unknown EPSG code");
        dataset.set_spatial_ref(&srs).expect("Failed to set CRS");
    }

    let mut band = dataset.rasterband(1).expect("Band 1");
    if let Some(nodata) = spec.nodata {
        band.set_no_data_value(Some(nodata)).expect("Failed to set nodata");
    }
    let mut buffer = Buffer::new((spec.width, spec.height), spec.values.clone());
    band.write((0, 0), (spec.width, spec.height), &mut buffer)
        .expect("Failed to write band");
}

/// One zone polygon with its change metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFixture {
    pub zone_id: i64,
    pub perc_loss_veg: Option<f64>,
    pub perc_gain_built: Option<f64>,
    /// Polygon as WKT in the CRS it will be written with.
    pub wkt: String,
}

/// Axis-aligned square polygon as WKT.
pub fn square_wkt(x: f64, y: f64, size: f64) -> String {
    format!(
        "POLYGON (({x0} {y0},{x1} {y0},{x1} {y1},{x0} {y1},{x0} {y0}))",
        x0 = x,
        y0 = y,
        x1 = x + size,
        y1 = y + size
    )
}

/// Four geographic zones in a 2x2 block; zone 4 has no vegetation value.
///
/// Loss values are 5, 10, 30 and missing; gain values 1, 2, 3, 4.
pub fn sample_zones() -> Vec<ZoneFixture> {
    let cells = [(-70.80, -33.46), (-70.78, -33.46), (-70.80, -33.44), (-70.78, -33.44)];
    let loss = [Some(5.0), Some(10.0), Some(30.0), None];
    cells
        .iter()
        .zip(loss)
        .enumerate()
        .map(|(i, (&(x, y), loss))| ZoneFixture {
            zone_id: i as i64 + 1,
            perc_loss_veg: loss,
            perc_gain_built: Some(i as f64 + 1.0),
            wkt: square_wkt(x, y, 0.02),
        })
        .collect()
}

/// The same 2x2 block laid out in UTM 19S metres.
pub fn sample_zones_utm() -> Vec<ZoneFixture> {
    let origin = (330_000.0, 6_295_000.0);
    sample_zones()
        .into_iter()
        .enumerate()
        .map(|(i, zone)| {
            let x = origin.0 + (i % 2) as f64 * 2_000.0;
            let y = origin.1 + (i / 2) as f64 * 2_000.0;
            ZoneFixture {
                wkt: square_wkt(x, y, 2_000.0),
                ..zone
            }
        })
        .collect()
}

/// Write zones as a single polygon layer using an OGR driver
/// (`"GPKG"`, `"GeoJSON"`, ...).
pub fn write_zones(path: &Path, driver_name: &str, zones: &[ZoneFixture], epsg: u32) {
    let driver = DriverManager::get_driver_by_name(driver_name).expect("OGR driver");
    let mut dataset = driver
        .create_vector_only(path)
        .expect("Failed to create vector dataset");
    let srs = SpatialRef::from_epsg(epsg).expect("Unknown EPSG code");
    let layer = dataset
        .create_layer(LayerOptions {
            name: "zonas",
            srs: Some(&srs),
            ty: OGRwkbGeometryType::wkbPolygon,
            options: None,
        })
        .expect("Failed to create layer");
    layer
        .create_defn_fields(&[
            ("zone_id", OGRFieldType::OFTInteger64),
            ("perc_loss_veg", OGRFieldType::OFTReal),
            ("perc_gain_built", OGRFieldType::OFTReal),
        ])
        .expect("Failed to define fields");

    for zone in zones {
        let geometry = Geometry::from_wkt(&zone.wkt).expect("Invalid WKT");
        let mut names = vec!["zone_id"];
        let mut values = vec![FieldValue::Integer64Value(zone.zone_id)];
        if let Some(v) = zone.perc_loss_veg {
            names.push("perc_loss_veg");
            values.push(FieldValue::RealValue(v));
        }
        if let Some(v) = zone.perc_gain_built {
            names.push("perc_gain_built");
            values.push(FieldValue::RealValue(v));
        }
        let mut feature = Feature::new(layer.defn()).expect("Failed to write feature");
        feature.set_geometry(geometry).expect("Failed to write feature");
        for (name, value) in names.iter().zip(values.iter()) {
            let idx = feature.field_index(name).expect("Failed to write feature");
            feature.set_field(idx, value).expect("Failed to write feature");
        }
        feature.create(&layer).expect("Failed to write feature");
    }
}

/// Attribute-only CSV mirror of the zones.
pub fn write_zones_csv(path: &Path, zones: &[ZoneFixture]) {
    let mut out = String::from("zone_id,perc_loss_veg,perc_gain_built\n");
    for zone in zones {
        let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "{},{},{}\n",
            zone.zone_id,
            cell(zone.perc_loss_veg),
            cell(zone.perc_gain_built)
        ));
    }
    fs::write(path, out).expect("Failed to write zones CSV");
}

/// Not a decodable image; figures are served byte-for-byte.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfixture";

pub const REPORT_FIGURES: [&str; 4] = [
    "ml_comparacion.png",
    "ml_mapas_predicciones.png",
    "final_maps.png",
    "final_metrics_plot.png",
];

/// Write the modelling report tables and figures into `dir`.
pub fn write_report_files(dir: &Path) {
    fs::create_dir_all(dir).expect("Failed to create reports dir");
    fs::write(
        dir.join("ml_metrics.csv"),
        "Modelo,RMSE,R²\nRandom Forest,0.118,0.812\nXGBoost,0.125,0.797\n",
    )
    .expect("Failed to write ml_metrics.csv");
    fs::write(
        dir.join("final_metrics.csv"),
        "Modelo,RMSE,MAE,R²\nKriging,0.140,0.101,0.74\nRandom Forest,0.118,0.090,0.81\n",
    )
    .expect("Failed to write final_metrics.csv");

    let features: Vec<_> = (0..3)
        .map(|i| {
            let x = -70.76 + i as f64 * 0.01;
            json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [x, -33.49]},
                "properties": {"pred_rf": 0.1 * (i + 1) as f64, "pred_xgb": 0.2 * (i + 1) as f64}
            })
        })
        .collect();
    let collection = json!({"type": "FeatureCollection", "features": features});
    fs::write(dir.join("ml_results.geojson"), collection.to_string()).expect("Failed to write ml_results.geojson");

    for name in REPORT_FIGURES {
        fs::write(dir.join(name), FAKE_PNG).expect("Failed to write figure");
    }
}

/// A complete data root in a temporary directory.
///
/// ```text
/// data/processed/{ndvi,ndbi}_<slug>_<year>.tif
/// data/processed/delta_{ndvi,ndbi}_<first>_<last>.tif
/// data/processed/cambios_por_zona.gpkg
/// outputs/cambios_por_zona_<slug>.csv
/// outputs/reports/...
/// ```
pub struct DataRoot {
    pub dir: tempfile::TempDir,
    pub slug: String,
    pub years: Vec<u16>,
}

impl DataRoot {
    /// Raster dimensions of every fixture layer.
    pub const WIDTH: usize = 8;
    pub const HEIGHT: usize = 8;

    /// Empty root: every lookup finds nothing.
    pub fn empty() -> Self {
        Self {
            dir: crate::temp_test_dir_with_prefix("landcover_"),
            slug: "pudahuel".to_string(),
            years: YEARS.to_vec(),
        }
    }

    /// Fully populated root for `slug`.
    pub fn populated(slug: &str) -> Self {
        let root = Self {
            slug: slug.to_string(),
            ..Self::empty()
        };
        fs::create_dir_all(root.processed()).expect("Failed to create data/processed");
        fs::create_dir_all(root.outputs()).expect("Failed to create outputs");

        for (i, &year) in root.years.iter().enumerate() {
            let shift = i as f64 * 0.05;
            for (index, low, high) in [("ndvi", 0.1, 0.8), ("ndbi", -0.4, 0.3)] {
                let values = create_gradient_band(Self::WIDTH, Self::HEIGHT, low - shift, high - shift);
                let spec = TiffSpec::geographic(Self::WIDTH, Self::HEIGHT, values);
                write_geotiff(&root.index_raster(index, year), &spec);
            }
        }
        for index in ["ndvi", "ndbi"] {
            let values = create_delta_band(Self::WIDTH, Self::HEIGHT, DELTA_NODATA, 7);
            let spec = TiffSpec::geographic(Self::WIDTH, Self::HEIGHT, values).with_nodata(DELTA_NODATA);
            write_geotiff(&root.delta_raster(index), &spec);
        }

        let zones = sample_zones();
        write_zones(&root.zones_gpkg(), "GPKG", &zones, EPSG_WGS84);
        write_zones_csv(&root.zones_csv(), &zones);
        write_report_files(&root.reports());
        root
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn processed(&self) -> PathBuf {
        self.root().join("data").join("processed")
    }

    pub fn outputs(&self) -> PathBuf {
        self.root().join("outputs")
    }

    pub fn reports(&self) -> PathBuf {
        self.outputs().join("reports")
    }

    pub fn index_raster(&self, index: &str, year: u16) -> PathBuf {
        self.processed().join(format!("{}_{}_{}.tif", index, self.slug, year))
    }

    pub fn delta_raster(&self, index: &str) -> PathBuf {
        let first = self.years.first().copied().unwrap_or(YEARS[0]);
        let last = self.years.last().copied().unwrap_or(YEARS[3]);
        self.processed().join(format!("delta_{}_{}_{}.tif", index, first, last))
    }

    pub fn zones_gpkg(&self) -> PathBuf {
        self.processed().join("cambios_por_zona.gpkg")
    }

    pub fn zones_csv(&self) -> PathBuf {
        self.outputs().join(format!("cambios_por_zona_{}.csv", self.slug))
    }
}
