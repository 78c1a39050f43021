//! Zone polygons with change metrics, from any OGR vector source.

use std::path::Path;

use gdal::spatial_ref::{AxisMappingStrategy, SpatialRef};
use gdal::vector::{Feature, FieldValue, LayerAccess};
use gdal::Dataset;
use landcover_common::{ZoneMetric, ZoneRecord};
use serde_json::{Map, Number, Value};
use tracing::{info, instrument, warn};

use crate::error::{StorageError, StorageResult};
use crate::layout::require_file;

pub const ZONE_ID_COLUMN: &str = "zone_id";

/// Zones of one file, in WGS84, plus the attribute columns it declares.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoneSet {
    pub zones: Vec<ZoneRecord>,
    pub columns: Vec<String>,
}

impl ZoneSet {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn find(&self, zone_id: i64) -> Option<&ZoneRecord> {
        self.zones.iter().find(|z| z.zone_id == zone_id)
    }

    /// Zone ids in ascending order.
    pub fn zone_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.zones.iter().map(|z| z.zone_id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Read the first layer of `path` as zones.
///
/// Geometries are transformed to WGS84; a layer without a CRS is taken as
/// WGS84 already. `zone_id` falls back to the feature id when the column is
/// absent.
#[instrument(level = "debug", fields(path = %path.display()))]
pub fn read_zones(path: &Path) -> StorageResult<ZoneSet> {
    require_file(path)?;
    let gdal_err = |e| StorageError::gdal(path, e);

    let dataset = Dataset::open(path).map_err(gdal_err)?;
    let mut layer = dataset.layer(0).map_err(gdal_err)?;

    let columns: Vec<String> = layer.defn().fields().map(|f| f.name()).collect();
    if !columns.iter().any(|c| c == ZONE_ID_COLUMN) {
        warn!(path = %path.display(), "Zones file has no zone_id column, using feature ids");
    }

    let target = match layer.spatial_ref() {
        Some(source) if !is_wgs84(&source) => {
            let mut wgs84 = SpatialRef::from_epsg(4326).map_err(gdal_err)?;
            wgs84.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
            Some(wgs84)
        }
        _ => None,
    };

    let mut zones = Vec::new();
    for (i, feature) in layer.features().enumerate() {
        let attributes = feature_attributes(&feature);
        let zone_id = attributes
            .get(ZONE_ID_COLUMN)
            .and_then(value_as_i64)
            .or_else(|| feature.fid().and_then(|fid| i64::try_from(fid).ok()))
            .unwrap_or(i as i64);

        let geometry = match feature.geometry() {
            Some(geom) => {
                let json = match &target {
                    Some(srs) => geom.transform_to(srs).and_then(|g| g.json()),
                    None => geom.json(),
                }
                .map_err(gdal_err)?;
                Some(serde_json::from_str(&json).map_err(|source| StorageError::Json {
                    path: path.to_path_buf(),
                    source,
                })?)
            }
            None => None,
        };

        let metric = |m: ZoneMetric| attributes.get(m.column()).and_then(Value::as_f64);
        zones.push(ZoneRecord {
            zone_id,
            perc_loss_veg: metric(ZoneMetric::PercLossVeg),
            perc_gain_built: metric(ZoneMetric::PercGainBuilt),
            geometry,
            attributes,
        });
    }

    info!(path = %path.display(), zones = zones.len(), "Loaded zones");
    Ok(ZoneSet { zones, columns })
}

fn is_wgs84(srs: &SpatialRef) -> bool {
    srs.auth_code().map(|code| code == 4326).unwrap_or(false)
}

fn feature_attributes(feature: &Feature) -> Map<String, Value> {
    feature
        .fields()
        .map(|(name, value)| (name, value.map(field_to_json).unwrap_or(Value::Null)))
        .collect()
}

fn field_to_json(value: FieldValue) -> Value {
    match value {
        FieldValue::IntegerValue(v) => Value::from(v),
        FieldValue::Integer64Value(v) => Value::from(v),
        FieldValue::RealValue(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
        FieldValue::StringValue(v) => Value::String(v),
        other => other.into_string().map(Value::String).unwrap_or(Value::Null),
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zone_id_coercion() {
        assert_eq!(value_as_i64(&json!(7)), Some(7));
        assert_eq!(value_as_i64(&json!(7.0)), Some(7));
        assert_eq!(value_as_i64(&json!(" 12 ")), Some(12));
        assert_eq!(value_as_i64(&json!(7.5)), None);
        assert_eq!(value_as_i64(&Value::Null), None);
    }

    #[test]
    fn test_field_conversion() {
        assert_eq!(field_to_json(FieldValue::RealValue(1.5)), json!(1.5));
        assert_eq!(field_to_json(FieldValue::RealValue(f64::NAN)), Value::Null);
        assert_eq!(field_to_json(FieldValue::IntegerValue(3)), json!(3));
        assert_eq!(field_to_json(FieldValue::StringValue("a".into())), json!("a"));
    }

    #[test]
    fn test_zone_set_lookup() {
        let set = ZoneSet {
            zones: vec![ZoneRecord::new(9, None, None), ZoneRecord::new(2, None, None)],
            columns: vec!["zone_id".into()],
        };
        assert_eq!(set.zone_ids(), vec![2, 9]);
        assert!(set.find(9).is_some());
        assert!(set.find(3).is_none());
        assert!(set.has_column("zone_id"));
    }
}
