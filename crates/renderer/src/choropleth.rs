//! Quantile choropleth for zone metrics.
//!
//! Zones fall into five buckets split at the 50th/75th/90th/97th
//! percentiles of the chosen metric. A value equal to a boundary belongs to
//! the lower bucket.

use landcover_common::{FeatureCollection, GeoFeature, ZoneMetric, ZoneRecord};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::gradient::Color;
use crate::stats::percentiles;

pub const BOUNDARY_PERCENTILES: [f64; 4] = [50.0, 75.0, 90.0, 97.0];

/// Reds, light to dark.
pub const BUCKET_COLORS: [Color; 5] = [
    Color::new(0xff, 0xf5, 0xf0, 255),
    Color::new(0xfc, 0xbb, 0xa1, 255),
    Color::new(0xfc, 0x92, 0x72, 255),
    Color::new(0xfb, 0x6a, 0x4a, 255),
    Color::new(0xcb, 0x18, 0x1d, 255),
];

pub const LINE_COLOR: &str = "#999999";
pub const LINE_WEIGHT: f64 = 0.3;
pub const FILL_OPACITY: f64 = 0.6;

/// Leaflet-style path options for one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStyle {
    pub fill_color: Color,
    pub color: &'static str,
    pub weight: f64,
    pub fill_opacity: f64,
}

impl ZoneStyle {
    pub fn for_bucket(bucket: usize) -> Self {
        Self {
            fill_color: BUCKET_COLORS[bucket.min(BUCKET_COLORS.len() - 1)],
            color: LINE_COLOR,
            weight: LINE_WEIGHT,
            fill_opacity: FILL_OPACITY,
        }
    }
}

/// Percentile boundaries for one metric over a zone set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Choropleth {
    pub metric: ZoneMetric,
    /// p50, p75, p90, p97.
    pub boundaries: [f64; 4],
}

impl Choropleth {
    /// Boundaries over `zones`, missing values counted as zero.
    ///
    /// Returns `None` when no zone carries the metric, which includes an
    /// empty zone set.
    pub fn from_zones(zones: &[ZoneRecord], metric: ZoneMetric) -> Option<Self> {
        if !zones.iter().any(|z| z.metric(metric).is_some()) {
            return None;
        }
        let values: Vec<f64> = zones.iter().map(|z| z.metric_or_zero(metric)).collect();
        percentiles(&values, BOUNDARY_PERCENTILES).map(|boundaries| Self { metric, boundaries })
    }

    /// Bucket index in `0..5`.
    pub fn bucket(&self, value: f64) -> usize {
        self.boundaries
            .iter()
            .position(|&p| value <= p)
            .unwrap_or(self.boundaries.len())
    }

    pub fn bucket_of(&self, zone: &ZoneRecord) -> usize {
        self.bucket(zone.metric_or_zero(self.metric))
    }

    pub fn color(&self, value: f64) -> Color {
        BUCKET_COLORS[self.bucket(value)]
    }

    /// Zones as a GeoJSON collection with bucket and style properties.
    pub fn styled_features(&self, zones: &[ZoneRecord]) -> FeatureCollection {
        let features = zones
            .iter()
            .map(|zone| {
                let bucket = self.bucket_of(zone);
                let mut properties = Map::new();
                properties.insert("zone_id".into(), json!(zone.zone_id));
                for metric in ZoneMetric::ALL {
                    properties.insert(metric.column().into(), json!(zone.metric(metric)));
                }
                properties.insert("bucket".into(), json!(bucket));
                properties.insert(
                    "style".into(),
                    serde_json::to_value(ZoneStyle::for_bucket(bucket)).unwrap_or(Value::Null),
                );
                let mut feature = GeoFeature::new(zone.geometry.clone(), properties);
                feature.id = Some(json!(zone.zone_id));
                feature
            })
            .collect();
        FeatureCollection::new(features)
    }
}

/// Tooltip fields and their aliases for the zones layer.
pub fn tooltip_fields() -> Vec<(&'static str, &'static str)> {
    let mut fields = vec![("zone_id", "Zona")];
    fields.extend(ZoneMetric::ALL.iter().map(|m| (m.column(), m.alias())));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(values: &[Option<f64>]) -> Vec<ZoneRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ZoneRecord::new(i as i64 + 1, None, v))
            .collect()
    }

    #[test]
    fn test_worked_example_boundaries() {
        let zs = zones(&[Some(0.0), Some(0.0), Some(5.0), Some(5.0), Some(10.0), Some(100.0)]);
        let c = Choropleth::from_zones(&zs, ZoneMetric::PercGainBuilt).unwrap();
        assert_eq!(c.boundaries[0], 5.0);
        assert!((c.boundaries[1] - 8.75).abs() < 1e-12);
        assert!((c.boundaries[2] - 55.0).abs() < 1e-12);
        assert!((c.boundaries[3] - 86.5).abs() < 1e-12);

        let buckets: Vec<usize> = zs.iter().map(|z| c.bucket_of(z)).collect();
        // 5.0 sits on p50 and stays in the lower bucket
        assert_eq!(buckets, vec![0, 0, 0, 0, 2, 4]);
    }

    #[test]
    fn test_missing_counts_as_zero() {
        let zs = zones(&[None, Some(f64::NAN), Some(4.0), Some(8.0)]);
        let c = Choropleth::from_zones(&zs, ZoneMetric::PercGainBuilt).unwrap();
        assert_eq!(c.boundaries[0], 2.0);
        assert_eq!(c.bucket_of(&zs[0]), 0);
        assert_eq!(c.bucket_of(&zs[1]), 0);
    }

    #[test]
    fn test_uniform_values_share_lowest_bucket() {
        let zs = zones(&[Some(3.0); 5]);
        let c = Choropleth::from_zones(&zs, ZoneMetric::PercGainBuilt).unwrap();
        assert!(zs.iter().all(|z| c.bucket_of(z) == 0));
    }

    #[test]
    fn test_empty_zone_set() {
        assert!(Choropleth::from_zones(&[], ZoneMetric::PercLossVeg).is_none());
    }

    #[test]
    fn test_metric_absent_from_every_zone() {
        let zs = zones(&[None, None, None]);
        assert!(Choropleth::from_zones(&zs, ZoneMetric::PercGainBuilt).is_none());
    }

    #[test]
    fn test_styled_features_carry_style() {
        let zs = zones(&[Some(1.0), Some(50.0)]);
        let c = Choropleth::from_zones(&zs, ZoneMetric::PercGainBuilt).unwrap();
        let fc = c.styled_features(&zs);
        assert_eq!(fc.features.len(), 2);
        let props = &fc.features[1].properties;
        assert_eq!(props["zone_id"], json!(2));
        assert_eq!(props["bucket"], json!(4));
        assert_eq!(props["style"]["fillColor"], json!("#cb181d"));
        assert_eq!(props["style"]["color"], json!("#999999"));
        assert_eq!(props["style"]["fillOpacity"], json!(0.6));
        assert_eq!(props["perc_loss_veg"], Value::Null);
    }

    #[test]
    fn test_tooltip_aliases() {
        let fields = tooltip_fields();
        assert_eq!(fields[0], ("zone_id", "Zona"));
        assert_eq!(fields[2], ("perc_gain_built", "% Aumento construido"));
    }
}
