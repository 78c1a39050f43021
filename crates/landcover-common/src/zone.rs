//! Zone records and the GeoJSON shapes used to ship them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::DashboardError;

/// Per-zone change metrics written by the zonal-statistics notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneMetric {
    /// Percent of the zone that lost vegetation.
    PercLossVeg,
    /// Percent of the zone that gained built area.
    PercGainBuilt,
}

impl ZoneMetric {
    pub const ALL: [ZoneMetric; 2] = [ZoneMetric::PercLossVeg, ZoneMetric::PercGainBuilt];

    /// Column name in the zones file.
    pub fn column(&self) -> &'static str {
        match self {
            ZoneMetric::PercLossVeg => "perc_loss_veg",
            ZoneMetric::PercGainBuilt => "perc_gain_built",
        }
    }

    /// Tooltip alias.
    pub fn alias(&self) -> &'static str {
        match self {
            ZoneMetric::PercLossVeg => "% Pérdida veg",
            ZoneMetric::PercGainBuilt => "% Aumento construido",
        }
    }
}

impl fmt::Display for ZoneMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for ZoneMetric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perc_loss_veg" => Ok(ZoneMetric::PercLossVeg),
            "perc_gain_built" => Ok(ZoneMetric::PercGainBuilt),
            _ => Err(DashboardError::invalid_parameter(
                "metric",
                format!("unknown zone metric '{}'", s),
            )),
        }
    }
}

/// One municipal sub-zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub zone_id: i64,
    pub perc_loss_veg: Option<f64>,
    pub perc_gain_built: Option<f64>,
    /// Remaining attribute columns, as read.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Polygon geometry as GeoJSON in WGS84.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
}

impl ZoneRecord {
    pub fn new(zone_id: i64, perc_loss_veg: Option<f64>, perc_gain_built: Option<f64>) -> Self {
        Self {
            zone_id,
            perc_loss_veg,
            perc_gain_built,
            attributes: Map::new(),
            geometry: None,
        }
    }

    /// Raw metric value; NaN counts as absent.
    pub fn metric(&self, metric: ZoneMetric) -> Option<f64> {
        let value = match metric {
            ZoneMetric::PercLossVeg => self.perc_loss_veg,
            ZoneMetric::PercGainBuilt => self.perc_gain_built,
        };
        value.filter(|v| v.is_finite())
    }

    /// Metric value with missing treated as zero.
    pub fn metric_or_zero(&self, metric: ZoneMetric) -> f64 {
        self.metric(metric).unwrap_or(0.0)
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFeature {
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    pub geometry: Option<Value>,

    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl GeoFeature {
    pub fn new(geometry: Option<Value>, properties: Map<String, Value>) -> Self {
        Self {
            type_: "Feature".to_string(),
            id: None,
            geometry,
            properties,
        }
    }

    /// Numeric property, if present and finite.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.properties
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }
}

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<GeoFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<GeoFeature>) -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Whether any feature carries the given property.
    pub fn has_property(&self, key: &str) -> bool {
        self.features.iter().any(|f| f.properties.contains_key(key))
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
