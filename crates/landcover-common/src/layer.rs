//! Raster layer identifiers for the change-detection products.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DashboardError;

/// Spectral index with one raster per analysis year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Ndvi,
    Ndbi,
}

impl IndexKind {
    pub const ALL: [IndexKind; 2] = [IndexKind::Ndvi, IndexKind::Ndbi];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Ndvi => "ndvi",
            IndexKind::Ndbi => "ndbi",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndexKind::Ndvi => "NDVI",
            IndexKind::Ndbi => "NDBI",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ndvi" => Ok(IndexKind::Ndvi),
            "ndbi" => Ok(IndexKind::Ndbi),
            _ => Err(DashboardError::invalid_parameter(
                "index",
                format!("unknown index '{}', expected ndvi or ndbi", s),
            )),
        }
    }
}

/// Layer families a map panel can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Index(IndexKind),
    /// Difference between the last and the first analysis year.
    Delta(IndexKind),
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Index(IndexKind::Ndvi),
        LayerKind::Index(IndexKind::Ndbi),
        LayerKind::Delta(IndexKind::Ndvi),
        LayerKind::Delta(IndexKind::Ndbi),
    ];

    pub fn index(&self) -> IndexKind {
        match self {
            LayerKind::Index(i) | LayerKind::Delta(i) => *i,
        }
    }

    pub fn is_delta(&self) -> bool {
        matches!(self, LayerKind::Delta(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Index(IndexKind::Ndvi) => "ndvi",
            LayerKind::Index(IndexKind::Ndbi) => "ndbi",
            LayerKind::Delta(IndexKind::Ndvi) => "delta_ndvi",
            LayerKind::Delta(IndexKind::Ndbi) => "delta_ndbi",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.strip_prefix("delta_") {
            Some(index) => index
                .parse()
                .map(LayerKind::Delta)
                .map_err(|_| DashboardError::LayerNotFound(s.to_string())),
            None => lower
                .parse()
                .map(LayerKind::Index)
                .map_err(|_| DashboardError::LayerNotFound(s.to_string())),
        }
    }
}

/// A concrete raster: a layer family pinned to its year(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerId {
    Year { index: IndexKind, year: u16 },
    Delta { index: IndexKind, from: u16, to: u16 },
}

impl LayerId {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerId::Year { index, .. } => LayerKind::Index(*index),
            LayerId::Delta { index, .. } => LayerKind::Delta(*index),
        }
    }

    /// Human-readable name, e.g. `NDVI 2024` or `ΔNDVI 2024-2017`.
    pub fn display_name(&self) -> String {
        match self {
            LayerId::Year { index, year } => format!("{} {}", index.label(), year),
            LayerId::Delta { index, from, to } => format!("Δ{} {}-{}", index.label(), to, from),
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerId::Year { index, year } => write!(f, "{}_{}", index, year),
            LayerId::Delta { index, from, to } => write!(f, "delta_{}_{}_{}", index, from, to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layer_kind() {
        assert_eq!("NDVI".parse::<LayerKind>().unwrap(), LayerKind::Index(IndexKind::Ndvi));
        assert_eq!("delta_ndbi".parse::<LayerKind>().unwrap(), LayerKind::Delta(IndexKind::Ndbi));
        assert!(matches!(
            "evi".parse::<LayerKind>(),
            Err(DashboardError::LayerNotFound(_))
        ));
    }

    #[test]
    fn test_display_names() {
        let year = LayerId::Year { index: IndexKind::Ndvi, year: 2024 };
        let delta = LayerId::Delta { index: IndexKind::Ndbi, from: 2017, to: 2024 };
        assert_eq!(year.display_name(), "NDVI 2024");
        assert_eq!(delta.display_name(), "ΔNDBI 2024-2017");
        assert_eq!(delta.to_string(), "delta_ndbi_2017_2024");
        assert!(delta.kind().is_delta());
    }
}
