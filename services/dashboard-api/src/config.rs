//! Dashboard configuration loading and types.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use landcover_common::{DashboardError, LayerId, LayerKind};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CENTER: [f64; 2] = [-33.40, -70.70];
pub const DEFAULT_YEARS: [u16; 4] = [2017, 2019, 2021, 2024];
pub const DEFAULT_OVERLAY_CACHE_CAPACITY: usize = 32;

/// Top-level configuration, loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding `data/` and `outputs/`.
    pub data_root: PathBuf,

    /// PROJ resource directory, exported before GDAL is used.
    pub proj_data: Option<PathBuf>,

    /// Number of rendered overlays kept in memory.
    pub overlay_cache_capacity: usize,

    /// Map center `(lat, lon)` when zones give none.
    pub default_center: [f64; 2],

    pub municipalities: Vec<MunicipalityConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            proj_data: None,
            overlay_cache_capacity: DEFAULT_OVERLAY_CACHE_CAPACITY,
            default_center: DEFAULT_CENTER,
            municipalities: vec![
                MunicipalityConfig::new("pudahuel", "Pudahuel", MunicipalityRole::ChangeDetection),
                MunicipalityConfig::new("cerrillos", "Cerrillos", MunicipalityRole::Modelling),
            ],
        }
    }
}

/// What a municipality's data is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MunicipalityRole {
    /// NDVI/NDBI layers, deltas and zones.
    #[default]
    ChangeDetection,
    /// Model reports.
    Modelling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityConfig {
    /// Lowercase identifier used in file names.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub role: MunicipalityRole,
    /// `(lat, lon)`.
    #[serde(default = "default_center")]
    pub center: [f64; 2],
    /// Analysis years, ascending.
    #[serde(default = "default_years")]
    pub years: Vec<u16>,
}

fn default_center() -> [f64; 2] {
    DEFAULT_CENTER
}

fn default_years() -> Vec<u16> {
    DEFAULT_YEARS.to_vec()
}

impl MunicipalityConfig {
    pub fn new(slug: &str, name: &str, role: MunicipalityRole) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            role,
            center: DEFAULT_CENTER,
            years: default_years(),
        }
    }

    pub fn first_year(&self) -> Option<u16> {
        self.years.first().copied()
    }

    pub fn last_year(&self) -> Option<u16> {
        self.years.last().copied()
    }

    /// Pin a layer family to concrete years.
    ///
    /// Per-year layers default to the last year; deltas always span the
    /// first to the last year.
    pub fn layer(&self, kind: LayerKind, year: Option<u16>) -> Result<LayerId, DashboardError> {
        let (first, last) = match (self.first_year(), self.last_year()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DashboardError::LayerNotFound(format!("{} has no years", self.slug))),
        };
        match kind {
            LayerKind::Index(index) => {
                let year = year.unwrap_or(last);
                self.require_year(year)?;
                Ok(LayerId::Year { index, year })
            }
            LayerKind::Delta(index) => Ok(LayerId::Delta {
                index,
                from: first,
                to: last,
            }),
        }
    }

    pub fn require_year(&self, year: u16) -> Result<u16, DashboardError> {
        if self.years.contains(&year) {
            Ok(year)
        } else {
            Err(DashboardError::invalid_parameter(
                "year",
                format!("{} is not an analysis year of {} ({:?})", year, self.slug, self.years),
            ))
        }
    }
}

impl DashboardConfig {
    /// Load from `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file does not exist, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read: {:?}", path))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Failed to parse: {:?}", path))?;
        tracing::info!(
            path = %path.display(),
            municipalities = config.municipalities.len(),
            "Loaded dashboard configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.overlay_cache_capacity == 0 {
            bail!("overlay_cache_capacity must be at least 1");
        }
        let mut seen = HashSet::new();
        for m in &self.municipalities {
            if m.slug.is_empty() || m.slug.chars().any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')) {
                bail!("municipality slug '{}' must be lowercase ascii", m.slug);
            }
            if !seen.insert(m.slug.as_str()) {
                bail!("municipality '{}' is declared twice", m.slug);
            }
            if m.years.is_empty() {
                bail!("municipality '{}' has no years", m.slug);
            }
            if m.years.windows(2).any(|w| w[0] >= w[1]) {
                bail!("years of '{}' must be strictly ascending", m.slug);
            }
        }
        Ok(())
    }

    pub fn municipality(&self, slug: &str) -> Result<&MunicipalityConfig, DashboardError> {
        self.municipalities
            .iter()
            .find(|m| m.slug == slug)
            .ok_or_else(|| DashboardError::MunicipalityNotFound(slug.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landcover_common::IndexKind;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.default_center, [-33.40, -70.70]);
        assert_eq!(config.municipality("pudahuel").unwrap().years, vec![2017, 2019, 2021, 2024]);
        assert_eq!(config.municipality("cerrillos").unwrap().role, MunicipalityRole::Modelling);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = DashboardConfig::from_yaml(
            "data_root: /srv/landcover\nmunicipalities:\n  - slug: maipu\n    name: Maipú\n",
        )
        .unwrap();
        assert_eq!(config.data_root, PathBuf::from("/srv/landcover"));
        assert_eq!(config.overlay_cache_capacity, DEFAULT_OVERLAY_CACHE_CAPACITY);
        let maipu = config.municipality("maipu").unwrap();
        assert_eq!(maipu.years, DEFAULT_YEARS.to_vec());
        assert_eq!(maipu.role, MunicipalityRole::ChangeDetection);
    }

    #[test]
    fn test_rejects_bad_years() {
        let yaml = "municipalities:\n  - slug: a\n    name: A\n    years: [2024, 2017]\n";
        assert!(DashboardConfig::from_yaml(yaml).is_err());
        let yaml = "municipalities:\n  - slug: a\n    name: A\n  - slug: a\n    name: B\n";
        assert!(DashboardConfig::from_yaml(yaml).is_err());
        assert!(DashboardConfig::from_yaml("overlay_cache_capacity: 0\n").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_layer_resolution() {
        let muni = MunicipalityConfig::new("pudahuel", "Pudahuel", MunicipalityRole::ChangeDetection);
        assert_eq!(
            muni.layer(LayerKind::Index(IndexKind::Ndvi), None).unwrap(),
            LayerId::Year {
                index: IndexKind::Ndvi,
                year: 2024
            }
        );
        assert_eq!(
            muni.layer(LayerKind::Delta(IndexKind::Ndbi), Some(2019)).unwrap(),
            LayerId::Delta {
                index: IndexKind::Ndbi,
                from: 2017,
                to: 2024
            }
        );
        assert!(matches!(
            muni.layer(LayerKind::Index(IndexKind::Ndvi), Some(2018)),
            Err(DashboardError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_unknown_municipality() {
        let config = DashboardConfig::default();
        assert!(matches!(
            config.municipality("santiago"),
            Err(DashboardError::MunicipalityNotFound(_))
        ));
    }

    #[test]
    fn test_shipped_config_parses() {
        let yaml = include_str!("../config/dashboard.yaml");
        let config = DashboardConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.municipalities.len(), 2);
    }
}
