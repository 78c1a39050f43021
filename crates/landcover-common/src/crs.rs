//! Coordinate reference system classification for source rasters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG code of the geographic frame overlays are delivered in.
pub const WGS84_EPSG: u32 = 4326;

/// The reference frame a raster declares for its stored bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceCrs {
    /// No CRS in the file; stored bounds are taken as geographic.
    Undeclared,
    /// Geographic WGS84 longitude/latitude.
    Geographic,
    /// Any other frame, kept as its WKT (or `EPSG:n`) definition.
    Projected { definition: String },
}

impl SourceCrs {
    /// Classify a WKT/authority string as read from a raster header.
    ///
    /// An empty definition means undeclared. Anything that is not plainly
    /// EPSG:4326 is kept as a definition for the transformer to resolve.
    pub fn from_definition(definition: &str, epsg: Option<u32>) -> Self {
        let trimmed = definition.trim();
        if trimmed.is_empty() && epsg.is_none() {
            return SourceCrs::Undeclared;
        }
        if epsg == Some(WGS84_EPSG) || trimmed.eq_ignore_ascii_case("EPSG:4326") {
            return SourceCrs::Geographic;
        }
        if trimmed.is_empty() {
            // Only an authority code is known
            if let Some(code) = epsg {
                return SourceCrs::Projected {
                    definition: format!("EPSG:{}", code),
                };
            }
        }
        SourceCrs::Projected {
            definition: trimmed.to_string(),
        }
    }

    /// Whether stored bounds can be used directly as lon/lat.
    pub fn needs_reprojection(&self) -> bool {
        matches!(self, SourceCrs::Projected { .. })
    }
}

impl fmt::Display for SourceCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceCrs::Undeclared => write!(f, "undeclared"),
            SourceCrs::Geographic => write!(f, "EPSG:{}", WGS84_EPSG),
            SourceCrs::Projected { definition } => write!(f, "{}", definition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(SourceCrs::from_definition("", None), SourceCrs::Undeclared);
        assert_eq!(SourceCrs::from_definition("  ", Some(4326)), SourceCrs::Geographic);
        assert_eq!(SourceCrs::from_definition("epsg:4326", None), SourceCrs::Geographic);
        assert_eq!(
            SourceCrs::from_definition("", Some(32719)),
            SourceCrs::Projected {
                definition: "EPSG:32719".to_string()
            }
        );
        assert!(SourceCrs::from_definition("PROJCS[\"WGS 84 / UTM zone 19S\"]", Some(32719)).needs_reprojection());
    }
}
