//! Common types shared by the land-cover dashboard crates and services.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod layer;
pub mod raster;
pub mod zone;

pub use bbox::GeoBounds;
pub use crs::SourceCrs;
pub use error::{DashboardError, DashboardResult};
pub use layer::{IndexKind, LayerId, LayerKind};
pub use raster::{GeoTransform, Raster};
pub use zone::{FeatureCollection, GeoFeature, ZoneMetric, ZoneRecord};
