//! Rendering for land-cover change products.
//!
//! - Raster overlays: percentile clipping into a red-to-green change ramp,
//!   draped over a WGS84 box
//! - Quantile choropleth styling for zone metrics
//! - Band and zone summary statistics
//! - PNG encoding

pub mod centroid;
pub mod choropleth;
pub mod error;
pub mod gradient;
pub mod overlay;
pub mod png;
pub mod stats;

pub use centroid::zones_centroid;
pub use choropleth::{Choropleth, ZoneStyle};
pub use error::RenderError;
pub use gradient::{ramp_color, viridis_color, Color};
pub use overlay::{render_overlay, ClipBounds, Overlay, ResolvedClip};
pub use stats::{percentile, zone_kpis, MetricKpi, SeriesSummary, YearStats};
