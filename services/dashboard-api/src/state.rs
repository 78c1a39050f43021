//! Application state for the dashboard API.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use landcover_common::{DashboardError, IndexKind, LayerId};
use projection::{BoundsReprojector, GdalReprojector};
use renderer::{render_overlay, zones_centroid, ClipBounds, YearStats};
use storage::{file_ok, read_raster, read_zones, require_file, DataLayout, ZoneSet};
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, instrument};

use crate::config::{DashboardConfig, MunicipalityConfig};
use crate::error::join_error;
use crate::metrics;
use crate::overlay_cache::{CachedOverlay, OverlayCache, OverlayKey};

/// Shared application state.
///
/// Everything is read-only after startup except the overlay cache and the
/// two memos, which only ever gain entries.
pub struct AppState {
    pub config: DashboardConfig,
    pub layout: DataLayout,
    pub reprojector: Arc<dyn BoundsReprojector + Send + Sync>,
    pub overlay_cache: OverlayCache,
    zones: OnceCell<Arc<ZoneSet>>,
    year_stats: RwLock<HashMap<(String, IndexKind), Arc<Vec<YearStats>>>>,
}

impl AppState {
    /// State with the GDAL reprojector.
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_reprojector(config, Arc::new(GdalReprojector::default()))
    }

    pub fn with_reprojector(config: DashboardConfig, reprojector: Arc<dyn BoundsReprojector + Send + Sync>) -> Self {
        let layout = DataLayout::resolve(&config.data_root);
        tracing::info!(
            root = %layout.root.display(),
            processed = %layout.processed.display(),
            reports = %layout.reports.display(),
            "Resolved data layout"
        );
        Self {
            overlay_cache: OverlayCache::new(config.overlay_cache_capacity),
            config,
            layout,
            reprojector,
            zones: OnceCell::new(),
            year_stats: RwLock::new(HashMap::new()),
        }
    }

    pub fn municipality(&self, slug: &str) -> Result<&MunicipalityConfig, DashboardError> {
        self.config.municipality(slug)
    }

    /// The data root is present.
    pub fn is_ready(&self) -> bool {
        self.layout.root.is_dir()
    }

    pub fn layer_path(&self, municipality: &MunicipalityConfig, layer: &LayerId) -> PathBuf {
        self.layout.layer_path(&municipality.slug, layer)
    }

    /// Render (or fetch from cache) the overlay of one layer file.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn overlay(
        &self,
        layer: &LayerId,
        path: PathBuf,
        clip: ClipBounds,
    ) -> Result<Arc<CachedOverlay>, DashboardError> {
        require_file(&path)?;

        let key = OverlayKey::canonical(&path, clip);
        if let Some(hit) = self.overlay_cache.get(&key).await {
            metrics::record_cache_hit();
            return Ok(hit);
        }
        metrics::record_cache_miss();

        let reprojector = Arc::clone(&self.reprojector);
        let started = Instant::now();
        let rendered = tokio::task::spawn_blocking(move || -> Result<CachedOverlay, DashboardError> {
            let raster = read_raster(&path)?;
            let overlay = render_overlay(&raster, clip, reprojector.as_ref())?;
            let png = overlay.to_png()?;
            Ok(CachedOverlay {
                overlay,
                png: Bytes::from(png),
            })
        })
        .await
        .map_err(join_error)??;
        metrics::record_render(layer.kind().as_str(), started.elapsed());

        Ok(self.overlay_cache.put(key, rendered).await)
    }

    /// Zones of the data root, read once.
    ///
    /// A failed read is not remembered, so the next request tries again.
    pub async fn zones(&self) -> Result<Arc<ZoneSet>, DashboardError> {
        self.zones
            .get_or_try_init(|| async {
                let path = self.layout.zones_gpkg();
                let set = tokio::task::spawn_blocking(move || read_zones(&path))
                    .await
                    .map_err(join_error)??;
                Ok::<_, DashboardError>(Arc::new(set))
            })
            .await
            .map(Arc::clone)
    }

    /// `(lat, lon)` of the zones' area centroid, or the configured center.
    pub fn zone_center(&self, zones: &ZoneSet) -> (f64, f64) {
        zones_centroid(&zones.zones).unwrap_or((self.config.default_center[0], self.config.default_center[1]))
    }

    /// Per-year band statistics of one index, read once per municipality.
    ///
    /// Years without a file are skipped.
    pub async fn year_stats(
        &self,
        municipality: &MunicipalityConfig,
        index: IndexKind,
    ) -> Result<Arc<Vec<YearStats>>, DashboardError> {
        let key = (municipality.slug.clone(), index);
        if let Some(hit) = self.year_stats.read().await.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let paths: Vec<(u16, PathBuf)> = municipality
            .years
            .iter()
            .map(|&year| (year, self.layout.index_raster(&municipality.slug, index, year)))
            .collect();
        let stats = tokio::task::spawn_blocking(move || -> Result<Vec<YearStats>, DashboardError> {
            let mut out = Vec::new();
            for (year, path) in paths {
                if !file_ok(&path) {
                    debug!(year, path = %path.display(), "Skipping missing year");
                    continue;
                }
                let raster = read_raster(&path)?;
                out.extend(YearStats::from_raster(year, &raster));
            }
            out.sort_by_key(|s| s.year);
            Ok(out)
        })
        .await
        .map_err(join_error)??;

        let stats = Arc::new(stats);
        self.year_stats.write().await.insert(key, Arc::clone(&stats));
        Ok(stats)
    }
}
