//! In-memory cache of rendered overlays.
//!
//! A render depends only on the raster file and the clip bounds, so entries
//! are keyed by `(path, lower bits, upper bits)` and never invalidated.
//! Capacity is bounded by entry count with LRU eviction.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use lru::LruCache;
use renderer::{ClipBounds, Overlay};
use tokio::sync::RwLock;

/// Cache key for one render.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct OverlayKey {
    pub path: PathBuf,
    pub lower: Option<u64>,
    pub upper: Option<u64>,
}

impl OverlayKey {
    /// Key for `path` as given; see [`OverlayKey::canonical`].
    pub fn new(path: &Path, clip: ClipBounds) -> Self {
        let (lower, upper) = clip.key_bits();
        Self {
            path: path.to_path_buf(),
            lower,
            upper,
        }
    }

    /// Key with the path canonicalized, so aliases of one file share an
    /// entry. Falls back to the path as given when it cannot be resolved.
    pub fn canonical(path: &Path, clip: ClipBounds) -> Self {
        let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Self::new(&resolved, clip)
    }
}

/// A rendered overlay and its PNG encoding.
#[derive(Debug, Clone)]
pub struct CachedOverlay {
    pub overlay: Overlay,
    pub png: Bytes,
}

/// Statistics for the overlay cache.
#[derive(Debug, Default)]
pub struct OverlayCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub entry_count: AtomicU64,
}

impl OverlayCacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

pub struct OverlayCache {
    cache: RwLock<LruCache<OverlayKey, Arc<CachedOverlay>>>,
    stats: Arc<OverlayCacheStats>,
    capacity: usize,
}

impl OverlayCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        tracing::info!(capacity = capacity.get(), "OverlayCache initialized");
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            stats: Arc::new(OverlayCacheStats::default()),
            capacity: capacity.get(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn get(&self, key: &OverlayKey) -> Option<Arc<CachedOverlay>> {
        // LruCache::get promotes the entry, so it needs the write lock
        let mut cache = self.cache.write().await;
        match cache.get(key) {
            Some(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry))
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert and return the shared entry.
    pub async fn put(&self, key: OverlayKey, value: CachedOverlay) -> Arc<CachedOverlay> {
        let entry = Arc::new(value);
        let mut cache = self.cache.write().await;
        if let Some((evicted, _)) = cache.push(key.clone(), Arc::clone(&entry)) {
            if evicted != key {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(path = %evicted.path.display(), "Evicted overlay");
            }
        }
        self.stats.entry_count.store(cache.len() as u64, Ordering::Relaxed);
        entry
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    pub fn stats(&self) -> &OverlayCacheStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landcover_common::GeoBounds;
    use renderer::ResolvedClip;

    fn entry(source: &str) -> CachedOverlay {
        CachedOverlay {
            overlay: Overlay {
                width: 1,
                height: 1,
                pixels: vec![0, 0, 0, 0],
                bounds: GeoBounds::new(-70.8, -33.5, -70.7, -33.4),
                clip: ResolvedClip { lower: 0.0, upper: 1.0 },
                source: source.to_string(),
            },
            png: Bytes::from_static(b"png"),
        }
    }

    fn key(name: &str, clip: ClipBounds) -> OverlayKey {
        OverlayKey::new(Path::new(name), clip)
    }

    #[tokio::test]
    async fn test_hit_and_miss() {
        let cache = OverlayCache::new(4);
        let k = key("a.tif", ClipBounds::default());
        assert!(cache.get(&k).await.is_none());
        cache.put(k.clone(), entry("a.tif")).await;
        assert_eq!(cache.get(&k).await.unwrap().overlay.source, "a.tif");
        assert_eq!(cache.stats().hits.load(Ordering::Relaxed), 1);
        assert_eq!(cache.stats().misses.load(Ordering::Relaxed), 1);
        assert_eq!(cache.stats().hit_rate(), 50.0);
    }

    #[tokio::test]
    async fn test_bounds_are_part_of_key() {
        let cache = OverlayCache::new(4);
        cache.put(key("a.tif", ClipBounds::explicit(0.0, 1.0)), entry("a.tif")).await;
        assert!(cache.get(&key("a.tif", ClipBounds::default())).await.is_none());
        assert!(cache.get(&key("a.tif", ClipBounds::explicit(-0.0, 1.0))).await.is_none());
        assert!(cache.get(&key("a.tif", ClipBounds::explicit(0.0, 1.0))).await.is_some());
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = OverlayCache::new(2);
        let (a, b, c) = (
            key("a.tif", ClipBounds::default()),
            key("b.tif", ClipBounds::default()),
            key("c.tif", ClipBounds::default()),
        );
        cache.put(a.clone(), entry("a")).await;
        cache.put(b.clone(), entry("b")).await;
        // Touch a so b is least recently used
        cache.get(&a).await;
        cache.put(c.clone(), entry("c")).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&a).await.is_some());
        assert!(cache.get(&b).await.is_none());
        assert_eq!(cache.stats().evictions.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_replacing_same_key_is_not_eviction() {
        let cache = OverlayCache::new(2);
        let a = key("a.tif", ClipBounds::default());
        cache.put(a.clone(), entry("a")).await;
        cache.put(a.clone(), entry("a")).await;
        assert_eq!(cache.stats().evictions.load(Ordering::Relaxed), 0);
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(OverlayCache::new(0).capacity(), 1);
    }
}
