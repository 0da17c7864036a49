//! Byte-budgeted LRU cache shared by rendered icons and badged composites.

use lru::LruCache;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::icon::pixmap::Pixmap;
use crate::icon::SizeTier;

/// Default cache budget in KiB (20 MiB).
pub const DEFAULT_CACHE_LIMIT_KB: usize = 20480;

/// One icon rendered at every size tier.
#[derive(Clone, Debug)]
pub struct RenderedIconSet {
    default: Pixmap,
    medium: Pixmap,
    large: Pixmap,
}

impl RenderedIconSet {
    /// Bundle the three tier renderings of an icon.
    pub fn new(default: Pixmap, medium: Pixmap, large: Pixmap) -> Self {
        Self {
            default,
            medium,
            large,
        }
    }

    /// The pixmap rendered for `tier`.
    pub fn pixmap(&self, tier: SizeTier) -> &Pixmap {
        match tier {
            SizeTier::Default => &self.default,
            SizeTier::Medium => &self.medium,
            SizeTier::Large => &self.large,
        }
    }

    /// Bytes of pixel data held by all tiers.
    pub fn byte_size(&self) -> usize {
        self.default.byte_size() + self.medium.byte_size() + self.large.byte_size()
    }
}

/// Value stored in a [`PixmapCache`].
#[derive(Clone, Debug)]
pub enum CacheEntry {
    /// A single pixmap, e.g. a badged composite.
    Pixmap(Pixmap),
    /// An icon pre-rendered at all tiers.
    IconSet(RenderedIconSet),
}

impl CacheEntry {
    /// Cost of the entry against the cache budget.
    pub fn byte_size(&self) -> usize {
        match self {
            CacheEntry::Pixmap(pixmap) => pixmap.byte_size(),
            CacheEntry::IconSet(set) => set.byte_size(),
        }
    }
}

struct CacheState {
    entries: LruCache<String, CacheEntry>,
    total_bytes: usize,
    limit_bytes: usize,
}

impl CacheState {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.pop(key)?;
        self.total_bytes -= entry.byte_size();
        Some(entry)
    }

    fn evict_to_limit(&mut self) {
        while self.total_bytes > self.limit_bytes {
            match self.entries.pop_lru() {
                Some((key, entry)) => {
                    self.total_bytes -= entry.byte_size();
                    log::debug!("PixmapCache: evicted '{}' ({} bytes)", key, entry.byte_size());
                },
                None => break,
            }
        }
    }
}

/// Capacity-bounded pixmap cache with least-recently-used eviction.
///
/// The budget is counted in bytes of pixel data. Handles are cheap to clone
/// and share the same storage, so one cache can back several services.
#[derive(Clone)]
pub struct PixmapCache {
    state: Arc<Mutex<CacheState>>,
}

impl PixmapCache {
    /// Create a cache with a budget of `limit_kb` KiB.
    pub fn new(limit_kb: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                total_bytes: 0,
                limit_bytes: limit_kb.saturating_mul(1024),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an entry under `key`, evicting least recently used entries as
    /// needed.
    ///
    /// Returns `false` when the entry alone exceeds the budget; it is not
    /// stored and any previous entry under `key` is dropped.
    pub fn insert(&self, key: impl Into<String>, entry: CacheEntry) -> bool {
        let key = key.into();
        let cost = entry.byte_size();
        let mut state = self.lock();
        state.remove(&key);

        if cost > state.limit_bytes {
            log::debug!(
                "PixmapCache: '{}' ({} bytes) exceeds the {} byte budget",
                key,
                cost,
                state.limit_bytes
            );
            return false;
        }

        state.entries.put(key, entry);
        state.total_bytes += cost;
        state.evict_to_limit();
        true
    }

    /// Look up an entry, marking it as recently used.
    pub fn find(&self, key: &str) -> Option<CacheEntry> {
        self.lock().entries.get(key).cloned()
    }

    /// Look up a single pixmap entry.
    pub fn find_pixmap(&self, key: &str) -> Option<Pixmap> {
        match self.find(key)? {
            CacheEntry::Pixmap(pixmap) => Some(pixmap),
            CacheEntry::IconSet(_) => None,
        }
    }

    /// Look up a rendered icon set.
    pub fn find_icon_set(&self, key: &str) -> Option<RenderedIconSet> {
        match self.find(key)? {
            CacheEntry::IconSet(set) => Some(set),
            CacheEntry::Pixmap(_) => None,
        }
    }

    /// Check whether `key` is cached without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains(key)
    }

    /// Remove an entry.
    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        self.lock().remove(key)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.total_bytes = 0;
    }

    /// Change the budget, evicting down to it immediately.
    pub fn set_cache_limit(&self, limit_kb: usize) {
        let mut state = self.lock();
        state.limit_bytes = limit_kb.saturating_mul(1024);
        state.evict_to_limit();
    }

    /// Current budget in KiB.
    pub fn cache_limit(&self) -> usize {
        self.lock().limit_bytes / 1024
    }

    /// Bytes of pixel data currently cached.
    pub fn total_bytes(&self) -> usize {
        self.lock().total_bytes
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

impl Default for PixmapCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_LIMIT_KB)
    }
}
