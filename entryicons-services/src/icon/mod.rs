//! Database entry icons and status badges.
//!
//! [`DatabaseIcons`] enumerates the bundled icon and badge sets once, renders
//! icons at three size tiers and paints badges onto icon corners. Rendered
//! results live in a shared, byte-budgeted [`PixmapCache`]; anything evicted
//! is rendered again on the next request.

mod cache;
mod error;
mod loader;
mod pixmap;
mod resources;

pub use cache::{CacheEntry, PixmapCache, RenderedIconSet, DEFAULT_CACHE_LIMIT_KB};
pub use error::IconError;
pub use loader::IconLoader;
pub use pixmap::Pixmap;
pub use resources::{DirectoryResources, MemoryResources, ResourceNamespace, ResourceProvider};

use crate::icon::loader::physical_size;
use crate::settings::Config;

/// Icon index shown for expired entries.
pub const EXPIRED_ICON_INDEX: usize = 45;

/// Target size class of an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeTier {
    /// Entry list rows.
    #[default]
    Default,
    /// Toolbar and group view.
    Medium,
    /// Entry editor and previews.
    Large,
}

impl SizeTier {
    /// All tiers, smallest first.
    pub const ALL: [SizeTier; 3] = [SizeTier::Default, SizeTier::Medium, SizeTier::Large];

    /// Logical pixel size of the tier.
    pub fn pixels(self, compact_mode: bool) -> u32 {
        match self {
            SizeTier::Default => if compact_mode { 16 } else { 22 },
            SizeTier::Medium => if compact_mode { 26 } else { 30 },
            SizeTier::Large => if compact_mode { 30 } else { 36 },
        }
    }
}

/// Well-known badges, indexed by their position in the sorted badge set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    /// Entry is shared and the share is active.
    ShareActive = 0,
    /// Entry is shared but the share is inactive.
    ShareInactive = 1,
    /// Entry has expired.
    Expired = 2,
}

impl Badge {
    /// Position of the badge in the badge set.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<Badge> for usize {
    fn from(badge: Badge) -> Self {
        badge.index()
    }
}

/// Construction parameters of [`DatabaseIcons`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconCacheConfig {
    /// Use the compact size table.
    pub compact_mode: bool,
    /// Physical pixels per logical pixel for rendered icons.
    pub device_pixel_ratio: f32,
    /// Budget of the pixmap cache in KiB.
    pub cache_limit_kb: usize,
}

impl IconCacheConfig {
    /// Derive the icon configuration from application settings.
    pub fn from_settings(config: &Config) -> Self {
        let defaults = Self::default();
        let device_pixel_ratio = match config.icons.device_pixel_ratio {
            Some(ratio) if ratio.is_finite() && ratio > 0.0 => ratio,
            Some(ratio) => {
                log::warn!("Ignoring invalid device_pixel_ratio {}", ratio);
                defaults.device_pixel_ratio
            },
            None => defaults.device_pixel_ratio,
        };

        Self {
            compact_mode: config.compact_mode(),
            device_pixel_ratio,
            cache_limit_kb: config.icons.cache_limit_kb.unwrap_or(defaults.cache_limit_kb),
        }
    }
}

impl Default for IconCacheConfig {
    fn default() -> Self {
        Self {
            compact_mode: false,
            device_pixel_ratio: 1.0,
            cache_limit_kb: DEFAULT_CACHE_LIMIT_KB,
        }
    }
}

/// Icon and badge service for database entries.
pub struct DatabaseIcons {
    resources: Box<dyn ResourceProvider>,
    icons: Vec<String>,
    badges: Vec<String>,
    compact_mode: bool,
    device_pixel_ratio: f32,
    cache: PixmapCache,
    loader: IconLoader,
}

impl DatabaseIcons {
    /// Create the service with its own pixmap cache.
    pub fn new(resources: impl ResourceProvider + 'static, config: IconCacheConfig) -> Self {
        Self::with_cache(resources, config, PixmapCache::default())
    }

    /// Create the service on top of an existing (possibly shared) cache.
    ///
    /// The cache budget is reset to `config.cache_limit_kb`, which affects
    /// every other user of the same cache.
    pub fn with_cache(
        resources: impl ResourceProvider + 'static,
        config: IconCacheConfig,
        cache: PixmapCache,
    ) -> Self {
        cache.set_cache_limit(config.cache_limit_kb);

        let icons = list_namespace(&resources, ResourceNamespace::Icons);
        let badges = list_namespace(&resources, ResourceNamespace::Badges);
        log::info!(
            "DatabaseIcons: {} icons, {} badges, compact mode {}",
            icons.len(),
            badges.len(),
            config.compact_mode
        );

        let device_pixel_ratio =
            if config.device_pixel_ratio.is_finite() && config.device_pixel_ratio > 0.0 {
                config.device_pixel_ratio
            } else {
                1.0
            };

        Self {
            resources: Box::new(resources),
            icons,
            badges,
            compact_mode: config.compact_mode,
            device_pixel_ratio,
            cache,
            loader: IconLoader::new(),
        }
    }

    /// Number of available base icons.
    pub fn count(&self) -> usize {
        self.icons.len()
    }

    /// Number of available badges.
    pub fn badge_count(&self) -> usize {
        self.badges.len()
    }

    /// Logical pixel size of a tier under the current density.
    pub fn icon_size(&self, tier: SizeTier) -> u32 {
        tier.pixels(self.compact_mode)
    }

    /// Whether the compact size table is in use.
    pub fn is_compact(&self) -> bool {
        self.compact_mode
    }

    /// Pixel ratio icons are rendered at.
    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// The pixmap cache backing this service.
    pub fn cache(&self) -> &PixmapCache {
        &self.cache
    }

    /// Get icon `index` rendered for `tier`.
    ///
    /// Invalid indices and undecodable resources are logged and yield a null
    /// pixmap.
    pub fn icon(&self, index: usize, tier: SizeTier) -> Pixmap {
        self.icon_checked(index, tier).unwrap_or_else(|e| {
            log::warn!("DatabaseIcons::icon: {}", e);
            Pixmap::null()
        })
    }

    /// Like [`DatabaseIcons::icon`], but reports why no icon was produced.
    pub fn icon_checked(&self, index: usize, tier: SizeTier) -> Result<Pixmap, IconError> {
        let name = self.icons.get(index).ok_or(IconError::InvalidIconIndex {
            index,
            count: self.count(),
        })?;

        let cache_key = index.to_string();
        if let Some(set) = self.cache.find_icon_set(&cache_key) {
            let pixmap = set.pixmap(tier);
            // Another service sharing the cache may have rendered this index
            // with a different density or pixel ratio.
            if self.matches_tier(pixmap, tier) {
                return Ok(pixmap.clone());
            }
            log::debug!("DatabaseIcons: cached icon {} has foreign tier sizes", index);
        }

        log::debug!("DatabaseIcons: rendering icon {} ({})", index, name);
        let image = self.loader.decode(&*self.resources, ResourceNamespace::Icons, name)?;
        let [default, medium, large] = SizeTier::ALL
            .map(|t| self.loader.render(&image, self.icon_size(t), self.device_pixel_ratio));
        let set = RenderedIconSet::new(default, medium, large);
        let pixmap = set.pixmap(tier).clone();
        self.cache.insert(cache_key, CacheEntry::IconSet(set));

        Ok(pixmap)
    }

    fn matches_tier(&self, pixmap: &Pixmap, tier: SizeTier) -> bool {
        let expected = physical_size(self.icon_size(tier), self.device_pixel_ratio);
        pixmap.width().max(pixmap.height()) == expected
            && pixmap.device_pixel_ratio() == self.device_pixel_ratio
    }

    /// Paint badge number `badge` onto the bottom-right corner of `base`.
    ///
    /// An invalid badge index or an undecodable badge is logged and `base`
    /// is returned unchanged.
    pub fn apply_badge(&self, base: &Pixmap, badge: usize) -> Pixmap {
        self.apply_badge_checked(base, badge).unwrap_or_else(|e| {
            log::warn!("DatabaseIcons::apply_badge: {}", e);
            base.clone()
        })
    }

    /// Like [`DatabaseIcons::apply_badge`], but reports why the badge was
    /// omitted.
    pub fn apply_badge_checked(
        &self,
        base: &Pixmap,
        index: usize,
    ) -> Result<Pixmap, IconError> {
        let name = self.badges.get(index).ok_or(IconError::InvalidBadgeIndex {
            index,
            count: self.badge_count(),
        })?;

        if base.is_null() {
            return Ok(base.clone());
        }

        let cache_key = format!("badgedicon-{}-{}", base.cache_key(), index);
        if let Some(pixmap) = self.cache.find_pixmap(&cache_key) {
            return Ok(pixmap);
        }

        let dpr = base.device_pixel_ratio();
        let base_size = base.width();
        let small_threshold = self.icon_size(SizeTier::Default) as f32 * dpr;
        let fraction = if base_size as f32 <= small_threshold { 0.6 } else { 0.5 };
        let badge_size = (base_size as f32 * fraction) as u32;
        let offset = ((base_size - badge_size) as f32 / dpr).round() as i32;

        let badge = self
            .loader
            .load_scaled(&*self.resources, ResourceNamespace::Badges, name, badge_size, badge_size)?
            .with_device_pixel_ratio(dpr);

        let mut pixmap = base.clone();
        pixmap.draw_pixmap(offset, offset, &badge);
        self.cache.insert(cache_key, CacheEntry::Pixmap(pixmap.clone()));

        Ok(pixmap)
    }
}

fn list_namespace(resources: &dyn ResourceProvider, namespace: ResourceNamespace) -> Vec<String> {
    resources.list(namespace).unwrap_or_else(|e| {
        log::warn!("DatabaseIcons: failed to list {}: {}", namespace.dir_name(), e);
        Vec::new()
    })
}
