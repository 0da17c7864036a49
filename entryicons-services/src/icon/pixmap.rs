//! Pixmap value type used by the icon cache.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbaImage;

static NEXT_CACHE_KEY: AtomicU64 = AtomicU64::new(1);

fn next_cache_key() -> u64 {
    NEXT_CACHE_KEY.fetch_add(1, Ordering::Relaxed)
}

/// An immutable RGBA image with a device pixel ratio and an identity key.
///
/// Cloning is cheap and keeps the cache key, so clones are recognised as the
/// same pixmap. Painting on a pixmap (or changing its device pixel ratio)
/// detaches it and assigns a fresh key.
#[derive(Clone)]
pub struct Pixmap {
    image: Option<Arc<RgbaImage>>,
    device_pixel_ratio: f32,
    cache_key: u64,
}

impl Pixmap {
    /// The null pixmap: no pixels, cache key 0.
    pub fn null() -> Self {
        Self {
            image: None,
            device_pixel_ratio: 1.0,
            cache_key: 0,
        }
    }

    /// Wrap a decoded image with a device pixel ratio of 1.
    pub fn from_image(image: RgbaImage) -> Self {
        if image.width() == 0 || image.height() == 0 {
            return Self::null();
        }
        Self {
            image: Some(Arc::new(image)),
            device_pixel_ratio: 1.0,
            cache_key: next_cache_key(),
        }
    }

    /// Return this pixmap with another device pixel ratio.
    ///
    /// Non-finite or non-positive ratios are clamped to 1.
    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        if self.is_null() || ratio == self.device_pixel_ratio {
            self.device_pixel_ratio = ratio;
            return self;
        }
        self.device_pixel_ratio = ratio;
        self.cache_key = next_cache_key();
        self
    }

    /// Whether the pixmap holds no pixels.
    pub fn is_null(&self) -> bool {
        self.image.is_none()
    }

    /// Width in physical pixels.
    pub fn width(&self) -> u32 {
        self.image.as_ref().map_or(0, |image| image.width())
    }

    /// Height in physical pixels.
    pub fn height(&self) -> u32 {
        self.image.as_ref().map_or(0, |image| image.height())
    }

    /// Ratio between physical and logical pixels.
    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Identity key; equal for clones, 0 for null pixmaps.
    pub fn cache_key(&self) -> u64 {
        self.cache_key
    }

    /// The pixel data, if any.
    pub fn as_image(&self) -> Option<&RgbaImage> {
        self.image.as_deref()
    }

    /// Number of bytes of pixel data held.
    pub fn byte_size(&self) -> usize {
        self.image.as_ref().map_or(0, |image| image.as_raw().len())
    }

    /// Whether both pixmaps have the same size and pixel content.
    pub fn same_pixels(&self, other: &Pixmap) -> bool {
        match (self.as_image(), other.as_image()) {
            (Some(a), Some(b)) => a.dimensions() == b.dimensions() && a.as_raw() == b.as_raw(),
            (None, None) => true,
            _ => false,
        }
    }

    /// Paint `source` at the logical position `(x, y)` using source-over
    /// blending.
    ///
    /// The position is converted to physical pixels with this pixmap's ratio.
    /// A source with a different ratio is rescaled so its logical size is
    /// preserved. Drawing on a null pixmap does nothing.
    pub fn draw_pixmap(&mut self, x: i32, y: i32, source: &Pixmap) {
        let Some(source_image) = source.as_image() else {
            return;
        };
        let dpr = self.device_pixel_ratio;
        let Some(target) = self.image.as_mut() else {
            return;
        };

        let scale = dpr / source.device_pixel_ratio;
        let rescaled;
        let top = if (scale - 1.0).abs() > f32::EPSILON {
            let width = ((source_image.width() as f32) * scale).round().max(1.0) as u32;
            let height = ((source_image.height() as f32) * scale).round().max(1.0) as u32;
            rescaled = imageops::resize(source_image, width, height, FilterType::Triangle);
            &rescaled
        } else {
            source_image
        };

        let px = (x as f32 * dpr).round() as i64;
        let py = (y as f32 * dpr).round() as i64;
        imageops::overlay(Arc::make_mut(target), top, px, py);
        self.cache_key = next_cache_key();
    }
}

impl Default for Pixmap {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pixmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("cache_key", &self.cache_key)
            .finish()
    }
}
