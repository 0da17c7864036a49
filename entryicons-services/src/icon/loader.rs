//! Icon loader: decodes resource bytes and renders them at a pixel size.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use crate::icon::error::IconError;
use crate::icon::pixmap::Pixmap;
use crate::icon::resources::{ResourceNamespace, ResourceProvider};

/// Icon loader.
pub struct IconLoader {
    filter: FilterType,
}

impl IconLoader {
    /// Create a new icon loader.
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Decode one resource file.
    pub fn decode(
        &self,
        resources: &dyn ResourceProvider,
        namespace: ResourceNamespace,
        name: &str,
    ) -> Result<RgbaImage, IconError> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        if extension == "svg" || extension == "svgz" {
            return Err(IconError::InvalidFormat(format!(
                "Unsupported icon format: {}",
                extension
            )));
        }

        let bytes = resources.read(namespace, name)?;
        let image = image::load_from_memory(&bytes)?;
        Ok(image.to_rgba8())
    }

    /// Render a decoded image into a square of `size` logical pixels.
    ///
    /// The image is scaled to fit `size * device_pixel_ratio` physical pixels,
    /// keeping its aspect ratio. Returns a null pixmap for a zero size.
    pub fn render(&self, image: &RgbaImage, size: u32, device_pixel_ratio: f32) -> Pixmap {
        let physical = physical_size(size, device_pixel_ratio);
        if physical == 0 {
            return Pixmap::null();
        }

        let scaled = if image.dimensions() == (physical, physical) {
            image.clone()
        } else {
            DynamicImage::ImageRgba8(image.clone())
                .resize(physical, physical, self.filter)
                .to_rgba8()
        };
        Pixmap::from_image(scaled).with_device_pixel_ratio(device_pixel_ratio)
    }

    /// Decode a resource scaled directly to `width` x `height` physical pixels.
    pub fn load_scaled(
        &self,
        resources: &dyn ResourceProvider,
        namespace: ResourceNamespace,
        name: &str,
        width: u32,
        height: u32,
    ) -> Result<Pixmap, IconError> {
        let image = self.decode(resources, namespace, name)?;
        if width == 0 || height == 0 {
            return Ok(Pixmap::null());
        }
        let scaled = if image.dimensions() == (width, height) {
            image
        } else {
            imageops::resize(&image, width, height, self.filter)
        };
        Ok(Pixmap::from_image(scaled))
    }
}

impl Default for IconLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Physical pixel count for a logical size.
pub(crate) fn physical_size(size: u32, device_pixel_ratio: f32) -> u32 {
    (size as f32 * device_pixel_ratio).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::resources::MemoryResources;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_render_sizes() {
        let loader = IconLoader::new();
        let image = RgbaImage::from_pixel(64, 64, Rgba([1, 2, 3, 255]));

        let pixmap = loader.render(&image, 22, 1.0);
        assert_eq!((pixmap.width(), pixmap.height()), (22, 22));

        let hidpi = loader.render(&image, 22, 2.0);
        assert_eq!(hidpi.width(), 44);
        assert_eq!(hidpi.device_pixel_ratio(), 2.0);

        assert!(loader.render(&image, 0, 1.0).is_null());
    }

    #[test]
    fn test_load_scaled() {
        let resources =
            MemoryResources::new().with(ResourceNamespace::Badges, "0_badge.png", png(48, 48));
        let loader = IconLoader::new();
        let pixmap = loader
            .load_scaled(&resources, ResourceNamespace::Badges, "0_badge.png", 13, 13)
            .unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (13, 13));
    }

    #[test]
    fn test_decode_errors() {
        let resources = MemoryResources::new()
            .with(ResourceNamespace::Icons, "broken.png", b"not an image".to_vec())
            .with(ResourceNamespace::Icons, "vector.svg", b"<svg/>".to_vec());
        let loader = IconLoader::new();

        assert!(matches!(
            loader.decode(&resources, ResourceNamespace::Icons, "broken.png"),
            Err(IconError::Decode(_))
        ));
        assert!(matches!(
            loader.decode(&resources, ResourceNamespace::Icons, "vector.svg"),
            Err(IconError::InvalidFormat(_))
        ));
        assert!(matches!(
            loader.decode(&resources, ResourceNamespace::Icons, "missing.png"),
            Err(IconError::ResourceNotFound(_))
        ));
    }
}
