//! Texture cache for the rasterized map.
//!
//! The map is rasterized only when something visible changes; otherwise the
//! last texture is reused every frame.

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use tiny_skia::Pixmap;

/// Cache key for identifying map texture state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MapCacheKey {
    /// Hash of the scene snapshot (fills and layer styles)
    pub content_signature: u64,
    /// Rendered image dimensions in physical pixels
    pub dimensions: (usize, usize),
}

impl MapCacheKey {
    pub fn new(content_signature: u64, dimensions: (usize, usize)) -> Self {
        Self {
            content_signature,
            dimensions,
        }
    }
}

/// Stores the rendered map as an egui texture, along with the key it was
/// rendered for.
#[derive(Default)]
pub struct MapTextureCache {
    texture: Option<TextureHandle>,
    cache_key: Option<MapCacheKey>,
}

impl MapTextureCache {
    /// Check if the cache contains a valid texture for the given key.
    pub fn is_valid(&self, key: &MapCacheKey) -> bool {
        self.cache_key.as_ref() == Some(key) && self.texture.is_some()
    }

    /// Replace the cached texture with a freshly rasterized pixmap.
    pub fn update(&mut self, ctx: &egui::Context, key: MapCacheKey, pixmap: &Pixmap) {
        log::trace!(
            "Updating map texture: {}x{} for signature {}",
            pixmap.width(),
            pixmap.height(),
            key.content_signature
        );

        let image = pixmap_to_image(pixmap);
        let options = TextureOptions {
            magnification: egui::TextureFilter::Linear,
            minification: egui::TextureFilter::Linear,
            ..Default::default()
        };

        match &mut self.texture {
            Some(texture) => texture.set(image, options),
            None => self.texture = Some(ctx.load_texture("map_texture", image, options)),
        }
        self.cache_key = Some(key);
    }

    /// Get the cached texture if available.
    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    /// Invalidate the cache, forcing a re-render on next frame.
    pub fn invalidate(&mut self) {
        self.cache_key = None;
    }
}

/// tiny-skia and egui both store premultiplied RGBA.
fn pixmap_to_image(pixmap: &Pixmap) -> ColorImage {
    ColorImage::from_rgba_premultiplied(
        [pixmap.width() as usize, pixmap.height() as usize],
        pixmap.data(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cache_is_never_valid() {
        let cache = MapTextureCache::default();
        assert!(!cache.is_valid(&MapCacheKey::new(1, (10, 10))));
        assert!(cache.texture().is_none());
    }

    #[test]
    fn test_pixmap_to_image_keeps_size_and_pixels() {
        let mut pixmap = Pixmap::new(3, 2).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(255, 0, 0, 255));
        let image = pixmap_to_image(&pixmap);
        assert_eq!(image.size, [3, 2]);
        assert!(image
            .pixels
            .iter()
            .all(|p| *p == egui::Color32::from_rgb(255, 0, 0)));
    }
}
