//! Map rendering.
//!
//! Projected geometry is compiled once into a [`SceneGeometry`]; each frame
//! the current [`SceneSnapshot`] is rasterized by [`SceneRasterizer`] and
//! uploaded through [`MapTextureCache`] when its signature changes.

mod raster;
mod scene;
mod text;
mod texture_cache;

pub use raster::{output_size, RasterError, SceneRasterizer};
pub use scene::{SceneGeometry, SceneSnapshot};
pub use texture_cache::{MapCacheKey, MapTextureCache};

#[cfg(test)]
pub(crate) use scene::tests::sample_geometry;
