//! Geographic data: GeoJSON layers, projection and loading.
//!
//! Counties, interstates, rivers and cities are read from GeoJSON, projected
//! with an Albers equal-area conic fit to the county extent, and compiled
//! into screen-space geometry for rendering and hit testing.

mod layer;
mod loader;
pub mod projection;

pub use layer::{CityClass, CountyId, GeoDataSet, GeoLayerType};
pub use loader::LoadChannel;
pub use projection::MapProjection;

#[cfg(test)]
pub use layer::{City, County, GeoFeature, GeoLayer};
