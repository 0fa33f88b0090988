//! Loading the four GeoJSON layers and compiling them into scene geometry.
//!
//! Loading runs on a worker thread; the UI polls [`LoadChannel`] each frame.

use super::layer::{GeoDataSet, GeoLayer, GeoLayerType};
use super::projection::MapProjection;
use crate::render::SceneGeometry;
use crate::state::PaintSettings;
use eframe::egui::{self, Vec2};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use thiserror::Error;
use web_time::Instant;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: geojson::Error,
    },
    #[error("county layer contains no polygons")]
    NoCounties,
    #[error("county extent is degenerate; cannot fit the projection")]
    DegenerateExtent,
    #[error("loader stopped without a result")]
    WorkerStopped,
}

/// A fully loaded, projected map.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub geometry: Arc<SceneGeometry>,
    pub load_time_ms: f64,
}

impl LoadedScene {
    pub fn county_count(&self) -> usize {
        self.geometry.county_count()
    }
}

fn read_layer(path: &Path, layer_type: GeoLayerType) -> Result<GeoLayer, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut layer = GeoLayer::new(layer_type);
    layer
        .load_from_geojson(&text)
        .map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    log::debug!(
        "Loaded {} {} features from {}",
        layer.features.len(),
        layer_type.label(),
        path.display()
    );
    Ok(layer)
}

/// Reads every layer, fits the projection to the counties and projects all
/// geometry into canvas coordinates.
pub fn load_scene(settings: &PaintSettings) -> Result<LoadedScene, LoadError> {
    let start = Instant::now();

    let read = |layer_type| read_layer(&settings.layer_path(layer_type), layer_type);
    let counties = read(GeoLayerType::Counties)?;
    let interstates = read(GeoLayerType::Interstates)?;
    let rivers = read(GeoLayerType::Rivers)?;
    let cities = read(GeoLayerType::Cities)?;

    let data = GeoDataSet::from_layers(counties, interstates, rivers, cities);
    if data.counties.is_empty() {
        return Err(LoadError::NoCounties);
    }

    let layout = &settings.layout;
    let (inner_width, inner_height) = layout.inner_size();
    let projection = MapProjection::fit_size(inner_width, inner_height, data.county_coords())
        .ok_or(LoadError::DegenerateExtent)?
        .with_offset(Vec2::new(layout.margin.left, layout.margin.top));

    let geometry =
        SceneGeometry::compile(&data, &projection, Vec2::new(layout.width, layout.height));
    let load_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    log::info!(
        "Loaded map: {} counties, {} river and {} interstate lines, {} cities in {:.0}ms",
        geometry.county_count(),
        geometry.rivers.len(),
        geometry.interstates.len(),
        geometry.cities.len(),
        load_time_ms
    );

    Ok(LoadedScene {
        geometry: Arc::new(geometry),
        load_time_ms,
    })
}

/// Channel-based background loader.
///
/// The load result is sent through a per-load channel and
/// `ctx.request_repaint()` wakes the UI to pick it up.
#[derive(Default)]
pub struct LoadChannel {
    receiver: Option<Receiver<Result<LoadedScene, LoadError>>>,
}

impl LoadChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts loading on a worker thread. Ignored while a load is running.
    pub fn load(&mut self, ctx: egui::Context, settings: PaintSettings) {
        if self.receiver.is_some() {
            return;
        }

        let (sender, receiver) = channel();
        self.receiver = Some(receiver);
        std::thread::spawn(move || {
            let result = load_scene(&settings);
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    /// Non-blocking check for a finished load.
    pub fn try_recv(&mut self) -> Option<Result<LoadedScene, LoadError>> {
        let result = match self.receiver.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(LoadError::WorkerStopped),
        };
        self.receiver = None;
        Some(result)
    }
}
