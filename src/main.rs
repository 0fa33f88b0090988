#![warn(clippy::all)]

//! EWX Paint - A county painting map for the EWX forecast area.
//!
//! Counties are painted by dragging with the primary button and erased with
//! the secondary button. Interstates, rivers, cities and a drop shadow can be
//! toggled, and the visible map can be exported as a transparent PNG.

mod export;
mod geo;
mod render;
mod state;
mod ui;

use eframe::egui;
use export::ExportChannel;
use geo::LoadChannel;
use render::SceneGeometry;
use state::{AppState, MapController, PaintSettings};
use std::sync::Arc;
use web_time::Instant;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let settings = PaintSettings::load();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("EWX Paint")
            .with_inner_size([
                settings.layout.width + 260.0,
                settings.layout.height + 60.0,
            ]),
        ..Default::default()
    };

    eframe::run_native(
        "EWX Paint",
        native_options,
        Box::new(|cc| Ok(Box::new(PaintApp::new(cc, settings)))),
    )
}

/// Main application state and logic.
pub struct PaintApp {
    /// UI-only state
    state: AppState,

    /// Settings loaded at startup
    settings: PaintSettings,

    /// Projected map geometry, once loaded
    geometry: Option<Arc<SceneGeometry>>,

    /// Fills, layer styles and control panel state, once the map is loaded
    controller: Option<MapController>,

    /// Channel for the background GeoJSON load
    load_channel: LoadChannel,

    /// Channel for background PNG exports
    export_channel: ExportChannel,

    /// Rasterizer and texture cache for the canvas
    canvas: ui::CanvasRenderer,
}

impl PaintApp {
    /// Creates the app and starts loading map data.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: PaintSettings) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let mut load_channel = LoadChannel::new();
        load_channel.load(cc.egui_ctx.clone(), settings.clone());

        Self {
            state: AppState::new(&settings),
            settings,
            geometry: None,
            controller: None,
            load_channel,
            export_channel: ExportChannel::new(),
            canvas: ui::CanvasRenderer::new(),
        }
    }

    fn poll_channels(&mut self) {
        if let Some(result) = self.load_channel.try_recv() {
            match result {
                Ok(scene) => {
                    let count = scene.county_count();
                    self.controller = Some(MapController::new(count, &self.settings));
                    self.geometry = Some(scene.geometry);
                    self.canvas.invalidate();
                    self.state.set_status(format!(
                        "Loaded {} counties in {:.0}ms",
                        count, scene.load_time_ms
                    ));
                }
                Err(e) => {
                    log::error!("Failed to load map data: {}", e);
                    self.state.set_error(format!("Failed to load map data: {}", e));
                }
            }
        }

        if let Some(result) = self.export_channel.try_recv() {
            match result {
                Ok(outcome) => self.state.set_status(format!(
                    "Saved {} ({}x{}, {}%)",
                    outcome.path.display(),
                    outcome.width,
                    outcome.height,
                    outcome.scale_percent
                )),
                Err(e) => {
                    log::error!("Export failed: {}", e);
                    self.state.set_error(format!("Export failed: {}", e));
                }
            }
        }
    }
}

impl eframe::App for PaintApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_channels();

        let now = Instant::now();
        let snapshot = self.controller.as_ref().map(|c| c.snapshot(now));

        ui::render_top_bar(
            ctx,
            &self.state,
            self.geometry.as_deref(),
            self.controller.as_ref(),
        );

        let mut events = ui::render_right_panel(
            ctx,
            &mut self.state,
            self.controller.as_ref(),
            self.export_channel.is_pending(),
        );

        let scene = self.geometry.as_deref().zip(snapshot.as_ref());
        events.extend(ui::render_canvas(ctx, &mut self.state, scene, &mut self.canvas));

        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        let had_events = !events.is_empty();
        for event in events {
            let Some(request) = controller.dispatch(event, now) else {
                continue;
            };
            let Some(geometry) = self.geometry.clone() else {
                continue;
            };
            let path = self.settings.export_path();
            if self.export_channel.export(ctx.clone(), geometry, request, path.clone()) {
                self.state.set_status(format!("Exporting to {}...", path.display()));
            }
        }

        if had_events || controller.paint().is_animating(Instant::now()) {
            ctx.request_repaint();
        }
    }
}
