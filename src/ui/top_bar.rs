//! Top bar UI: app title, status, and the hovered county.

use super::colors;
use crate::render::SceneGeometry;
use crate::state::{AppState, FillState, MapController};
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(
    ctx: &egui::Context,
    state: &AppState,
    geometry: Option<&SceneGeometry>,
    controller: Option<&MapController>,
) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new("EWX Paint")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                let status_color = if state.status_is_error {
                    colors::ui::ERROR
                } else {
                    Color32::GRAY
                };
                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(status_color),
                );

                let Some(county) = state
                    .hovered_county
                    .zip(geometry)
                    .and_then(|(id, geometry)| geometry.county(id))
                else {
                    return;
                };
                let name = county.name.as_deref().unwrap_or("Unnamed county");
                let fill = controller.and_then(|c| c.paint().fill_state(county.id));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(FillState::Painted(color)) = fill {
                        ui.label(RichText::new("\u{25A0}").size(13.0).color(color));
                    }
                    ui.label(RichText::new(name).size(13.0).color(colors::ui::LABEL));
                });
            });
        });
}
