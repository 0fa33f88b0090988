//! Right panel UI: paint color, layer toggles and export.

use super::colors;
use crate::state::{
    parse_color, to_hex, AppState, Gesture, MapController, MapEvent, PaintMode, ToggleLayer,
};
use eframe::egui::{self, RichText, ScrollArea};
use egui_phosphor::regular as icons;

/// Renders the control panel and returns the events it produced.
///
/// Controls stay disabled until the map has loaded.
pub fn render_right_panel(
    ctx: &egui::Context,
    state: &mut AppState,
    controller: Option<&MapController>,
    export_pending: bool,
) -> Vec<MapEvent> {
    let mut events = Vec::new();

    egui::SidePanel::right("right_panel")
        .resizable(true)
        .default_width(220.0)
        .min_width(180.0)
        .max_width(320.0)
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Controls");
                ui.separator();

                let Some(controller) = controller else {
                    ui.label(RichText::new("Waiting for map data").color(colors::ui::LABEL));
                    return;
                };

                render_paint_section(ui, controller, &mut events);
                ui.add_space(5.0);

                render_layers_section(ui, controller, &mut events);
                ui.add_space(5.0);

                render_export_section(ui, state, export_pending, &mut events);
            });
        });

    events
}

fn render_paint_section(ui: &mut egui::Ui, controller: &MapController, events: &mut Vec<MapEvent>) {
    egui::CollapsingHeader::new(RichText::new(format!("{} Paint", icons::PAINT_BRUSH)).strong())
        .default_open(true)
        .show(ui, |ui| {
            let mut color = parse_color(&controller.controls().color)
                .unwrap_or_else(|_| controller.paint().paint_color());

            ui.horizontal(|ui| {
                ui.label("Color");
                if ui.color_edit_button_srgba(&mut color).changed() {
                    events.push(MapEvent::ColorChanged {
                        value: to_hex(color),
                    });
                }
                ui.label(
                    RichText::new(&controller.controls().color)
                        .monospace()
                        .color(colors::ui::LABEL),
                );
            });

            let paint = controller.paint();
            ui.label(
                RichText::new(format!(
                    "{} of {} counties painted",
                    paint.painted_count(),
                    paint.county_count()
                ))
                .size(11.0)
                .color(colors::ui::LABEL),
            );
            let hint = match paint.gesture() {
                Gesture::Idle => "Left-drag paints, right-drag erases",
                Gesture::Painting(PaintMode::Fill) => "Painting...",
                Gesture::Painting(PaintMode::Erase) => "Erasing...",
            };
            ui.label(RichText::new(hint).size(11.0).color(colors::ui::LABEL));
        });
}

fn render_layers_section(
    ui: &mut egui::Ui,
    controller: &MapController,
    events: &mut Vec<MapEvent>,
) {
    egui::CollapsingHeader::new(RichText::new(format!("{} Layers", icons::STACK)).strong())
        .default_open(true)
        .show(ui, |ui| {
            for &layer in ToggleLayer::all() {
                let checkbox = controller.controls().checkbox(layer);
                let mut checked = checkbox.checked;
                let response =
                    ui.add_enabled(checkbox.enabled, egui::Checkbox::new(&mut checked, layer.label()));
                if response.changed() {
                    events.push(MapEvent::ToggleChanged {
                        layer,
                        value: checked,
                    });
                }
            }
        });
}

fn render_export_section(
    ui: &mut egui::Ui,
    state: &mut AppState,
    export_pending: bool,
    events: &mut Vec<MapEvent>,
) {
    egui::CollapsingHeader::new(RichText::new(format!("{} Export", icons::IMAGE)).strong())
        .default_open(true)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Scale (%)");
                ui.add(
                    egui::TextEdit::singleline(&mut state.scale_input)
                        .desired_width(50.0)
                        .hint_text("100")
                        .font(egui::FontId::monospace(12.0)),
                );
            });

            let label = if export_pending {
                format!("{} Exporting...", icons::HOURGLASS)
            } else {
                format!("{} Download PNG", icons::DOWNLOAD_SIMPLE)
            };
            if ui
                .add_enabled(!export_pending, egui::Button::new(label))
                .clicked()
            {
                events.push(MapEvent::ExportRequested {
                    scale_input: state.scale_input.clone(),
                });
            }
        });
}
