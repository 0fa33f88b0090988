//! Central canvas UI: the county map.
//!
//! The map is rasterized at the window's physical resolution and drawn as a
//! single texture. Pointer input is hit-tested against projected county
//! outlines and turned into [`MapEvent`]s for the controller.

use super::colors;
use crate::geo::CountyId;
use crate::render::{MapCacheKey, MapTextureCache, SceneGeometry, SceneRasterizer, SceneSnapshot};
use crate::state::{AppState, MapEvent, MouseButton};
use eframe::egui::{self, pos2, Pos2, Rect, Sense, Vec2};

/// Rendering and pointer state that persists across frames.
#[derive(Default)]
pub struct CanvasRenderer {
    rasterizer: SceneRasterizer,
    texture_cache: MapTextureCache,
    /// County under the pointer last frame, for enter detection
    last_hovered: Option<CountyId>,
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the next frame to re-rasterize.
    pub fn invalidate(&mut self) {
        self.texture_cache.invalidate();
    }
}

/// Where the map sits inside the canvas rect.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MapViewport {
    rect: Rect,
    /// Screen points per map unit
    zoom: f32,
}

impl MapViewport {
    /// Largest aspect-preserving fit of `map_size` centred in `available`.
    fn fit(available: Rect, map_size: Vec2) -> Option<Self> {
        if map_size.x <= 0.0 || map_size.y <= 0.0 {
            return None;
        }
        let zoom = (available.width() / map_size.x).min(available.height() / map_size.y);
        if !zoom.is_finite() || zoom <= 0.0 {
            return None;
        }
        let rect = Rect::from_center_size(available.center(), map_size * zoom);
        Some(Self { rect, zoom })
    }

    fn screen_to_map(&self, pos: Pos2) -> Pos2 {
        pos2(
            (pos.x - self.rect.min.x) / self.zoom,
            (pos.y - self.rect.min.y) / self.zoom,
        )
    }
}

fn map_button(button: egui::PointerButton) -> MouseButton {
    match button {
        egui::PointerButton::Primary => MouseButton::Primary,
        egui::PointerButton::Secondary => MouseButton::Secondary,
        egui::PointerButton::Middle | egui::PointerButton::Extra1 | egui::PointerButton::Extra2 => {
            MouseButton::Other
        }
    }
}

/// Translates raw input events, in delivery order, into map events.
///
/// `hit` finds the county under a screen position. `hovered` is the county
/// under the pointer before the first event and is updated as events move it.
fn translate_pointer_events(
    input: &[egui::Event],
    hit: impl Fn(Pos2) -> Option<CountyId>,
    hovered: &mut Option<CountyId>,
) -> Vec<MapEvent> {
    let mut events = Vec::new();
    let mut move_to = |county: Option<CountyId>, events: &mut Vec<MapEvent>| {
        if county != *hovered {
            if let Some(county) = county {
                events.push(MapEvent::PointerEnter { county });
            }
            *hovered = county;
        }
    };

    for event in input {
        match event {
            egui::Event::PointerMoved(pos) => move_to(hit(*pos), &mut events),
            egui::Event::PointerGone => move_to(None, &mut events),
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } => {
                let county = hit(*pos);
                move_to(county, &mut events);
                let button = map_button(*button);

                if *pressed {
                    if let Some(county) = county {
                        events.push(MapEvent::PointerDown { button, county });
                    }
                    continue;
                }

                if button == MouseButton::Secondary {
                    if let Some(county) = county {
                        events.push(MapEvent::ContextMenu { county });
                    }
                }
                // Releases end the gesture wherever they happen
                events.push(MapEvent::PointerUp);
            }
            _ => {}
        }
    }

    events
}

/// Draws the map and returns the pointer events of this frame.
pub fn render_canvas(
    ctx: &egui::Context,
    state: &mut AppState,
    scene: Option<(&SceneGeometry, &SceneSnapshot)>,
    renderer: &mut CanvasRenderer,
) -> Vec<MapEvent> {
    let mut events = Vec::new();

    egui::CentralPanel::default().show(ctx, |ui| {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, colors::map::CANVAS_BACKGROUND);

        let Some((geometry, snapshot)) = scene else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                &state.status_message,
                egui::FontId::proportional(16.0),
                colors::ui::LABEL,
            );
            return;
        };

        let Some(viewport) = MapViewport::fit(rect, geometry.size) else {
            return;
        };

        draw_map(ctx, &painter, viewport, geometry, snapshot, renderer);
        handle_pointer(ctx, &response, viewport, geometry, state, renderer, &mut events);
        draw_overlay_info(ui, &rect, state, geometry);
    });

    events
}

fn draw_map(
    ctx: &egui::Context,
    painter: &egui::Painter,
    viewport: MapViewport,
    geometry: &SceneGeometry,
    snapshot: &SceneSnapshot,
    renderer: &mut CanvasRenderer,
) {
    let scale = viewport.zoom * ctx.pixels_per_point();
    let dimensions = (
        (geometry.size.x * scale).round() as usize,
        (geometry.size.y * scale).round() as usize,
    );
    let key = MapCacheKey::new(snapshot.signature(), dimensions);

    if !renderer.texture_cache.is_valid(&key) {
        match renderer.rasterizer.render(geometry, snapshot, scale) {
            Ok(pixmap) => renderer.texture_cache.update(ctx, key, &pixmap),
            Err(e) => {
                log::warn!("Failed to rasterize map: {}", e);
                return;
            }
        }
    }

    if let Some(texture) = renderer.texture_cache.texture() {
        painter.image(
            texture.id(),
            viewport.rect,
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }
}

fn handle_pointer(
    ctx: &egui::Context,
    response: &egui::Response,
    viewport: MapViewport,
    geometry: &SceneGeometry,
    state: &mut AppState,
    renderer: &mut CanvasRenderer,
    events: &mut Vec<MapEvent>,
) {
    let rect = response.rect;
    let canvas_layer = response.layer_id;
    let hit = |pos: Pos2| {
        if !rect.contains(pos) {
            return None;
        }
        // Popups over the canvas block painting
        if ctx.layer_id_at(pos).is_some_and(|layer| layer != canvas_layer) {
            return None;
        }
        geometry.county_at(viewport.screen_to_map(pos))
    };

    let input = ctx.input(|i| i.events.clone());
    events.extend(translate_pointer_events(&input, hit, &mut renderer.last_hovered));
    state.hovered_county = renderer.last_hovered;
}

/// Draw the hovered county name in the top-left corner.
fn draw_overlay_info(ui: &egui::Ui, rect: &Rect, state: &AppState, geometry: &SceneGeometry) {
    let Some(county) = state.hovered_county.and_then(|id| geometry.county(id)) else {
        return;
    };
    let name = county.name.as_deref().unwrap_or("Unnamed county");
    let painter = ui.painter_at(*rect);
    let galley = painter.layout_no_wrap(
        name.to_string(),
        egui::FontId::proportional(14.0),
        egui::Color32::WHITE,
    );
    let pos = rect.left_top() + Vec2::new(10.0, 10.0);
    painter.rect_filled(
        Rect::from_min_size(pos, galley.size()).expand(4.0),
        4.0,
        egui::Color32::from_black_alpha(160),
    );
    painter.galley(pos, galley, egui::Color32::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::sample_geometry;
    use crate::state::LayerVisibility;

    const A: CountyId = CountyId(0);
    const B: CountyId = CountyId(1);

    /// A covers x < 100, B covers 100..200, nothing beyond.
    fn strip_hit(pos: Pos2) -> Option<CountyId> {
        match pos.x {
            x if (0.0..100.0).contains(&x) => Some(A),
            x if (100.0..200.0).contains(&x) => Some(B),
            _ => None,
        }
    }

    fn button(x: f32, button: egui::PointerButton, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: pos2(x, 50.0),
            button,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn test_drag_then_release_off_map_ends_gesture() {
        let input = [
            button(50.0, egui::PointerButton::Primary, true),
            egui::Event::PointerMoved(pos2(150.0, 50.0)),
            button(500.0, egui::PointerButton::Primary, false),
        ];
        let mut hovered = None;
        let events = translate_pointer_events(&input, strip_hit, &mut hovered);

        assert_eq!(
            events,
            vec![
                MapEvent::PointerEnter { county: A },
                MapEvent::PointerDown {
                    button: MouseButton::Primary,
                    county: A
                },
                MapEvent::PointerEnter { county: B },
                MapEvent::PointerUp,
            ]
        );
        assert_eq!(hovered, None);
    }

    #[test]
    fn test_secondary_release_over_county_is_context_menu() {
        let input = [button(50.0, egui::PointerButton::Secondary, false)];
        let mut hovered = Some(A);
        let events = translate_pointer_events(&input, strip_hit, &mut hovered);
        assert_eq!(
            events,
            vec![MapEvent::ContextMenu { county: A }, MapEvent::PointerUp]
        );
    }

    #[test]
    fn test_events_keep_delivery_order() {
        let input = [
            button(50.0, egui::PointerButton::Secondary, false),
            button(50.0, egui::PointerButton::Primary, true),
        ];
        let mut hovered = Some(A);
        let events = translate_pointer_events(&input, strip_hit, &mut hovered);
        assert_eq!(
            events,
            vec![
                MapEvent::ContextMenu { county: A },
                MapEvent::PointerUp,
                MapEvent::PointerDown {
                    button: MouseButton::Primary,
                    county: A
                },
            ]
        );
    }

    #[test]
    fn test_extra_buttons_erase_and_release() {
        for extra in [egui::PointerButton::Extra1, egui::PointerButton::Extra2] {
            let input = [button(50.0, extra, true), button(50.0, extra, false)];
            let mut hovered = Some(A);
            let events = translate_pointer_events(&input, strip_hit, &mut hovered);
            assert_eq!(
                events,
                vec![
                    MapEvent::PointerDown {
                        button: MouseButton::Other,
                        county: A
                    },
                    MapEvent::PointerUp,
                ]
            );
        }
    }

    #[test]
    fn test_render_canvas_reports_release_outside_map() {
        let ctx = egui::Context::default();
        let geometry = sample_geometry();
        let snapshot = SceneSnapshot {
            county_colors: vec![colors::map::NULL_FILL; geometry.county_count()],
            layers: LayerVisibility::default(),
        };
        let mut state = AppState::default();
        let mut renderer = CanvasRenderer::new();

        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 300.0))),
            events: vec![egui::Event::PointerButton {
                pos: pos2(399.0, 299.0),
                button: egui::PointerButton::Primary,
                pressed: false,
                modifiers: egui::Modifiers::NONE,
            }],
            ..Default::default()
        };

        let mut events = Vec::new();
        let _ = ctx.run(input, |ctx| {
            events.extend(render_canvas(
                ctx,
                &mut state,
                Some((&geometry, &snapshot)),
                &mut renderer,
            ));
        });

        assert!(!events.is_empty());
        assert!(events.iter().all(|e| *e == MapEvent::PointerUp));
        assert_eq!(state.hovered_county, None);
    }

    #[test]
    fn test_viewport_fits_and_centers() {
        let available = Rect::from_min_size(pos2(0.0, 0.0), Vec2::new(2000.0, 600.0));
        let viewport = MapViewport::fit(available, Vec2::new(1000.0, 600.0)).unwrap();
        assert_eq!(viewport.zoom, 1.0);
        assert_eq!(viewport.rect.min, pos2(500.0, 0.0));
        assert_eq!(viewport.screen_to_map(pos2(600.0, 50.0)), pos2(100.0, 50.0));
    }

    #[test]
    fn test_viewport_scales_down() {
        let available = Rect::from_min_size(pos2(0.0, 0.0), Vec2::new(500.0, 600.0));
        let viewport = MapViewport::fit(available, Vec2::new(1000.0, 600.0)).unwrap();
        assert_eq!(viewport.zoom, 0.5);
        assert_eq!(viewport.screen_to_map(pos2(250.0, 300.0)), pos2(500.0, 300.0));
    }

    #[test]
    fn test_viewport_rejects_empty_areas() {
        let empty = Rect::from_min_size(pos2(0.0, 0.0), Vec2::ZERO);
        assert!(MapViewport::fit(empty, Vec2::new(1000.0, 600.0)).is_none());
        let available = Rect::from_min_size(pos2(0.0, 0.0), Vec2::new(100.0, 100.0));
        assert!(MapViewport::fit(available, Vec2::ZERO).is_none());
    }
}
