//! Control panel model and the single event dispatcher.
//!
//! Every user interaction reaches the map as a [`MapEvent`]. The
//! [`MapController`] owns all mutable map state and is the only place it
//! changes, so the whole interaction model can be driven without a UI.

use super::color::{parse_color, to_hex};
use super::layer::{LayerVisibility, ToggleLayer};
use super::paint::{MouseButton, PaintState};
use super::settings::PaintSettings;
use crate::export::{resolve_scale, ExportRequest};
use crate::geo::CountyId;
use crate::render::SceneSnapshot;
use crate::ui::colors;
use web_time::Instant;

/// One user interaction with the map or the control panel.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    PointerDown { button: MouseButton, county: CountyId },
    PointerEnter { county: CountyId },
    PointerUp,
    ContextMenu { county: CountyId },
    ToggleChanged { layer: ToggleLayer, value: bool },
    ColorChanged { value: String },
    ExportRequested { scale_input: String },
}

/// A checkbox as the control panel shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkbox {
    pub checked: bool,
    pub enabled: bool,
}

impl Checkbox {
    fn new(checked: bool) -> Self {
        Self {
            checked,
            enabled: true,
        }
    }
}

/// Checked/enabled state of every control.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    /// Last accepted color picker value
    pub color: String,
    pub interstate: Checkbox,
    pub shadow: Checkbox,
    pub river: Checkbox,
    pub major_cities: Checkbox,
    pub minor_cities: Checkbox,
}

impl ControlPanel {
    pub fn from_settings(settings: &PaintSettings) -> Self {
        let toggles = &settings.toggles;
        let mut panel = Self {
            color: settings.paint_color.clone(),
            interstate: Checkbox::new(toggles.interstates),
            shadow: Checkbox::new(toggles.shadow),
            river: Checkbox::new(toggles.rivers),
            major_cities: Checkbox::new(toggles.major_cities),
            minor_cities: Checkbox::new(toggles.minor_cities),
        };
        if !toggles.major_cities {
            panel.minor_cities = Checkbox {
                checked: false,
                enabled: false,
            };
        }
        panel
    }

    pub fn checkbox(&self, layer: ToggleLayer) -> Checkbox {
        match layer {
            ToggleLayer::Interstate => self.interstate,
            ToggleLayer::Shadow => self.shadow,
            ToggleLayer::River => self.river,
            ToggleLayer::CityMajor => self.major_cities,
            ToggleLayer::CityMinor => self.minor_cities,
        }
    }

    fn checkbox_mut(&mut self, layer: ToggleLayer) -> &mut Checkbox {
        match layer {
            ToggleLayer::Interstate => &mut self.interstate,
            ToggleLayer::Shadow => &mut self.shadow,
            ToggleLayer::River => &mut self.river,
            ToggleLayer::CityMajor => &mut self.major_cities,
            ToggleLayer::CityMinor => &mut self.minor_cities,
        }
    }
}

/// Owner of all interactive map state.
#[derive(Debug, Clone)]
pub struct MapController {
    paint: PaintState,
    layers: LayerVisibility,
    controls: ControlPanel,
}

impl MapController {
    pub fn new(county_count: usize, settings: &PaintSettings) -> Self {
        let paint_color = parse_color(&settings.paint_color).unwrap_or_else(|e| {
            log::warn!("Invalid paint color in settings: {}", e);
            colors::map::DEFAULT_PAINT
        });
        let mut controls = ControlPanel::from_settings(settings);
        controls.color = to_hex(paint_color);

        Self {
            paint: PaintState::new(county_count, paint_color),
            layers: LayerVisibility::from_toggles(&settings.toggles),
            controls,
        }
    }

    pub fn paint(&self) -> &PaintState {
        &self.paint
    }

    #[cfg(test)]
    pub fn layers(&self) -> &LayerVisibility {
        &self.layers
    }

    pub fn controls(&self) -> &ControlPanel {
        &self.controls
    }

    /// Applies one event. Returns an export request when the event asks for
    /// one; the request carries the scene as it is visible right now.
    pub fn dispatch(&mut self, event: MapEvent, now: Instant) -> Option<ExportRequest> {
        match event {
            MapEvent::PointerDown { button, county } => {
                self.paint.pointer_down(button, county, now);
            }
            MapEvent::PointerEnter { county } => {
                self.paint.pointer_enter(county, now);
            }
            MapEvent::PointerUp => {
                self.paint.pointer_up();
            }
            MapEvent::ContextMenu { county } => {
                self.paint.context_menu(county, now);
            }
            MapEvent::ToggleChanged { layer, value } => {
                self.toggle(layer, value);
            }
            MapEvent::ColorChanged { value } => match parse_color(&value) {
                Ok(color) => {
                    self.paint.set_paint_color(color);
                    self.controls.color = value;
                }
                Err(e) => log::warn!("Ignoring color change: {}", e),
            },
            MapEvent::ExportRequested { scale_input } => {
                let scale_percent = resolve_scale(&scale_input);
                log::info!("Export requested at {}% scale", scale_percent);
                return Some(ExportRequest {
                    scale_percent,
                    snapshot: self.snapshot(now),
                });
            }
        }
        None
    }

    fn toggle(&mut self, layer: ToggleLayer, value: bool) {
        let checkbox = self.controls.checkbox_mut(layer);
        if !checkbox.enabled {
            log::debug!("Ignoring toggle of disabled {:?}", layer);
            return;
        }
        checkbox.checked = value;
        self.layers.apply_toggle(layer, value);

        if layer == ToggleLayer::CityMajor {
            if value {
                // Re-enabled but not re-checked; visibility follows the box.
                self.controls.minor_cities.enabled = true;
            } else {
                self.controls.minor_cities = Checkbox {
                    checked: false,
                    enabled: false,
                };
            }
            let minor = self.controls.minor_cities.checked;
            self.layers.apply_toggle(ToggleLayer::CityMinor, minor);
        }
    }

    /// Captures everything the renderer needs at `now`.
    pub fn snapshot(&self, now: Instant) -> SceneSnapshot {
        SceneSnapshot {
            county_colors: self.paint.display_colors(now),
            layers: self.layers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::CityClass;
    use crate::state::{FillState, Gesture};
    use eframe::egui::Color32;

    const A: CountyId = CountyId(0);
    const B: CountyId = CountyId(1);

    fn controller() -> MapController {
        let settings = PaintSettings {
            paint_color: "#ff0000".to_string(),
            ..Default::default()
        };
        MapController::new(3, &settings)
    }

    fn toggle(layer: ToggleLayer, value: bool) -> MapEvent {
        MapEvent::ToggleChanged { layer, value }
    }

    #[test]
    fn test_paint_scenario() {
        let now = Instant::now();
        let mut map = controller();

        map.dispatch(
            MapEvent::PointerDown {
                button: MouseButton::Primary,
                county: A,
            },
            now,
        );
        map.dispatch(MapEvent::PointerEnter { county: B }, now);
        map.dispatch(MapEvent::PointerUp, now);

        let red = Color32::from_rgb(255, 0, 0);
        assert_eq!(map.paint().fill_state(A), Some(FillState::Painted(red)));
        assert_eq!(map.paint().fill_state(B), Some(FillState::Painted(red)));
        assert_eq!(map.paint().gesture(), Gesture::Idle);

        map.dispatch(
            MapEvent::PointerDown {
                button: MouseButton::Secondary,
                county: A,
            },
            now,
        );
        assert_eq!(map.paint().fill_state(A), Some(FillState::Unpainted));
    }

    #[test]
    fn test_color_change_has_no_immediate_visual_effect() {
        let now = Instant::now();
        let mut map = controller();
        let before = map.snapshot(now);

        map.dispatch(
            MapEvent::ColorChanged {
                value: "#00ff00".to_string(),
            },
            now,
        );

        assert_eq!(map.snapshot(now), before);
        assert_eq!(map.paint().paint_color(), Color32::from_rgb(0, 255, 0));
        assert_eq!(map.controls().color, "#00ff00");
    }

    #[test]
    fn test_invalid_color_keeps_previous() {
        let now = Instant::now();
        let mut map = controller();
        map.dispatch(
            MapEvent::ColorChanged {
                value: "bogus".to_string(),
            },
            now,
        );
        assert_eq!(map.paint().paint_color(), Color32::from_rgb(255, 0, 0));
        assert_eq!(map.controls().color, "#ff0000");
    }

    #[test]
    fn test_river_toggle_leaves_interstate_alone() {
        let now = Instant::now();
        let mut map = controller();
        map.dispatch(toggle(ToggleLayer::River, false), now);

        assert_eq!(map.layers().river.opacity, 0.0);
        assert!(map.layers().interstate.is_shown());
        assert!(!map.controls().river.checked);
        assert!(map.controls().interstate.checked);
    }

    #[test]
    fn test_shadow_toggle_sets_opacity() {
        let now = Instant::now();
        let mut map = controller();
        map.dispatch(toggle(ToggleLayer::Shadow, false), now);
        assert_eq!(map.layers().shadow.opacity, 0.0);
        map.dispatch(toggle(ToggleLayer::Shadow, true), now);
        assert_eq!(map.layers().shadow.opacity, 1.0);
    }

    #[test]
    fn test_major_off_forces_minor_off_and_disabled() {
        let now = Instant::now();
        let mut map = controller();
        assert!(map.layers().city(CityClass::Minor).is_shown());

        map.dispatch(toggle(ToggleLayer::CityMajor, false), now);

        assert!(!map.layers().city(CityClass::Major).is_shown());
        assert!(!map.layers().city(CityClass::Minor).is_shown());
        assert_eq!(
            map.controls().minor_cities,
            Checkbox {
                checked: false,
                enabled: false
            }
        );

        // Clicking a disabled minor checkbox is a no-op
        map.dispatch(toggle(ToggleLayer::CityMinor, true), now);
        assert!(!map.layers().city(CityClass::Minor).is_shown());
        assert!(!map.controls().minor_cities.checked);
    }

    #[test]
    fn test_major_on_reenables_without_rechecking_minor() {
        let now = Instant::now();
        let mut map = controller();
        map.dispatch(toggle(ToggleLayer::CityMajor, false), now);
        map.dispatch(toggle(ToggleLayer::CityMajor, true), now);

        assert!(map.layers().city(CityClass::Major).is_shown());
        assert_eq!(
            map.controls().minor_cities,
            Checkbox {
                checked: false,
                enabled: true
            }
        );
        assert!(!map.layers().city(CityClass::Minor).is_shown());

        map.dispatch(toggle(ToggleLayer::CityMinor, true), now);
        assert!(map.layers().city(CityClass::Minor).is_shown());
    }

    #[test]
    fn test_export_request_resolves_scale_and_snapshots() {
        let now = Instant::now();
        let mut map = controller();
        map.dispatch(
            MapEvent::PointerDown {
                button: MouseButton::Primary,
                county: A,
            },
            now,
        );

        for (input, expected) in [("", 100), ("10", 25), ("500", 300), ("abc", 100), ("150", 150)] {
            let request = map
                .dispatch(
                    MapEvent::ExportRequested {
                        scale_input: input.to_string(),
                    },
                    now,
                )
                .unwrap();
            assert_eq!(request.scale_percent, expected, "input {:?}", input);
            assert_eq!(request.snapshot, map.snapshot(now));
        }

        // Exporting does not end the gesture or touch fills
        assert_ne!(map.paint().gesture(), Gesture::Idle);
        assert!(map.paint().fill_state(A).unwrap().is_painted());
    }

    #[test]
    fn test_non_export_events_return_nothing() {
        let now = Instant::now();
        let mut map = controller();
        assert!(map.dispatch(MapEvent::PointerUp, now).is_none());
        assert!(map
            .dispatch(toggle(ToggleLayer::Interstate, false), now)
            .is_none());
    }
}
