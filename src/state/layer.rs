//! Layer visibility state.

use crate::geo::CityClass;
use crate::state::settings::ToggleDefaults;

/// Layers (or feature classes) with a toggle in the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleLayer {
    Interstate,
    Shadow,
    River,
    CityMajor,
    CityMinor,
}

impl ToggleLayer {
    pub fn label(&self) -> &'static str {
        match self {
            ToggleLayer::Interstate => "Interstates",
            ToggleLayer::Shadow => "Drop shadow",
            ToggleLayer::River => "Rivers",
            ToggleLayer::CityMajor => "Major cities",
            ToggleLayer::CityMinor => "Minor cities",
        }
    }

    pub fn all() -> &'static [ToggleLayer] {
        &[
            ToggleLayer::Interstate,
            ToggleLayer::Shadow,
            ToggleLayer::River,
            ToggleLayer::CityMajor,
            ToggleLayer::CityMinor,
        ]
    }

    /// Shadow and river toggles fade the layer; the others hide it.
    fn toggles_opacity(&self) -> bool {
        matches!(self, ToggleLayer::Shadow | ToggleLayer::River)
    }

    pub fn for_city(class: CityClass) -> Self {
        match class {
            CityClass::Major => ToggleLayer::CityMajor,
            CityClass::Minor => ToggleLayer::CityMinor,
        }
    }
}

/// Visibility and opacity of one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub visible: bool,
    pub opacity: f32,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
        }
    }
}

impl LayerStyle {
    /// Alpha multiplier the layer is drawn with.
    pub fn alpha(&self) -> f32 {
        if self.visible {
            self.opacity.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_shown(&self) -> bool {
        self.alpha() > 0.0
    }
}

/// Style of every toggleable layer.
///
/// Hidden layers keep their geometry; only the style changes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerVisibility {
    pub interstate: LayerStyle,
    pub shadow: LayerStyle,
    pub river: LayerStyle,
    pub city_major: LayerStyle,
    pub city_minor: LayerStyle,
}

impl LayerVisibility {
    pub fn from_toggles(toggles: &ToggleDefaults) -> Self {
        let mut layers = Self::default();
        layers.apply_toggle(ToggleLayer::Interstate, toggles.interstates);
        layers.apply_toggle(ToggleLayer::Shadow, toggles.shadow);
        layers.apply_toggle(ToggleLayer::River, toggles.rivers);
        layers.apply_toggle(ToggleLayer::CityMajor, toggles.major_cities);
        layers.apply_toggle(ToggleLayer::CityMinor, toggles.major_cities && toggles.minor_cities);
        layers
    }

    pub fn style(&self, layer: ToggleLayer) -> LayerStyle {
        match layer {
            ToggleLayer::Interstate => self.interstate,
            ToggleLayer::Shadow => self.shadow,
            ToggleLayer::River => self.river,
            ToggleLayer::CityMajor => self.city_major,
            ToggleLayer::CityMinor => self.city_minor,
        }
    }

    fn style_mut(&mut self, layer: ToggleLayer) -> &mut LayerStyle {
        match layer {
            ToggleLayer::Interstate => &mut self.interstate,
            ToggleLayer::Shadow => &mut self.shadow,
            ToggleLayer::River => &mut self.river,
            ToggleLayer::CityMajor => &mut self.city_major,
            ToggleLayer::CityMinor => &mut self.city_minor,
        }
    }

    pub fn set_visible(&mut self, layer: ToggleLayer, visible: bool) {
        self.style_mut(layer).visible = visible;
    }

    pub fn set_opacity(&mut self, layer: ToggleLayer, opacity: f32) {
        self.style_mut(layer).opacity = opacity;
    }

    /// Applies a checkbox value the way the layer's toggle is wired:
    /// opacity 1/0 for shadow and rivers, visibility for the rest.
    pub fn apply_toggle(&mut self, layer: ToggleLayer, value: bool) {
        if layer.toggles_opacity() {
            self.set_opacity(layer, if value { 1.0 } else { 0.0 });
        } else {
            self.set_visible(layer, value);
        }
    }

    /// Style of a city class; markers and labels share it.
    pub fn city(&self, class: CityClass) -> LayerStyle {
        self.style(ToggleLayer::for_city(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_river_toggle_changes_opacity_only() {
        let mut layers = LayerVisibility::default();
        layers.apply_toggle(ToggleLayer::River, false);

        assert_eq!(layers.river.opacity, 0.0);
        assert!(layers.river.visible);
        assert!(!layers.river.is_shown());
        assert_eq!(layers.interstate, LayerStyle::default());
    }

    #[test]
    fn test_interstate_toggle_changes_visibility_only() {
        let mut layers = LayerVisibility::default();
        layers.apply_toggle(ToggleLayer::Interstate, false);

        assert!(!layers.interstate.visible);
        assert_eq!(layers.interstate.opacity, 1.0);
        assert_eq!(layers.interstate.alpha(), 0.0);

        layers.apply_toggle(ToggleLayer::Interstate, true);
        assert_eq!(layers.interstate, LayerStyle::default());
    }

    #[test]
    fn test_initial_minor_hidden_when_major_hidden() {
        let toggles = ToggleDefaults {
            major_cities: false,
            minor_cities: true,
            ..Default::default()
        };
        let layers = LayerVisibility::from_toggles(&toggles);
        assert!(!layers.city(CityClass::Major).is_shown());
        assert!(!layers.city(CityClass::Minor).is_shown());
    }
}
