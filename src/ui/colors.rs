//! Centralized color constants.
//!
//! This module provides consistent colors across the panels and the map.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for secondary text.
    pub const LABEL: Color32 = Color32::from_rgb(140, 140, 150);
    /// Failure indicator.
    pub const ERROR: Color32 = Color32::from_rgb(255, 90, 90);
}

/// Colors of the rendered map.
pub mod map {
    use super::Color32;

    /// Fill of unpainted counties.
    pub const NULL_FILL: Color32 = Color32::from_rgb(0x47, 0x47, 0x49);
    /// Paint color used when the configured one is invalid.
    pub const DEFAULT_PAINT: Color32 = Color32::from_rgb(0xd6, 0x27, 0x28);
    /// County borders.
    pub const COUNTY_STROKE: Color32 = Color32::from_rgb(230, 230, 235);
    pub const RIVER: Color32 = Color32::from_rgb(70, 140, 220);
    pub const INTERSTATE: Color32 = Color32::from_rgb(225, 185, 60);
    pub const CITY_FILL: Color32 = Color32::from_rgb(250, 250, 250);
    pub const CITY_STROKE: Color32 = Color32::from_rgb(20, 20, 25);
    pub const CITY_LABEL: Color32 = Color32::from_rgb(245, 245, 245);
    /// Drop shadow flood color (black at 0.9 opacity).
    pub const SHADOW: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 230);
    /// Canvas behind the map in the window; never exported.
    pub const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(32, 33, 38);
}
