//! Application settings.
//!
//! Settings are read once at startup from `ewx-paint.json` in the working
//! directory. Every field has a default, so the file may be partial or absent.

use crate::geo::GeoLayerType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Canvas margins around the projected geography, in map pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 0.0,
            right: 52.0,
            bottom: 20.0,
            left: 0.0,
        }
    }
}

/// Map canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapLayout {
    /// Full canvas width, margins included
    pub width: f32,
    /// Full canvas height, margins included
    pub height: f32,
    pub margin: Margins,
}

impl Default for MapLayout {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            margin: Margins::default(),
        }
    }
}

impl MapLayout {
    /// Size of the box the geography is fit into.
    pub fn inner_size(&self) -> (f32, f32) {
        (
            (self.width - self.margin.left - self.margin.right).max(0.0),
            (self.height - self.margin.top - self.margin.bottom).max(0.0),
        )
    }
}

/// Initial checkbox states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleDefaults {
    pub interstates: bool,
    pub shadow: bool,
    pub rivers: bool,
    pub major_cities: bool,
    pub minor_cities: bool,
}

impl Default for ToggleDefaults {
    fn default() -> Self {
        Self {
            interstates: true,
            shadow: true,
            rivers: true,
            major_cities: true,
            minor_cities: true,
        }
    }
}

/// All user-adjustable settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintSettings {
    /// Directory holding the GeoJSON files
    pub data_dir: PathBuf,
    pub counties_file: String,
    pub interstates_file: String,
    pub rivers_file: String,
    pub cities_file: String,
    pub layout: MapLayout,
    pub toggles: ToggleDefaults,
    /// Initial paint color as a hex or rgb() string
    pub paint_color: String,
    /// Initial contents of the export scale field
    pub export_scale: String,
    pub export_dir: PathBuf,
    pub export_file_name: String,
}

impl Default for PaintSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("geojson"),
            counties_file: "counties_ewx.geojson".to_string(),
            interstates_file: "interstates_ewx.geojson".to_string(),
            rivers_file: "rivers_major_ewx.geojson".to_string(),
            cities_file: "cities.geojson".to_string(),
            layout: MapLayout::default(),
            toggles: ToggleDefaults::default(),
            paint_color: "#d62728".to_string(),
            export_scale: "100".to_string(),
            export_dir: PathBuf::from("."),
            export_file_name: "EWX_Paint.png".to_string(),
        }
    }
}

impl PaintSettings {
    /// Settings file looked up in the working directory.
    pub const FILE_NAME: &'static str = "ewx-paint.json";

    /// Load settings from the working directory.
    pub fn load() -> Self {
        Self::load_from(Path::new(Self::FILE_NAME))
    }

    /// Load settings from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Failed to read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Failed to parse settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Path of the GeoJSON file backing a layer.
    pub fn layer_path(&self, layer_type: GeoLayerType) -> PathBuf {
        let file = match layer_type {
            GeoLayerType::Counties => &self.counties_file,
            GeoLayerType::Interstates => &self.interstates_file,
            GeoLayerType::Rivers => &self.rivers_file,
            GeoLayerType::Cities => &self.cities_file,
        };
        self.data_dir.join(file)
    }

    /// Fixed destination of exported images.
    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(&self.export_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PaintSettings::load_from(&dir.path().join("absent.json"));
        assert_eq!(settings, PaintSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{"paint_color": "#00ff00", "toggles": {{"rivers": false}}, "layout": {{"width": 800}}}}"##
        )
        .unwrap();

        let settings = PaintSettings::load_from(file.path());
        assert_eq!(settings.paint_color, "#00ff00");
        assert!(!settings.toggles.rivers);
        assert!(settings.toggles.interstates);
        assert_eq!(settings.layout.width, 800.0);
        assert_eq!(settings.layout.height, 600.0);
        assert_eq!(settings.export_file_name, "EWX_Paint.png");
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ paint_color: ").unwrap();
        assert_eq!(PaintSettings::load_from(file.path()), PaintSettings::default());
    }

    #[test]
    fn test_paths() {
        let settings = PaintSettings::default();
        assert_eq!(
            settings.layer_path(GeoLayerType::Rivers),
            PathBuf::from("geojson").join("rivers_major_ewx.geojson")
        );
        assert_eq!(settings.export_path(), PathBuf::from(".").join("EWX_Paint.png"));
        assert_eq!(settings.layout.inner_size(), (948.0, 580.0));
    }
}
