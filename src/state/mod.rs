//! Application state management.
//!
//! Map interaction state (fills, gesture, layer styles, control panel) is
//! owned by [`MapController`]. The remaining UI-only state lives in
//! [`AppState`].

mod color;
mod controls;
mod layer;
mod paint;
pub mod settings;

pub use color::{parse_color, to_hex};
pub use controls::{MapController, MapEvent};
pub use layer::{LayerVisibility, ToggleLayer};
pub use paint::{FillState, Gesture, MouseButton, PaintMode};
pub use settings::PaintSettings;

use crate::geo::CountyId;

/// UI state outside the map model.
#[derive(Default)]
pub struct AppState {
    /// Status message displayed in the top bar
    pub status_message: String,

    /// Whether the status message reports a failure
    pub status_is_error: bool,

    /// County currently under the pointer
    pub hovered_county: Option<CountyId>,

    /// Contents of the export scale field
    pub scale_input: String,
}

impl AppState {
    pub fn new(settings: &PaintSettings) -> Self {
        Self {
            status_message: "Loading map data...".to_string(),
            status_is_error: false,
            hovered_county: None,
            scale_input: settings.export_scale.clone(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_is_error = true;
    }
}
