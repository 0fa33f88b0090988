//! UI modules for the EWX Paint application.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, status, and hovered county
//! - Central canvas: The county map
//! - Right panel: Paint color, layer toggles, and export

mod canvas;
pub mod colors;
mod right_panel;
mod top_bar;

pub use canvas::{render_canvas, CanvasRenderer};
pub use right_panel::render_right_panel;
pub use top_bar::render_top_bar;
