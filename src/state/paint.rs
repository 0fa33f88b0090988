//! County painting state machine.
//!
//! A gesture starts with a button press on a county and lasts until any
//! button release. The pressed button fixes the gesture's mode: the primary
//! button fills, every other button erases. Counties entered during the
//! gesture receive the same action. A context-menu request on a county
//! always erases it and ends the gesture.

use crate::geo::CountyId;
use crate::ui::colors;
use eframe::egui::Color32;
use std::time::Duration;
use web_time::Instant;

/// Duration of the color transition after a fill or erase.
pub const FILL_TRANSITION: Duration = Duration::from_millis(100);

/// Pointer button that started a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Other,
}

/// What a gesture does to the counties it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    Fill,
    Erase,
}

impl PaintMode {
    pub fn for_button(button: MouseButton) -> Self {
        match button {
            MouseButton::Primary => PaintMode::Fill,
            MouseButton::Secondary | MouseButton::Other => PaintMode::Erase,
        }
    }
}

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Painting(PaintMode),
}

/// Persistent fill of one county.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillState {
    #[default]
    Unpainted,
    Painted(Color32),
}

impl FillState {
    pub fn is_painted(&self) -> bool {
        matches!(self, FillState::Painted(_))
    }

    /// Color the county settles on.
    pub fn color(&self) -> Color32 {
        match self {
            FillState::Unpainted => colors::map::NULL_FILL,
            FillState::Painted(color) => *color,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FillTransition {
    from: Color32,
    to: Color32,
    started: Instant,
}

impl FillTransition {
    fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / FILL_TRANSITION.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn color_at(&self, now: Instant) -> Color32 {
        lerp_color(self.from, self.to, self.progress(now))
    }
}

fn lerp_color(from: Color32, to: Color32, t: f32) -> Color32 {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        mix(from.r(), to.r()),
        mix(from.g(), to.g()),
        mix(from.b(), to.b()),
        mix(from.a(), to.a()),
    )
}

/// Fill state of every county plus the active gesture.
///
/// Per-county data lives in vectors indexed by `CountyId`.
#[derive(Debug, Clone)]
pub struct PaintState {
    fills: Vec<FillState>,
    transitions: Vec<Option<FillTransition>>,
    gesture: Gesture,
    paint_color: Color32,
}

impl PaintState {
    pub fn new(county_count: usize, paint_color: Color32) -> Self {
        Self {
            fills: vec![FillState::Unpainted; county_count],
            transitions: vec![None; county_count],
            gesture: Gesture::Idle,
            paint_color,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn paint_color(&self) -> Color32 {
        self.paint_color
    }

    /// Changes the color used by subsequent fills. Already painted counties
    /// keep their color.
    pub fn set_paint_color(&mut self, color: Color32) {
        self.paint_color = color;
    }

    pub fn county_count(&self) -> usize {
        self.fills.len()
    }

    pub fn fill_state(&self, county: CountyId) -> Option<FillState> {
        self.fills.get(county.0).copied()
    }

    pub fn painted_count(&self) -> usize {
        self.fills.iter().filter(|f| f.is_painted()).count()
    }

    /// Starts a gesture and applies its action to the pressed county.
    pub fn pointer_down(&mut self, button: MouseButton, county: CountyId, now: Instant) {
        let mode = PaintMode::for_button(button);
        log::debug!("Gesture start: {:?} on county {}", mode, county.0);
        self.gesture = Gesture::Painting(mode);
        self.apply(mode, county, now);
    }

    /// Applies the active gesture's action to an entered county.
    pub fn pointer_enter(&mut self, county: CountyId, now: Instant) {
        if let Gesture::Painting(mode) = self.gesture {
            self.apply(mode, county, now);
        }
    }

    /// Ends the gesture. Harmless when no gesture is active.
    pub fn pointer_up(&mut self) {
        if self.gesture != Gesture::Idle {
            log::debug!("Gesture end");
        }
        self.gesture = Gesture::Idle;
    }

    /// Erases the county and cancels any gesture, whatever its mode.
    pub fn context_menu(&mut self, county: CountyId, now: Instant) {
        self.apply(PaintMode::Erase, county, now);
        self.gesture = Gesture::Idle;
    }

    fn apply(&mut self, mode: PaintMode, county: CountyId, now: Instant) {
        let from = self.display_color(county, now);
        let Some(fill) = self.fills.get_mut(county.0) else {
            log::warn!("Ignoring paint action on unknown county {}", county.0);
            return;
        };

        *fill = match mode {
            PaintMode::Fill => FillState::Painted(self.paint_color),
            PaintMode::Erase => FillState::Unpainted,
        };
        let to = fill.color();

        self.transitions[county.0] = Some(FillTransition {
            from,
            to,
            started: now,
        });
    }

    /// Color a county is displayed with at `now`, mid-transition included.
    pub fn display_color(&self, county: CountyId, now: Instant) -> Color32 {
        match self.transitions.get(county.0).copied().flatten() {
            Some(transition) => transition.color_at(now),
            None => self
                .fill_state(county)
                .unwrap_or_default()
                .color(),
        }
    }

    /// Displayed colors of all counties.
    pub fn display_colors(&self, now: Instant) -> Vec<Color32> {
        (0..self.fills.len())
            .map(|idx| self.display_color(CountyId(idx), now))
            .collect()
    }

    /// True while any transition is still running.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.transitions
            .iter()
            .flatten()
            .any(|t| t.progress(now) < 1.0)
    }
}
