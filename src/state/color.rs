//! Paint color parsing.

use eframe::egui::Color32;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("empty color value")]
    Empty,
    #[error("invalid hex color {0:?}")]
    InvalidHex(String),
    #[error("invalid rgb() color {0:?}")]
    InvalidRgb(String),
    #[error("unsupported color format {0:?}")]
    Unsupported(String),
}

/// Parses a color picker value: `#rgb`, `#rrggbb` or `rgb(r, g, b)`.
pub fn parse_color(value: &str) -> Result<Color32, ColorParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ColorParseError::Empty);
    }

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(value.to_string()));
    }

    let lower = value.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args).ok_or_else(|| ColorParseError::InvalidRgb(value.to_string()));
    }

    Err(ColorParseError::Unsupported(value.to_string()))
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(Color32::from_rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Color32> {
    let channels: Vec<u8> = args
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect::<Option<_>>()?;
    match channels[..] {
        [r, g, b] => Some(Color32::from_rgb(r, g, b)),
        _ => None,
    }
}

/// Formats a color as `#rrggbb`, the color picker's value format.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
