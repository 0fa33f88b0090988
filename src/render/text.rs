//! Label text rasterization.
//!
//! tiny-skia has no text support, so glyphs are rasterized with rusttype and
//! blended into the pixmap by hand. The font is the proportional face bundled
//! with egui, which keeps exported labels identical on every machine.

use eframe::egui::{Color32, FontDefinitions, FontFamily};
use rusttype::{point, Font, Scale};
use std::sync::OnceLock;
use tiny_skia::Pixmap;

/// Label font size in map pixels at scale 1.
pub const LABEL_SIZE: f32 = 14.0;

/// Bundled proportional font, loaded once.
pub fn label_font() -> Option<&'static Font<'static>> {
    static FONT: OnceLock<Option<Font<'static>>> = OnceLock::new();
    FONT.get_or_init(|| {
        let fonts = FontDefinitions::default();
        let font = fonts
            .families
            .get(&FontFamily::Proportional)
            .into_iter()
            .flatten()
            .filter_map(|name| fonts.font_data.get(name))
            .find_map(|data| Font::try_from_vec(data.font.to_vec()));
        if font.is_none() {
            log::warn!("No bundled proportional font; city labels will not be drawn");
        }
        font
    })
    .as_ref()
}

/// Draws `text` with its baseline starting at (`x`, `y`) in pixmap pixels.
pub fn draw_text(
    pixmap: &mut Pixmap,
    font: &Font<'_>,
    text: &str,
    (x, y): (f32, f32),
    size: f32,
    color: Color32,
    alpha: f32,
) {
    if alpha <= 0.0 || text.is_empty() {
        return;
    }

    let width = pixmap.width() as i32;
    let height = pixmap.height() as i32;
    let scale = Scale::uniform(size);
    let data = pixmap.data_mut();

    for glyph in font.layout(text, scale, point(x, y)) {
        let Some(bounding_box) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = gx as i32 + bounding_box.min.x;
            let py = gy as i32 + bounding_box.min.y;
            if px < 0 || px >= width || py < 0 || py >= height {
                return;
            }
            let idx = ((py * width + px) * 4) as usize;
            blend_over(&mut data[idx..idx + 4], color, coverage * alpha);
        });
    }
}

/// Source-over blend of an opaque color at `alpha` onto a premultiplied pixel.
fn blend_over(pixel: &mut [u8], color: Color32, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    let src = [color.r(), color.g(), color.b(), 255];
    for (dst, src) in pixel.iter_mut().zip(src) {
        *dst = (src as f32 * alpha + *dst as f32 * inv).round().min(255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_over_transparent_and_opaque() {
        let mut pixel = [0u8, 0, 0, 0];
        blend_over(&mut pixel, Color32::from_rgb(200, 100, 50), 1.0);
        assert_eq!(pixel, [200, 100, 50, 255]);

        let mut pixel = [0u8, 0, 0, 0];
        blend_over(&mut pixel, Color32::from_rgb(200, 100, 50), 0.5);
        assert_eq!(pixel, [100, 50, 25, 128]);

        let mut pixel = [10u8, 20, 30, 255];
        blend_over(&mut pixel, Color32::WHITE, 0.0);
        assert_eq!(pixel, [10, 20, 30, 255]);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let Some(font) = label_font() else {
            return;
        };
        let mut pixmap = Pixmap::new(120, 40).unwrap();
        draw_text(&mut pixmap, font, "Austin", (5.0, 25.0), LABEL_SIZE, Color32::WHITE, 1.0);
        assert!(pixmap.data().chunks(4).any(|px| px[3] > 0));
    }

    #[test]
    fn test_draw_text_with_zero_alpha_draws_nothing() {
        let Some(font) = label_font() else {
            return;
        };
        let mut pixmap = Pixmap::new(120, 40).unwrap();
        draw_text(&mut pixmap, font, "Austin", (5.0, 25.0), LABEL_SIZE, Color32::WHITE, 0.0);
        assert!(pixmap.data().iter().all(|b| *b == 0));
    }
}
