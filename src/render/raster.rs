//! Scene rasterization with tiny-skia.
//!
//! The same rasterizer produces the on-screen texture and the exported image,
//! so an export shows exactly what the window shows. Layers are drawn in
//! [`DrawLayer::ORDER`] onto a transparent pixmap.

use super::scene::{DrawLayer, SceneGeometry, SceneSnapshot};
use super::text::{draw_text, label_font, LABEL_SIZE};
use crate::geo::CityClass;
use crate::ui::colors;
use eframe::egui::{Color32, Pos2};
use thiserror::Error;
use tiny_skia::{
    Color, FillRule, FilterQuality, IntSize, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};

/// Drop shadow offset in map pixels.
const SHADOW_OFFSET: (f32, f32) = (10.0, 10.0);
/// Drop shadow blur standard deviation in map pixels.
const SHADOW_BLUR: f32 = 3.0;
/// The shadow is blurred at scales rounded to this step and stretched to fit,
/// so resizing the window does not re-blur every frame.
const SHADOW_SCALE_STEP: f32 = 0.125;

const COUNTY_STROKE_WIDTH: f32 = 0.5;
const RIVER_WIDTH: f32 = 1.5;
const INTERSTATE_WIDTH: f32 = 1.5;
const CITY_STROKE_WIDTH: f32 = 1.5;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot rasterize a {width}x{height} canvas")]
    EmptyCanvas { width: u32, height: u32 },
}

/// Output pixel size of the scene at `scale`.
pub fn output_size(geometry: &SceneGeometry, scale: f32) -> (u32, u32) {
    (
        (geometry.size.x * scale).round().max(0.0) as u32,
        (geometry.size.y * scale).round().max(0.0) as u32,
    )
}

fn skia_color(color: Color32, alpha: f32) -> Color {
    let a = (color.a() as f32 * alpha.clamp(0.0, 1.0)).round() as u8;
    Color::from_rgba8(color.r(), color.g(), color.b(), a)
}

fn paint_for(color: Color32, alpha: f32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color, alpha));
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        ..Default::default()
    }
}

/// Builds one path from several rings. `close` closes each ring.
fn rings_path(rings: &[Vec<Pos2>], close: bool) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for ring in rings {
        let Some((first, rest)) = ring.split_first() else {
            continue;
        };
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
        if close {
            pb.close();
        }
    }
    pb.finish()
}

fn shadow_scale(scale: f32) -> f32 {
    ((scale / SHADOW_SCALE_STEP).round() * SHADOW_SCALE_STEP).max(SHADOW_SCALE_STEP)
}

/// Rasterizes scenes, caching the blurred drop shadow per quantized scale.
#[derive(Default)]
pub struct SceneRasterizer {
    shadow_cache: Option<(u32, Pixmap)>,
}

impl SceneRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the whole layer stack at `scale` (1.0 = one pixel per map unit).
    pub fn render(
        &mut self,
        geometry: &SceneGeometry,
        snapshot: &SceneSnapshot,
        scale: f32,
    ) -> Result<Pixmap, RasterError> {
        let (width, height) = output_size(geometry, scale);
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RasterError::EmptyCanvas { width, height })?;
        let transform = Transform::from_scale(scale, scale);

        for layer in DrawLayer::ORDER {
            match layer {
                DrawLayer::Shadow => self.draw_shadow(&mut pixmap, geometry, snapshot, scale),
                DrawLayer::Geography => draw_counties(&mut pixmap, geometry, snapshot, transform),
                DrawLayer::Rivers => draw_lines(
                    &mut pixmap,
                    &geometry.rivers,
                    colors::map::RIVER,
                    snapshot.layers.river.alpha(),
                    RIVER_WIDTH,
                    transform,
                ),
                DrawLayer::Interstates => draw_lines(
                    &mut pixmap,
                    &geometry.interstates,
                    colors::map::INTERSTATE,
                    snapshot.layers.interstate.alpha(),
                    INTERSTATE_WIDTH,
                    transform,
                ),
                DrawLayer::CityMarkers => draw_markers(&mut pixmap, geometry, snapshot, transform),
                DrawLayer::CityLabels => draw_labels(&mut pixmap, geometry, snapshot, scale),
            }
        }

        Ok(pixmap)
    }

    fn draw_shadow(
        &mut self,
        pixmap: &mut Pixmap,
        geometry: &SceneGeometry,
        snapshot: &SceneSnapshot,
        scale: f32,
    ) {
        let alpha = snapshot.layers.shadow.alpha();
        if alpha <= 0.0 {
            return;
        }

        let shadow_scale = shadow_scale(scale);
        let key = shadow_scale.to_bits();
        let cached = matches!(&self.shadow_cache, Some((k, _)) if *k == key);
        if !cached {
            let (width, height) = output_size(geometry, shadow_scale);
            let Some(shadow) = render_shadow(geometry, width, height, shadow_scale) else {
                return;
            };
            log::debug!("Blurred drop shadow at {width}x{height}");
            self.shadow_cache = Some((key, shadow));
        }

        if let Some((_, shadow)) = &self.shadow_cache {
            let stretch = scale / shadow_scale;
            let paint = PixmapPaint {
                opacity: alpha,
                quality: if stretch == 1.0 {
                    FilterQuality::Nearest
                } else {
                    FilterQuality::Bilinear
                },
                ..Default::default()
            };
            let transform = Transform::from_scale(stretch, stretch);
            pixmap.draw_pixmap(0, 0, shadow.as_ref(), &paint, transform, None);
        }
    }
}

/// Renders the offset, blurred county silhouette.
fn render_shadow(geometry: &SceneGeometry, width: u32, height: u32, scale: f32) -> Option<Pixmap> {
    let mut silhouette = Pixmap::new(width, height)?;
    let transform =
        Transform::from_translate(SHADOW_OFFSET.0, SHADOW_OFFSET.1).post_scale(scale, scale);
    let paint = paint_for(colors::map::SHADOW, 1.0);

    for county in &geometry.counties {
        if let Some(path) = rings_path(&county.rings, true) {
            silhouette.fill_path(&path, &paint, FillRule::EvenOdd, transform, None);
        }
    }

    let image = image::RgbaImage::from_raw(width, height, silhouette.take())?;
    let blurred = image::imageops::blur(&image, SHADOW_BLUR * scale);
    Pixmap::from_vec(blurred.into_raw(), IntSize::from_wh(width, height)?)
}

fn draw_counties(
    pixmap: &mut Pixmap,
    geometry: &SceneGeometry,
    snapshot: &SceneSnapshot,
    transform: Transform,
) {
    let outline = paint_for(colors::map::COUNTY_STROKE, 1.0);
    let outline_stroke = stroke(COUNTY_STROKE_WIDTH);

    for county in &geometry.counties {
        let Some(path) = rings_path(&county.rings, true) else {
            continue;
        };
        let fill = snapshot
            .county_colors
            .get(county.id.0)
            .copied()
            .unwrap_or(colors::map::NULL_FILL);
        pixmap.fill_path(&path, &paint_for(fill, 1.0), FillRule::EvenOdd, transform, None);
        pixmap.stroke_path(&path, &outline, &outline_stroke, transform, None);
    }
}

fn draw_lines(
    pixmap: &mut Pixmap,
    lines: &[Vec<Pos2>],
    color: Color32,
    alpha: f32,
    width: f32,
    transform: Transform,
) {
    if alpha <= 0.0 || lines.is_empty() {
        return;
    }
    if let Some(path) = rings_path(lines, false) {
        pixmap.stroke_path(&path, &paint_for(color, alpha), &stroke(width), transform, None);
    }
}

fn draw_markers(
    pixmap: &mut Pixmap,
    geometry: &SceneGeometry,
    snapshot: &SceneSnapshot,
    transform: Transform,
) {
    for class in [CityClass::Major, CityClass::Minor] {
        let alpha = snapshot.layers.city(class).alpha();
        if alpha <= 0.0 {
            continue;
        }
        let fill = paint_for(colors::map::CITY_FILL, alpha);
        let outline = paint_for(colors::map::CITY_STROKE, alpha);

        for city in geometry.cities_of(class) {
            let Some(circle) =
                PathBuilder::from_circle(city.position.x, city.position.y, class.marker_radius())
            else {
                continue;
            };
            pixmap.fill_path(&circle, &fill, FillRule::Winding, transform, None);
            pixmap.stroke_path(&circle, &outline, &stroke(CITY_STROKE_WIDTH), transform, None);
        }
    }
}

fn draw_labels(pixmap: &mut Pixmap, geometry: &SceneGeometry, snapshot: &SceneSnapshot, scale: f32) {
    let Some(font) = label_font() else {
        return;
    };

    for class in [CityClass::Major, CityClass::Minor] {
        let alpha = snapshot.layers.city(class).alpha();
        if alpha <= 0.0 {
            continue;
        }
        for city in geometry.cities_of(class) {
            let anchor = city.label_anchor();
            draw_text(
                pixmap,
                font,
                &city.name,
                (anchor.x * scale, anchor.y * scale),
                LABEL_SIZE * scale,
                colors::map::CITY_LABEL,
                alpha,
            );
        }
    }
}
