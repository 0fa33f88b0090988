//! Map projection and coordinate transformation.
//!
//! The map uses a fixed Albers equal-area conic projection (the lower-48
//! parameters of an Albers USA projection) scaled and translated so the
//! county geometry fits the map viewport. Nothing pans or zooms afterwards.

use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;

/// Standard parallels and origin used for the contiguous United States.
const PARALLELS_DEG: (f64, f64) = (29.5, 45.5);
const ORIGIN_LON_DEG: f64 = -96.0;

/// Albers equal-area conic on the unit sphere.
#[derive(Debug, Clone, Copy)]
struct AlbersConic {
    n: f64,
    c: f64,
    rho0: f64,
    lambda0: f64,
}

impl AlbersConic {
    fn usa() -> Self {
        let sin0 = PARALLELS_DEG.0.to_radians().sin();
        let sin1 = PARALLELS_DEG.1.to_radians().sin();
        let n = (sin0 + sin1) / 2.0;
        let c = 1.0 + sin0 * (2.0 * n - sin0);
        Self {
            n,
            c,
            rho0: c.sqrt() / n,
            lambda0: ORIGIN_LON_DEG.to_radians(),
        }
    }

    /// Projects (lon, lat) in degrees to planar coordinates with y pointing up.
    fn project(&self, coord: Coord<f64>) -> (f64, f64) {
        let lambda = coord.x.to_radians() - self.lambda0;
        let phi = coord.y.to_radians();
        let rho = (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let theta = lambda * self.n;
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }
}

/// Fixed projection from geographic to map (screen) coordinates.
#[derive(Debug, Clone)]
pub struct MapProjection {
    conic: AlbersConic,
    /// Planar units to pixels
    scale: f64,
    /// Pixel translation applied after scaling (y already flipped)
    translate: (f64, f64),
    /// Margin offset of the geography inside the canvas
    offset: Vec2,
}

impl MapProjection {
    /// Creates a projection that fits `coords` into a `width` x `height` box,
    /// centred on both axes.
    ///
    /// Returns `None` when there is nothing to fit or the extent is degenerate.
    pub fn fit_size(
        width: f32,
        height: f32,
        coords: impl IntoIterator<Item = Coord<f64>>,
    ) -> Option<Self> {
        let conic = AlbersConic::usa();

        let (min_x, max_x, min_y, max_y) = coords.into_iter().map(|c| conic.project(c)).fold(
            (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
            |(min_x, max_x, min_y, max_y), (x, y)| {
                (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
            },
        );

        let dx = max_x - min_x;
        let dy = max_y - min_y;
        if !(dx.is_finite() && dy.is_finite()) || dx <= 0.0 || dy <= 0.0 {
            return None;
        }

        let (width, height) = (width as f64, height as f64);
        let scale = (width / dx).min(height / dy);
        let translate = (
            (width - scale * (min_x + max_x)) / 2.0,
            (height + scale * (min_y + max_y)) / 2.0,
        );

        Some(Self {
            conic,
            scale,
            translate,
            offset: Vec2::ZERO,
        })
    }

    /// Shifts all projected points by the canvas margin.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Converts geographic coordinates (lon, lat) to a map position.
    pub fn geo_to_screen(&self, coord: Coord<f64>) -> Pos2 {
        let (x, y) = self.conic.project(coord);
        Pos2::new(
            (self.translate.0 + self.scale * x) as f32 + self.offset.x,
            (self.translate.1 - self.scale * y) as f32 + self.offset.y,
        )
    }

    /// Projects a ring or line string.
    pub fn project_line(&self, coords: &[Coord<f64>]) -> Vec<Pos2> {
        coords.iter().map(|c| self.geo_to_screen(*c)).collect()
    }

    /// Projects several rings; rings with fewer than two points are dropped.
    pub fn project_lines(&self, lines: &[Vec<Coord<f64>>]) -> Vec<Vec<Pos2>> {
        lines
            .iter()
            .filter(|line| line.len() >= 2)
            .map(|line| self.project_line(line))
            .collect()
    }
}

/// Bounding rectangle of a set of rings.
pub fn rings_bounds(rings: &[Vec<Pos2>]) -> Rect {
    rings
        .iter()
        .flatten()
        .fold(Rect::NOTHING, |rect, p| rect.union(Rect::from_min_max(*p, *p)))
}

/// Even-odd point-in-polygon test over all rings, holes included.
pub fn rings_contain(rings: &[Vec<Pos2>], point: Pos2) -> bool {
    let mut inside = false;
    for ring in rings {
        if ring.len() < 3 {
            continue;
        }
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let (a, b) = (ring[i], ring[j]);
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min_lon: f64, min_lat: f64, size: f64) -> Vec<Coord<f64>> {
        vec![
            Coord { x: min_lon, y: min_lat },
            Coord { x: min_lon + size, y: min_lat },
            Coord { x: min_lon + size, y: min_lat + size },
            Coord { x: min_lon, y: min_lat + size },
            Coord { x: min_lon, y: min_lat },
        ]
    }

    #[test]
    fn test_fit_size_fills_the_box() {
        let coords = square(-100.0, 28.0, 4.0);
        let projection = MapProjection::fit_size(948.0, 580.0, coords.iter().copied()).unwrap();

        let points = projection.project_line(&coords);
        let bounds = rings_bounds(&[points]);

        assert!(bounds.min.x >= -0.5 && bounds.min.y >= -0.5);
        assert!(bounds.max.x <= 948.5 && bounds.max.y <= 580.5);
        // One axis is tight against the box
        let tight_x = (bounds.width() - 948.0).abs() < 1.0;
        let tight_y = (bounds.height() - 580.0).abs() < 1.0;
        assert!(tight_x || tight_y);
        // Centred on both axes
        assert!((bounds.center().x - 474.0).abs() < 1.0);
        assert!((bounds.center().y - 290.0).abs() < 1.0);
    }

    #[test]
    fn test_north_is_up() {
        let coords = square(-100.0, 28.0, 4.0);
        let projection = MapProjection::fit_size(500.0, 500.0, coords.iter().copied()).unwrap();

        let south = projection.geo_to_screen(Coord { x: -98.0, y: 29.0 });
        let north = projection.geo_to_screen(Coord { x: -98.0, y: 31.0 });
        assert!(north.y < south.y);

        let west = projection.geo_to_screen(Coord { x: -99.0, y: 30.0 });
        let east = projection.geo_to_screen(Coord { x: -97.0, y: 30.0 });
        assert!(west.x < east.x);
    }

    #[test]
    fn test_offset_shifts_points() {
        let coords = square(-100.0, 28.0, 4.0);
        let base = MapProjection::fit_size(500.0, 500.0, coords.iter().copied()).unwrap();
        let shifted = base.clone().with_offset(Vec2::new(10.0, 20.0));

        let c = Coord { x: -98.0, y: 30.0 };
        let delta = shifted.geo_to_screen(c) - base.geo_to_screen(c);
        assert!((delta.x - 10.0).abs() < 1e-3);
        assert!((delta.y - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_fit_size_rejects_empty_input() {
        assert!(MapProjection::fit_size(100.0, 100.0, Vec::new()).is_none());
        let single = vec![Coord { x: -98.0, y: 30.0 }];
        assert!(MapProjection::fit_size(100.0, 100.0, single).is_none());
    }

    #[test]
    fn test_rings_contain_respects_holes() {
        let outer = vec![
            Pos2::new(0.0, 0.0),
            Pos2::new(10.0, 0.0),
            Pos2::new(10.0, 10.0),
            Pos2::new(0.0, 10.0),
        ];
        let hole = vec![
            Pos2::new(4.0, 4.0),
            Pos2::new(6.0, 4.0),
            Pos2::new(6.0, 6.0),
            Pos2::new(4.0, 6.0),
        ];
        let rings = vec![outer, hole];

        assert!(rings_contain(&rings, Pos2::new(2.0, 2.0)));
        assert!(!rings_contain(&rings, Pos2::new(5.0, 5.0)));
        assert!(!rings_contain(&rings, Pos2::new(12.0, 5.0)));
    }
}
