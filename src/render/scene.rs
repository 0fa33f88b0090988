//! Screen-space scene geometry and the fixed layer stack.
//!
//! Every feature is projected exactly once when the scene is compiled.
//! Toggling a layer only changes the style it is drawn with, so showing a
//! hidden layer again reuses the same geometry.

use crate::geo::projection::{rings_bounds, rings_contain};
use crate::geo::{CityClass, CountyId, GeoDataSet, MapProjection};
use crate::state::LayerVisibility;
use eframe::egui::{Color32, Pos2, Rect, Vec2};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Drawing layers, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawLayer {
    Shadow,
    Geography,
    Rivers,
    Interstates,
    CityMarkers,
    CityLabels,
}

impl DrawLayer {
    /// Fixed z-order. Visibility toggles never reorder layers.
    pub const ORDER: [DrawLayer; 6] = [
        DrawLayer::Shadow,
        DrawLayer::Geography,
        DrawLayer::Rivers,
        DrawLayer::Interstates,
        DrawLayer::CityMarkers,
        DrawLayer::CityLabels,
    ];
}

/// A county projected into map pixels.
#[derive(Debug, Clone)]
pub struct CountyShape {
    pub id: CountyId,
    pub name: Option<String>,
    /// Every ring of every polygon; filled with the even-odd rule
    pub rings: Vec<Vec<Pos2>>,
    pub bounds: Rect,
}

/// A city projected into map pixels.
#[derive(Debug, Clone)]
pub struct CityMark {
    pub name: String,
    pub class: CityClass,
    pub position: Pos2,
}

impl CityMark {
    /// Horizontal distance from the marker centre to the label start.
    pub const LABEL_OFFSET: f32 = 15.0;

    pub fn label_anchor(&self) -> Pos2 {
        self.position + Vec2::new(Self::LABEL_OFFSET, 0.0)
    }
}

/// All geometry of the map in canvas pixels at scale 1.
#[derive(Debug, Clone)]
pub struct SceneGeometry {
    /// Canvas size, margins included
    pub size: Vec2,
    pub counties: Vec<CountyShape>,
    pub rivers: Vec<Vec<Pos2>>,
    pub interstates: Vec<Vec<Pos2>>,
    pub cities: Vec<CityMark>,
}

impl SceneGeometry {
    /// Projects the loaded data set.
    pub fn compile(data: &GeoDataSet, projection: &MapProjection, size: Vec2) -> Self {
        let counties = data
            .counties
            .iter()
            .map(|county| {
                let lines: Vec<_> = county
                    .polygons
                    .iter()
                    .flat_map(|(ext, holes)| std::iter::once(ext).chain(holes.iter()))
                    .cloned()
                    .collect();
                let rings = projection.project_lines(&lines);
                let bounds = rings_bounds(&rings);
                CountyShape {
                    id: county.id,
                    name: county.name.clone(),
                    rings,
                    bounds,
                }
            })
            .collect();

        let rivers = data
            .rivers
            .features
            .iter()
            .flat_map(|f| projection.project_lines(&f.lines()))
            .collect();

        let interstates = data
            .interstates
            .features
            .iter()
            .flat_map(|f| projection.project_lines(&f.lines()))
            .collect();

        let cities = data
            .cities
            .iter()
            .map(|city| CityMark {
                name: city.name.clone(),
                class: city.class,
                position: projection.geo_to_screen(city.coord),
            })
            .collect();

        Self {
            size,
            counties,
            rivers,
            interstates,
            cities,
        }
    }

    pub fn county_count(&self) -> usize {
        self.counties.len()
    }

    pub fn county(&self, id: CountyId) -> Option<&CountyShape> {
        self.counties.get(id.0)
    }

    /// Finds the county under a canvas position.
    ///
    /// Counties drawn later sit on top, so they are tested first.
    pub fn county_at(&self, pos: Pos2) -> Option<CountyId> {
        self.counties
            .iter()
            .rev()
            .find(|county| county.bounds.contains(pos) && rings_contain(&county.rings, pos))
            .map(|county| county.id)
    }

    /// Cities of one class, in load order.
    pub fn cities_of(&self, class: CityClass) -> impl Iterator<Item = &CityMark> {
        self.cities.iter().filter(move |city| city.class == class)
    }
}

/// Everything mutable that affects the rendered image, captured at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    /// Displayed fill of each county, indexed by `CountyId`
    pub county_colors: Vec<Color32>,
    pub layers: LayerVisibility,
}

impl SceneSnapshot {
    /// Content signature used as a texture cache key.
    pub fn signature(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.county_colors.hash(&mut hasher);
        let layers = &self.layers;
        for style in [
            layers.interstate,
            layers.shadow,
            layers.river,
            layers.city_major,
            layers.city_minor,
        ] {
            style.visible.hash(&mut hasher);
            style.opacity.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geo::{City, County, GeoLayer, GeoLayerType};
    use geo_types::Coord;

    fn square(min_lon: f64, min_lat: f64, size: f64) -> Vec<Coord<f64>> {
        vec![
            Coord { x: min_lon, y: min_lat },
            Coord { x: min_lon + size, y: min_lat },
            Coord { x: min_lon + size, y: min_lat + size },
            Coord { x: min_lon, y: min_lat + size },
            Coord { x: min_lon, y: min_lat },
        ]
    }

    /// Two side-by-side counties, one river, one city of each class.
    pub(crate) fn sample_geometry() -> SceneGeometry {
        let mut rivers = GeoLayer::new(GeoLayerType::Rivers);
        rivers.features.push(crate::geo::GeoFeature::LineString(vec![
            Coord { x: -99.0, y: 29.5 },
            Coord { x: -97.0, y: 29.5 },
        ]));

        let data = GeoDataSet {
            counties: vec![
                County {
                    id: CountyId(0),
                    name: Some("West".to_string()),
                    polygons: vec![(square(-99.0, 29.0, 1.0), Vec::new())],
                },
                County {
                    id: CountyId(1),
                    name: Some("East".to_string()),
                    polygons: vec![(square(-98.0, 29.0, 1.0), Vec::new())],
                },
            ],
            interstates: GeoLayer::new(GeoLayerType::Interstates),
            rivers,
            cities: vec![
                City {
                    name: "Big".to_string(),
                    class: CityClass::Major,
                    coord: Coord { x: -98.5, y: 29.8 },
                },
                City {
                    name: "Small".to_string(),
                    class: CityClass::Minor,
                    coord: Coord { x: -97.5, y: 29.8 },
                },
            ],
        };

        let projection = MapProjection::fit_size(180.0, 100.0, data.county_coords())
            .unwrap()
            .with_offset(Vec2::new(10.0, 10.0));
        SceneGeometry::compile(&data, &projection, Vec2::new(200.0, 120.0))
    }

    #[test]
    fn test_compile_projects_everything() {
        let geometry = sample_geometry();
        assert_eq!(geometry.county_count(), 2);
        assert_eq!(geometry.rivers.len(), 1);
        assert!(geometry.interstates.is_empty());
        assert_eq!(geometry.cities_of(CityClass::Major).count(), 1);
        assert_eq!(geometry.cities_of(CityClass::Minor).count(), 1);
    }

    #[test]
    fn test_county_at_hits_the_right_county() {
        let geometry = sample_geometry();
        let west = geometry.county(CountyId(0)).unwrap().bounds.center();
        let east = geometry.county(CountyId(1)).unwrap().bounds.center();

        assert_eq!(geometry.county_at(west), Some(CountyId(0)));
        assert_eq!(geometry.county_at(east), Some(CountyId(1)));
        assert_eq!(geometry.county_at(Pos2::new(-50.0, -50.0)), None);
    }

    #[test]
    fn test_draw_order_is_fixed() {
        assert_eq!(DrawLayer::ORDER[0], DrawLayer::Shadow);
        assert_eq!(DrawLayer::ORDER[1], DrawLayer::Geography);
        assert_eq!(DrawLayer::ORDER[5], DrawLayer::CityLabels);
    }

    #[test]
    fn test_signature_tracks_content() {
        let snapshot = SceneSnapshot {
            county_colors: vec![Color32::RED, Color32::BLUE],
            layers: LayerVisibility::default(),
        };
        let mut changed = snapshot.clone();
        changed.layers.river.opacity = 0.0;

        assert_eq!(snapshot.signature(), snapshot.clone().signature());
        assert_ne!(snapshot.signature(), changed.signature());
    }
}
