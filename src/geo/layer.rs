//! Geographic layer data structures.

use geo_types::Coord;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};

/// Property keys tried, in order, when looking for a feature's display name.
const LABEL_KEYS: &[&str] = &["City", "NAME", "name", "Name", "County", "NAMELSAD"];

/// Type of geographic layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoLayerType {
    Counties,
    Interstates,
    Rivers,
    Cities,
}

impl GeoLayerType {
    pub fn label(&self) -> &'static str {
        match self {
            GeoLayerType::Counties => "counties",
            GeoLayerType::Interstates => "interstates",
            GeoLayerType::Rivers => "rivers",
            GeoLayerType::Cities => "cities",
        }
    }
}

/// A polygon as (exterior ring, holes).
pub type PolygonRings = (Vec<Coord<f64>>, Vec<Vec<Coord<f64>>>);

/// A geographic feature that can be rendered.
#[derive(Debug, Clone)]
pub enum GeoFeature {
    /// A series of connected line segments (rivers, interstates)
    LineString(Vec<Coord<f64>>),
    /// Multiple line strings
    MultiLineString(Vec<Vec<Coord<f64>>>),
    /// A closed polygon with optional label
    Polygon {
        exterior: Vec<Coord<f64>>,
        holes: Vec<Vec<Coord<f64>>>,
        label: Option<String>,
    },
    /// Multiple polygons with optional label
    MultiPolygon {
        polygons: Vec<PolygonRings>,
        label: Option<String>,
    },
    /// A single point with its label and `Class` property
    Point {
        coord: Coord<f64>,
        label: Option<String>,
        class: Option<String>,
    },
}

impl GeoFeature {
    /// Returns the polygons of an areal feature; empty for lines and points.
    pub fn polygons(&self) -> Vec<PolygonRings> {
        match self {
            GeoFeature::Polygon { exterior, holes, .. } => vec![(exterior.clone(), holes.clone())],
            GeoFeature::MultiPolygon { polygons, .. } => polygons.clone(),
            _ => Vec::new(),
        }
    }

    /// Returns every line of the feature. Polygons contribute their rings.
    pub fn lines(&self) -> Vec<Vec<Coord<f64>>> {
        match self {
            GeoFeature::LineString(coords) => vec![coords.clone()],
            GeoFeature::MultiLineString(lines) => lines.clone(),
            GeoFeature::Polygon { .. } | GeoFeature::MultiPolygon { .. } => self
                .polygons()
                .into_iter()
                .flat_map(|(exterior, holes)| std::iter::once(exterior).chain(holes))
                .collect(),
            GeoFeature::Point { .. } => Vec::new(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            GeoFeature::Polygon { label, .. }
            | GeoFeature::MultiPolygon { label, .. }
            | GeoFeature::Point { label, .. } => label.as_deref(),
            _ => None,
        }
    }
}

/// A geographic layer containing multiple features.
#[derive(Debug, Clone)]
pub struct GeoLayer {
    /// Type of this layer
    pub layer_type: GeoLayerType,
    /// Features in this layer, in file order
    pub features: Vec<GeoFeature>,
}

impl GeoLayer {
    /// Creates a new empty layer of the specified type.
    pub fn new(layer_type: GeoLayerType) -> Self {
        Self {
            layer_type,
            features: Vec::new(),
        }
    }

    /// Loads features from GeoJSON data.
    pub fn load_from_geojson(&mut self, geojson_str: &str) -> Result<(), geojson::Error> {
        let geojson: GeoJson = geojson_str.parse()?;

        match geojson {
            GeoJson::FeatureCollection(fc) => {
                self.load_feature_collection(fc);
            }
            GeoJson::Feature(f) => {
                if let Some(feature) = convert_feature(&f) {
                    self.features.push(feature);
                }
            }
            GeoJson::Geometry(g) => {
                if let Some(feature) = convert_geometry(&g, None, None) {
                    self.features.push(feature);
                }
            }
        }

        Ok(())
    }

    fn load_feature_collection(&mut self, fc: FeatureCollection) {
        let total = fc.features.len();
        for feature in fc.features {
            if let Some(geo_feature) = convert_feature(&feature) {
                self.features.push(geo_feature);
            }
        }
        if self.features.len() < total {
            log::debug!(
                "{}: skipped {} features without usable geometry",
                self.layer_type.label(),
                total - self.features.len()
            );
        }
    }
}

fn string_property(properties: Option<&JsonObject>, keys: &[&str]) -> Option<String> {
    let properties = properties?;
    keys.iter()
        .filter_map(|key| properties.get(*key))
        .find_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
}

fn convert_feature(feature: &Feature) -> Option<GeoFeature> {
    let label = string_property(feature.properties.as_ref(), LABEL_KEYS);
    let class = string_property(feature.properties.as_ref(), &["Class"]);

    feature
        .geometry
        .as_ref()
        .and_then(|g| convert_geometry(g, label, class))
}

fn to_coord(position: &[f64]) -> Option<Coord<f64>> {
    match position {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn to_ring(positions: &[Vec<f64>]) -> Vec<Coord<f64>> {
    positions.iter().filter_map(|p| to_coord(p)).collect()
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<PolygonRings> {
    let (exterior, holes) = rings.split_first()?;
    Some((to_ring(exterior), holes.iter().map(|r| to_ring(r)).collect()))
}

fn convert_geometry(
    geometry: &Geometry,
    label: Option<String>,
    class: Option<String>,
) -> Option<GeoFeature> {
    match &geometry.value {
        Value::Point(position) => Some(GeoFeature::Point {
            coord: to_coord(position)?,
            label,
            class,
        }),
        // Only the first point of a MultiPoint is kept as the representative
        Value::MultiPoint(points) => Some(GeoFeature::Point {
            coord: to_coord(points.first()?)?,
            label,
            class,
        }),
        Value::LineString(coords) => Some(GeoFeature::LineString(to_ring(coords))),
        Value::MultiLineString(lines) => Some(GeoFeature::MultiLineString(
            lines.iter().map(|line| to_ring(line)).collect(),
        )),
        Value::Polygon(rings) => {
            let (exterior, holes) = to_polygon(rings)?;
            Some(GeoFeature::Polygon {
                exterior,
                holes,
                label,
            })
        }
        Value::MultiPolygon(polygons) => Some(GeoFeature::MultiPolygon {
            polygons: polygons.iter().filter_map(|rings| to_polygon(rings)).collect(),
            label,
        }),
        Value::GeometryCollection(geometries) => geometries
            .iter()
            .find_map(|g| convert_geometry(g, label.clone(), class.clone())),
    }
}

/// Identity of a county: its index in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountyId(pub usize);

/// A paintable county polygon.
#[derive(Debug, Clone)]
pub struct County {
    pub id: CountyId,
    pub name: Option<String>,
    pub polygons: Vec<PolygonRings>,
}

/// City size class, from the `Class` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CityClass {
    Major,
    Minor,
}

impl CityClass {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Major" => Some(CityClass::Major),
            "Minor" => Some(CityClass::Minor),
            _ => None,
        }
    }

    /// Marker radius in map pixels.
    pub fn marker_radius(&self) -> f32 {
        match self {
            CityClass::Major => 10.0,
            CityClass::Minor => 7.0,
        }
    }
}

/// A labelled city point.
#[derive(Debug, Clone)]
pub struct City {
    pub name: String,
    pub class: CityClass,
    pub coord: Coord<f64>,
}

/// The four loaded feature collections, read-only after load.
#[derive(Debug, Clone)]
pub struct GeoDataSet {
    pub counties: Vec<County>,
    pub interstates: GeoLayer,
    pub rivers: GeoLayer,
    pub cities: Vec<City>,
}

impl GeoDataSet {
    /// Builds the data set from raw layers, keeping only polygonal counties
    /// and cities with a recognised class.
    pub fn from_layers(
        counties: GeoLayer,
        interstates: GeoLayer,
        rivers: GeoLayer,
        cities: GeoLayer,
    ) -> Self {
        let counties = counties
            .features
            .iter()
            .map(|f| (f.label().map(str::to_string), f.polygons()))
            .filter(|(_, polygons)| !polygons.is_empty())
            .enumerate()
            .map(|(idx, (name, polygons))| County {
                id: CountyId(idx),
                name,
                polygons,
            })
            .collect();

        let cities = cities
            .features
            .into_iter()
            .filter_map(|feature| match feature {
                GeoFeature::Point {
                    coord,
                    label,
                    class,
                } => {
                    let Some(class) = class.as_deref().and_then(CityClass::parse) else {
                        log::debug!("Skipping city {:?} with class {:?}", label, class);
                        return None;
                    };
                    Some(City {
                        name: label.unwrap_or_default(),
                        class,
                        coord,
                    })
                }
                _ => None,
            })
            .collect();

        Self {
            counties,
            interstates,
            rivers,
            cities,
        }
    }

    /// Iterates over every county coordinate; the projection is fit to these.
    pub fn county_coords(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.counties.iter().flat_map(|county| {
            county
                .polygons
                .iter()
                .flat_map(|(ext, holes)| ext.iter().chain(holes.iter().flatten()))
                .copied()
        })
    }
}
