//! Country outlines read from a GeoJSON feature collection

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use geo::{BoundingRect, Contains};
use geo_types::{Coord, LineString, MultiPolygon, Point, Polygon, Rect};
use geojson::{Feature, GeoJson, Value};
use tracing::{debug, info, warn};

use crate::DataError;

/// Property holding the ISO alpha-3 code in Natural Earth style files
pub const DEFAULT_ISO_PROPERTY: &str = "ISO_A3";

/// Region outlines keyed by ISO alpha-3 code
#[derive(Debug, Clone, Default)]
pub struct WorldBoundaries {
    regions: AHashMap<String, MultiPolygon<f64>>,
}

impl WorldBoundaries {
    /// Read a GeoJSON file on a blocking thread
    pub async fn load(path: impl Into<PathBuf>, iso_property: &str) -> Result<Self, DataError> {
        let path = path.into();
        let iso_property = iso_property.to_string();
        let boundaries = tokio::task::spawn_blocking({
            let path = path.clone();
            move || Self::read_file(&path, &iso_property)
        })
        .await??;

        info!("Loaded {} region outlines from {}", boundaries.len(), path.display());
        Ok(boundaries)
    }

    fn read_file(path: &Path, iso_property: &str) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&text, iso_property)
    }

    /// Parse a feature collection (or a single feature). Features without the
    /// ISO property or without polygon geometry are skipped; features sharing
    /// a code are merged into one region.
    pub fn from_geojson_str(text: &str, iso_property: &str) -> Result<Self, DataError> {
        let features = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                return Err(DataError::GeoJson(
                    "expected a Feature or FeatureCollection, found a bare Geometry".to_string(),
                ))
            }
        };

        let mut regions: AHashMap<String, MultiPolygon<f64>> = AHashMap::new();
        let mut skipped = 0usize;

        for feature in features {
            let Some(iso) = feature_code(&feature, iso_property) else {
                skipped += 1;
                continue;
            };
            let Some(polygons) = feature.geometry.as_ref().and_then(|g| to_polygons(&g.value)) else {
                skipped += 1;
                continue;
            };
            regions.entry(iso).or_insert_with(|| MultiPolygon(Vec::new())).0.extend(polygons);
        }

        if skipped > 0 {
            warn!("Skipped {} features without '{}' or polygon geometry", skipped, iso_property);
        }
        debug!("Parsed {} regions", regions.len());

        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Outline of one region
    pub fn get(&self, iso: &str) -> Option<&MultiPolygon<f64>> {
        self.regions.get(iso)
    }

    pub fn contains_code(&self, iso: &str) -> bool {
        self.regions.contains_key(iso)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultiPolygon<f64>)> {
        self.regions.iter().map(|(iso, shape)| (iso.as_str(), shape))
    }

    /// Code of the region containing a lon/lat position
    pub fn region_at(&self, lon: f64, lat: f64) -> Option<&str> {
        let point = Point::new(lon, lat);
        self.regions
            .iter()
            .find(|(_, shape)| shape.contains(&point))
            .map(|(iso, _)| iso.as_str())
    }

    /// Bounding box over every region
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.regions
            .values()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }
}

fn feature_code(feature: &Feature, iso_property: &str) -> Option<String> {
    let code = feature.property(iso_property)?.as_str()?.trim();
    // Natural Earth marks disputed areas with "-99"
    if code.is_empty() || code == "-99" {
        return None;
    }
    Some(code.to_string())
}

fn to_polygons(value: &Value) -> Option<Vec<Polygon<f64>>> {
    match value {
        Value::Polygon(rings) => to_polygon(rings).map(|p| vec![p]),
        Value::MultiPolygon(polygons) => {
            let converted: Vec<_> = polygons.iter().filter_map(|rings| to_polygon(rings)).collect();
            (!converted.is_empty()).then_some(converted)
        }
        _ => None,
    }
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| to_line_string(ring));
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

fn to_line_string(ring: &[Vec<f64>]) -> LineString<f64> {
    ring.iter()
        .filter(|position| position.len() >= 2)
        .map(|position| Coord { x: position[0], y: position[1] })
        .collect()
}
