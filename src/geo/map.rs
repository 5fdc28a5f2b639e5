//! Municipality boundary maps and the coordinate-to-municipality join.
//!
//! Maps are GeoJSON FeatureCollections of Polygon / MultiPolygon features.
//! The map's coordinate system comes from the legacy `crs` member when the
//! file has one (Statistics Finland exports carry `EPSG:3067`), otherwise
//! RFC 7946 WGS84 is assumed.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::crs::{Crs, Point};
use super::polygon::{Geometry, Polygon, Ring};
use crate::error::{Error, Result};
use crate::logging::{self, Component};

/// Property holding the municipality code in Statistics Finland maps.
pub const DEFAULT_CODE_PROPERTY: &str = "NATCODE";

// ---------------------------------------------------------------------------
// GeoJSON document shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeatureCollectionDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    crs: Option<CrsDoc>,
    features: Vec<FeatureDoc>,
}

#[derive(Debug, Deserialize)]
struct CrsDoc {
    properties: CrsPropertiesDoc,
}

#[derive(Debug, Deserialize)]
struct CrsPropertiesDoc {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FeatureDoc {
    #[serde(default)]
    properties: Option<Map<String, JsonValue>>,
    geometry: Option<GeometryDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryDoc {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

fn to_ring(coords: Vec<Vec<f64>>) -> Result<Ring> {
    coords
        .into_iter()
        .map(|c| match c.as_slice() {
            [x, y, ..] => Ok(Point::new(*x, *y)),
            _ => Err(Error::Geo {
                message: format!("position needs at least two coordinates, got {:?}", c),
            }),
        })
        .collect()
}

fn to_polygon(rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon> {
    let mut rings = rings.into_iter().map(to_ring);
    let exterior = rings.next().transpose()?.ok_or_else(|| Error::Geo {
        message: "polygon has no exterior ring".to_string(),
    })?;
    let holes = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, holes))
}

/// Reads a numeric code from a property that may be a JSON number or a
/// zero-padded string such as `"091"`.
fn code_from_property(value: Option<&JsonValue>) -> Option<u32> {
    match value? {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Parsed municipality code, `None` when the property is absent or not numeric.
    pub code: Option<u32>,
    pub properties: Map<String, JsonValue>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MunicipalityMap {
    pub crs: Crs,
    pub features: Vec<Feature>,
}

impl MunicipalityMap {
    pub fn new(crs: Crs, features: Vec<Feature>) -> Self {
        Self { crs, features }
    }

    pub fn load(path: impl AsRef<Path>, code_property: &str) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let map = Self::from_geojson(&text, code_property)?;
        logging::info(
            Component::Geo,
            Some(&path.display().to_string()),
            &format!("loaded {} features in {}", map.features.len(), map.crs),
        );
        Ok(map)
    }

    pub fn from_geojson(text: &str, code_property: &str) -> Result<Self> {
        let doc: FeatureCollectionDoc = serde_json::from_str(text)?;
        if doc.kind != "FeatureCollection" {
            return Err(Error::Geo {
                message: format!("expected a FeatureCollection, found '{}'", doc.kind),
            });
        }
        let crs = match &doc.crs {
            Some(c) => Crs::from_code(&c.properties.name)?,
            None => Crs::Wgs84,
        };

        let mut features = Vec::with_capacity(doc.features.len());
        let mut skipped = 0usize;
        for feature in doc.features {
            let geometry = match feature.geometry {
                Some(GeometryDoc::Polygon { coordinates }) => {
                    Geometry::Polygon(to_polygon(coordinates)?)
                }
                Some(GeometryDoc::MultiPolygon { coordinates }) => Geometry::MultiPolygon(
                    coordinates
                        .into_iter()
                        .map(to_polygon)
                        .collect::<Result<Vec<_>>>()?,
                ),
                Some(GeometryDoc::Unsupported) | None => {
                    skipped += 1;
                    continue;
                }
            };
            let properties = feature.properties.unwrap_or_default();
            features.push(Feature {
                code: code_from_property(properties.get(code_property)),
                properties,
                geometry,
            });
        }
        if skipped > 0 {
            logging::warn(
                Component::Geo,
                None,
                &format!("skipped {} features without polygon geometry", skipped),
            );
        }

        Ok(Self { crs, features })
    }

    /// First feature containing `point`, which must already be in the map's CRS.
    pub fn feature_at(&self, point: Point) -> Option<&Feature> {
        self.features.iter().find(|f| f.geometry.contains(point))
    }

    /// Left join of WGS84 points against the map with a "within" predicate.
    /// The result has one entry per input point.
    pub fn spatial_join(&self, points: &[Point]) -> Vec<Option<&Feature>> {
        let joined: Vec<Option<&Feature>> = points
            .iter()
            .map(|p| self.feature_at(Crs::Wgs84.transform(*p, self.crs)))
            .collect();
        logging::log_match_summary(
            Component::Geo,
            joined.len(),
            joined.iter().filter(|f| f.is_some()).count(),
        );
        joined
    }

    /// Municipality code for a WGS84 `(longitude, latitude)` pair.
    pub fn mid_by_coords(&self, coords: (f64, f64)) -> Option<u32> {
        let point = Crs::Wgs84.transform(Point::from(coords), self.crs);
        let code = self.feature_at(point).and_then(|f| f.code);
        if code.is_none() {
            logging::log_lookup_miss("coordinate", &format!("{:?}", coords));
        }
        code
    }
}

/// Municipality code for a WGS84 `(longitude, latitude)` pair.
pub fn get_mid_by_coords(coords: (f64, f64), map: &MunicipalityMap) -> Option<u32> {
    map.mid_by_coords(coords)
}
