//! Polygon features used as spatial filter values

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as Json};

use crate::FilterError;

/// Geometry `type` a feature was read with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryKind {
    /// Chosen from the polygon count when written back
    #[default]
    Inferred,
    /// Polygon nesting with no `type` key
    Untyped,
    Polygon,
    MultiPolygon,
}

/// A drawn polygon (or multipolygon) feature.
///
/// Rings follow GeoJSON nesting: the first ring of each polygon is the outer
/// boundary, the remaining rings are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFeature {
    pub id: String,
    pub geometry: MultiPolygon<f64>,
    pub kind: GeometryKind,
    pub properties: Map<String, Json>,
}

impl PolygonFeature {
    pub fn new(id: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            id: id.into(),
            geometry,
            kind: GeometryKind::Inferred,
            properties: Map::new(),
        }
    }

    /// Parse a GeoJSON-like feature object.
    ///
    /// Accepts `Polygon` and `MultiPolygon` geometries, and an untyped
    /// geometry holding polygon nesting. Empty `coordinates` yield an empty
    /// geometry.
    pub fn from_json(json: &Json) -> Result<Self, FilterError> {
        let id = match json.get("id") {
            Some(Json::String(s)) if !s.is_empty() => s.clone(),
            Some(Json::Number(n)) => n.to_string(),
            _ => return Err(FilterError::InvalidGeometry("feature has no id".into())),
        };
        let geometry = json
            .get("geometry")
            .ok_or_else(|| FilterError::InvalidGeometry("feature has no geometry".into()))?;
        let coordinates = geometry
            .get("coordinates")
            .and_then(Json::as_array)
            .ok_or_else(|| FilterError::InvalidGeometry("geometry has no coordinates".into()))?;

        let (kind, polygons) = match geometry.get("type").and_then(Json::as_str) {
            Some("MultiPolygon") => (
                GeometryKind::MultiPolygon,
                coordinates
                    .iter()
                    .map(parse_polygon)
                    .collect::<Result<Vec<_>, _>>()?
                    .into_iter()
                    .flatten()
                    .collect(),
            ),
            Some("Polygon") => (
                GeometryKind::Polygon,
                parse_rings(coordinates)?.into_iter().collect(),
            ),
            None => (
                GeometryKind::Untyped,
                parse_rings(coordinates)?.into_iter().collect(),
            ),
            Some(other) => {
                return Err(FilterError::InvalidGeometry(format!(
                    "unsupported geometry type {other}"
                )))
            }
        };

        let properties = json
            .get("properties")
            .and_then(Json::as_object)
            .cloned()
            .unwrap_or_default();

        Ok(Self {
            id,
            geometry: MultiPolygon(polygons),
            kind,
            properties,
        })
    }

    /// Convert a parsed `geojson` feature
    pub fn from_geojson(feature: &geojson::Feature) -> Result<Self, FilterError> {
        let id = match &feature.id {
            Some(geojson::feature::Id::String(s)) => s.clone(),
            Some(geojson::feature::Id::Number(n)) => n.to_string(),
            None => return Err(FilterError::InvalidGeometry("feature has no id".into())),
        };
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or_else(|| FilterError::InvalidGeometry("feature has no geometry".into()))?;

        let (kind, polygons) = match &geometry.value {
            geojson::Value::Polygon(rings) => (
                GeometryKind::Polygon,
                positions_to_polygon(rings).into_iter().collect(),
            ),
            geojson::Value::MultiPolygon(polygons) => (
                GeometryKind::MultiPolygon,
                polygons
                    .iter()
                    .filter_map(|rings| positions_to_polygon(rings))
                    .collect(),
            ),
            _ => {
                return Err(FilterError::InvalidGeometry(
                    "feature is not a polygon".into(),
                ))
            }
        };

        Ok(Self {
            id,
            geometry: MultiPolygon(polygons),
            kind,
            properties: feature.properties.clone().unwrap_or_default(),
        })
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: Json) {
        self.properties.insert(key.into(), value);
    }

    pub fn to_json(&self) -> Json {
        let polygons: Vec<Json> = self.geometry.0.iter().map(polygon_to_json).collect();
        let single = || polygons.first().cloned().unwrap_or_else(|| json!([]));
        let geometry = match self.kind {
            GeometryKind::Untyped => json!({"coordinates": single()}),
            GeometryKind::Polygon => json!({"type": "Polygon", "coordinates": single()}),
            GeometryKind::MultiPolygon => json!({"type": "MultiPolygon", "coordinates": polygons}),
            GeometryKind::Inferred if polygons.len() == 1 => {
                json!({"type": "Polygon", "coordinates": single()})
            }
            GeometryKind::Inferred => json!({"type": "MultiPolygon", "coordinates": polygons}),
        };
        json!({
            "type": "Feature",
            "id": self.id,
            "geometry": geometry,
            "properties": self.properties,
        })
    }
}

impl Serialize for PolygonFeature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn parse_position(json: &Json) -> Result<Coord<f64>, FilterError> {
    let pos = json
        .as_array()
        .filter(|p| p.len() >= 2)
        .ok_or_else(|| FilterError::InvalidGeometry("position needs two numbers".into()))?;
    match (pos[0].as_f64(), pos[1].as_f64()) {
        (Some(x), Some(y)) => Ok(Coord { x, y }),
        _ => Err(FilterError::InvalidGeometry("non numeric position".into())),
    }
}

fn parse_ring(json: &Json) -> Result<LineString<f64>, FilterError> {
    let points = json
        .as_array()
        .ok_or_else(|| FilterError::InvalidGeometry("ring is not an array".into()))?;
    let coords = points.iter().map(parse_position).collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

fn parse_rings(rings: &[Json]) -> Result<Option<Polygon<f64>>, FilterError> {
    let mut rings = rings.iter().map(parse_ring).collect::<Result<Vec<_>, _>>()?;
    if rings.is_empty() {
        return Ok(None);
    }
    let exterior = rings.remove(0);
    Ok(Some(Polygon::new(exterior, rings)))
}

fn parse_polygon(json: &Json) -> Result<Option<Polygon<f64>>, FilterError> {
    let rings = json
        .as_array()
        .ok_or_else(|| FilterError::InvalidGeometry("polygon is not an array".into()))?;
    parse_rings(rings)
}

fn positions_to_polygon(rings: &[Vec<geojson::Position>]) -> Option<Polygon<f64>> {
    let mut rings: Vec<LineString<f64>> = rings
        .iter()
        .map(|ring| {
            ring.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| Coord { x: p[0], y: p[1] })
                .collect::<Vec<_>>()
                .into()
        })
        .collect();
    if rings.is_empty() {
        return None;
    }
    let exterior = rings.remove(0);
    Some(Polygon::new(exterior, rings))
}

fn ring_to_json(ring: &LineString<f64>) -> Json {
    Json::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

fn polygon_to_json(polygon: &Polygon<f64>) -> Json {
    let mut rings = vec![ring_to_json(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring_to_json));
    Json::Array(rings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polygon_with_hole() {
        let feature = PolygonFeature::from_json(&json!({
            "id": "f1",
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                    [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
                ]
            },
            "properties": {"isVisible": true}
        }))
        .unwrap();

        assert_eq!(feature.id, "f1");
        assert_eq!(feature.geometry.0.len(), 1);
        assert_eq!(feature.geometry.0[0].interiors().len(), 1);
        assert_eq!(feature.properties.get("isVisible"), Some(&json!(true)));
    }

    #[test]
    fn test_empty_coordinates_are_valid() {
        let feature =
            PolygonFeature::from_json(&json!({"id": "feature_1", "geometry": {"coordinates": []}}))
                .unwrap();
        assert!(feature.geometry.0.is_empty());
        assert_eq!(feature.kind, GeometryKind::Untyped);
        assert_eq!(feature.to_json()["geometry"], json!({"coordinates": []}));
    }

    #[test]
    fn test_missing_geometry_is_rejected() {
        assert!(PolygonFeature::from_json(&json!({"id": "x"})).is_err());
        assert!(PolygonFeature::from_json(&json!({"geometry": {"coordinates": []}})).is_err());
        assert!(PolygonFeature::from_json(&json!({
            "id": "x",
            "geometry": {"type": "Polygon", "coordinates": [[["a", 1]]]}
        }))
        .is_err());
    }

    #[test]
    fn test_from_geojson_feature() {
        let text = r#"{
            "type": "Feature",
            "id": "g1",
            "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                [[[5, 5], [6, 5], [6, 6], [5, 5]]]
            ]},
            "properties": null
        }"#;
        let feature: geojson::Feature = text.parse().unwrap();
        let polygon = PolygonFeature::from_geojson(&feature).unwrap();
        assert_eq!(polygon.id, "g1");
        assert_eq!(polygon.geometry.0.len(), 2);
    }

    #[test]
    fn test_to_json_keeps_geometry_type() {
        let feature = PolygonFeature::from_json(&json!({
            "id": "f1",
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}
        }))
        .unwrap();
        let out = feature.to_json();
        assert_eq!(out["geometry"]["type"], json!("Polygon"));
        assert_eq!(PolygonFeature::from_json(&out).unwrap(), feature);
    }
}
