/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! Reading and writing GeoJSON FeatureCollections for footprints, address
//! points and area boundaries. Coordinates are taken as-is; no reprojection is
//! performed.

use crate::features::{AddressPoint, Boundary, Footprint};
use bpc_common::structures::{Point2D, Polygon, Shape};
use bpc_common::{BpcError, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

fn decode_err<S: Into<String>>(msg: S) -> BpcError {
    BpcError::Decode(msg.into())
}

fn parse_position(v: &Value) -> Result<Point2D> {
    let coords = v
        .as_array()
        .ok_or_else(|| decode_err("a position must be an array of numbers"))?;
    if coords.len() < 2 {
        return Err(decode_err("a position needs at least two ordinates"));
    }
    let x = coords[0]
        .as_f64()
        .ok_or_else(|| decode_err("non-numeric x ordinate"))?;
    let y = coords[1]
        .as_f64()
        .ok_or_else(|| decode_err("non-numeric y ordinate"))?;
    Ok(Point2D::new(x, y))
}

fn parse_ring(v: &Value) -> Result<Vec<Point2D>> {
    v.as_array()
        .ok_or_else(|| decode_err("a linear ring must be an array of positions"))?
        .iter()
        .map(parse_position)
        .collect()
}

fn parse_polygon(v: &Value) -> Result<Polygon> {
    let rings = v
        .as_array()
        .ok_or_else(|| decode_err("polygon coordinates must be an array of rings"))?;
    let mut rings = rings.iter().map(parse_ring).collect::<Result<Vec<_>>>()?;
    if rings.is_empty() {
        return Err(decode_err("empty polygon"));
    }
    let exterior = rings.remove(0);
    Polygon::new(exterior, rings)
}

/// Decodes a GeoJSON geometry object.
pub fn geometry_from_geojson(geometry: &Value) -> Result<Shape> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| decode_err("geometry without a type"))?;
    let coords = geometry
        .get("coordinates")
        .ok_or_else(|| decode_err("geometry without coordinates"))?;
    match kind {
        "Point" => Ok(Shape::Point(parse_position(coords)?)),
        "Polygon" => Ok(Shape::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or_else(|| decode_err("multipolygon coordinates must be an array"))?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>>>()?;
            Ok(Shape::MultiPolygon(polys))
        }
        other => Err(decode_err(format!("unsupported geometry type '{}'", other))),
    }
}

fn ring_to_json(ring: &[Point2D]) -> Value {
    Value::Array(ring.iter().map(|p| json!([p.x, p.y])).collect())
}

pub fn polygon_to_geojson(polygon: &Polygon) -> Value {
    let mut rings = vec![ring_to_json(polygon.exterior())];
    rings.extend(polygon.holes().iter().map(|h| ring_to_json(h)));
    json!({ "type": "Polygon", "coordinates": rings })
}

pub fn point_to_geojson(p: &Point2D) -> Value {
    json!({ "type": "Point", "coordinates": [p.x, p.y] })
}

/// Wraps features in a FeatureCollection.
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

pub fn feature(properties: Map<String, Value>, geometry: Option<Value>) -> Value {
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": geometry.unwrap_or(Value::Null),
    })
}

/// Returns the feature array of a FeatureCollection document.
pub fn features_of(doc: &Value) -> Result<&Vec<Value>> {
    if doc.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(decode_err("the document is not a GeoJSON FeatureCollection"));
    }
    doc.get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| decode_err("the FeatureCollection has no features array"))
}

pub fn read_document(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn write_document(doc: &Value, path: &Path) -> Result<()> {
    fs::write(path, serde_json::to_string(doc)?)?;
    Ok(())
}

/// Reads an integer property, accepting numbers and numeric strings.
pub fn integer_property(feature: &Value, name: &str) -> Option<i64> {
    let v = feature.get("properties")?.get(name)?;
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0f64 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn string_property(feature: &Value, name: &str) -> Option<String> {
    match feature.get("properties")?.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn feature_geometry(feature: &Value) -> Result<Option<Shape>> {
    match feature.get("geometry") {
        None | Some(Value::Null) => Ok(None),
        Some(g) => geometry_from_geojson(g).map(Some),
    }
}

/// Parses building footprints from a FeatureCollection. The id is taken from
/// `id_field`, falling back to the feature's own `id` member. Single-part
/// MultiPolygons are accepted; features that are not polygonal are skipped.
pub fn parse_footprints(doc: &Value, id_field: &str) -> Result<Vec<Footprint>> {
    let mut footprints = vec![];
    for (i, f) in features_of(doc)?.iter().enumerate() {
        let id = integer_property(f, id_field)
            .or_else(|| f.get("id").and_then(Value::as_i64))
            .ok_or_else(|| {
                decode_err(format!(
                    "footprint feature {} has no integer '{}' property",
                    i, id_field
                ))
            })?;
        let geometry = match feature_geometry(f)? {
            Some(Shape::Polygon(p)) => p,
            Some(Shape::MultiPolygon(mut polys)) if polys.len() == 1 => polys.remove(0),
            Some(other) => {
                log::warn!(
                    "Skipping footprint {}: unsupported {} geometry",
                    id,
                    other.type_name()
                );
                continue;
            }
            None => {
                log::warn!("Skipping footprint {}: missing geometry", id);
                continue;
            }
        };
        footprints.push(Footprint { id, geometry });
    }
    Ok(footprints)
}

/// Parses address points carrying a `uprn` property.
pub fn parse_addresses(doc: &Value) -> Result<Vec<AddressPoint>> {
    let mut addresses = vec![];
    for (i, f) in features_of(doc)?.iter().enumerate() {
        let uprn = integer_property(f, "uprn")
            .ok_or_else(|| decode_err(format!("address feature {} has no 'uprn' property", i)))?;
        match feature_geometry(f)? {
            Some(Shape::Point(location)) => addresses.push(AddressPoint { uprn, location }),
            _ => log::warn!("Skipping address {}: not a point", uprn),
        }
    }
    Ok(addresses)
}

/// Parses administrative boundaries keyed by `code_field`, e.g. `lad21cd`.
pub fn parse_boundaries(doc: &Value, code_field: &str) -> Result<Vec<Boundary>> {
    let mut boundaries = vec![];
    for (i, f) in features_of(doc)?.iter().enumerate() {
        let code = string_property(f, code_field).ok_or_else(|| {
            decode_err(format!("boundary feature {} has no '{}' property", i, code_field))
        })?;
        let polygons = match feature_geometry(f)? {
            Some(Shape::Polygon(p)) => vec![p],
            Some(Shape::MultiPolygon(v)) => v,
            _ => {
                return Err(decode_err(format!(
                    "boundary '{}' does not have a polygonal geometry",
                    code
                )))
            }
        };
        boundaries.push(Boundary { code, polygons });
    }
    Ok(boundaries)
}

pub fn read_footprints(path: &Path, id_field: &str) -> Result<Vec<Footprint>> {
    parse_footprints(&read_document(path)?, id_field)
}

pub fn read_addresses(path: &Path) -> Result<Vec<AddressPoint>> {
    parse_addresses(&read_document(path)?)
}

pub fn read_boundaries(path: &Path, code_field: &str) -> Result<Vec<Boundary>> {
    parse_boundaries(&read_document(path)?, code_field)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn footprint_doc() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "gid": 17 },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "id": 18,
                    "properties": {},
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [[[[20.0, 0.0], [24.0, 0.0], [24.0, 3.0], [20.0, 0.0]]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "gid": "19" },
                    "geometry": { "type": "Point", "coordinates": [1.0, 1.0] }
                }
            ]
        })
    }

    #[test]
    fn test_parse_footprints() {
        let fps = parse_footprints(&footprint_doc(), "gid").unwrap();
        assert_eq!(fps.len(), 2);
        assert_eq!(fps[0].id, 17);
        assert_eq!(fps[0].geometry.area(), 100.0);
        assert_eq!(fps[1].id, 18);
        assert_eq!(fps[1].geometry.exterior().len(), 4);
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [{ "type": "Feature", "properties": {}, "geometry": null }]
        });
        assert!(parse_footprints(&doc, "gid").is_err());
        assert!(parse_footprints(&json!({ "type": "Feature" }), "gid").is_err());
    }

    #[test]
    fn test_parse_addresses_and_boundaries() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "uprn": 100023336956i64 },
                  "geometry": { "type": "Point", "coordinates": [5.0, 5.0] } }
            ]
        });
        let addrs = parse_addresses(&doc).unwrap();
        assert_eq!(addrs[0].uprn, 100023336956);
        assert_eq!(addrs[0].location, Point2D::new(5.0, 5.0));

        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "lad21cd": "E06000014" },
                  "geometry": { "type": "Polygon",
                                "coordinates": [[[-5.0, -5.0], [50.0, -5.0], [50.0, 50.0], [-5.0, 50.0]]] } }
            ]
        });
        let bounds = parse_boundaries(&doc, "lad21cd").unwrap();
        assert_eq!(bounds[0].code, "E06000014");
        assert!(bounds[0].intersects(&Polygon::rectangle(0.0, 0.0, 1.0, 1.0).unwrap()));
        assert!(!bounds[0].intersects(&Polygon::rectangle(60.0, 0.0, 61.0, 1.0).unwrap()));
    }

    #[test]
    fn test_written_document_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("footprints.json");
        let poly = Polygon::rectangle(1.0, 2.0, 3.0, 4.0).unwrap();
        let mut props = Map::new();
        props.insert("id_fp".to_string(), json!(7));
        let doc = feature_collection(vec![feature(props, Some(polygon_to_geojson(&poly)))]);
        write_document(&doc, &path).unwrap();
        let fps = read_footprints(&path, "id_fp").unwrap();
        assert_eq!(fps, vec![Footprint { id: 7, geometry: poly }]);
    }
}
