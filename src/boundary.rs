//! GeoJSON boundary files and geometry parsing.
use crate::error::{DataError, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// One outline of a boundary file, with the code used to join map data.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub code: String,
    pub geometry: MultiPolygon<f64>,
}

/// Read a FeatureCollection, taking each feature's join code from
/// `feature_id_key` (e.g. `properties.DDEP_C_COD`).
pub fn load_boundaries(path: &Path, feature_id_key: &str) -> Result<Vec<BoundaryFeature>> {
    let bytes = std::fs::read(path).map_err(|e| DataError::io(path.display().to_string(), e))?;
    let features = read_boundaries_from_bytes(&bytes, feature_id_key)?;
    info!("loaded {} boundary features from {}", features.len(), path.display());
    Ok(features)
}

pub fn read_boundaries_from_bytes(bytes: &[u8], feature_id_key: &str) -> Result<Vec<BoundaryFeature>> {
    let value: Value = serde_json::from_slice(bytes)?;
    let features = value["features"]
        .as_array()
        .ok_or_else(|| DataError::Geometry("boundary file has no \"features\" array".to_string()))?;

    let mut out = Vec::with_capacity(features.len());
    let mut missing_code = 0usize;
    for feature in features {
        let Some(code) = resolve_path(feature, feature_id_key).and_then(value_to_code) else {
            missing_code += 1;
            continue;
        };
        let geometry = parse_geometry(&feature["geometry"])?;
        out.push(BoundaryFeature { code, geometry });
    }
    if missing_code > 0 {
        warn!(missing_code, key = feature_id_key, "boundary features without a join code were skipped");
    }
    Ok(out)
}

/// Follow a dotted path (`properties.CODE`) through nested objects.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}

fn value_to_code(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Convert a GeoJSON `Polygon` or `MultiPolygon` object. `null` gives an
/// empty shape.
pub fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    if geometry.is_null() {
        return Ok(MultiPolygon(vec![]));
    }
    let coords = geometry["coordinates"]
        .as_array()
        .ok_or_else(|| DataError::Geometry("geometry has no coordinates".to_string()))?;
    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon(coords)?])),
        Some("MultiPolygon") => {
            let polygons = coords
                .iter()
                .map(|p| {
                    p.as_array()
                        .ok_or_else(|| DataError::Geometry("polygon is not an array".to_string()))
                        .and_then(|rings| parse_polygon(rings))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(MultiPolygon(polygons))
        }
        other => Err(DataError::Geometry(format!("unsupported geometry type {other:?}"))),
    }
}

/// Parse a geometry stored as JSON text (reference table cells).
pub fn parse_geometry_str(text: &str) -> Result<MultiPolygon<f64>> {
    if text.trim().is_empty() {
        return Ok(MultiPolygon(vec![]));
    }
    let value: Value = serde_json::from_str(text)?;
    parse_geometry(&value)
}

/// Rings: exterior first, holes after.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| DataError::Geometry("ring is not an array".to_string()))
            .and_then(|coords| parse_ring(coords))
    });
    let exterior = rings
        .next()
        .ok_or_else(|| DataError::Geometry("polygon without exterior ring".to_string()))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_ring(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());
    for pair in coords {
        let (Some(x), Some(y)) = (pair[0].as_f64(), pair[1].as_f64()) else {
            return Err(DataError::Geometry("coordinate must be [x, y] numbers".to_string()));
        };
        points.push(Coord { x, y });
    }
    // close the ring
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if first != last {
            points.push(first);
        }
    }
    Ok(LineString(points))
}
