//! Loading the hexagon dataset from GeoJSON and exporting it back.
//!
//! Every feature must carry an integer `index` property and the six
//! neighbour keys `n0`..`n5`. A neighbour value of `null` or any negative
//! integer is read as "no neighbour". All other numeric and string
//! properties become cell attributes; booleans, arrays and objects are
//! ignored.

use std::path::Path;

use serde_json::{Map, Value, json};
use spider_types::{AttrValue, Attributes, Cell, CellIndex, Coord, NEIGHBOR_COUNT};
use tracing::info;

use crate::error::GridError;
use crate::geometry::Geometry;
use crate::hex_grid::HexGrid;

/// Property holding the cell index.
pub const INDEX_KEY: &str = "index";

/// Property names of the neighbour slots, in slot order.
pub const NEIGHBOR_KEYS: [&str; NEIGHBOR_COUNT] = ["n0", "n1", "n2", "n3", "n4", "n5"];

fn invalid(feature: usize, reason: impl Into<String>) -> GridError {
    GridError::InvalidFeature {
        feature,
        reason: reason.into(),
    }
}

fn read_index(feature: usize, value: Option<&Value>) -> Result<CellIndex, GridError> {
    let value = value.ok_or_else(|| invalid(feature, "missing \"index\" property"))?;
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .map(CellIndex)
        .ok_or_else(|| invalid(feature, format!("\"index\" is not a cell index: {value}")))
}

/// Caller guarantees `f` is integral and within `0..=u32::MAX`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integral_to_u32(f: f64) -> u32 {
    f as u32
}

fn read_neighbor(feature: usize, key: &str, value: Option<&Value>) -> Result<Option<CellIndex>, GridError> {
    match value {
        None => Err(invalid(feature, format!("missing {key:?} property"))),
        Some(Value::Null) => Ok(None),
        Some(v) => {
            if let Some(n) = v.as_i64() {
                if n < 0 {
                    return Ok(None);
                }
                return u32::try_from(n)
                    .map(|n| Some(CellIndex(n)))
                    .map_err(|_| invalid(feature, format!("{key:?} out of range: {n}")));
            }
            // Floats that hold an integer ("3.0") are common in exported tables.
            match v.as_f64() {
                Some(f) if f.fract() == 0.0 && f < 0.0 => Ok(None),
                Some(f) if f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
                    Ok(Some(CellIndex(integral_to_u32(f))))
                }
                _ => Err(invalid(feature, format!("{key:?} is not an integer: {v}"))),
            }
        }
    }
}

fn parse_feature(position: usize, feature: &Value) -> Result<Cell, GridError> {
    let properties = feature
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(position, "missing properties object"))?;

    let index = read_index(position, properties.get(INDEX_KEY))?;

    let mut neighbors = [None; NEIGHBOR_COUNT];
    for (slot, key) in neighbors.iter_mut().zip(NEIGHBOR_KEYS) {
        *slot = read_neighbor(position, key, properties.get(key))?;
    }

    let mut cell = Cell::new(index, neighbors);
    for (key, value) in properties {
        if key == INDEX_KEY || NEIGHBOR_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Some(attr) = AttrValue::from_json(value) {
            cell.attributes.insert(key.clone(), attr);
        }
    }

    match feature.get("geometry") {
        None | Some(Value::Null) => {}
        Some(raw) => {
            let geometry: Geometry = serde_json::from_value(raw.clone())
                .map_err(|e| invalid(position, format!("bad geometry: {e}")))?;
            if let Some(ring) = geometry.outer_ring() {
                cell.footprint = ring.to_vec();
            }
        }
    }

    Ok(cell)
}

/// Build a grid from a parsed GeoJSON `FeatureCollection`.
///
/// # Errors
///
/// Returns [`GridError::InvalidFeature`] for the first malformed feature,
/// or the container errors of [`HexGrid::from_unordered`] when the indices
/// are duplicated or not dense.
pub fn load_cells(collection: &Value) -> Result<HexGrid, GridError> {
    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(0, "not a FeatureCollection: no features array"))?;

    let cells = features
        .iter()
        .enumerate()
        .map(|(position, feature)| parse_feature(position, feature))
        .collect::<Result<Vec<_>, _>>()?;

    HexGrid::from_unordered(cells)
}

/// Parse GeoJSON text into a grid.
///
/// # Errors
///
/// Returns [`GridError::Json`] for malformed JSON, otherwise as
/// [`load_cells`].
pub fn parse_feature_collection(text: &str) -> Result<HexGrid, GridError> {
    let value: Value = serde_json::from_str(text)?;
    load_cells(&value)
}

/// Read a GeoJSON dataset from disk.
///
/// # Errors
///
/// Returns [`GridError::Io`] if the file cannot be read, otherwise as
/// [`parse_feature_collection`].
pub fn read_hex_file(path: &Path) -> Result<HexGrid, GridError> {
    let text = std::fs::read_to_string(path)?;
    let grid = parse_feature_collection(&text)?;
    info!(path = %path.display(), cells = grid.len(), "hex dataset loaded");
    Ok(grid)
}

fn footprint_geometry(footprint: &[Coord]) -> Value {
    if footprint.is_empty() {
        return Value::Null;
    }
    json!({
        "type": "Polygon",
        "coordinates": [footprint.iter().map(|c| [c.lon, c.lat]).collect::<Vec<_>>()],
    })
}

/// Export the grid as a `FeatureCollection`.
///
/// Each feature carries the index, the neighbour slots (`null` for
/// sentinels), the static attributes, and the matching entry of `derived`
/// when there is one. Derived values win over static ones of the same name.
pub fn to_feature_collection(grid: &HexGrid, derived: &[Attributes]) -> Value {
    let features: Vec<Value> = grid
        .iter()
        .map(|cell| {
            let mut properties = Map::new();
            properties.insert(INDEX_KEY.to_owned(), json!(cell.index.0));
            for (key, slot) in NEIGHBOR_KEYS.iter().zip(&cell.neighbors) {
                let value = slot.map_or(Value::Null, |n| json!(n.0));
                properties.insert((*key).to_owned(), value);
            }
            for (key, value) in &cell.attributes {
                properties.insert(key.clone(), value.to_json());
            }
            if let Some(outputs) = derived.get(cell.index.position()) {
                for (key, value) in outputs {
                    properties.insert(key.clone(), value.to_json());
                }
            }
            json!({
                "type": "Feature",
                "id": cell.index.0,
                "properties": properties,
                "geometry": footprint_geometry(&cell.footprint),
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(index: i64, neighbors: [Value; 6], extra: Value) -> Value {
        let mut properties = json!({ "index": index });
        for (key, n) in NEIGHBOR_KEYS.iter().zip(neighbors) {
            properties[*key] = n;
        }
        if let (Some(props), Some(extra)) = (properties.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                props.insert(k.clone(), v.clone());
            }
        }
        json!({
            "type": "Feature",
            "properties": properties,
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            }
        })
    }

    fn two_cells() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                feature(1, [json!(0), json!(-1), Value::Null, json!(-1), json!(-1), json!(-1)],
                        json!({ "grid_dist": 40.0, "county": "Kisumu", "flag": true })),
                feature(0, [json!(1), json!(-1), json!(-1), json!(-1), json!(-1), json!(-1)],
                        json!({ "grid_dist": 20 })),
            ]
        })
    }

    #[test]
    fn loads_and_orders_cells() {
        let grid = load_cells(&two_cells()).unwrap_or_default();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.neighbors(CellIndex(0)), vec![CellIndex(1)]);
        assert_eq!(grid.neighbors(CellIndex(1)), vec![CellIndex(0)]);
        assert_eq!(grid.number(CellIndex(0), "grid_dist").ok(), Some(20.0));

        let cell = grid.get(CellIndex(1));
        assert_eq!(cell.and_then(|c| c.attribute("county")).and_then(AttrValue::as_text), Some("Kisumu"));
        assert!(cell.and_then(|c| c.attribute("flag")).is_none());
        assert_eq!(cell.map(|c| c.footprint.len()), Some(4));
    }

    #[test]
    fn missing_neighbor_key_is_rejected() {
        let mut collection = two_cells();
        if let Some(props) = collection["features"][0]["properties"].as_object_mut() {
            props.remove("n4");
        }
        assert!(matches!(
            load_cells(&collection),
            Err(GridError::InvalidFeature { feature: 0, .. })
        ));
    }

    #[test]
    fn fractional_neighbor_is_rejected() {
        let mut collection = two_cells();
        collection["features"][1]["properties"]["n2"] = json!(1.5);
        assert!(matches!(
            load_cells(&collection),
            Err(GridError::InvalidFeature { feature: 1, .. })
        ));
    }

    #[test]
    fn integral_float_neighbor_is_accepted() {
        let mut collection = two_cells();
        collection["features"][1]["properties"]["n0"] = json!(1.0);
        let grid = load_cells(&collection).unwrap_or_default();
        assert_eq!(grid.neighbors(CellIndex(0)), vec![CellIndex(1)]);
    }

    #[test]
    fn missing_index_is_rejected() {
        let mut collection = two_cells();
        if let Some(props) = collection["features"][0]["properties"].as_object_mut() {
            props.remove("index");
        }
        assert!(load_cells(&collection).is_err());
    }

    #[test]
    fn malformed_text_is_a_json_error() {
        assert!(matches!(
            parse_feature_collection("{ not json"),
            Err(GridError::Json { .. })
        ));
    }

    #[test]
    fn export_merges_derived_and_nulls_sentinels() {
        let grid = load_cells(&two_cells()).unwrap_or_default();
        let mut derived = vec![Attributes::new(); 2];
        if let Some(first) = derived.first_mut() {
            first.insert("profit".to_owned(), AttrValue::Number(12.0));
            first.insert("grid_dist".to_owned(), AttrValue::Number(f64::NAN));
        }
        let out = to_feature_collection(&grid, &derived);

        let features = out["features"].as_array().cloned().unwrap_or_default();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["id"], json!(0));
        assert_eq!(features[0]["properties"]["profit"], json!(12.0));
        assert_eq!(features[0]["properties"]["grid_dist"], Value::Null);
        assert_eq!(features[0]["properties"]["n1"], Value::Null);
        assert_eq!(features[1]["properties"]["n0"], json!(0));
        assert_eq!(features[1]["geometry"]["type"], json!("Polygon"));
    }

    #[test]
    fn export_then_load_preserves_the_grid() {
        let grid = load_cells(&two_cells()).unwrap_or_default();
        let again = load_cells(&to_feature_collection(&grid, &[])).unwrap_or_default();
        assert_eq!(grid, again);
    }
}
