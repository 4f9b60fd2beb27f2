//! Hexagon cells: identity, adjacency, and attribute values.
//!
//! A [`Cell`] is one spatial unit of the analysis grid. It carries a stable
//! [`CellIndex`], six directed neighbour slots, a bag of named attributes
//! loaded from the dataset, and the outer ring of its polygon footprint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of neighbour slots on every hexagon (`n0` through `n5`).
pub const NEIGHBOR_COUNT: usize = 6;

/// Named attribute values of one cell, ordered by name.
pub type Attributes = BTreeMap<String, AttrValue>;

// ---------------------------------------------------------------------------
// CellIndex
// ---------------------------------------------------------------------------

/// Identifier of a cell, equal to its position in the grid container.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct CellIndex(pub u32);

impl CellIndex {
    /// Position of this cell in a `Vec`-backed container.
    pub const fn position(self) -> usize {
        self.0 as usize
    }

    /// Build an index from a container position.
    ///
    /// Returns `None` if the position does not fit in a `u32`.
    pub fn from_position(position: usize) -> Option<Self> {
        u32::try_from(position).ok().map(Self)
    }
}

impl core::fmt::Display for CellIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CellIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

// ---------------------------------------------------------------------------
// AttrValue
// ---------------------------------------------------------------------------

/// A single attribute value: numeric quantity or categorical label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum AttrValue {
    /// A numeric quantity (distance, population, cost, ...).
    Number(f64),
    /// A categorical label (technology, county name, ...).
    Text(String),
}

impl AttrValue {
    /// Return the numeric value, or `None` for text.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Return the text value, or `None` for numbers.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    /// Convert a JSON property value.
    ///
    /// Numbers and strings map to [`AttrValue::Number`] and
    /// [`AttrValue::Text`]. Booleans, nulls, arrays and objects have no
    /// attribute representation and yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Convert into a JSON value for export.
    ///
    /// Non-finite numbers have no JSON representation and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// ---------------------------------------------------------------------------
// Coord
// ---------------------------------------------------------------------------

/// A longitude/latitude pair in degrees (WGS84), serialised as `[lon, lat]`.
///
/// Deserialisation accepts GeoJSON positions with a trailing altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Coord {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Coord {
    /// Create a coordinate from longitude and latitude.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coord {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl TryFrom<Vec<f64>> for Coord {
    type Error = String;

    fn try_from(position: Vec<f64>) -> Result<Self, Self::Error> {
        match position.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            _ => Err(format!(
                "position needs at least 2 elements, got {}",
                position.len()
            )),
        }
    }
}

impl From<Coord> for [f64; 2] {
    fn from(c: Coord) -> Self {
        [c.lon, c.lat]
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One hexagon of the analysis grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Stable identifier, equal to the cell's position in its grid.
    pub index: CellIndex,
    /// Neighbour slots `n0..n5`. `None` marks "no neighbour" (map edge).
    ///
    /// Slots are a directed lookup. A `Some` value may still point outside
    /// the grid; lookups skip such entries.
    pub neighbors: [Option<CellIndex>; NEIGHBOR_COUNT],
    /// Static attributes assigned at load time.
    pub attributes: Attributes,
    /// Outer ring of the hexagon polygon. Empty when the dataset carries no
    /// geometry.
    #[serde(default)]
    pub footprint: Vec<Coord>,
}

impl Cell {
    /// Create a cell with no attributes and no footprint.
    pub const fn new(index: CellIndex, neighbors: [Option<CellIndex>; NEIGHBOR_COUNT]) -> Self {
        Self {
            index,
            neighbors,
            attributes: BTreeMap::new(),
            footprint: Vec::new(),
        }
    }

    /// Builder-style helper to set one attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.to_owned(), value.into());
        self
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Look up a numeric attribute. Text or missing attributes yield `None`.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).and_then(AttrValue::as_number)
    }

    /// Overwrite (or insert) a numeric attribute.
    pub fn set_number(&mut self, name: &str, value: f64) {
        self.attributes
            .insert(name.to_owned(), AttrValue::Number(value));
    }

    /// Iterate over the non-sentinel neighbour slots.
    ///
    /// Range checking against a concrete grid is the grid's job.
    pub fn neighbor_indices(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.neighbors.iter().flatten().copied()
    }
}
