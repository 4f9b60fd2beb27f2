//! Immutable snapshot of drawable attributes, captured once at load.
//!
//! Drawing only ever lowers an attribute. Undoing a drawing means restoring
//! the values the dataset shipped with, which the [`Baseline`] keeps.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::GridError;
use crate::hex_grid::HexGrid;

/// Original per-cell values of the attributes that can be drawn on.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    /// Attribute name -> value per cell, in index order.
    columns: BTreeMap<String, Vec<f64>>,
}

impl Baseline {
    /// Capture the current values of `attributes` from `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingAttribute`] if any cell lacks a numeric
    /// value for one of the attributes.
    pub fn capture<'a>(
        grid: &HexGrid,
        attributes: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, GridError> {
        let mut columns = BTreeMap::new();
        for attribute in attributes {
            columns.insert(attribute.to_owned(), grid.column(attribute)?);
        }
        Ok(Self { columns })
    }

    /// Whether `attribute` was captured.
    pub fn tracks(&self, attribute: &str) -> bool {
        self.columns.contains_key(attribute)
    }

    /// Names of the captured attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// The original values of one attribute, in index order.
    pub fn column(&self, attribute: &str) -> Option<&[f64]> {
        self.columns.get(attribute).map(Vec::as_slice)
    }

    /// Write the original values of `attribute` back onto `grid`.
    ///
    /// Returns the number of cells whose value changed.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UntrackedAttribute`] if the attribute was not
    /// captured, or [`GridError::BaselineMismatch`] if the grid size differs
    /// from capture time.
    pub fn restore(&self, grid: &mut HexGrid, attribute: &str) -> Result<usize, GridError> {
        let values = self
            .columns
            .get(attribute)
            .ok_or_else(|| GridError::UntrackedAttribute(attribute.to_owned()))?;
        let changed = grid.set_column(attribute, values)?;
        debug!(attribute, changed, "attribute restored from baseline");
        Ok(changed)
    }
}
