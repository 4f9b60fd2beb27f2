//! Input to one propagation run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cell::CellIndex;

/// One propagation run: relax `attribute` outward from `seeds`.
///
/// Seed cells receive `start_distance`; each further hex ring adds
/// `step_size` (the physical size of one hex ring, in the attribute's unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PropagationRequest {
    /// Cells the line or point touched.
    pub seeds: BTreeSet<CellIndex>,
    /// Name of the numeric attribute being relaxed (e.g. `grid_dist`).
    pub attribute: String,
    /// Value assigned to seed cells. Must be finite and non-negative.
    pub start_distance: f64,
    /// Increment per hex ring. Must be finite and strictly positive.
    pub step_size: f64,
}

impl PropagationRequest {
    /// Create a request from any collection of seed indices.
    pub fn new(
        seeds: impl IntoIterator<Item = CellIndex>,
        attribute: &str,
        start_distance: f64,
        step_size: f64,
    ) -> Self {
        Self {
            seeds: seeds.into_iter().collect(),
            attribute: attribute.to_owned(),
            start_distance,
            step_size,
        }
    }
}
