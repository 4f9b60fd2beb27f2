//! Error types for the `spider-grid` crate.
//!
//! All fallible operations in this crate return [`GridError`] through the
//! standard [`Result`] type alias.

use spider_types::CellIndex;

/// Errors that can occur while building, loading, or mutating a hex grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A cell index does not exist in the grid.
    #[error("cell not found: {0}")]
    CellNotFound(CellIndex),

    /// A cell's `index` does not match its position in the container.
    #[error("cell at position {position} carries index {index}")]
    IndexMismatch {
        /// Position in the container.
        position: usize,
        /// Index the cell declared.
        index: CellIndex,
    },

    /// Two cells declared the same index.
    #[error("duplicate cell index: {0}")]
    DuplicateIndex(CellIndex),

    /// The dataset holds more cells than a [`CellIndex`] can address.
    #[error("too many cells: {0}")]
    TooManyCells(usize),

    /// A cell lacks the named attribute, or holds a non-numeric value.
    #[error("cell {cell} has no numeric attribute {attribute:?}")]
    MissingAttribute {
        /// The offending cell.
        cell: CellIndex,
        /// The attribute name.
        attribute: String,
    },

    /// Propagation step size must be finite and strictly positive.
    #[error("invalid step size: {0}")]
    InvalidStepSize(f64),

    /// Propagation start distance must be finite and non-negative.
    #[error("invalid start distance: {0}")]
    InvalidStartDistance(f64),

    /// The baseline snapshot does not track the requested attribute.
    #[error("attribute {0:?} is not tracked by the baseline")]
    UntrackedAttribute(String),

    /// The baseline was captured from a grid of a different size.
    #[error("baseline holds {expected} cells but grid holds {found}")]
    BaselineMismatch {
        /// Cell count at capture time.
        expected: usize,
        /// Cell count of the grid being restored.
        found: usize,
    },

    /// A GeoJSON feature is malformed.
    #[error("feature {feature}: {reason}")]
    InvalidFeature {
        /// Position of the feature in the collection.
        feature: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A geometry type cannot be used for the requested operation.
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// Malformed JSON.
    #[error("invalid JSON: {source}")]
    Json {
        /// The underlying parse error.
        #[from]
        source: serde_json::Error,
    },

    /// Failed to read a dataset from disk.
    #[error("failed to read dataset: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
