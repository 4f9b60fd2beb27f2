//! Hex grid, adjacency propagation, and dataset IO for Spider.
//!
//! This crate models the analysis grid as a directed graph: cells are nodes,
//! neighbour slots are edges. On top of that it provides the distance
//! propagation used when the user draws new infrastructure, the baseline
//! snapshot that lets a drawing be undone, and GeoJSON loading and export.
//!
//! # Modules
//!
//! - [`baseline`] -- Immutable snapshot of drawable attributes.
//! - [`error`] -- Error types for grid operations.
//! - [`geojson`] -- `FeatureCollection` loading and export.
//! - [`geometry`] -- GeoJSON geometries, great-circle distance, line
//!   sampling, and point-in-ring tests.
//! - [`hex_grid`] -- The cell container with neighbour and column queries.
//! - [`propagate`] -- Step-wise distance propagation from seed cells.
//! - [`seed`] -- Mapping drawn points and lines onto seed cells.

pub mod baseline;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod hex_grid;
pub mod propagate;
pub mod seed;

// Re-export primary types at crate root.
pub use baseline::Baseline;
pub use error::GridError;
pub use geojson::{load_cells, parse_feature_collection, read_hex_file, to_feature_collection};
pub use geometry::Geometry;
pub use hex_grid::HexGrid;
pub use propagate::{PropagationReport, propagate};
pub use seed::{SAMPLE_SPACING_KM, cell_at, select_seeds};
