//! Shared type definitions for the Spider hex-grid model.
//!
//! This crate is the single source of truth for the data contracts shared
//! by the propagator, the evaluators, and the map API. Types flow downstream
//! to `TypeScript` via `ts-rs` for the browser map front end.
//!
//! # Modules
//!
//! - [`cell`] -- Cells, cell indices, attribute values, coordinates
//! - [`params`] -- Parameter values and the parameter set
//! - [`request`] -- Propagation request

pub mod cell;
pub mod params;
pub mod request;

// Re-export all public types at crate root for convenience.
pub use cell::{AttrValue, Attributes, Cell, CellIndex, Coord, NEIGHBOR_COUNT};
pub use params::{ParameterSet, ParameterValue};
pub use request::PropagationRequest;

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        let _ = crate::CellIndex::export_all();
        let _ = crate::AttrValue::export_all();
        let _ = crate::ParameterValue::export_all();
        let _ = crate::PropagationRequest::export_all();
    }
}
