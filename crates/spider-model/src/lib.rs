//! Per-cell economic evaluators for Spider.
//!
//! An [`Evaluator`] turns one cell's static attributes and the current
//! parameter set into derived outputs (profit, costs, technology label).
//! Evaluators are pure and run independently for every cell; the session
//! re-runs them over the whole grid on each change.
//!
//! # Modules
//!
//! - [`error`] -- Error types for evaluation.
//! - [`evaluator`] -- The [`Evaluator`] trait and the [`ModelKind`] registry.
//! - [`inputs`] -- Lazy typed access to attributes and parameters, and
//!   output flooring.
//! - [`fish`] -- Fish-farm siting.
//! - [`irrigation`] -- Crop irrigation.
//! - [`hydrogen`] -- Green hydrogen production.
//! - [`example`] -- Minimal reference deployment.

pub mod error;
pub mod evaluator;
pub mod example;
pub mod fish;
pub mod hydrogen;
pub mod inputs;
pub mod irrigation;

// Re-export primary types at crate root.
pub use error::ModelError;
pub use evaluator::{Evaluator, ModelKind, NO_TECH, TECH};
pub use example::ExampleModel;
pub use fish::FishModel;
pub use hydrogen::HydrogenModel;
pub use inputs::{Inputs, floor};
pub use irrigation::IrrigationModel;
