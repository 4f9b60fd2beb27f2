//! The evaluator strategy and the registry of deployments.
//!
//! Each deployment (fish farms, irrigation, hydrogen) supplies one
//! [`Evaluator`]. The session picks the implementation from configuration
//! through [`ModelKind`] and calls it once per cell on every pass.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use spider_types::{Attributes, ParameterSet};

use crate::error::ModelError;
use crate::example::ExampleModel;
use crate::fish::FishModel;
use crate::hydrogen::HydrogenModel;
use crate::irrigation::IrrigationModel;

/// Name of the categorical technology output.
pub const TECH: &str = "tech";

/// Technology label of a cell that fails eligibility.
pub const NO_TECH: &str = "none";

/// A deterministic per-cell economic model.
///
/// Implementations are pure: the same attributes and parameters always give
/// the same outputs, and no cell ever sees another cell's values.
pub trait Evaluator: Send + Sync {
    /// Deployment name.
    fn name(&self) -> &'static str;

    /// Names of the numeric outputs, in display order.
    fn outputs(&self) -> &'static [&'static str];

    /// Compute the derived attributes of one cell.
    ///
    /// Every numeric output is floored at 0.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when a parameter or attribute the model reads
    /// is missing, of the wrong kind, or an unrecognised choice.
    fn evaluate(
        &self,
        attributes: &Attributes,
        parameters: &ParameterSet,
    ) -> Result<Attributes, ModelError>;
}

/// The evaluators available to a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Fish-farm siting.
    Fish,
    /// Crop irrigation.
    Irrigation,
    /// Green hydrogen production.
    Hydrogen,
    /// Minimal reference deployment.
    Example,
}

impl ModelKind {
    /// All kinds, in registry order.
    pub const ALL: [Self; 4] = [Self::Fish, Self::Irrigation, Self::Hydrogen, Self::Example];

    /// Lower-case name used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fish => "fish",
            Self::Irrigation => "irrigation",
            Self::Hydrogen => "hydrogen",
            Self::Example => "example",
        }
    }

    /// Construct the evaluator for this kind.
    pub fn build(self) -> Box<dyn Evaluator> {
        match self {
            Self::Fish => Box::new(FishModel),
            Self::Irrigation => Box::new(IrrigationModel),
            Self::Hydrogen => Box::new(HydrogenModel),
            Self::Example => Box::new(ExampleModel),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownModel(s.to_owned()))
    }
}
