//! Minimal reference deployment.
//!
//! Shows the smallest useful evaluator: revenue from distance to the city,
//! fixed government and social figures.

use spider_types::{Attributes, ParameterSet};

use crate::error::ModelError;
use crate::evaluator::Evaluator;
use crate::inputs::{Inputs, put_number};

const OUTPUTS: &[&str] = &["revenue", "profit", "gov_costs", "gov_annual", "social"];

/// The example deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleModel;

impl Evaluator for ExampleModel {
    fn name(&self) -> &'static str {
        "example"
    }

    fn outputs(&self) -> &'static [&'static str] {
        OUTPUTS
    }

    fn evaluate(
        &self,
        attributes: &Attributes,
        parameters: &ParameterSet,
    ) -> Result<Attributes, ModelError> {
        let inputs = Inputs::new(attributes, parameters);
        let revenue = inputs.attr("city_dist")? * 2.0;

        let mut out = Attributes::new();
        put_number(&mut out, "revenue", revenue);
        put_number(&mut out, "profit", revenue / 10.0);
        put_number(&mut out, "gov_costs", 100.0 * inputs.par("duration")?);
        put_number(&mut out, "gov_annual", 20.0);
        put_number(&mut out, "social", 15.0);
        Ok(out)
    }
}
