//! Lazy, typed access to a cell's attributes and the parameter set.
//!
//! Evaluators read their inputs one key at a time through [`Inputs`], so a
//! branch that is never taken never demands its inputs.

use spider_types::{AttrValue, Attributes, ParameterSet, ParameterValue};

use crate::error::ModelError;

/// The two read-only inputs of one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'a> {
    attributes: &'a Attributes,
    parameters: &'a ParameterSet,
}

impl<'a> Inputs<'a> {
    /// Pair a cell's attributes with the current parameters.
    pub const fn new(attributes: &'a Attributes, parameters: &'a ParameterSet) -> Self {
        Self {
            attributes,
            parameters,
        }
    }

    /// A numeric cell attribute.
    pub fn attr(&self, name: &str) -> Result<f64, ModelError> {
        match self.attributes.get(name) {
            Some(AttrValue::Number(n)) => Ok(*n),
            Some(AttrValue::Text(_)) => Err(ModelError::AttributeKind {
                name: name.to_owned(),
                expected: "numeric",
            }),
            None => Err(ModelError::MissingAttribute {
                name: name.to_owned(),
            }),
        }
    }

    /// A text cell attribute.
    pub fn text(&self, name: &str) -> Result<&'a str, ModelError> {
        match self.attributes.get(name) {
            Some(AttrValue::Text(s)) => Ok(s),
            Some(AttrValue::Number(_)) => Err(ModelError::AttributeKind {
                name: name.to_owned(),
                expected: "text",
            }),
            None => Err(ModelError::MissingAttribute {
                name: name.to_owned(),
            }),
        }
    }

    /// A numeric parameter.
    pub fn par(&self, name: &str) -> Result<f64, ModelError> {
        match self.parameters.get(name) {
            Some(ParameterValue::Number(n)) => Ok(*n),
            Some(ParameterValue::Choice(_)) => Err(ModelError::ParameterKind {
                name: name.to_owned(),
                expected: "number",
            }),
            None => Err(ModelError::MissingParameter {
                name: name.to_owned(),
            }),
        }
    }

    /// A categorical parameter.
    pub fn choice(&self, name: &str) -> Result<&'a str, ModelError> {
        match self.parameters.get(name) {
            Some(ParameterValue::Choice(c)) => Ok(c),
            Some(ParameterValue::Number(_)) => Err(ModelError::ParameterKind {
                name: name.to_owned(),
                expected: "choice",
            }),
            None => Err(ModelError::MissingParameter {
                name: name.to_owned(),
            }),
        }
    }
}

/// Clamp a numeric output to be non-negative. `NaN` becomes 0.
pub fn floor(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

/// Insert a floored numeric output.
pub fn put_number(out: &mut Attributes, name: &str, value: f64) {
    out.insert(name.to_owned(), AttrValue::Number(floor(value)));
}

/// Insert a categorical output.
pub fn put_text(out: &mut Attributes, name: &str, value: &str) {
    out.insert(name.to_owned(), AttrValue::Text(value.to_owned()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_report_the_offending_key() {
        let attrs: Attributes = [
            ("pop".to_owned(), AttrValue::Number(10.0)),
            ("adm1".to_owned(), AttrValue::Text("Siaya".to_owned())),
        ]
        .into_iter()
        .collect();
        let pars = ParameterSet::new().with("duration", 10.0).with("state", "Liquid");
        let inputs = Inputs::new(&attrs, &pars);

        assert_eq!(inputs.attr("pop"), Ok(10.0));
        assert_eq!(inputs.text("adm1"), Ok("Siaya"));
        assert_eq!(inputs.par("duration"), Ok(10.0));
        assert_eq!(inputs.choice("state"), Ok("Liquid"));

        assert_eq!(
            inputs.attr("precip"),
            Err(ModelError::MissingAttribute { name: "precip".to_owned() })
        );
        assert!(matches!(inputs.attr("adm1"), Err(ModelError::AttributeKind { .. })));
        assert!(matches!(inputs.text("pop"), Err(ModelError::AttributeKind { .. })));
        assert!(matches!(inputs.par("state"), Err(ModelError::ParameterKind { .. })));
        assert!(matches!(inputs.choice("duration"), Err(ModelError::ParameterKind { .. })));
        assert!(matches!(inputs.par("rate"), Err(ModelError::MissingParameter { .. })));
    }

    #[test]
    fn floor_clamps_negatives_and_nan() {
        assert!(floor(-3.0).abs() < f64::EPSILON);
        assert!(floor(f64::NAN).abs() < f64::EPSILON);
        assert!((floor(2.5) - 2.5).abs() < f64::EPSILON);
        assert!(floor(f64::INFINITY).is_infinite());
    }
}
