//! Model parameters: the slider and drop-down values fed to the evaluator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Current value of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum ParameterValue {
    /// A scalar slider value.
    Number(f64),
    /// A categorical choice (e.g. irrigation technology).
    Choice(String),
}

impl ParameterValue {
    /// Return the numeric value, or `None` for a categorical choice.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Choice(_) => None,
        }
    }

    /// Return the categorical choice, or `None` for a number.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Choice(s) => Some(s),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Choice(value.to_owned())
    }
}

/// Mapping from parameter name to its current value.
///
/// Supplied from UI state and read-only to the evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, ParameterValue>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Builder-style helper to set one value.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<ParameterValue>) -> Self {
        self.values.insert(name.to_owned(), value.into());
        self
    }

    /// Set a value, returning the previous one if present.
    pub fn insert(&mut self, name: &str, value: ParameterValue) -> Option<ParameterValue> {
        self.values.insert(name.to_owned(), value)
    }

    /// Look up a value by name.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// Whether a parameter with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.values.iter()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, ParameterValue)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, ParameterValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
