//! Error types for the spider-model crate.
//!
//! Evaluators never panic on bad input. A missing or mistyped parameter or
//! attribute surfaces as a [`ModelError`] naming the offending key.

/// Errors that can occur while evaluating a cell.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A parameter the model reads is not in the parameter set.
    #[error("missing parameter: {name}")]
    MissingParameter {
        /// The parameter name.
        name: String,
    },

    /// A parameter holds the wrong kind of value.
    #[error("parameter {name} should be a {expected}")]
    ParameterKind {
        /// The parameter name.
        name: String,
        /// The kind the model expected (`number` or `choice`).
        expected: &'static str,
    },

    /// A cell attribute the model reads is absent.
    #[error("missing attribute: {name}")]
    MissingAttribute {
        /// The attribute name.
        name: String,
    },

    /// A cell attribute holds the wrong kind of value.
    #[error("attribute {name} should be {expected}")]
    AttributeKind {
        /// The attribute name.
        name: String,
        /// The kind the model expected (`numeric` or `text`).
        expected: &'static str,
    },

    /// A categorical parameter holds a value the model does not know.
    #[error("parameter {name} has unrecognised choice {value:?}")]
    InvalidChoice {
        /// The parameter name.
        name: String,
        /// The value that was supplied.
        value: String,
    },

    /// No evaluator is registered under this name.
    #[error("unknown model: {0}")]
    UnknownModel(String),
}
