//! Deployment configuration and the interactive map session for Spider.
//!
//! # Modules
//!
//! - [`config`] -- Deployment configuration loaded from YAML: the model,
//!   the dataset, parameter definitions, and drawable infrastructure.
//! - [`session`] -- [`Session`], which owns the working grid, its baseline,
//!   and the derived attributes, and applies parameter changes, drawings,
//!   and resets atomically.
//!
//! [`Session`]: session::Session

pub mod config;
pub mod session;

pub use config::{
    ConfigError, InfraDef, InfraKind, LoggingConfig, ParameterDef, ServerConfig, SpiderConfig,
    ValueError,
};
pub use session::{CellView, DrawSummary, RecomputeSummary, ResetSummary, Session, SessionError};
