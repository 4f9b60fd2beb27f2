//! Error types for the `spider` binary.

/// Top-level error for the `spider` binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: spider_core::ConfigError,
    },

    /// The session rejected a load, parameter, or drawing.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: spider_core::SessionError,
    },

    /// The HTTP server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: spider_server::ServerError,
    },

    /// Reading or writing a file failed.
    #[error("io error: {source}")]
    Io {
        /// The underlying IO error.
        #[from]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or written.
    #[error("json error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A `--set` argument is not of the form `name=value`.
    #[error("expected name=value, got {0:?}")]
    Assignment(String),

    /// A feature of the `--lines` file cannot be drawn.
    #[error("lines feature {feature}: {reason}")]
    Lines {
        /// Position of the feature in the collection.
        feature: usize,
        /// What is wrong with it.
        reason: String,
    },
}
