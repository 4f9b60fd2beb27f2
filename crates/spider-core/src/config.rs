//! Deployment configuration: which model, which dataset, which sliders.
//!
//! A deployment is described by one YAML file. This module defines
//! strongly-typed structs that mirror it, a loader that reads and validates
//! the file, and the value checks the session applies when the user moves a
//! slider.
//!
//! ```yaml
//! name: fish
//! model: fish
//! data: ../data/hex.geojson
//! hex_size_km: 10
//! pars:
//!   - col: duration
//!     label: Duration
//!     unit: years
//!     min: 5
//!     max: 20
//!     val: 10
//! infra:
//!   - col: grid_dist
//!     label: Grid
//!     type: line
//!     color: "#FF0000"
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spider_model::ModelKind;
use spider_types::{ParameterSet, ParameterValue};

/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "SPIDER_PORT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A parameter definition's default value violates its own constraints.
    #[error("parameter {name}: invalid default: {source}")]
    InvalidDefault {
        /// The parameter name.
        name: String,
        /// What is wrong with the default.
        #[source]
        source: ValueError,
    },

    /// Two parameter or infrastructure definitions share a column.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// `hex_size_km` must be finite and positive.
    #[error("invalid hex size: {0}")]
    InvalidHexSize(f64),

    /// An environment override holds an unusable value.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv {
        /// The variable name.
        var: &'static str,
        /// The value found.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Why a parameter value is not acceptable for its definition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// A numeric value lies outside the slider range.
    #[error("{value} is outside [{min}, {max}]")]
    OutOfRange {
        /// The rejected value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A categorical value is not one of the listed choices.
    #[error("{value:?} is not one of {choices:?}")]
    NotAChoice {
        /// The rejected value.
        value: String,
        /// The allowed choices.
        choices: Vec<String>,
    },

    /// A categorical parameter received a number.
    #[error("expected one of {0:?}, got a number")]
    ExpectedChoice(Vec<String>),

    /// A numeric parameter received a label.
    #[error("expected a number, got {0:?}")]
    ExpectedNumber(String),

    /// A numeric definition is missing a bound or has `min > max`.
    #[error("numeric parameters need min <= max")]
    BadBounds,
}

/// Top-level deployment configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpiderConfig {
    /// Deployment name shown in logs and the API.
    #[serde(default = "default_name")]
    pub name: String,

    /// Which evaluator computes the derived attributes.
    #[serde(default = "default_model")]
    pub model: ModelKind,

    /// Path to the hexagon GeoJSON. Relative paths resolve against the
    /// directory of the config file.
    #[serde(default)]
    pub data: PathBuf,

    /// Physical size of one hex ring, used as the propagation step when
    /// drawing.
    #[serde(default = "default_hex_size_km")]
    pub hex_size_km: f64,

    /// Slider definitions.
    #[serde(default)]
    pub pars: Vec<ParameterDef>,

    /// Drawable infrastructure columns.
    #[serde(default)]
    pub infra: Vec<InfraDef>,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            model: default_model(),
            data: PathBuf::new(),
            hex_size_km: default_hex_size_km(),
            pars: Vec::new(),
            infra: Vec::new(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SpiderConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// `SPIDER_PORT` overrides `server.port`. A relative `data` path is
    /// resolved against the directory holding the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        if config.data.is_relative()
            && !config.data.as_os_str().is_empty()
            && let Some(dir) = path.parent()
        {
            config.data = dir.join(&config.data);
        }
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `SPIDER_PORT` is not a port.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(PORT_ENV) {
            self.server.override_port(&value)?;
        }
        Ok(())
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidHexSize`] unless `hex_size_km` is finite and
    ///   positive.
    /// - [`ConfigError::DuplicateColumn`] if a parameter or infrastructure
    ///   column is declared twice.
    /// - [`ConfigError::InvalidDefault`] if a default is out of bounds or
    ///   not among the choices.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.hex_size_km.is_finite() || self.hex_size_km <= 0.0 {
            return Err(ConfigError::InvalidHexSize(self.hex_size_km));
        }

        let mut seen = BTreeSet::new();
        for def in &self.pars {
            if !seen.insert(def.col.as_str()) {
                return Err(ConfigError::DuplicateColumn(def.col.clone()));
            }
            def.check_bounds()
                .and_then(|()| def.check(&def.val))
                .map_err(|source| ConfigError::InvalidDefault {
                    name: def.col.clone(),
                    source,
                })?;
        }

        let mut seen = BTreeSet::new();
        for infra in &self.infra {
            if !seen.insert(infra.col.as_str()) {
                return Err(ConfigError::DuplicateColumn(infra.col.clone()));
            }
        }
        Ok(())
    }

    /// The parameter set holding every default.
    pub fn parameter_set(&self) -> ParameterSet {
        self.pars
            .iter()
            .map(|def| (def.col.clone(), def.val.clone()))
            .collect()
    }
}

/// One slider (numeric) or drop-down (categorical) parameter.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParameterDef {
    /// Name the model reads the value by.
    pub col: String,
    /// Label shown next to the control.
    #[serde(default)]
    pub label: String,
    /// Unit shown after the value.
    #[serde(default)]
    pub unit: String,
    /// Lower slider bound (numeric parameters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper slider bound (numeric parameters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Starting value.
    pub val: ParameterValue,
    /// Allowed choices; non-empty marks the parameter as categorical.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cats: Vec<String>,
}

impl ParameterDef {
    /// Whether this is a categorical parameter.
    pub fn is_categorical(&self) -> bool {
        !self.cats.is_empty()
    }

    fn check_bounds(&self) -> Result<(), ValueError> {
        if self.is_categorical() {
            return Ok(());
        }
        match (self.min, self.max) {
            (Some(min), Some(max)) if min <= max => Ok(()),
            _ => Err(ValueError::BadBounds),
        }
    }

    /// Check `value` against the bounds or choices of this definition.
    ///
    /// # Errors
    ///
    /// Returns the [`ValueError`] describing the violation.
    pub fn check(&self, value: &ParameterValue) -> Result<(), ValueError> {
        match value {
            ParameterValue::Choice(choice) if self.is_categorical() => {
                if self.cats.iter().any(|c| c == choice) {
                    Ok(())
                } else {
                    Err(ValueError::NotAChoice {
                        value: choice.clone(),
                        choices: self.cats.clone(),
                    })
                }
            }
            ParameterValue::Number(_) if self.is_categorical() => {
                Err(ValueError::ExpectedChoice(self.cats.clone()))
            }
            ParameterValue::Choice(choice) => Err(ValueError::ExpectedNumber(choice.clone())),
            ParameterValue::Number(n) => {
                let min = self.min.unwrap_or(f64::NEG_INFINITY);
                let max = self.max.unwrap_or(f64::INFINITY);
                if n.is_finite() && *n >= min && *n <= max {
                    Ok(())
                } else {
                    Err(ValueError::OutOfRange { value: *n, min, max })
                }
            }
        }
    }
}

/// How an infrastructure column is drawn on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InfraKind {
    /// Polylines (grid, roads).
    Line,
    /// Points (demand centres).
    Point,
}

/// One drawable infrastructure column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InfraDef {
    /// The distance attribute a drawing lowers.
    pub col: String,
    /// Label of the drawing button.
    #[serde(default)]
    pub label: String,
    /// Geometry the user draws.
    #[serde(rename = "type", default = "default_infra_kind")]
    pub kind: InfraKind,
    /// CSS colour of drawn features.
    #[serde(default = "default_color")]
    pub color: String,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,
    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Replace the port with a textual override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `value` is not a port number.
    pub fn override_port(&mut self, value: &str) -> Result<(), ConfigError> {
        self.port = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: PORT_ENV,
            value: value.to_owned(),
        })?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_name() -> String {
    "spider".to_owned()
}

const fn default_model() -> ModelKind {
    ModelKind::Example
}

const fn default_hex_size_km() -> f64 {
    10.0
}

const fn default_infra_kind() -> InfraKind {
    InfraKind::Line
}

fn default_color() -> String {
    "#FF0000".to_owned()
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FISH_YAML: &str = r##"
name: kenya-fish
model: fish
data: hex.geojson
hex_size_km: 9
pars:
  - col: duration
    label: Duration
    unit: years
    min: 5
    max: 20
    val: 10
  - col: h2_state
    label: Hydrogen state
    cats: ["500 bar", "Liquid"]
    val: "500 bar"
infra:
  - col: grid_dist
    label: Grid
    type: line
    color: "#FF0000"
  - col: mombasa_dist
    label: Demand
    type: point
server:
  host: 127.0.0.1
  port: 9000
logging:
  level: debug
"##;

    #[test]
    fn parse_full_yaml() {
        let config = SpiderConfig::parse(FISH_YAML);
        assert!(config.is_ok(), "{config:?}");
        let config = config.unwrap_or_default();
        assert_eq!(config.name, "kenya-fish");
        assert_eq!(config.model, ModelKind::Fish);
        assert!((config.hex_size_km - 9.0).abs() < f64::EPSILON);
        assert_eq!(config.pars.len(), 2);
        let kinds: Vec<_> = config.infra.iter().map(|i| (i.col.as_str(), i.kind)).collect();
        assert_eq!(
            kinds,
            vec![("grid_dist", InfraKind::Line), ("mombasa_dist", InfraKind::Point)]
        );
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.level, "debug");

        let pars = config.parameter_set();
        assert_eq!(pars.get("duration").and_then(ParameterValue::as_number), Some(10.0));
        assert_eq!(pars.get("h2_state").and_then(ParameterValue::as_choice), Some("500 bar"));
    }

    #[test]
    fn parse_empty_yaml_uses_defaults() {
        let config = SpiderConfig::parse("");
        assert!(config.is_ok());
        let config = config.unwrap_or_default();
        assert!((config.hex_size_km - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.model, ModelKind::Example);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn unknown_model_is_a_yaml_error() {
        assert!(matches!(
            SpiderConfig::parse("model: solar\n"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn default_outside_bounds_is_rejected() {
        let yaml = "pars:\n  - col: rate\n    min: 0\n    max: 1\n    val: 2\n";
        assert!(matches!(
            SpiderConfig::parse(yaml),
            Err(ConfigError::InvalidDefault { source: ValueError::OutOfRange { .. }, .. })
        ));
    }

    #[test]
    fn default_outside_choices_is_rejected() {
        let yaml = "pars:\n  - col: tech\n    cats: [pump, bore]\n    val: drip\n";
        assert!(matches!(
            SpiderConfig::parse(yaml),
            Err(ConfigError::InvalidDefault { source: ValueError::NotAChoice { .. }, .. })
        ));
    }

    #[test]
    fn numeric_parameter_needs_bounds() {
        let yaml = "pars:\n  - col: rate\n    val: 2\n";
        assert!(matches!(
            SpiderConfig::parse(yaml),
            Err(ConfigError::InvalidDefault { source: ValueError::BadBounds, .. })
        ));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let yaml = "infra:\n  - col: grid_dist\n  - col: grid_dist\n";
        assert!(matches!(
            SpiderConfig::parse(yaml),
            Err(ConfigError::DuplicateColumn(c)) if c == "grid_dist"
        ));
    }

    #[test]
    fn non_positive_hex_size_is_rejected() {
        assert!(matches!(
            SpiderConfig::parse("hex_size_km: 0\n"),
            Err(ConfigError::InvalidHexSize(_))
        ));
    }

    #[test]
    fn port_override() {
        let mut server = ServerConfig::default();
        assert!(server.override_port(" 3100 ").is_ok());
        assert_eq!(server.port, 3100);
        assert!(matches!(
            server.override_port("http"),
            Err(ConfigError::InvalidEnv { var: PORT_ENV, .. })
        ));
        assert_eq!(server.port, 3100);
    }

    #[test]
    fn check_rejects_wrong_kinds() {
        let numeric = ParameterDef {
            col: "duration".to_owned(),
            label: String::new(),
            unit: String::new(),
            min: Some(5.0),
            max: Some(20.0),
            val: ParameterValue::Number(10.0),
            cats: Vec::new(),
        };
        assert!(numeric.check(&ParameterValue::Number(20.0)).is_ok());
        assert!(numeric.check(&ParameterValue::Number(f64::NAN)).is_err());
        assert!(matches!(
            numeric.check(&ParameterValue::Choice("ten".to_owned())),
            Err(ValueError::ExpectedNumber(_))
        ));

        let categorical = ParameterDef {
            cats: vec!["pump".to_owned()],
            val: ParameterValue::Choice("pump".to_owned()),
            ..numeric
        };
        assert!(matches!(
            categorical.check(&ParameterValue::Number(1.0)),
            Err(ValueError::ExpectedChoice(_))
        ));
    }

    #[test]
    fn load_shipped_configs() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..").join("config");
        for name in ["fish.yaml", "irrigation.yaml", "hydrogen.yaml", "example.yaml"] {
            let path = dir.join(name);
            if path.exists() {
                let config = SpiderConfig::from_file(&path);
                assert!(config.is_ok(), "{name}: {config:?}");
            }
        }
    }
}
