//! CLI configuration management
//!
//! Handles loading configuration from TOML files, `RWA_*` environment
//! variables and command-line flags.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use capital_core::params::{MaturityAdjustmentMethod, DEFAULT_MACRO_INDEX};
use capital_optimiser::target::DEFAULT_EAD_FLOOR;
use capital_risk::engine::{CapitalFormula, PdSource, RwaOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::OutputFormat;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Setting with an unrecognised value.
    #[error("Invalid value for {name}: {value}")]
    InvalidOption {
        /// Setting name
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// Numeric setting outside its range.
    #[error("{name} must be in {expected}, got {value}")]
    OutOfRange {
        /// Setting name
        name: &'static str,
        /// Offending value
        value: f64,
        /// Admissible range
        expected: &'static str,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace
    Trace,
    /// Debug
    Debug,
    /// Info
    Info,
    /// Warn
    #[default]
    Warn,
    /// Error
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Effective configuration of the `rwa` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level
    #[serde(deserialize_with = "deserialize_from_str")]
    pub log_level: LogLevel,
    /// Output format
    #[serde(deserialize_with = "deserialize_from_str")]
    pub output_format: OutputFormat,
    /// Capital formula
    #[serde(deserialize_with = "deserialize_from_str")]
    pub formula: CapitalFormula,
    /// Maturity adjustment method
    #[serde(deserialize_with = "deserialize_from_str")]
    pub maturity_method: MaturityAdjustmentMethod,
    /// PD source
    #[serde(deserialize_with = "deserialize_from_str")]
    pub pd_source: PdSource,
    /// Apply the 1.25 correlation multiplier to flagged financial institutions
    pub financial_correlation_multiplier: bool,
    /// Lower bound on optimiser EAD multipliers
    pub ead_floor: f64,
    /// Macro index for TTC PD derivation
    pub macro_index: f64,
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s = String::deserialize(deserializer)?;
    T::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            output_format: OutputFormat::default(),
            formula: CapitalFormula::default(),
            maturity_method: MaturityAdjustmentMethod::default(),
            pd_source: PdSource::default(),
            financial_correlation_multiplier: false,
            ead_floor: DEFAULT_EAD_FLOOR,
            macro_index: DEFAULT_MACRO_INDEX,
        }
    }
}

/// Environment variables read by [`CliConfig::apply_env`].
pub const ENV_VARS: [&str; 8] = [
    "RWA_LOG_LEVEL",
    "RWA_OUTPUT_FORMAT",
    "RWA_FORMULA",
    "RWA_MATURITY_METHOD",
    "RWA_PD_SOURCE",
    "RWA_FI_MULTIPLIER",
    "RWA_EAD_FLOOR",
    "RWA_MACRO_INDEX",
];

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config: CliConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment variables
    ///
    /// `lookup` returns the value of a variable, if set.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("RWA_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(format) = lookup("RWA_OUTPUT_FORMAT") {
            self.output_format = parse_option("output_format", &format)?;
        }
        if let Some(formula) = lookup("RWA_FORMULA") {
            self.formula = parse_option("formula", &formula)?;
        }
        if let Some(method) = lookup("RWA_MATURITY_METHOD") {
            self.maturity_method = parse_option("maturity_method", &method)?;
        }
        if let Some(source) = lookup("RWA_PD_SOURCE") {
            self.pd_source = parse_option("pd_source", &source)?;
        }
        if let Some(enabled) = lookup("RWA_FI_MULTIPLIER") {
            self.financial_correlation_multiplier = parse_bool("financial_correlation_multiplier", &enabled)?;
        }
        if let Some(floor) = lookup("RWA_EAD_FLOOR") {
            self.ead_floor = parse_option("ead_floor", &floor)?;
        }
        if let Some(index) = lookup("RWA_MACRO_INDEX") {
            self.macro_index = parse_option("macro_index", &index)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ead_floor > 0.0 && self.ead_floor <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "ead_floor",
                value: self.ead_floor,
                expected: "(0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.macro_index) {
            return Err(ConfigError::OutOfRange {
                name: "macro_index",
                value: self.macro_index,
                expected: "[0, 1]",
            });
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        if let Some(format) = &cli.output_format {
            self.output_format = parse_option("output_format", format)?;
        }
        if let Some(formula) = &cli.formula {
            self.formula = parse_option("formula", formula)?;
        }
        if let Some(method) = &cli.maturity_method {
            self.maturity_method = parse_option("maturity_method", method)?;
        }
        if let Some(source) = &cli.pd_source {
            self.pd_source = parse_option("pd_source", source)?;
        }
        if cli.fi_multiplier {
            self.financial_correlation_multiplier = true;
        }
        if let Some(floor) = cli.ead_floor {
            self.ead_floor = floor;
        }
        if let Some(index) = cli.macro_index {
            self.macro_index = index;
        }
        Ok(())
    }

    /// Engine options described by this configuration
    pub fn rwa_options(&self) -> RwaOptions {
        RwaOptions::default()
            .with_formula(self.formula)
            .with_maturity_method(self.maturity_method)
            .with_pd_source(self.pd_source)
            .with_financial_correlation_multiplier(self.financial_correlation_multiplier)
            .with_macro_index(self.macro_index)
    }
}

fn parse_option<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
{
    value.trim().parse().map_err(|_| ConfigError::InvalidOption {
        name,
        value: value.to_string(),
    })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidOption {
            name,
            value: value.to_string(),
        }),
    }
}

/// Configuration-related command-line arguments
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Output format override
    pub output_format: Option<String>,
    /// Capital formula override
    pub formula: Option<String>,
    /// Maturity method override
    pub maturity_method: Option<String>,
    /// PD source override
    pub pd_source: Option<String>,
    /// Enable the financial correlation multiplier
    pub fi_multiplier: bool,
    /// EAD floor override
    pub ead_floor: Option<f64>,
    /// Macro index override
    pub macro_index: Option<f64>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config<F>(cli: &CliArgs, env: F) -> Result<CliConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };

    config.apply_env(env)?;
    config.merge_with_cli(cli)?;

    // Final validation
    config.validate()?;

    Ok(config)
}

/// Reads a variable from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.output_format, OutputFormat::Table);
        assert_eq!(config.formula, CapitalFormula::Basel);
        assert_eq!(config.maturity_method, MaturityAdjustmentMethod::Basel);
        assert_eq!(config.pd_source, PdSource::PointInTime);
        assert!(!config.financial_correlation_multiplier);
        assert_eq!(config.ead_floor, 0.5);
        assert_eq!(config.macro_index, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("WARN").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);

        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            log_level = "debug"
            output_format = "json"
            formula = "simplified"
            maturity_method = "legacy"
            pd_source = "ttc"
            financial_correlation_multiplier = true
            ead_floor = 0.7
            macro_index = 0.3
        "#;

        let config: CliConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.formula, CapitalFormula::Simplified);
        assert_eq!(config.maturity_method, MaturityAdjustmentMethod::LegacyConstant);
        assert_eq!(config.pd_source, PdSource::ThroughTheCycle);
        assert!(config.financial_correlation_multiplier);
        assert_eq!(config.ead_floor, 0.7);
        assert_eq!(config.macro_index, 0.3);
    }

    #[test]
    fn test_partial_toml_deserialization() {
        let config: CliConfig = toml::from_str("ead_floor = 0.6").unwrap();
        // Should use defaults for unspecified fields
        assert_eq!(config.ead_floor, 0.6);
        assert_eq!(config.formula, CapitalFormula::Basel);
        assert_eq!(config.output_format, OutputFormat::Table);
    }

    #[test]
    fn test_invalid_toml_value() {
        let result: Result<CliConfig, _> = toml::from_str(r#"formula = "vasicek""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CliConfig::default();
        config
            .apply_env(env(&[
                ("RWA_OUTPUT_FORMAT", "csv"),
                ("RWA_FI_MULTIPLIER", "yes"),
                ("RWA_EAD_FLOOR", "0.8"),
            ]))
            .unwrap();

        assert_eq!(config.output_format, OutputFormat::Csv);
        assert!(config.financial_correlation_multiplier);
        assert_eq!(config.ead_floor, 0.8);
        assert_eq!(config.formula, CapitalFormula::Basel);
    }

    #[test]
    fn test_env_invalid_value() {
        let mut config = CliConfig::default();
        let err = config.apply_env(env(&[("RWA_PD_SOURCE", "fwd")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for pd_source: fwd");
    }

    #[test]
    fn test_cli_args_merge() {
        let mut config = CliConfig::default();
        let cli = CliArgs {
            log_level: Some("debug".to_string()),
            formula: Some("simplified".to_string()),
            fi_multiplier: true,
            ead_floor: Some(0.9),
            ..CliArgs::default()
        };

        config.merge_with_cli(&cli).unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.formula, CapitalFormula::Simplified);
        assert!(config.financial_correlation_multiplier);
        assert_eq!(config.ead_floor, 0.9);
    }

    #[test]
    fn test_cli_takes_precedence_over_env() {
        let cli = CliArgs {
            output_format: Some("json".to_string()),
            ..CliArgs::default()
        };
        let config = build_config(&cli, env(&[("RWA_OUTPUT_FORMAT", "csv")])).unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_build_config_with_defaults() {
        let config = build_config(&CliArgs::default(), env(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_validate_ranges() {
        let config = CliConfig {
            ead_floor: 0.0,
            ..CliConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CliConfig {
            macro_index: 1.2,
            ..CliConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "macro_index must be in [0, 1], got 1.2");

        let err = build_config(
            &CliArgs {
                ead_floor: Some(1.5),
                ..CliArgs::default()
            },
            env(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { name: "ead_floor", .. }));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("rwa_config_{}.toml", std::process::id()));
        std::fs::write(&path, "pd_source = \"ttc\"\nmacro_index = 0.25\n").unwrap();

        let config = CliConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.pd_source, PdSource::ThroughTheCycle);
        assert_eq!(config.macro_index, 0.25);
        assert!(matches!(
            CliConfig::from_file(Path::new("/nonexistent/rwa.toml")),
            Err(ConfigError::FileError(_))
        ));
    }

    #[test]
    fn test_demo_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demo/rwa.toml");
        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.financial_correlation_multiplier);
    }

    #[test]
    fn test_rwa_options() {
        let config = CliConfig {
            pd_source: PdSource::ThroughTheCycle,
            financial_correlation_multiplier: true,
            macro_index: 0.2,
            ..CliConfig::default()
        };
        let options = config.rwa_options();
        assert_eq!(options.pd_source, PdSource::ThroughTheCycle);
        assert!(options.financial_correlation_multiplier);
        assert_eq!(options.macro_index, 0.2);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidLogLevel("bad".to_string());
        assert!(err.to_string().contains("Invalid log level"));

        let err = ConfigError::FileError("boom".to_string());
        assert_eq!(err.to_string(), "Configuration file error: boom");
    }
}
