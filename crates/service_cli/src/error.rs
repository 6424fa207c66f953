//! CLI error types.

use capital_core::types::ParameterError;
use capital_optimiser::OptimiserError;
use capital_risk::portfolio::PortfolioError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the `rwa` command-line tool.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Invalid command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File type that cannot hold the requested data.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid portfolio data.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    /// Invalid risk parameter.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Optimiser error.
    #[error(transparent)]
    Optimiser(#[from] OptimiserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
