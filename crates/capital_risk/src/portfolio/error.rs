//! Portfolio error types.

use thiserror::Error;

/// Errors that can occur while building a portfolio.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
    /// Duplicate counterparty ID encountered.
    #[error("Duplicate counterparty ID: {0}")]
    DuplicateCounterparty(String),

    /// A counterparty field is outside its admissible range.
    #[error("Invalid counterparty {0}: {1}")]
    InvalidCounterparty(String, String),

    /// A credit rating symbol could not be parsed.
    #[error("Unknown credit rating: {0}")]
    UnknownRating(String),
}
