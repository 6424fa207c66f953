//! Optimiser error types.

use capital_risk::portfolio::PortfolioError;
use thiserror::Error;

/// Errors raised when configuring the optimiser or applying its output.
///
/// An unreachable target is not an error; it is reported through
/// [`OptimisationResult`](crate::target::OptimisationResult).
///
/// # Examples
///
/// ```
/// use capital_optimiser::OptimiserError;
///
/// let err = OptimiserError::InvalidFloor(1.5);
/// assert_eq!(format!("{}", err), "EAD floor must be in (0, 1], got 1.5");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimiserError {
    /// EAD floor outside `(0, 1]`.
    #[error("EAD floor must be in (0, 1], got {0}")]
    InvalidFloor(f64),

    /// EAD multiplier that is negative or not finite.
    #[error("Invalid EAD multiplier for {counterparty}: {multiplier}")]
    InvalidMultiplier {
        /// Counterparty the multiplier was given for
        counterparty: String,
        /// Offending multiplier
        multiplier: f64,
    },

    /// Unrecognised option value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Rebuilding the portfolio failed.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
}
