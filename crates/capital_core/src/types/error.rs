//! Error types for risk parameter validation.
//!
//! Only genuinely invalid inputs are reported as errors. Missing or
//! non-finite exposure data is handled by the engine's documented defaults
//! and never reaches this type.

use thiserror::Error;

/// Errors raised when a risk parameter is outside its admissible range.
///
/// # Examples
/// ```
/// use capital_core::types::ParameterError;
///
/// let err = ParameterError::OutOfUnitInterval { name: "macro_index", value: 1.5 };
/// assert_eq!(
///     format!("{}", err),
///     "macro_index must be a finite value in [0, 1], got 1.5"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// A probability-like input fell outside `[0, 1]` or was not finite.
    #[error("{name} must be a finite value in [0, 1], got {value}")]
    OutOfUnitInterval {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A quantity that must be non-negative was negative or not finite.
    #[error("{name} must be finite and non-negative, got {value}")]
    Negative {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Any other invalid parameter combination.
    #[error("Invalid parameter: {0}")]
    InvalidInput(String),
}

impl ParameterError {
    /// Checks that `value` is finite and inside `[0, 1]`.
    pub fn check_unit_interval(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(ParameterError::OutOfUnitInterval { name, value })
        }
    }

    /// Checks that `value` is finite and non-negative.
    pub fn check_non_negative(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(ParameterError::Negative { name, value })
        }
    }
}
