//! Maturity adjustment for the IRB capital formula.
//!
//! MA(M) = (1 + (M − 2.5) · b) / (1 − 1.5 · b)
//!
//! Two slope conventions are in circulation. The regulatory one makes the
//! slope depend on PD, `b(PD) = (0.11852 − 0.05478 · ln PD)²`. A constant
//! `b = 0.05` simplification also exists; it understates capital for
//! investment-grade obligors and is only available as an explicit legacy
//! method so that results produced with it are never mistaken for the
//! regulatory figure.

use std::fmt;
use std::str::FromStr;

use crate::types::ParameterError;

/// Effective maturity at which the adjustment is neutral in the numerator.
pub const REFERENCE_MATURITY: f64 = 2.5;

/// Slope used by the legacy constant-`b` variant.
pub const LEGACY_MATURITY_SLOPE: f64 = 0.05;

/// Selects how the maturity slope `b` is obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MaturityAdjustmentMethod {
    /// Regulatory PD-dependent slope `b(PD)`.
    #[default]
    Basel,
    /// Constant slope `b = 0.05`. Kept for reconciliation with older figures.
    LegacyConstant,
}

impl MaturityAdjustmentMethod {
    /// Get the name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            MaturityAdjustmentMethod::Basel => "basel",
            MaturityAdjustmentMethod::LegacyConstant => "legacy_constant",
        }
    }

    /// Whether this method departs from the regulatory formula.
    pub fn is_legacy(&self) -> bool {
        matches!(self, MaturityAdjustmentMethod::LegacyConstant)
    }
}

impl fmt::Display for MaturityAdjustmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MaturityAdjustmentMethod {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "basel" | "regulatory" => Ok(MaturityAdjustmentMethod::Basel),
            "legacy" | "legacy_constant" => Ok(MaturityAdjustmentMethod::LegacyConstant),
            other => Err(ParameterError::InvalidInput(format!(
                "Unknown maturity adjustment method: {}. Supported: basel, legacy",
                other
            ))),
        }
    }
}

/// Regulatory maturity slope `b(PD) = (0.11852 − 0.05478 · ln PD)²`.
///
/// Undefined (infinite) at `pd == 0`; callers treat zero PD separately.
#[inline]
pub fn maturity_slope(pd: f64) -> f64 {
    let base = 0.11852 - 0.05478 * pd.ln();
    base * base
}

/// Computes the maturity adjustment for a PD and effective maturity in years.
///
/// # Examples
/// ```
/// use capital_core::params::{maturity_adjustment, MaturityAdjustmentMethod};
///
/// let regulatory = maturity_adjustment(0.01, 2.5, MaturityAdjustmentMethod::Basel);
/// assert!((regulatory - 1.2598).abs() < 1e-3);
///
/// let legacy = maturity_adjustment(0.01, 2.5, MaturityAdjustmentMethod::LegacyConstant);
/// assert!((legacy - 1.0 / 0.925).abs() < 1e-12);
/// ```
#[inline]
pub fn maturity_adjustment(pd: f64, maturity: f64, method: MaturityAdjustmentMethod) -> f64 {
    let b = match method {
        MaturityAdjustmentMethod::Basel => maturity_slope(pd),
        MaturityAdjustmentMethod::LegacyConstant => LEGACY_MATURITY_SLOPE,
    };
    (1.0 + (maturity - REFERENCE_MATURITY) * b) / (1.0 - 1.5 * b)
}
