//! Point-in-time to through-the-cycle PD conversion.
//!
//! The conversion scales the point-in-time PD by the state of the economy,
//! weighted by how cyclical the obligor's industry is, and blends the result
//! with the industry's long-run default rate:
//!
//! ```text
//! ttc = pit · (1 + (0.5 − macro) · cyclicality · 2) · 0.7 + long_term_average · 0.3
//! ```
//!
//! clamped to `[0.0001, 1]`. A macro index of 1 describes a strong economy,
//! 0 a recession and 0.5 a neutral cycle position.
//!
//! Two entry points are provided:
//! - [`derive_ttc_pd_from_inputs`] takes the full structured input
//! - [`derive_ttc_pd`] takes only the point-in-time PD and assumes a neutral
//!   cycle ([`DEFAULT_MACRO_INDEX`]), medium cyclicality
//!   ([`DEFAULT_CYCLICALITY`]) and a generic long-run default rate
//!   ([`DEFAULT_LONG_TERM_AVERAGE`])

use crate::types::ParameterError;

/// Lower clamp applied to every derived TTC PD.
pub const TTC_PD_FLOOR: f64 = 0.0001;

/// Neutral position in the economic cycle.
pub const DEFAULT_MACRO_INDEX: f64 = 0.5;

/// Medium sensitivity to the economic cycle.
pub const DEFAULT_CYCLICALITY: f64 = 0.5;

/// Generic long-run annual default rate used when no industry is known.
pub const DEFAULT_LONG_TERM_AVERAGE: f64 = 0.02;

const PIT_WEIGHT: f64 = 0.7;
const LONG_TERM_WEIGHT: f64 = 0.3;

/// Structured inputs for the TTC PD conversion.
///
/// All four values must lie in `[0, 1]`.
///
/// # Examples
///
/// ```
/// use capital_core::params::{derive_ttc_pd_from_inputs, TtcPdInputs};
///
/// let inputs = TtcPdInputs::new(0.02, 0.2, 0.03, 0.8).unwrap();
/// let ttc = derive_ttc_pd_from_inputs(&inputs);
/// // weak economy, cyclical industry: TTC sits above the blended neutral value
/// assert!(ttc > 0.02 * 0.7 + 0.03 * 0.3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TtcPdInputs {
    pit_pd: f64,
    macro_index: f64,
    long_term_average: f64,
    cyclicality: f64,
}

impl TtcPdInputs {
    /// Creates validated conversion inputs.
    ///
    /// # Errors
    ///
    /// Returns `ParameterError::OutOfUnitInterval` naming the first input
    /// that is not a finite value in `[0, 1]`.
    pub fn new(
        pit_pd: f64,
        macro_index: f64,
        long_term_average: f64,
        cyclicality: f64,
    ) -> Result<Self, ParameterError> {
        Ok(Self {
            pit_pd: ParameterError::check_unit_interval("pit_pd", pit_pd)?,
            macro_index: ParameterError::check_unit_interval("macro_index", macro_index)?,
            long_term_average: ParameterError::check_unit_interval(
                "long_term_average",
                long_term_average,
            )?,
            cyclicality: ParameterError::check_unit_interval("cyclicality", cyclicality)?,
        })
    }

    /// Creates inputs for a point-in-time PD under the documented defaults.
    pub fn with_defaults(pit_pd: f64) -> Result<Self, ParameterError> {
        Self::new(
            pit_pd,
            DEFAULT_MACRO_INDEX,
            DEFAULT_LONG_TERM_AVERAGE,
            DEFAULT_CYCLICALITY,
        )
    }

    /// Creates inputs from an industry profile and macro index.
    pub fn for_industry(
        pit_pd: f64,
        macro_index: f64,
        profile: &IndustryProfile,
    ) -> Result<Self, ParameterError> {
        Self::new(
            pit_pd,
            macro_index,
            profile.long_term_average(),
            profile.cyclicality(),
        )
    }

    /// Returns the point-in-time PD.
    #[inline]
    pub fn pit_pd(&self) -> f64 {
        self.pit_pd
    }

    /// Returns the macroeconomic index (1 = strong economy).
    #[inline]
    pub fn macro_index(&self) -> f64 {
        self.macro_index
    }

    /// Returns the long-run average default rate.
    #[inline]
    pub fn long_term_average(&self) -> f64 {
        self.long_term_average
    }

    /// Returns the cyclicality factor.
    #[inline]
    pub fn cyclicality(&self) -> f64 {
        self.cyclicality
    }
}

/// Converts a point-in-time PD to a through-the-cycle PD.
#[inline]
pub fn derive_ttc_pd_from_inputs(inputs: &TtcPdInputs) -> f64 {
    let cycle_factor = 1.0 + (0.5 - inputs.macro_index) * inputs.cyclicality * 2.0;
    let ttc = inputs.pit_pd * cycle_factor * PIT_WEIGHT + inputs.long_term_average * LONG_TERM_WEIGHT;
    ttc.clamp(TTC_PD_FLOOR, 1.0)
}

/// Converts a point-in-time PD using the documented default assumptions.
///
/// With the neutral macro index the cycle factor is 1, so the result is
/// `0.7 · pit + 0.3 · 0.02`.
///
/// # Errors
///
/// Returns `ParameterError::OutOfUnitInterval` when `pit_pd` is not in `[0, 1]`.
///
/// # Examples
///
/// ```
/// use capital_core::params::derive_ttc_pd;
///
/// let ttc = derive_ttc_pd(0.05).unwrap();
/// assert!((ttc - (0.035 + 0.006)).abs() < 1e-12);
/// ```
pub fn derive_ttc_pd(pit_pd: f64) -> Result<f64, ParameterError> {
    TtcPdInputs::with_defaults(pit_pd).map(|inputs| derive_ttc_pd_from_inputs(&inputs))
}

/// Converts a point-in-time PD using an industry profile.
pub fn derive_ttc_pd_for_industry(
    pit_pd: f64,
    macro_index: f64,
    profile: &IndustryProfile,
) -> Result<f64, ParameterError> {
    TtcPdInputs::for_industry(pit_pd, macro_index, profile)
        .map(|inputs| derive_ttc_pd_from_inputs(&inputs))
}

/// Long-run default behaviour of an industry.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndustryProfile {
    long_term_average: f64,
    cyclicality: f64,
}

impl Default for IndustryProfile {
    fn default() -> Self {
        Self {
            long_term_average: DEFAULT_LONG_TERM_AVERAGE,
            cyclicality: DEFAULT_CYCLICALITY,
        }
    }
}

impl IndustryProfile {
    /// Creates a validated profile.
    pub fn new(long_term_average: f64, cyclicality: f64) -> Result<Self, ParameterError> {
        Ok(Self {
            long_term_average: ParameterError::check_unit_interval(
                "long_term_average",
                long_term_average,
            )?,
            cyclicality: ParameterError::check_unit_interval("cyclicality", cyclicality)?,
        })
    }

    /// Returns the indicative profile for an industry name.
    ///
    /// Matching is case-insensitive and ignores spaces, hyphens and
    /// underscores. Unknown industries fall back to the generic profile.
    ///
    /// These are indicative long-run averages and should be replaced with
    /// internal default studies in production.
    pub fn for_industry(industry: &str) -> Self {
        let key: String = industry
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        let (long_term_average, cyclicality) = match key.as_str() {
            "banking" | "banks" | "financials" | "financialservices" => (0.010, 0.6),
            "insurance" => (0.008, 0.5),
            "energy" | "oilgas" | "oilandgas" => (0.025, 0.8),
            "utilities" => (0.008, 0.3),
            "technology" | "tech" => (0.020, 0.6),
            "healthcare" | "pharmaceuticals" => (0.012, 0.3),
            "realestate" | "construction" => (0.030, 0.9),
            "retail" | "consumer" => (0.025, 0.7),
            "manufacturing" | "industrials" => (0.020, 0.7),
            "telecommunications" | "telecom" => (0.015, 0.4),
            "transportation" | "airlines" => (0.025, 0.8),
            "government" | "sovereign" | "publicsector" => (0.002, 0.1),
            _ => (DEFAULT_LONG_TERM_AVERAGE, DEFAULT_CYCLICALITY),
        };

        Self {
            long_term_average,
            cyclicality,
        }
    }

    /// Returns the long-run average default rate.
    #[inline]
    pub fn long_term_average(&self) -> f64 {
        self.long_term_average
    }

    /// Returns the cyclicality factor.
    #[inline]
    pub fn cyclicality(&self) -> f64 {
        self.cyclicality
    }
}
