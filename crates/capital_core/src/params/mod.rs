//! IRB risk parameter derivation.
//!
//! - `correlation`: Basel asset correlation R(PD) for corporate exposures
//! - `maturity`: Maturity adjustment MA(PD, M)
//! - `ttc`: Point-in-time to through-the-cycle PD conversion

pub mod correlation;
pub mod maturity;
pub mod ttc;

pub use correlation::{
    asset_correlation, clamp_correlation, CORRELATION_CAP, CORRELATION_FLOOR,
    FINANCIAL_CORRELATION_MULTIPLIER,
};
pub use maturity::{
    maturity_adjustment, maturity_slope, MaturityAdjustmentMethod, LEGACY_MATURITY_SLOPE,
    REFERENCE_MATURITY,
};
pub use ttc::{
    derive_ttc_pd, derive_ttc_pd_for_industry, derive_ttc_pd_from_inputs, IndustryProfile,
    TtcPdInputs, DEFAULT_CYCLICALITY, DEFAULT_LONG_TERM_AVERAGE, DEFAULT_MACRO_INDEX,
    TTC_PD_FLOOR,
};
