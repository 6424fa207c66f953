//! Basel asset correlation for corporate, sovereign and bank exposures.
//!
//! R(PD) = 0.12 · w + 0.24 · (1 − w),  w = (1 − e^(−50·PD)) / (1 − e^(−50))
//!
//! The weight `w` rises from 0 to 1 as PD grows, so the correlation falls
//! from 24% for the safest obligors towards 12% for the riskiest.

/// Lower bound of the correlation curve (reached as PD → 1).
pub const CORRELATION_FLOOR: f64 = 0.12;

/// Upper bound of the correlation curve (reached as PD → 0).
pub const CORRELATION_CAP: f64 = 0.24;

/// Decay rate of the exponential weight.
pub const CORRELATION_DECAY: f64 = 50.0;

/// Asset value correlation multiplier for large or unregulated financial institutions.
pub const FINANCIAL_CORRELATION_MULTIPLIER: f64 = 1.25;

/// Computes the Basel asset correlation for a given PD.
///
/// Strictly decreasing in `pd` and bounded to `[0.12, 0.24]` for `pd ∈ (0, 1)`.
///
/// # Examples
/// ```
/// use capital_core::params::asset_correlation;
///
/// let r = asset_correlation(0.01);
/// assert!((r - 0.1928).abs() < 1e-4);
/// ```
#[inline]
pub fn asset_correlation(pd: f64) -> f64 {
    let weight = (1.0 - (-CORRELATION_DECAY * pd).exp()) / (1.0 - (-CORRELATION_DECAY).exp());
    CORRELATION_FLOOR * weight + CORRELATION_CAP * (1.0 - weight)
}

/// Clamps a correlation to the admissible range `[0, 1]`.
#[inline]
pub fn clamp_correlation(r: f64) -> f64 {
    r.clamp(0.0, 1.0)
}
