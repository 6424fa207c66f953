//! IRB capital engine.
//!
//! For each counterparty the engine resolves the effective risk parameters,
//! evaluates the Basel capital requirement
//!
//! ```text
//! K          = LGD · [ N( G(PD)/√(1−R) + √(R/(1−R))·G(0.999) ) − PD ] · MA
//! RiskWeight = K · 1250   (percent)
//! RWA        = EAD · K · 12.5
//! ```
//!
//! and then applies the counterparty's overlays in the fixed order described
//! in [`crate::adjustment`].
//!
//! The engine holds no state besides its options; it never fails. Inputs
//! that are not finite fall back to documented defaults and a missing
//! counterparty yields a zeroed result.

use std::fmt;
use std::str::FromStr;

use capital_core::math::distributions::{inverse_norm_cdf, norm_cdf};
use capital_core::params::{
    asset_correlation, clamp_correlation, derive_ttc_pd_from_inputs, maturity_adjustment,
    IndustryProfile, MaturityAdjustmentMethod, TtcPdInputs, DEFAULT_MACRO_INDEX,
    FINANCIAL_CORRELATION_MULTIPLIER,
};
use capital_core::types::ParameterError;

use crate::adjustment::{AdjustmentBook, CounterpartyOverlays};
use crate::portfolio::{Counterparty, CounterpartyId, Portfolio};

/// PD used when the supplied PD is not finite.
pub const DEFAULT_PD: f64 = 0.01;
/// LGD used when the supplied LGD is not finite.
pub const DEFAULT_LGD: f64 = 0.45;
/// EAD used when the supplied EAD is not finite.
pub const DEFAULT_EAD: f64 = 1_000_000.0;
/// Maturity used when the supplied maturity is not finite.
pub const DEFAULT_MATURITY: f64 = 2.5;

/// Confidence level of the capital requirement.
pub const CONFIDENCE_LEVEL: f64 = 0.999;
/// Reciprocal of the 8% minimum capital ratio.
pub const CAPITAL_TO_RWA: f64 = 12.5;

/// Capital formula used to compute K.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CapitalFormula {
    /// Vasicek single-factor formula with maturity adjustment.
    #[default]
    Basel,
    /// Expected loss `K = LGD · PD`, without correlation or maturity terms.
    Simplified,
}

impl CapitalFormula {
    /// Get the name of this formula.
    pub fn name(&self) -> &'static str {
        match self {
            CapitalFormula::Basel => "basel",
            CapitalFormula::Simplified => "simplified",
        }
    }
}

impl fmt::Display for CapitalFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CapitalFormula {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basel" | "irb" => Ok(CapitalFormula::Basel),
            "simplified" | "simple" => Ok(CapitalFormula::Simplified),
            other => Err(ParameterError::InvalidInput(format!(
                "Unknown capital formula: {}. Supported: basel, simplified",
                other
            ))),
        }
    }
}

/// Which PD input feeds the capital formula.
///
/// A counterparty that opts into its rating PD uses that regardless of
/// this setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PdSource {
    /// Point-in-time PD as supplied.
    #[default]
    PointInTime,
    /// Through-the-cycle PD, supplied or derived.
    ThroughTheCycle,
}

impl PdSource {
    /// Get the name of this source.
    pub fn name(&self) -> &'static str {
        match self {
            PdSource::PointInTime => "pit",
            PdSource::ThroughTheCycle => "ttc",
        }
    }
}

impl fmt::Display for PdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PdSource {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pit" | "point_in_time" => Ok(PdSource::PointInTime),
            "ttc" | "through_the_cycle" => Ok(PdSource::ThroughTheCycle),
            other => Err(ParameterError::InvalidInput(format!(
                "Unknown PD source: {}. Supported: pit, ttc",
                other
            ))),
        }
    }
}

/// Per-call replacements for resolved risk parameters.
///
/// Any field left as `None` is taken from the counterparty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParameterOverrides {
    /// PD fed into the formula
    pub pd: Option<f64>,
    /// Loss given default
    pub lgd: Option<f64>,
    /// Exposure at default
    pub ead: Option<f64>,
    /// Effective maturity in years
    pub maturity: Option<f64>,
    /// Asset correlation
    pub correlation: Option<f64>,
    /// Maturity adjustment factor
    pub maturity_adjustment: Option<f64>,
    /// Through-the-cycle PD
    pub ttc_pd: Option<f64>,
}

/// Options controlling a capital calculation.
///
/// # Examples
///
/// ```
/// use capital_risk::engine::{CapitalFormula, PdSource, RwaOptions};
///
/// let options = RwaOptions::default()
///     .with_pd_source(PdSource::ThroughTheCycle)
///     .with_financial_correlation_multiplier(true);
///
/// assert_eq!(options.formula, CapitalFormula::Basel);
/// assert!(options.financial_correlation_multiplier);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RwaOptions {
    /// Capital formula
    pub formula: CapitalFormula,
    /// Maturity adjustment slope convention
    pub maturity_method: MaturityAdjustmentMethod,
    /// PD input used by the formula
    pub pd_source: PdSource,
    /// Apply the 1.25 correlation multiplier to flagged financial institutions
    pub financial_correlation_multiplier: bool,
    /// Macro index used when a TTC PD has to be derived
    pub macro_index: f64,
    /// Parameter overrides
    pub overrides: ParameterOverrides,
}

impl Default for RwaOptions {
    fn default() -> Self {
        Self {
            formula: CapitalFormula::default(),
            maturity_method: MaturityAdjustmentMethod::default(),
            pd_source: PdSource::default(),
            financial_correlation_multiplier: false,
            macro_index: DEFAULT_MACRO_INDEX,
            overrides: ParameterOverrides::default(),
        }
    }
}

impl RwaOptions {
    /// Sets the capital formula.
    pub fn with_formula(mut self, formula: CapitalFormula) -> Self {
        self.formula = formula;
        self
    }

    /// Sets the maturity adjustment method.
    pub fn with_maturity_method(mut self, method: MaturityAdjustmentMethod) -> Self {
        self.maturity_method = method;
        self
    }

    /// Sets the PD source.
    pub fn with_pd_source(mut self, source: PdSource) -> Self {
        self.pd_source = source;
        self
    }

    /// Enables or disables the financial institution correlation multiplier.
    pub fn with_financial_correlation_multiplier(mut self, enabled: bool) -> Self {
        self.financial_correlation_multiplier = enabled;
        self
    }

    /// Sets the macro index used for TTC derivation.
    pub fn with_macro_index(mut self, macro_index: f64) -> Self {
        self.macro_index = macro_index;
        self
    }

    /// Sets the parameter overrides.
    pub fn with_overrides(mut self, overrides: ParameterOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Capital result for one counterparty.
///
/// `original_rwa` is the formula output, `baseline_rwa` adds the
/// counterparty-level overlay and `rwa` the portfolio-level overlay on top.
/// Without overlays all three are equal.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RwaResult {
    /// Counterparty the result belongs to
    pub counterparty_id: CounterpartyId,
    /// Effective PD used in the formula
    pub pd: f64,
    /// Effective through-the-cycle PD
    pub ttc_pd: f64,
    /// Effective loss given default
    pub lgd: f64,
    /// Effective exposure at default
    pub ead: f64,
    /// Effective maturity in years
    pub maturity: f64,
    /// Asset correlation
    pub correlation: f64,
    /// Maturity adjustment factor
    pub maturity_adjustment: f64,
    /// Capital requirement per unit of EAD
    pub k: f64,
    /// Risk weight in percent (`K · 1250`)
    pub risk_weight: f64,
    /// RWA before any overlay
    pub original_rwa: f64,
    /// RWA after the counterparty-level overlay
    pub baseline_rwa: f64,
    /// RWA after both overlays
    pub rwa: f64,
}

impl RwaResult {
    /// Result with every figure set to zero.
    pub fn zeroed(counterparty_id: CounterpartyId) -> Self {
        Self {
            counterparty_id,
            ..Self::default()
        }
    }

    /// RWA per unit of exposure, zero when EAD is zero.
    #[inline]
    pub fn rwa_density(&self) -> f64 {
        if self.ead > 0.0 {
            self.rwa / self.ead
        } else {
            0.0
        }
    }

    /// Net effect of both overlays.
    #[inline]
    pub fn adjustment(&self) -> f64 {
        self.rwa - self.original_rwa
    }
}

/// Basel IRB capital requirement per unit of EAD.
///
/// Returns zero for `pd <= 0`. The result is floored at zero.
///
/// # Examples
///
/// ```
/// use capital_risk::engine::capital_requirement;
///
/// let k = capital_requirement(0.01, 0.45, 0.192_784, 1.259_808);
/// assert!((k - 0.0739).abs() < 1e-3);
/// ```
pub fn capital_requirement(pd: f64, lgd: f64, correlation: f64, maturity_adjustment: f64) -> f64 {
    if pd <= 0.0 {
        return 0.0;
    }
    let g_pd = inverse_norm_cdf(pd);
    let g_conf = inverse_norm_cdf(CONFIDENCE_LEVEL);
    let conditional_pd = norm_cdf(
        g_pd / (1.0 - correlation).sqrt() + (correlation / (1.0 - correlation)).sqrt() * g_conf,
    );
    let k = lgd * (conditional_pd - pd) * maturity_adjustment;
    // NaN from degenerate correlations also maps to zero here
    k.max(0.0)
}

/// Computes the capital result for one counterparty.
///
/// Use [`CapitalEngine`] when the same options serve many calls.
pub fn compute_rwa(
    counterparty: &Counterparty,
    overlays: &CounterpartyOverlays,
    options: &RwaOptions,
) -> RwaResult {
    let ov = &options.overrides;

    let pit_pd = finite_or(counterparty.pd(), DEFAULT_PD);
    let ttc_pd = finite_or(
        ov.ttc_pd
            .or(counterparty.ttc_pd())
            .unwrap_or_else(|| derived_ttc_pd(counterparty, pit_pd, options.macro_index)),
        pit_pd,
    );
    let source_pd = match options.pd_source {
        PdSource::PointInTime => pit_pd,
        PdSource::ThroughTheCycle => ttc_pd,
    };
    let pd = finite_or(
        ov.pd.or(counterparty.rating_pd()).unwrap_or(source_pd),
        DEFAULT_PD,
    );
    let lgd = finite_or(ov.lgd.unwrap_or(counterparty.lgd()), DEFAULT_LGD);
    let ead = finite_or(ov.ead.unwrap_or(counterparty.ead()), DEFAULT_EAD);
    let maturity = finite_or(ov.maturity.unwrap_or(counterparty.maturity()), DEFAULT_MATURITY);

    let correlation = clamp_correlation(finite_or(
        ov.correlation.unwrap_or(f64::NAN),
        formula_correlation(counterparty, pd, options),
    ));
    let ma = finite_or(
        ov.maturity_adjustment.unwrap_or(f64::NAN),
        if pd > 0.0 {
            maturity_adjustment(pd, maturity, options.maturity_method)
        } else {
            1.0
        },
    );

    let k = match options.formula {
        CapitalFormula::Basel => capital_requirement(pd, lgd, correlation, ma),
        CapitalFormula::Simplified => (lgd * pd).max(0.0),
    };
    let original_rwa = ead * k * CAPITAL_TO_RWA;

    RwaResult {
        counterparty_id: counterparty.id().clone(),
        pd,
        ttc_pd,
        lgd,
        ead,
        maturity,
        correlation,
        maturity_adjustment: ma,
        k,
        risk_weight: k * CAPITAL_TO_RWA * 100.0,
        original_rwa,
        baseline_rwa: overlays.baseline(original_rwa),
        rwa: overlays.apply(original_rwa),
    }
}

/// Sum of post-overlay RWA.
pub fn total_rwa(results: &[RwaResult]) -> f64 {
    results.iter().map(|r| r.rwa).sum()
}

/// Stateless capital engine bound to a set of options.
///
/// # Examples
///
/// ```
/// use capital_risk::adjustment::AdjustmentBook;
/// use capital_risk::engine::{CapitalEngine, RwaOptions};
/// use capital_risk::portfolio::{Counterparty, CounterpartyId, PortfolioBuilder};
///
/// let cp = Counterparty::new(CounterpartyId::new("CP001"), 0.01, 0.45, 10_000_000.0, 2.5).unwrap();
/// let portfolio = PortfolioBuilder::new().add_counterparty(cp).build().unwrap();
///
/// let engine = CapitalEngine::new(RwaOptions::default());
/// let results = engine.compute_portfolio(&portfolio, &AdjustmentBook::new());
///
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].rwa, results[0].original_rwa);
/// assert!((results[0].rwa - 9_231_700.0).abs() / 9_231_700.0 < 0.01);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CapitalEngine {
    options: RwaOptions,
}

impl CapitalEngine {
    /// Creates an engine with the given options.
    ///
    /// Selecting the legacy constant-slope maturity adjustment is logged as
    /// a warning.
    pub fn new(options: RwaOptions) -> Self {
        if options.maturity_method.is_legacy() {
            tracing::warn!(
                method = %options.maturity_method,
                "legacy constant maturity slope selected; RWA will differ from the regulatory figure"
            );
        }
        Self { options }
    }

    /// Returns the engine options.
    #[inline]
    pub fn options(&self) -> &RwaOptions {
        &self.options
    }

    /// Computes the result for one counterparty.
    #[inline]
    pub fn compute(&self, counterparty: &Counterparty, overlays: &CounterpartyOverlays) -> RwaResult {
        compute_rwa(counterparty, overlays, &self.options)
    }

    /// Computes the result for an optional counterparty.
    ///
    /// `None` yields [`RwaResult::zeroed`] with an empty ID.
    pub fn compute_opt(
        &self,
        counterparty: Option<&Counterparty>,
        overlays: &CounterpartyOverlays,
    ) -> RwaResult {
        match counterparty {
            Some(cp) => self.compute(cp, overlays),
            None => RwaResult::zeroed(CounterpartyId::default()),
        }
    }

    /// Computes the result for a counterparty looked up by ID.
    ///
    /// An unknown ID yields a zeroed result carrying that ID.
    pub fn compute_by_id(
        &self,
        portfolio: &Portfolio,
        book: &AdjustmentBook,
        id: &CounterpartyId,
    ) -> RwaResult {
        match portfolio.counterparty(id) {
            Some(cp) => self.compute(cp, &book.overlays(id)),
            None => {
                tracing::debug!(counterparty = %id, "unknown counterparty, returning zeroed result");
                RwaResult::zeroed(id.clone())
            }
        }
    }

    /// Computes results for every counterparty, in portfolio order.
    pub fn compute_portfolio(&self, portfolio: &Portfolio, book: &AdjustmentBook) -> Vec<RwaResult> {
        let compute_one = |cp: &Counterparty| self.compute(cp, &book.overlays(cp.id()));

        #[cfg(feature = "parallel")]
        let results: Vec<RwaResult> = {
            use rayon::prelude::*;
            portfolio.counterparties().par_iter().map(compute_one).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let results: Vec<RwaResult> = portfolio.iter().map(compute_one).collect();

        tracing::debug!(
            counterparties = results.len(),
            total_rwa = total_rwa(&results),
            "computed portfolio capital"
        );
        results
    }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

fn derived_ttc_pd(counterparty: &Counterparty, pit_pd: f64, macro_index: f64) -> f64 {
    let profile = IndustryProfile::for_industry(counterparty.industry());
    TtcPdInputs::for_industry(pit_pd.clamp(0.0, 1.0), macro_index, &profile)
        .map(|inputs| derive_ttc_pd_from_inputs(&inputs))
        .unwrap_or(pit_pd)
}

fn formula_correlation(counterparty: &Counterparty, pd: f64, options: &RwaOptions) -> f64 {
    let base = asset_correlation(pd);
    if options.financial_correlation_multiplier
        && counterparty.flags().attracts_correlation_multiplier()
    {
        base * FINANCIAL_CORRELATION_MULTIPLIER
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::{Adjustment, AdjustmentLevel};
    use crate::portfolio::{CreditRating, InstitutionFlags, PortfolioBuilder};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn golden() -> Counterparty {
        Counterparty::new(CounterpartyId::new("GOLD"), 0.01, 0.45, 10_000_000.0, 2.5).unwrap()
    }

    fn simplified() -> RwaOptions {
        RwaOptions::default().with_formula(CapitalFormula::Simplified)
    }

    #[test]
    fn test_golden_value_basel_maturity_adjustment() {
        let result = compute_rwa(&golden(), &CounterpartyOverlays::NONE, &RwaOptions::default());

        assert_relative_eq!(result.correlation, 0.192_784, epsilon = 1e-5);
        assert_relative_eq!(result.maturity_adjustment, 1.259_808, epsilon = 1e-5);
        assert_relative_eq!(result.k, 0.073_85, max_relative = 0.01);
        assert_relative_eq!(result.original_rwa, 9_231_700.0, max_relative = 0.01);
        assert_relative_eq!(result.risk_weight, result.k * 1250.0, epsilon = 1e-12);
    }

    #[test]
    fn test_golden_value_legacy_maturity_adjustment() {
        let options =
            RwaOptions::default().with_maturity_method(MaturityAdjustmentMethod::LegacyConstant);
        let result = CapitalEngine::new(options).compute(&golden(), &CounterpartyOverlays::NONE);

        assert_relative_eq!(result.correlation, 0.193, max_relative = 0.01);
        assert_relative_eq!(result.k, 0.063, max_relative = 0.01);
        assert_relative_eq!(result.original_rwa, 7_900_000.0, max_relative = 0.01);
    }

    #[test]
    fn test_no_overlays_leaves_rwa_unchanged() {
        let result = compute_rwa(&golden(), &CounterpartyOverlays::NONE, &RwaOptions::default());
        assert_eq!(result.rwa, result.original_rwa);
        assert_eq!(result.baseline_rwa, result.original_rwa);
        assert_eq!(result.adjustment(), 0.0);
    }

    #[test]
    fn test_overlay_order_through_engine() {
        // lgd · pd · ead · 12.5 = 1,000,000
        let cp = Counterparty::new(CounterpartyId::new("A"), 0.08, 1.0, 1_000_000.0, 2.5).unwrap();

        let overlays = CounterpartyOverlays {
            counterparty: Adjustment::multiplicative(1.10),
            portfolio: Adjustment::additive(50_000.0),
        };
        let result = compute_rwa(&cp, &overlays, &simplified());
        assert_relative_eq!(result.original_rwa, 1_000_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.baseline_rwa, 1_100_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.rwa, 1_150_000.0, epsilon = 1e-6);

        let swapped = CounterpartyOverlays {
            counterparty: Adjustment::additive(50_000.0),
            portfolio: Adjustment::multiplicative(1.10),
        };
        let result = compute_rwa(&cp, &swapped, &simplified());
        assert_relative_eq!(result.rwa, 1_155_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_pd_has_no_capital() {
        let cp = Counterparty::new(CounterpartyId::new("Z"), 0.0, 0.45, 1_000.0, 3.0).unwrap();
        let result = compute_rwa(&cp, &CounterpartyOverlays::NONE, &RwaOptions::default());
        assert_eq!(result.k, 0.0);
        assert_eq!(result.rwa, 0.0);
        assert_eq!(result.maturity_adjustment, 1.0);
        assert_relative_eq!(result.correlation, 0.24, epsilon = 1e-12);
    }

    #[test]
    fn test_defaulted_obligor_has_no_unexpected_loss_capital() {
        let cp = Counterparty::new(CounterpartyId::new("D"), 1.0, 0.45, 1_000.0, 3.0).unwrap();
        let result = compute_rwa(&cp, &CounterpartyOverlays::NONE, &RwaOptions::default());
        assert_eq!(result.k, 0.0);
    }

    #[test]
    fn test_non_finite_overrides_fall_back_to_defaults() {
        let options = RwaOptions::default().with_overrides(ParameterOverrides {
            pd: Some(f64::NAN),
            lgd: Some(f64::INFINITY),
            ead: Some(f64::NAN),
            maturity: Some(f64::NEG_INFINITY),
            ..ParameterOverrides::default()
        });
        let cp = Counterparty::new(CounterpartyId::new("N"), 0.05, 0.2, 5.0, 1.0).unwrap();
        let result = compute_rwa(&cp, &CounterpartyOverlays::NONE, &options);

        assert_eq!(result.pd, DEFAULT_PD);
        assert_eq!(result.lgd, DEFAULT_LGD);
        assert_eq!(result.ead, DEFAULT_EAD);
        assert_eq!(result.maturity, DEFAULT_MATURITY);
    }

    #[test]
    fn test_overrides_replace_counterparty_values() {
        let options = RwaOptions::default().with_overrides(ParameterOverrides {
            correlation: Some(0.15),
            maturity_adjustment: Some(1.0),
            lgd: Some(0.25),
            ..ParameterOverrides::default()
        });
        let result = compute_rwa(&golden(), &CounterpartyOverlays::NONE, &options);

        assert_eq!(result.correlation, 0.15);
        assert_eq!(result.maturity_adjustment, 1.0);
        assert_eq!(result.lgd, 0.25);
        assert_relative_eq!(result.k, capital_requirement(0.01, 0.25, 0.15, 1.0), epsilon = 1e-15);
    }

    #[test]
    fn test_rating_pd_takes_precedence() {
        let cp = golden()
            .with_credit_rating(CreditRating::B)
            .with_rating_pd(true);
        let result = compute_rwa(&cp, &CounterpartyOverlays::NONE, &RwaOptions::default());
        assert_eq!(result.pd, CreditRating::B.indicative_pd());
    }

    #[test]
    fn test_ttc_source_uses_derived_ttc_pd() {
        let cp = Counterparty::new(CounterpartyId::new("RE"), 0.04, 0.45, 1.0, 2.5)
            .unwrap()
            .with_industry("Real Estate");
        let options = RwaOptions::default().with_pd_source(PdSource::ThroughTheCycle);
        let result = compute_rwa(&cp, &CounterpartyOverlays::NONE, &options);

        // 0.04 · 0.7 + 0.030 · 0.3 at a neutral cycle
        assert_relative_eq!(result.ttc_pd, 0.037, epsilon = 1e-12);
        assert_eq!(result.pd, result.ttc_pd);
    }

    #[test]
    fn test_explicit_ttc_pd_is_used() {
        let cp = golden().with_ttc_pd(0.02).unwrap();
        let options = RwaOptions::default().with_pd_source(PdSource::ThroughTheCycle);
        let result = compute_rwa(&cp, &CounterpartyOverlays::NONE, &options);
        assert_eq!(result.pd, 0.02);

        let pit = compute_rwa(&cp, &CounterpartyOverlays::NONE, &RwaOptions::default());
        assert_eq!(pit.pd, 0.01);
        assert_eq!(pit.ttc_pd, 0.02);
    }

    #[test]
    fn test_financial_correlation_multiplier_is_opt_in() {
        let cp = golden().with_flags(InstitutionFlags {
            is_financial: true,
            is_large_financial: true,
            is_regulated: true,
        });
        let off = compute_rwa(&cp, &CounterpartyOverlays::NONE, &RwaOptions::default());
        let on = compute_rwa(
            &cp,
            &CounterpartyOverlays::NONE,
            &RwaOptions::default().with_financial_correlation_multiplier(true),
        );

        assert_relative_eq!(on.correlation, off.correlation * 1.25, epsilon = 1e-12);
        assert!(on.rwa > off.rwa);
    }

    #[test]
    fn test_simplified_formula() {
        let result = compute_rwa(&golden(), &CounterpartyOverlays::NONE, &simplified());
        assert_relative_eq!(result.k, 0.0045, epsilon = 1e-15);
        assert_relative_eq!(result.rwa, 562_500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_counterparty_yields_zeroed_result() {
        let engine = CapitalEngine::default();
        let none = engine.compute_opt(None, &CounterpartyOverlays::NONE);
        assert_eq!(none, RwaResult::zeroed(CounterpartyId::default()));

        let portfolio = PortfolioBuilder::new().add_counterparty(golden()).build().unwrap();
        let unknown =
            engine.compute_by_id(&portfolio, &AdjustmentBook::new(), &CounterpartyId::new("NOPE"));
        assert_eq!(unknown.counterparty_id.as_str(), "NOPE");
        assert_eq!(unknown.rwa, 0.0);
        assert_eq!(unknown.rwa_density(), 0.0);
    }

    #[test]
    fn test_compute_portfolio_preserves_order_and_reads_book() {
        let ids = ["C", "A", "B"];
        let portfolio = PortfolioBuilder::new()
            .add_counterparties(ids.iter().map(|id| {
                Counterparty::new(CounterpartyId::new(*id), 0.02, 0.45, 1_000.0, 2.5).unwrap()
            }))
            .build()
            .unwrap();
        let mut book = AdjustmentBook::new();
        book.set(
            CounterpartyId::new("A"),
            AdjustmentLevel::Counterparty,
            Adjustment::multiplicative(2.0),
        );

        let results = CapitalEngine::default().compute_portfolio(&portfolio, &book);

        let order: Vec<&str> = results.iter().map(|r| r.counterparty_id.as_str()).collect();
        assert_eq!(order, ids);
        assert_relative_eq!(results[1].rwa, 2.0 * results[0].rwa, epsilon = 1e-9);
        assert_relative_eq!(total_rwa(&results), 4.0 * results[0].rwa, epsilon = 1e-9);
    }

    #[test]
    fn test_formula_and_source_parsing() {
        assert_eq!("IRB".parse::<CapitalFormula>().unwrap(), CapitalFormula::Basel);
        assert_eq!("simplified".parse::<CapitalFormula>().unwrap(), CapitalFormula::Simplified);
        assert!("vasicek".parse::<CapitalFormula>().is_err());
        assert_eq!("through-the-cycle".parse::<PdSource>().unwrap(), PdSource::ThroughTheCycle);
        assert_eq!(PdSource::PointInTime.to_string(), "pit");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_capital_is_non_negative_and_bounded_by_lgd_times_ma(
            pd in 0.0001_f64..0.9999,
            lgd in 0.0_f64..1.0,
            maturity in 1.0_f64..5.0,
        ) {
            let cp = Counterparty::new(CounterpartyId::new("P"), pd, lgd, 1.0, maturity).unwrap();
            let result = compute_rwa(&cp, &CounterpartyOverlays::NONE, &RwaOptions::default());
            prop_assert!(result.k >= 0.0);
            prop_assert!(result.k <= lgd * result.maturity_adjustment + 1e-12);
            prop_assert_eq!(result.rwa, result.original_rwa);
        }

        #[test]
        fn prop_rwa_scales_linearly_with_ead(
            pd in 0.0003_f64..0.5,
            ead in 1.0_f64..1e9,
        ) {
            let unit = Counterparty::new(CounterpartyId::new("U"), pd, 0.45, 1.0, 2.5).unwrap();
            let scaled = unit.clone().with_ead(ead).unwrap();
            let options = RwaOptions::default();
            let a = compute_rwa(&unit, &CounterpartyOverlays::NONE, &options);
            let b = compute_rwa(&scaled, &CounterpartyOverlays::NONE, &options);
            prop_assert!((b.rwa - a.rwa * ead).abs() <= 1e-9 * b.rwa.max(1.0));
        }
    }
}
