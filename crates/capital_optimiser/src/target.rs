//! Greedy exposure scaling towards a target total RWA.
//!
//! Counterparties are visited in a caller-chosen priority order. Each one
//! can have its EAD cut down to the floor (half by default); since RWA is
//! linear in EAD, the achievable reduction is `(1 − floor) · RWA`. The
//! search takes full cuts while they fit in the remaining gap and finishes
//! with one partial cut, so the estimated RWA never undershoots the target.
//! When every counterparty is at the floor and the gap remains, the result
//! is still successful and `achieved_rwa` sits above the target.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use capital_risk::engine::RwaResult;
use capital_risk::portfolio::CounterpartyId;

use crate::error::OptimiserError;

/// Default lower bound on EAD multipliers.
pub const DEFAULT_EAD_FLOOR: f64 = 0.5;

/// Result field used to rank counterparties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RiskKey {
    /// Through-the-cycle PD
    #[default]
    TtcPd,
    /// PD used in the capital formula
    Pd,
    /// Loss given default
    Lgd,
    /// Exposure at default
    Ead,
    /// Effective maturity
    Maturity,
    /// Post-overlay RWA
    Rwa,
    /// Risk weight
    RiskWeight,
}

impl RiskKey {
    /// Get the name of this key.
    pub fn name(&self) -> &'static str {
        match self {
            RiskKey::TtcPd => "ttc_pd",
            RiskKey::Pd => "pd",
            RiskKey::Lgd => "lgd",
            RiskKey::Ead => "ead",
            RiskKey::Maturity => "maturity",
            RiskKey::Rwa => "rwa",
            RiskKey::RiskWeight => "risk_weight",
        }
    }

    /// Reads this key from a capital result.
    #[inline]
    pub fn value(&self, result: &RwaResult) -> f64 {
        match self {
            RiskKey::TtcPd => result.ttc_pd,
            RiskKey::Pd => result.pd,
            RiskKey::Lgd => result.lgd,
            RiskKey::Ead => result.ead,
            RiskKey::Maturity => result.maturity,
            RiskKey::Rwa => result.rwa,
            RiskKey::RiskWeight => result.risk_weight,
        }
    }
}

impl fmt::Display for RiskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RiskKey {
    type Err = OptimiserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "ttc_pd" | "ttc" => Ok(RiskKey::TtcPd),
            "pd" => Ok(RiskKey::Pd),
            "lgd" => Ok(RiskKey::Lgd),
            "ead" => Ok(RiskKey::Ead),
            "maturity" => Ok(RiskKey::Maturity),
            "rwa" => Ok(RiskKey::Rwa),
            "risk_weight" | "rw" => Ok(RiskKey::RiskWeight),
            other => Err(OptimiserError::InvalidInput(format!(
                "Unknown priority key: {}. Supported: ttc_pd, pd, lgd, ead, maturity, rwa, risk_weight",
                other
            ))),
        }
    }
}

/// Sort direction of the priority order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SortDirection {
    /// Largest value first
    #[default]
    Descending,
    /// Smallest value first
    Ascending,
}

impl FromStr for SortDirection {
    type Err = OptimiserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "desc" | "descending" => Ok(SortDirection::Descending),
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            other => Err(OptimiserError::InvalidInput(format!(
                "Unknown sort direction: {}. Supported: asc, desc",
                other
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Descending => "desc",
            SortDirection::Ascending => "asc",
        })
    }
}

/// Order in which counterparties are scaled.
///
/// Defaults to highest TTC PD first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityOrder {
    /// Ranking field
    pub key: RiskKey,
    /// Sort direction
    pub direction: SortDirection,
}

impl PriorityOrder {
    /// Creates a priority order.
    #[inline]
    pub fn new(key: RiskKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Returns `results` stably sorted by this order.
    pub fn sort<'a>(&self, results: &'a [RwaResult]) -> Vec<&'a RwaResult> {
        let mut ordered: Vec<&RwaResult> = results.iter().collect();
        ordered.sort_by(|a, b| {
            let (x, y) = (self.key.value(a), self.key.value(b));
            match self.direction {
                SortDirection::Ascending => x.total_cmp(&y),
                SortDirection::Descending => y.total_cmp(&x),
            }
        });
        ordered
    }
}

/// Outcome of an optimisation request.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimisationResult {
    /// Whether a set of multipliers was produced
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Requested total RWA
    pub target_rwa: Option<f64>,
    /// Estimated total RWA after scaling
    pub achieved_rwa: Option<f64>,
    /// EAD multiplier per counterparty; empty on failure
    pub ead_multipliers: BTreeMap<CounterpartyId, f64>,
}

impl OptimisationResult {
    fn failure(message: String, target_rwa: f64) -> Self {
        Self {
            success: false,
            message,
            target_rwa: Some(target_rwa),
            ..Self::default()
        }
    }

    /// Multiplier for `id`, 1.0 when none was assigned.
    #[inline]
    pub fn multiplier(&self, id: &CounterpartyId) -> f64 {
        self.ead_multipliers.get(id).copied().unwrap_or(1.0)
    }

    /// Whether the estimated RWA is at or below the target.
    pub fn meets_target(&self) -> bool {
        match (self.achieved_rwa, self.target_rwa) {
            (Some(achieved), Some(target)) => self.success && achieved <= target * (1.0 + 1e-12),
            _ => false,
        }
    }
}

/// Greedy target-RWA optimiser.
///
/// # Examples
///
/// ```
/// use capital_optimiser::target::{PriorityOrder, TargetRwaOptimiser};
/// use capital_risk::engine::RwaResult;
/// use capital_risk::portfolio::CounterpartyId;
///
/// let results: Vec<RwaResult> = [("A", 0.01, 100.0), ("B", 0.05, 300.0)]
///     .into_iter()
///     .map(|(id, ttc_pd, rwa)| RwaResult {
///         counterparty_id: CounterpartyId::new(id),
///         ttc_pd,
///         ead: 100.0,
///         rwa,
///         ..RwaResult::default()
///     })
///     .collect();
///
/// let result = TargetRwaOptimiser::default().optimise(&results, 400.0, 300.0, PriorityOrder::default());
///
/// assert!(result.success);
/// // B has the higher TTC PD and absorbs the whole reduction
/// assert!((result.multiplier(&CounterpartyId::new("B")) - 2.0 / 3.0).abs() < 1e-12);
/// assert_eq!(result.multiplier(&CounterpartyId::new("A")), 1.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TargetRwaOptimiser {
    ead_floor: f64,
}

impl Default for TargetRwaOptimiser {
    fn default() -> Self {
        Self {
            ead_floor: DEFAULT_EAD_FLOOR,
        }
    }
}

impl TargetRwaOptimiser {
    /// Creates an optimiser with the default EAD floor.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an optimiser with a custom EAD floor.
    ///
    /// # Errors
    ///
    /// Returns `OptimiserError::InvalidFloor` unless `floor` is in `(0, 1]`.
    pub fn with_ead_floor(floor: f64) -> Result<Self, OptimiserError> {
        if floor.is_finite() && floor > 0.0 && floor <= 1.0 {
            Ok(Self { ead_floor: floor })
        } else {
            Err(OptimiserError::InvalidFloor(floor))
        }
    }

    /// Returns the EAD floor.
    #[inline]
    pub fn ead_floor(&self) -> f64 {
        self.ead_floor
    }

    /// Searches for EAD multipliers bringing total RWA down to `target_rwa`.
    ///
    /// A target at or above the current total, or non-finite totals, yield
    /// an unsuccessful result without multipliers.
    pub fn optimise(
        &self,
        results: &[RwaResult],
        current_total_rwa: f64,
        target_rwa: f64,
        priority: PriorityOrder,
    ) -> OptimisationResult {
        if !current_total_rwa.is_finite() || !target_rwa.is_finite() {
            return OptimisationResult::failure(
                "Current and target RWA must be finite".to_string(),
                target_rwa,
            );
        }
        if target_rwa >= current_total_rwa {
            return OptimisationResult::failure(
                format!(
                    "Target RWA {:.2} is not below current RWA {:.2}; no reduction needed",
                    target_rwa, current_total_rwa
                ),
                target_rwa,
            );
        }

        let mut remaining = current_total_rwa - target_rwa;
        let mut multipliers = BTreeMap::new();

        for result in priority.sort(results) {
            if remaining <= 0.0 {
                break;
            }
            // Scaling exposure cannot lower a negative RWA; leave it at 1.0
            if result.rwa.is_nan() || result.rwa < 0.0 {
                continue;
            }
            let ead = result.ead;
            let density = if ead != 0.0 { result.rwa / ead } else { 0.0 };
            let max_reduction = (1.0 - self.ead_floor) * ead * density;

            let multiplier = if max_reduction <= remaining {
                remaining -= max_reduction;
                self.ead_floor
            } else {
                let multiplier = (1.0 - (remaining / density) / ead).max(self.ead_floor);
                remaining = 0.0;
                multiplier
            };
            multipliers.insert(result.counterparty_id.clone(), multiplier);
        }

        for result in results {
            multipliers
                .entry(result.counterparty_id.clone())
                .or_insert(1.0);
        }

        let reduction = current_total_rwa - target_rwa - remaining;
        let achieved = current_total_rwa - reduction;
        let message = if remaining > 0.0 {
            tracing::warn!(
                target_rwa,
                achieved_rwa = achieved,
                shortfall = remaining,
                "target RWA not reachable within the EAD floor"
            );
            format!(
                "All exposures at the {:.0}% floor; estimated RWA {:.2} remains above target {:.2}",
                self.ead_floor * 100.0,
                achieved,
                target_rwa
            )
        } else {
            tracing::info!(target_rwa, achieved_rwa = achieved, "target RWA reached");
            format!("Estimated RWA {:.2} meets target {:.2}", achieved, target_rwa)
        };

        OptimisationResult {
            success: true,
            message,
            target_rwa: Some(target_rwa),
            achieved_rwa: Some(achieved),
            ead_multipliers: multipliers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn result(id: &str, ttc_pd: f64, ead: f64, rwa: f64) -> RwaResult {
        RwaResult {
            counterparty_id: CounterpartyId::new(id),
            ttc_pd,
            pd: ttc_pd,
            ead,
            rwa,
            ..RwaResult::default()
        }
    }

    fn three() -> Vec<RwaResult> {
        vec![
            result("A", 0.01, 100.0, 100.0),
            result("B", 0.03, 100.0, 200.0),
            result("C", 0.05, 100.0, 300.0),
        ]
    }

    fn id(s: &str) -> CounterpartyId {
        CounterpartyId::new(s)
    }

    #[test]
    fn test_negative_rwa_is_left_unscaled() {
        let results = vec![
            result("A", 0.09, 100.0, -100.0),
            result("B", 0.05, 100.0, 300.0),
        ];
        let outcome =
            TargetRwaOptimiser::default().optimise(&results, 200.0, 100.0, PriorityOrder::default());

        assert!(outcome.success);
        assert_eq!(outcome.multiplier(&id("A")), 1.0);
        assert_relative_eq!(outcome.multiplier(&id("B")), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(outcome.achieved_rwa.unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_target_at_or_above_current_fails() {
        let optimiser = TargetRwaOptimiser::new();
        for target in [600.0, 700.0] {
            let result = optimiser.optimise(&three(), 600.0, target, PriorityOrder::default());
            assert!(!result.success);
            assert!(result.ead_multipliers.is_empty());
            assert_eq!(result.achieved_rwa, None);
        }
    }

    #[test]
    fn test_non_finite_inputs_fail() {
        let result =
            TargetRwaOptimiser::new().optimise(&three(), f64::NAN, 100.0, PriorityOrder::default());
        assert!(!result.success);
        assert!(result.ead_multipliers.is_empty());
    }

    #[test]
    fn test_single_full_cut_meets_target() {
        let result = TargetRwaOptimiser::new().optimise(&three(), 600.0, 450.0, PriorityOrder::default());

        assert!(result.success);
        assert_eq!(result.multiplier(&id("C")), 0.5);
        assert_eq!(result.multiplier(&id("B")), 1.0);
        assert_eq!(result.multiplier(&id("A")), 1.0);
        assert_eq!(result.ead_multipliers.len(), 3);
        assert_relative_eq!(result.achieved_rwa.unwrap(), 450.0, epsilon = 1e-9);
        assert!(result.meets_target());
    }

    #[test]
    fn test_partial_cut() {
        let result = TargetRwaOptimiser::new().optimise(&three(), 600.0, 500.0, PriorityOrder::default());

        // 1 − (100 / 3) / 100
        assert_relative_eq!(result.multiplier(&id("C")), 2.0 / 3.0, epsilon = 1e-12);
        assert_eq!(result.multiplier(&id("B")), 1.0);
        assert_relative_eq!(result.achieved_rwa.unwrap(), 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unreachable_target_still_succeeds() {
        let result = TargetRwaOptimiser::new().optimise(&three(), 600.0, 100.0, PriorityOrder::default());

        assert!(result.success);
        assert!(result.ead_multipliers.values().all(|&m| m == 0.5));
        assert_relative_eq!(result.achieved_rwa.unwrap(), 300.0, epsilon = 1e-9);
        assert!(!result.meets_target());
    }

    #[test]
    fn test_priority_order_changes_allocation() {
        let order = PriorityOrder::new(RiskKey::TtcPd, SortDirection::Ascending);
        let result = TargetRwaOptimiser::new().optimise(&three(), 600.0, 550.0, order);

        assert_eq!(result.multiplier(&id("A")), 0.5);
        assert_eq!(result.multiplier(&id("C")), 1.0);
        assert_relative_eq!(result.achieved_rwa.unwrap(), 550.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let results = vec![
            result("X", 0.02, 100.0, 100.0),
            result("Y", 0.02, 100.0, 100.0),
        ];
        let result = TargetRwaOptimiser::new().optimise(&results, 200.0, 150.0, PriorityOrder::default());
        assert_eq!(result.multiplier(&id("X")), 0.5);
        assert_eq!(result.multiplier(&id("Y")), 1.0);
    }

    #[test]
    fn test_zero_exposure_counterparty() {
        let results = vec![result("Z", 0.09, 0.0, 0.0), result("A", 0.01, 100.0, 100.0)];
        let result = TargetRwaOptimiser::new().optimise(&results, 100.0, 80.0, PriorityOrder::default());

        assert_eq!(result.multiplier(&id("Z")), 0.5);
        assert_relative_eq!(result.multiplier(&id("A")), 0.8, epsilon = 1e-12);
        assert_relative_eq!(result.achieved_rwa.unwrap(), 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_custom_floor() {
        let optimiser = TargetRwaOptimiser::with_ead_floor(0.8).unwrap();
        let result = optimiser.optimise(&three(), 600.0, 450.0, PriorityOrder::default());

        // C gives up 60, B 40 and A 20, leaving 30 above target
        assert_relative_eq!(result.multiplier(&id("C")), 0.8);
        assert_relative_eq!(result.multiplier(&id("B")), 0.8);
        assert_relative_eq!(result.multiplier(&id("A")), 0.8);
        assert_relative_eq!(result.achieved_rwa.unwrap(), 480.0, epsilon = 1e-9);
    }

    #[test]
    fn test_floor_validation() {
        assert!(TargetRwaOptimiser::with_ead_floor(1.0).is_ok());
        assert_eq!(
            TargetRwaOptimiser::with_ead_floor(0.0),
            Err(OptimiserError::InvalidFloor(0.0))
        );
        assert!(TargetRwaOptimiser::with_ead_floor(1.01).is_err());
        assert!(TargetRwaOptimiser::with_ead_floor(f64::NAN).is_err());
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("TTC-PD".parse::<RiskKey>().unwrap(), RiskKey::TtcPd);
        assert_eq!("rw".parse::<RiskKey>().unwrap(), RiskKey::RiskWeight);
        assert!("beta".parse::<RiskKey>().is_err());
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!(SortDirection::default().to_string(), "desc");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_multipliers_within_floor_and_estimate_not_below_target(
            rows in prop::collection::vec((0.0001_f64..0.3, 0.0_f64..1e6, 0.0_f64..3.0), 1..30),
            fraction in 0.0_f64..0.99,
        ) {
            let results: Vec<RwaResult> = rows
                .iter()
                .enumerate()
                .map(|(i, &(pd, ead, density))| result(&format!("P{}", i), pd, ead, ead * density))
                .collect();
            let current: f64 = results.iter().map(|r| r.rwa).sum();
            prop_assume!(current > 1.0);
            let target = current * fraction;

            let outcome = TargetRwaOptimiser::new().optimise(&results, current, target, PriorityOrder::default());

            prop_assert!(outcome.success);
            prop_assert_eq!(outcome.ead_multipliers.len(), results.len());
            for &m in outcome.ead_multipliers.values() {
                prop_assert!((0.5..=1.0).contains(&m));
            }
            let achieved = outcome.achieved_rwa.unwrap();
            prop_assert!(achieved >= target - 1e-6 * current);
            prop_assert!(achieved <= current);
        }
    }
}
