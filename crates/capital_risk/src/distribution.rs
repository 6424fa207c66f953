//! Distribution of a portfolio-level RWA adjustment across counterparties.
//!
//! A portfolio adjustment is requested either as a percentage of the
//! selected counterparties' baseline RWA or as an absolute amount with an
//! allocation rule. The result records each counterparty's share together
//! with the portfolio-level overlay that reproduces it, ready to be written
//! into an [`AdjustmentBook`].
//!
//! Baseline RWA is the RWA after the counterparty-level overlay and before
//! any portfolio-level overlay, so repeating a distribution replaces the
//! previous portfolio overlay instead of compounding it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use capital_core::types::ParameterError;
use chrono::{DateTime, Utc};

use crate::adjustment::{Adjustment, AdjustmentBook, AdjustmentLevel};
use crate::engine::RwaResult;
use crate::portfolio::CounterpartyId;

/// Rule for splitting an absolute adjustment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistributionMethod {
    /// Share proportional to baseline RWA.
    #[default]
    Proportional,
    /// Same share for every selected counterparty.
    Equal,
    /// Share proportional to baseline RWA, which already reflects risk weight.
    RiskWeighted,
}

impl DistributionMethod {
    /// Get the name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            DistributionMethod::Proportional => "proportional",
            DistributionMethod::Equal => "equal",
            DistributionMethod::RiskWeighted => "risk_weighted",
        }
    }
}

impl fmt::Display for DistributionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionMethod {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "proportional" => Ok(DistributionMethod::Proportional),
            "equal" => Ok(DistributionMethod::Equal),
            "risk_weighted" | "riskweighted" => Ok(DistributionMethod::RiskWeighted),
            other => Err(ParameterError::InvalidInput(format!(
                "Unknown distribution method: {}. Supported: proportional, equal, risk_weighted",
                other
            ))),
        }
    }
}

/// Requested portfolio-level adjustment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum AdjustmentRequest {
    /// Scale every selected counterparty's baseline by `1 + percent / 100`.
    Percentage {
        /// Change in percent (negative to reduce)
        percent: f64,
    },
    /// Add `amount` in total, split by `method`.
    Absolute {
        /// Total RWA change (negative to reduce)
        amount: f64,
        /// Allocation rule
        method: DistributionMethod,
    },
}

impl AdjustmentRequest {
    /// Percentage request.
    #[inline]
    pub fn percentage(percent: f64) -> Self {
        AdjustmentRequest::Percentage { percent }
    }

    /// Absolute request.
    #[inline]
    pub fn absolute(amount: f64, method: DistributionMethod) -> Self {
        AdjustmentRequest::Absolute { amount, method }
    }

    /// Requested value: percent or amount.
    #[inline]
    pub fn value(&self) -> f64 {
        match *self {
            AdjustmentRequest::Percentage { percent } => percent,
            AdjustmentRequest::Absolute { amount, .. } => amount,
        }
    }
}

impl fmt::Display for AdjustmentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjustmentRequest::Percentage { percent } => write!(f, "{:+}%", percent),
            AdjustmentRequest::Absolute { amount, method } => write!(f, "{:+} ({})", amount, method),
        }
    }
}

/// One counterparty's part of a portfolio adjustment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterpartyAllocation {
    /// Counterparty receiving the share
    pub counterparty_id: CounterpartyId,
    /// RWA before the portfolio-level overlay
    pub baseline_rwa: f64,
    /// RWA change allocated to this counterparty
    pub share: f64,
    /// RWA after the allocation
    pub adjusted_rwa: f64,
    /// Portfolio-level overlay producing `adjusted_rwa`
    pub overlay: Adjustment,
}

/// Outcome of distributing a portfolio-level adjustment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioAdjustment {
    /// Request that produced this adjustment
    pub request: AdjustmentRequest,
    /// Free-text justification
    pub reason: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Sum of baseline RWA over the allocations
    pub total_baseline_rwa: f64,
    /// Total RWA change
    pub total_adjustment: f64,
    /// Sum of adjusted RWA over the allocations
    pub total_adjusted_rwa: f64,
    /// Total change relative to the baseline, in percent
    pub percentage_change: f64,
    /// Per-counterparty allocations, in selection order
    pub allocations: Vec<CounterpartyAllocation>,
    /// Selected IDs without a capital result
    pub skipped: Vec<CounterpartyId>,
}

impl PortfolioAdjustment {
    /// Sets the justification.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Sets the creation time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the allocation for `id`.
    pub fn allocation(&self, id: &CounterpartyId) -> Option<&CounterpartyAllocation> {
        self.allocations.iter().find(|a| &a.counterparty_id == id)
    }

    /// Writes each allocation's overlay into the portfolio level of `book`.
    ///
    /// Counterparties outside the allocation keep their portfolio overlay.
    pub fn apply_to(&self, book: &mut AdjustmentBook) {
        for allocation in &self.allocations {
            book.set(
                allocation.counterparty_id.clone(),
                AdjustmentLevel::Portfolio,
                allocation.overlay,
            );
        }
    }
}

/// Splits a portfolio-level adjustment across the selected counterparties.
///
/// Shares are computed on baseline RWA:
/// - `Percentage`: every baseline scales by `1 + percent / 100`; the share
///   is the resulting change
/// - `Absolute` with `Proportional` or `RiskWeighted`: `amount · baseline / total`
/// - `Absolute` with `Equal`: `amount / n`
///
/// An empty selection or a zero total baseline produces zero shares and no
/// overlays. Selected IDs without a result are skipped with a warning;
/// repeated IDs are counted once.
///
/// # Examples
///
/// ```
/// use capital_risk::distribution::{distribute, AdjustmentRequest, DistributionMethod};
/// use capital_risk::engine::RwaResult;
/// use capital_risk::portfolio::CounterpartyId;
///
/// let results: Vec<RwaResult> = [("A", 100.0), ("B", 200.0), ("C", 300.0)]
///     .into_iter()
///     .map(|(id, rwa)| RwaResult {
///         counterparty_id: CounterpartyId::new(id),
///         original_rwa: rwa,
///         baseline_rwa: rwa,
///         rwa,
///         ..RwaResult::default()
///     })
///     .collect();
/// let selected: Vec<CounterpartyId> = results.iter().map(|r| r.counterparty_id.clone()).collect();
///
/// let adj = distribute(
///     &results,
///     &selected,
///     &AdjustmentRequest::absolute(-60.0, DistributionMethod::Equal),
/// );
/// let adjusted: Vec<f64> = adj.allocations.iter().map(|a| a.adjusted_rwa).collect();
/// assert_eq!(adjusted, vec![80.0, 180.0, 280.0]);
/// ```
pub fn distribute(
    results: &[RwaResult],
    selected_ids: &[CounterpartyId],
    request: &AdjustmentRequest,
) -> PortfolioAdjustment {
    let by_id: HashMap<&CounterpartyId, &RwaResult> =
        results.iter().map(|r| (&r.counterparty_id, r)).collect();

    let mut seen = HashSet::with_capacity(selected_ids.len());
    let mut matched = Vec::with_capacity(selected_ids.len());
    let mut skipped = Vec::new();
    for id in selected_ids {
        if !seen.insert(id) {
            continue;
        }
        match by_id.get(id) {
            Some(result) => matched.push(*result),
            None => {
                tracing::warn!(
                    counterparty = %id,
                    "selected counterparty has no capital result, skipped"
                );
                skipped.push(id.clone());
            }
        }
    }

    let total_baseline: f64 = matched.iter().map(|r| r.baseline_rwa).sum();
    let degenerate = matched.is_empty() || total_baseline == 0.0;

    let total_adjustment = if degenerate {
        0.0
    } else {
        match *request {
            AdjustmentRequest::Percentage { percent } => total_baseline * percent / 100.0,
            AdjustmentRequest::Absolute { amount, .. } => amount,
        }
    };

    let allocations: Vec<CounterpartyAllocation> = matched
        .iter()
        .map(|result| {
            let baseline = result.baseline_rwa;
            let (share, adjusted, overlay) = if degenerate {
                (0.0, baseline, Adjustment::None)
            } else {
                allocate(request, baseline, total_baseline, total_adjustment, matched.len())
            };
            CounterpartyAllocation {
                counterparty_id: result.counterparty_id.clone(),
                baseline_rwa: baseline,
                share,
                adjusted_rwa: adjusted,
                overlay,
            }
        })
        .collect();

    let percentage_change = if degenerate {
        0.0
    } else {
        total_adjustment / total_baseline * 100.0
    };

    tracing::debug!(
        request = %request,
        allocations = allocations.len(),
        skipped = skipped.len(),
        total_adjustment,
        "distributed portfolio adjustment"
    );

    PortfolioAdjustment {
        request: *request,
        reason: String::new(),
        timestamp: Utc::now(),
        total_baseline_rwa: total_baseline,
        total_adjustment,
        total_adjusted_rwa: allocations.iter().map(|a| a.adjusted_rwa).sum(),
        percentage_change,
        allocations,
        skipped,
    }
}

fn allocate(
    request: &AdjustmentRequest,
    baseline: f64,
    total_baseline: f64,
    total_adjustment: f64,
    count: usize,
) -> (f64, f64, Adjustment) {
    let proportional = total_adjustment * baseline / total_baseline;
    match *request {
        AdjustmentRequest::Percentage { percent } => {
            let factor = 1.0 + percent / 100.0;
            (proportional, baseline * factor, Adjustment::multiplicative(factor))
        }
        AdjustmentRequest::Absolute { method, .. } => {
            let share = match method {
                DistributionMethod::Proportional | DistributionMethod::RiskWeighted => proportional,
                DistributionMethod::Equal => total_adjustment / count as f64,
            };
            (share, baseline + share, Adjustment::additive(share))
        }
    }
}
