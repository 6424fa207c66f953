//! Portfolio-level aggregation of capital results.

use std::collections::BTreeMap;

use crate::engine::RwaResult;
use crate::portfolio::Portfolio;

/// Segment label for counterparties without an industry or region.
pub const UNCLASSIFIED: &str = "Unclassified";

/// Totals for one industry or region.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentTotals {
    /// Number of counterparties
    pub count: usize,
    /// Sum of EAD
    pub ead: f64,
    /// Sum of post-overlay RWA
    pub rwa: f64,
}

impl SegmentTotals {
    fn add(&mut self, result: &RwaResult) {
        self.count += 1;
        self.ead += result.ead;
        self.rwa += result.rwa;
    }
}

/// Aggregate view of a set of capital results.
///
/// PD and LGD averages are EAD-weighted. All ratios are zero for a
/// portfolio without exposure.
///
/// # Examples
///
/// ```
/// use capital_risk::adjustment::AdjustmentBook;
/// use capital_risk::engine::CapitalEngine;
/// use capital_risk::portfolio::{Counterparty, CounterpartyId, PortfolioBuilder};
/// use capital_risk::summary::PortfolioSummary;
///
/// let portfolio = PortfolioBuilder::new()
///     .add_counterparty(
///         Counterparty::new(CounterpartyId::new("A"), 0.01, 0.45, 1_000.0, 2.5)
///             .unwrap()
///             .with_industry("Retail"),
///     )
///     .build()
///     .unwrap();
/// let results = CapitalEngine::default().compute_portfolio(&portfolio, &AdjustmentBook::new());
///
/// let summary = PortfolioSummary::from_results(&portfolio, &results);
/// assert_eq!(summary.counterparty_count, 1);
/// assert_eq!(summary.by_industry["Retail"].count, 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioSummary {
    /// Number of results aggregated
    pub counterparty_count: usize,
    /// Sum of EAD
    pub total_ead: f64,
    /// Sum of pre-overlay RWA
    pub total_original_rwa: f64,
    /// Sum of post-overlay RWA
    pub total_rwa: f64,
    /// Net effect of all overlays
    pub total_adjustment: f64,
    /// EAD-weighted PD
    pub weighted_pd: f64,
    /// EAD-weighted LGD
    pub weighted_lgd: f64,
    /// Total RWA over total EAD
    pub rwa_density: f64,
    /// Totals per industry
    pub by_industry: BTreeMap<String, SegmentTotals>,
    /// Totals per region
    pub by_region: BTreeMap<String, SegmentTotals>,
}

impl PortfolioSummary {
    /// Aggregates `results`, classifying each through `portfolio`.
    ///
    /// Results whose counterparty is not in the portfolio, or has no
    /// industry or region, are grouped under [`UNCLASSIFIED`].
    pub fn from_results(portfolio: &Portfolio, results: &[RwaResult]) -> Self {
        let mut summary = Self {
            counterparty_count: results.len(),
            ..Self::default()
        };
        let mut pd_weight = 0.0;
        let mut lgd_weight = 0.0;

        for result in results {
            summary.total_ead += result.ead;
            summary.total_original_rwa += result.original_rwa;
            summary.total_rwa += result.rwa;
            pd_weight += result.pd * result.ead;
            lgd_weight += result.lgd * result.ead;

            let cp = portfolio.counterparty(&result.counterparty_id);
            let industry = segment_label(cp.map(|c| c.industry()));
            let region = segment_label(cp.map(|c| c.region()));
            summary.by_industry.entry(industry).or_default().add(result);
            summary.by_region.entry(region).or_default().add(result);
        }

        summary.total_adjustment = summary.total_rwa - summary.total_original_rwa;
        if summary.total_ead > 0.0 {
            summary.weighted_pd = pd_weight / summary.total_ead;
            summary.weighted_lgd = lgd_weight / summary.total_ead;
            summary.rwa_density = summary.total_rwa / summary.total_ead;
        }
        summary
    }
}

fn segment_label(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => UNCLASSIFIED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::{Adjustment, AdjustmentBook, AdjustmentLevel};
    use crate::engine::{CapitalEngine, CapitalFormula, RwaOptions};
    use crate::portfolio::{Counterparty, CounterpartyId, PortfolioBuilder};
    use approx::assert_relative_eq;

    fn portfolio() -> Portfolio {
        let cp = |id: &str, pd: f64, ead: f64, industry: &str, region: &str| {
            Counterparty::new(CounterpartyId::new(id), pd, 0.5, ead, 2.5)
                .unwrap()
                .with_industry(industry)
                .with_region(region)
        };
        PortfolioBuilder::new()
            .add_counterparty(cp("A", 0.01, 100.0, "Retail", "EMEA"))
            .add_counterparty(cp("B", 0.03, 300.0, "Retail", "APAC"))
            .add_counterparty(cp("C", 0.02, 600.0, "", "EMEA"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_totals_and_weighted_averages() {
        let portfolio = portfolio();
        let engine = CapitalEngine::new(RwaOptions::default().with_formula(CapitalFormula::Simplified));
        let results = engine.compute_portfolio(&portfolio, &AdjustmentBook::new());
        let summary = PortfolioSummary::from_results(&portfolio, &results);

        assert_eq!(summary.counterparty_count, 3);
        assert_relative_eq!(summary.total_ead, 1_000.0);
        // (0.01·100 + 0.03·300 + 0.02·600) / 1000
        assert_relative_eq!(summary.weighted_pd, 0.022, epsilon = 1e-12);
        assert_relative_eq!(summary.weighted_lgd, 0.5, epsilon = 1e-12);
        assert_relative_eq!(summary.total_rwa, 0.5 * 22.0 * 12.5, epsilon = 1e-9);
        assert_relative_eq!(summary.rwa_density, summary.total_rwa / 1_000.0);
        assert_eq!(summary.total_adjustment, 0.0);
    }

    #[test]
    fn test_segments() {
        let portfolio = portfolio();
        let results = CapitalEngine::default().compute_portfolio(&portfolio, &AdjustmentBook::new());
        let summary = PortfolioSummary::from_results(&portfolio, &results);

        assert_eq!(summary.by_industry["Retail"].count, 2);
        assert_eq!(summary.by_industry[UNCLASSIFIED].count, 1);
        assert_relative_eq!(summary.by_region["EMEA"].ead, 700.0);
        assert_relative_eq!(
            summary.by_region["EMEA"].rwa + summary.by_region["APAC"].rwa,
            summary.total_rwa,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_adjustment_total_reflects_overlays() {
        let portfolio = portfolio();
        let mut book = AdjustmentBook::new();
        book.set(CounterpartyId::new("B"), AdjustmentLevel::Portfolio, Adjustment::additive(-5.0));
        let results = CapitalEngine::default().compute_portfolio(&portfolio, &book);
        let summary = PortfolioSummary::from_results(&portfolio, &results);

        assert_relative_eq!(summary.total_adjustment, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_results() {
        let summary = PortfolioSummary::from_results(&Portfolio::default(), &[]);
        assert_eq!(summary, PortfolioSummary::default());
    }
}
