//! Applying EAD multipliers to a portfolio.
//!
//! The optimiser only proposes multipliers. Re-pricing the scaled portfolio
//! with the capital engine gives the exact post-optimisation RWA.

use std::collections::BTreeMap;

use capital_risk::portfolio::{CounterpartyId, Portfolio, PortfolioBuilder};

use crate::error::OptimiserError;

/// Returns a new portfolio with each EAD scaled by its multiplier.
///
/// Counterparties without a multiplier keep their exposure. Multipliers for
/// IDs outside the portfolio are ignored.
///
/// # Errors
///
/// Returns `OptimiserError::InvalidMultiplier` for a negative or non-finite
/// multiplier.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use capital_optimiser::exposure::apply_ead_multipliers;
/// use capital_risk::portfolio::{Counterparty, CounterpartyId, PortfolioBuilder};
///
/// let portfolio = PortfolioBuilder::new()
///     .add_counterparty(Counterparty::new(CounterpartyId::new("A"), 0.01, 0.45, 200.0, 2.5).unwrap())
///     .add_counterparty(Counterparty::new(CounterpartyId::new("B"), 0.02, 0.45, 300.0, 2.5).unwrap())
///     .build()
///     .unwrap();
///
/// let multipliers = BTreeMap::from([(CounterpartyId::new("A"), 0.5)]);
/// let scaled = apply_ead_multipliers(&portfolio, &multipliers).unwrap();
///
/// assert_eq!(scaled.counterparty(&CounterpartyId::new("A")).unwrap().ead(), 100.0);
/// assert_eq!(scaled.counterparty(&CounterpartyId::new("B")).unwrap().ead(), 300.0);
/// ```
pub fn apply_ead_multipliers(
    portfolio: &Portfolio,
    multipliers: &BTreeMap<CounterpartyId, f64>,
) -> Result<Portfolio, OptimiserError> {
    let mut scaled = Vec::with_capacity(portfolio.len());
    for cp in portfolio {
        let multiplier = multipliers.get(cp.id()).copied().unwrap_or(1.0);
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(OptimiserError::InvalidMultiplier {
                counterparty: cp.id().to_string(),
                multiplier,
            });
        }
        let ead = cp.ead() * multiplier;
        scaled.push(cp.clone().with_ead(ead)?);
    }

    let unknown = multipliers.keys().filter(|id| !portfolio.contains(id)).count();
    if unknown > 0 {
        tracing::debug!(unknown, "ignored multipliers for counterparties outside the portfolio");
    }

    Ok(PortfolioBuilder::new().add_counterparties(scaled).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capital_risk::portfolio::Counterparty;

    fn portfolio() -> Portfolio {
        PortfolioBuilder::new()
            .add_counterparty(
                Counterparty::new(CounterpartyId::new("A"), 0.01, 0.45, 200.0, 2.5)
                    .unwrap()
                    .with_name("Alpha"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_scaling_keeps_other_fields() {
        let multipliers = BTreeMap::from([(CounterpartyId::new("A"), 0.75)]);
        let scaled = apply_ead_multipliers(&portfolio(), &multipliers).unwrap();
        let cp = scaled.counterparty(&CounterpartyId::new("A")).unwrap();

        assert_eq!(cp.ead(), 150.0);
        assert_eq!(cp.name(), "Alpha");
        assert_eq!(cp.pd(), 0.01);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let multipliers = BTreeMap::from([(CounterpartyId::new("GHOST"), 0.5)]);
        let scaled = apply_ead_multipliers(&portfolio(), &multipliers).unwrap();
        assert_eq!(scaled.total_ead(), 200.0);
    }

    #[test]
    fn test_invalid_multiplier() {
        for bad in [-0.1, f64::NAN, f64::INFINITY] {
            let multipliers = BTreeMap::from([(CounterpartyId::new("A"), bad)]);
            assert!(matches!(
                apply_ead_multipliers(&portfolio(), &multipliers),
                Err(OptimiserError::InvalidMultiplier { .. })
            ));
        }
    }
}
