//! Portfolio builder for constructing validated portfolios.

use std::collections::HashMap;

use super::counterparty::Counterparty;
use super::error::PortfolioError;
use super::Portfolio;

/// Builder for constructing portfolios with validation.
///
/// Counterparties keep the order in which they were added; capital results
/// for a portfolio are returned in the same order.
///
/// # Examples
///
/// ```
/// use capital_risk::portfolio::{Counterparty, CounterpartyId, PortfolioBuilder};
///
/// let a = Counterparty::new(CounterpartyId::new("A"), 0.01, 0.45, 1_000_000.0, 2.5).unwrap();
/// let b = Counterparty::new(CounterpartyId::new("B"), 0.03, 0.40, 2_000_000.0, 1.0).unwrap();
///
/// let portfolio = PortfolioBuilder::new()
///     .add_counterparty(a)
///     .add_counterparty(b)
///     .build()
///     .unwrap();
///
/// assert_eq!(portfolio.len(), 2);
/// assert_eq!(portfolio.total_ead(), 3_000_000.0);
/// ```
#[derive(Default)]
pub struct PortfolioBuilder {
    counterparties: Vec<Counterparty>,
}

impl PortfolioBuilder {
    /// Creates a new portfolio builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a counterparty to the portfolio.
    pub fn add_counterparty(mut self, counterparty: Counterparty) -> Self {
        self.counterparties.push(counterparty);
        self
    }

    /// Adds multiple counterparties to the portfolio.
    pub fn add_counterparties(
        mut self,
        counterparties: impl IntoIterator<Item = Counterparty>,
    ) -> Self {
        self.counterparties.extend(counterparties);
        self
    }

    /// Builds and validates the portfolio.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::DuplicateCounterparty` if two counterparties
    /// share an ID.
    pub fn build(self) -> Result<Portfolio, PortfolioError> {
        let mut index = HashMap::with_capacity(self.counterparties.len());
        for (position, cp) in self.counterparties.iter().enumerate() {
            if index.insert(cp.id().clone(), position).is_some() {
                return Err(PortfolioError::DuplicateCounterparty(cp.id().to_string()));
            }
        }

        Ok(Portfolio {
            counterparties: self.counterparties,
            index,
        })
    }
}
