//! Counterparty portfolio for regulatory capital calculations.
//!
//! This module provides:
//! - Strongly-typed counterparty identifiers
//! - Counterparty records with PD, LGD, EAD, maturity and classification
//! - Credit ratings with indicative PDs
//! - An ordered portfolio container with O(1) lookup by ID
//!
//! # Examples
//!
//! ```
//! use capital_risk::portfolio::{Counterparty, CounterpartyId, PortfolioBuilder};
//!
//! let cp = Counterparty::new(CounterpartyId::new("CP001"), 0.01, 0.45, 10_000_000.0, 2.5)
//!     .unwrap()
//!     .with_name("Acme Corp")
//!     .with_region("EMEA");
//!
//! let portfolio = PortfolioBuilder::new().add_counterparty(cp).build().unwrap();
//!
//! let found = portfolio.counterparty(&CounterpartyId::new("CP001"));
//! assert_eq!(found.map(|c| c.region()), Some("EMEA"));
//! ```

mod builder;
mod counterparty;
mod error;
mod ids;
mod rating;

pub use builder::PortfolioBuilder;
pub use counterparty::{Counterparty, InstitutionFlags};
pub use error::PortfolioError;
pub use ids::CounterpartyId;
pub use rating::CreditRating;

use std::collections::HashMap;

/// Ordered collection of counterparties with lookup by ID.
///
/// Built through [`PortfolioBuilder`], which guarantees unique IDs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Portfolio {
    counterparties: Vec<Counterparty>,
    index: HashMap<CounterpartyId, usize>,
}

impl Portfolio {
    /// Returns the number of counterparties.
    #[inline]
    pub fn len(&self) -> usize {
        self.counterparties.len()
    }

    /// Returns whether the portfolio has no counterparties.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counterparties.is_empty()
    }

    /// Returns a counterparty by ID.
    #[inline]
    pub fn counterparty(&self, id: &CounterpartyId) -> Option<&Counterparty> {
        self.index.get(id).map(|&i| &self.counterparties[i])
    }

    /// Returns whether a counterparty with this ID exists.
    #[inline]
    pub fn contains(&self, id: &CounterpartyId) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the counterparties in insertion order.
    #[inline]
    pub fn counterparties(&self) -> &[Counterparty] {
        &self.counterparties
    }

    /// Iterates over counterparties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Counterparty> {
        self.counterparties.iter()
    }

    /// Returns the IDs in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &CounterpartyId> {
        self.counterparties.iter().map(|c| c.id())
    }

    /// Sum of exposure at default.
    pub fn total_ead(&self) -> f64 {
        self.counterparties.iter().map(|c| c.ead()).sum()
    }

    /// Consumes the portfolio and returns its counterparties in order.
    pub fn into_counterparties(self) -> Vec<Counterparty> {
        self.counterparties
    }
}

impl<'a> IntoIterator for &'a Portfolio {
    type Item = &'a Counterparty;
    type IntoIter = std::slice::Iter<'a, Counterparty>;

    fn into_iter(self) -> Self::IntoIter {
        self.counterparties.iter()
    }
}
