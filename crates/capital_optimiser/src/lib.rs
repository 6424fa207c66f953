//! # capital_optimiser
//!
//! Target RWA optimisation for the capital engine.
//!
//! This crate sits on top of the portfolio layer (`capital_risk`, L2) and
//! answers the inverse question: which exposures should be reduced, and by
//! how much, to bring total RWA down to a target.
//!
//! ## Architecture Position
//!
//! Layer 2.5. Depends on `capital_risk` (L2), which in turn depends on
//! `capital_core` (L1).
//!
//! ## Modules
//!
//! - `target`: Greedy EAD-scaling search with a configurable priority order
//! - `exposure`: Applying proposed EAD multipliers to a portfolio
//!
//! ## Example
//!
//! ```rust
//! use capital_optimiser::exposure::apply_ead_multipliers;
//! use capital_optimiser::target::{PriorityOrder, TargetRwaOptimiser};
//! use capital_risk::adjustment::AdjustmentBook;
//! use capital_risk::engine::{total_rwa, CapitalEngine};
//! use capital_risk::portfolio::{Counterparty, CounterpartyId, PortfolioBuilder};
//!
//! let portfolio = PortfolioBuilder::new()
//!     .add_counterparty(Counterparty::new(CounterpartyId::new("A"), 0.01, 0.45, 5e6, 2.5).unwrap())
//!     .add_counterparty(Counterparty::new(CounterpartyId::new("B"), 0.04, 0.45, 5e6, 2.5).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let engine = CapitalEngine::default();
//! let book = AdjustmentBook::new();
//! let results = engine.compute_portfolio(&portfolio, &book);
//! let current = total_rwa(&results);
//!
//! let outcome = TargetRwaOptimiser::new().optimise(&results, current, 0.8 * current, PriorityOrder::default());
//! assert!(outcome.success);
//!
//! let scaled = apply_ead_multipliers(&portfolio, &outcome.ead_multipliers).unwrap();
//! let repriced = total_rwa(&engine.compute_portfolio(&scaled, &book));
//! assert!((repriced - 0.8 * current).abs() < 1e-6 * current);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod exposure;
pub mod target;

mod error;

pub use error::OptimiserError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::exposure::apply_ead_multipliers;
    pub use crate::target::{
        OptimisationResult, PriorityOrder, RiskKey, SortDirection, TargetRwaOptimiser,
    };
    pub use crate::OptimiserError;
}
