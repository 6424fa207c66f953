//! # capital_risk: IRB Capital Engine (L2: Portfolio)
//!
//! Computes Basel IRB regulatory capital for a portfolio of credit
//! counterparties and manages the overlays analysts place on top of it.
//!
//! This crate provides:
//! - Counterparty records, credit ratings and a validated portfolio container
//! - The capital engine: K, risk weight and RWA per counterparty
//! - Two-level RWA overlays held in an adjustment book
//! - Distribution of a portfolio-level adjustment across counterparties
//! - Portfolio summaries by industry and region
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            capital_risk (L2)            │
//! ├─────────────────────────────────────────┤
//! │  portfolio/    - Counterparty, Portfolio│
//! │  engine        - K, RW, RWA             │
//! │  adjustment    - overlays, book         │
//! │  distribution  - portfolio adjustments  │
//! │  summary       - aggregation            │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │            capital_core (L1)            │
//! │  Normal distribution, risk parameters   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use capital_risk::adjustment::AdjustmentBook;
//! use capital_risk::distribution::{distribute, AdjustmentRequest};
//! use capital_risk::engine::{total_rwa, CapitalEngine, RwaOptions};
//! use capital_risk::portfolio::{Counterparty, CounterpartyId, PortfolioBuilder};
//!
//! let portfolio = PortfolioBuilder::new()
//!     .add_counterparty(
//!         Counterparty::new(CounterpartyId::new("CP001"), 0.01, 0.45, 10_000_000.0, 2.5).unwrap(),
//!     )
//!     .add_counterparty(
//!         Counterparty::new(CounterpartyId::new("CP002"), 0.03, 0.40, 5_000_000.0, 1.5).unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let engine = CapitalEngine::new(RwaOptions::default());
//! let mut book = AdjustmentBook::new();
//! let before = engine.compute_portfolio(&portfolio, &book);
//!
//! // Reduce the whole portfolio by 10%
//! let selected: Vec<CounterpartyId> = portfolio.ids().cloned().collect();
//! distribute(&before, &selected, &AdjustmentRequest::percentage(-10.0)).apply_to(&mut book);
//!
//! let after = engine.compute_portfolio(&portfolio, &book);
//! assert!((total_rwa(&after) - 0.9 * total_rwa(&before)).abs() < 1e-6);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): compute portfolios with Rayon
//! - `serde`: Enable serialisation for all records

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod adjustment;
pub mod distribution;
pub mod engine;
pub mod portfolio;
pub mod summary;
