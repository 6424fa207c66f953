//! # capital_core: Mathematical Foundation for the IRB Capital Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! capital_core is the bottom layer of the workspace, providing:
//! - Standard normal distribution approximations (`math::distributions`)
//! - IRB risk parameters: asset correlation, maturity adjustment and
//!   through-the-cycle PD conversion (`params`)
//! - Parameter error types (`types::error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other capital_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Structured error types
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use capital_core::math::distributions::{inverse_norm_cdf, norm_cdf};
//! use capital_core::params::{asset_correlation, maturity_adjustment, MaturityAdjustmentMethod};
//!
//! let x = inverse_norm_cdf(0.999_f64);
//! assert!((norm_cdf(x) - 0.999).abs() < 1e-12);
//!
//! let r = asset_correlation(0.01);
//! assert!(r > 0.12 && r < 0.24);
//!
//! let ma = maturity_adjustment(0.01, 2.5, MaturityAdjustmentMethod::Basel);
//! assert!(ma > 1.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for parameter types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod params;
pub mod types;
