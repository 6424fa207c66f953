//! Numerical building blocks shared by the capital engine.
//!
//! - `distributions`: standard normal CDF, inverse CDF and PDF

pub mod distributions;

pub use distributions::{inverse_norm_cdf, norm_cdf, norm_pdf};
