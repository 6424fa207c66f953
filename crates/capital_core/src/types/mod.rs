//! Shared types for the capital engine foundation layer.

pub mod error;

pub use error::ParameterError;
