//! Check command implementation
//!
//! Prints the effective configuration and runs a reference calculation.

use capital_risk::adjustment::CounterpartyOverlays;
use capital_risk::engine::CapitalEngine;
use capital_risk::portfolio::{Counterparty, CounterpartyId};
use tracing::info;

use crate::config::{process_env, CliConfig, ENV_VARS};
use crate::{CliError, Result};

/// Builds the check report.
pub fn report(config: &CliConfig) -> Result<String> {
    config.validate()?;
    let effective = toml::to_string_pretty(config)
        .map_err(|e| CliError::InvalidArgument(format!("Cannot render configuration: {}", e)))?;

    let reference = Counterparty::new(CounterpartyId::new("REFERENCE"), 0.01, 0.45, 10_000_000.0, 2.5)?;
    let result = CapitalEngine::new(config.rwa_options()).compute(&reference, &CounterpartyOverlays::NONE);
    info!(rwa = result.rwa, "reference calculation complete");

    let overridden: Vec<&str> = ENV_VARS
        .iter()
        .copied()
        .filter(|name| process_env(name).is_some())
        .collect();
    let environment = if overridden.is_empty() {
        "none".to_string()
    } else {
        overridden.join(", ")
    };

    Ok(format!(
        "Effective configuration:\n{}\n\
         Environment overrides: {}\n\n\
         Reference exposure (PD 1%, LGD 45%, EAD 10,000,000, M 2.5):\n  \
         R = {:.5}  MA = {:.5}  K = {:.5}  RWA = {:.2}\n",
        effective, environment, result.correlation, result.maturity_adjustment, result.k, result.rwa
    ))
}

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    let text = report(config)?;
    super::emit(&text, None)
}
