//! TTC command implementation
//!
//! Converts a point-in-time PD to a through-the-cycle PD. The macro index
//! comes from the configuration (`--macro-index`, `RWA_MACRO_INDEX`).

use capital_core::params::{derive_ttc_pd_from_inputs, IndustryProfile, TtcPdInputs};
use clap::Args;
use serde::Serialize;

use crate::config::CliConfig;
use crate::output::{to_csv, OutputFormat};
use crate::Result;

/// Arguments of `rwa ttc`.
#[derive(Debug, Clone, Args)]
pub struct TtcArgs {
    /// Point-in-time PD
    pub pit_pd: f64,

    /// Industry whose long-run profile to use
    #[arg(long)]
    pub industry: Option<String>,

    /// Long-run average default rate, overriding the industry profile
    #[arg(long)]
    pub long_term_average: Option<f64>,

    /// Cyclicality in [0, 1], overriding the industry profile
    #[arg(long)]
    pub cyclicality: Option<f64>,
}

#[derive(Debug, Serialize)]
struct TtcReport {
    pit_pd: f64,
    macro_index: f64,
    long_term_average: f64,
    cyclicality: f64,
    ttc_pd: f64,
}

/// Builds the TTC conversion report.
pub fn report(config: &CliConfig, args: &TtcArgs) -> Result<String> {
    let profile = args
        .industry
        .as_deref()
        .map(IndustryProfile::for_industry)
        .unwrap_or_default();
    let inputs = TtcPdInputs::new(
        args.pit_pd,
        config.macro_index,
        args.long_term_average.unwrap_or(profile.long_term_average()),
        args.cyclicality.unwrap_or(profile.cyclicality()),
    )?;
    let report = TtcReport {
        pit_pd: inputs.pit_pd(),
        macro_index: inputs.macro_index(),
        long_term_average: inputs.long_term_average(),
        cyclicality: inputs.cyclicality(),
        ttc_pd: derive_ttc_pd_from_inputs(&inputs),
    };

    match config.output_format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)? + "\n"),
        OutputFormat::Csv => to_csv(std::slice::from_ref(&report)),
        OutputFormat::Table => Ok(format!(
            "PIT PD:            {:.6}\n\
             Macro index:       {:.4}\n\
             Long-term average: {:.6}\n\
             Cyclicality:       {:.4}\n\
             TTC PD:            {:.6}\n",
            report.pit_pd, report.macro_index, report.long_term_average, report.cyclicality, report.ttc_pd
        )),
    }
}

/// Run the ttc command
pub fn run(config: &CliConfig, args: &TtcArgs) -> Result<()> {
    let text = report(config, args)?;
    super::emit(&text, None)
}
