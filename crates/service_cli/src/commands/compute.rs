//! Compute command implementation
//!
//! Prices every counterparty of a snapshot with the IRB formula.

use std::path::PathBuf;

use capital_risk::summary::PortfolioSummary;
use clap::Args;
use tracing::info;

use crate::config::CliConfig;
use crate::input::load_snapshot;
use crate::output::render_results;
use crate::Result;

/// Arguments of `rwa compute`.
#[derive(Debug, Clone, Args)]
pub struct ComputeArgs {
    /// Portfolio snapshot (.json or .csv)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Restrict the report to these counterparty IDs
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,

    /// Append portfolio totals and segment breakdowns
    #[arg(short, long)]
    pub summary: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Builds the compute report.
pub fn report(config: &CliConfig, args: &ComputeArgs) -> Result<String> {
    let snapshot = load_snapshot(&args.input)?;
    let results = super::compute_results(config, &snapshot.portfolio, &snapshot.adjustments, &args.ids);

    let summary = args
        .summary
        .then(|| PortfolioSummary::from_results(&snapshot.portfolio, &results));
    if let Some(summary) = &summary {
        info!(
            counterparties = summary.counterparty_count,
            total_rwa = summary.total_rwa,
            "portfolio capital computed"
        );
    }

    render_results(&results, summary.as_ref(), config.output_format)
}

/// Run the compute command
pub fn run(config: &CliConfig, args: &ComputeArgs) -> Result<()> {
    let text = report(config, args)?;
    super::emit(&text, args.output.as_deref())
}
