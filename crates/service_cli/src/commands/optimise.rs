//! Optimise command implementation
//!
//! Searches for EAD multipliers that bring total RWA down to a target and
//! optionally writes the scaled portfolio back out.

use std::path::PathBuf;

use capital_optimiser::exposure::apply_ead_multipliers;
use capital_optimiser::target::{PriorityOrder, RiskKey, SortDirection, TargetRwaOptimiser};
use capital_risk::engine::total_rwa;
use clap::Args;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::input::{load_snapshot, save_snapshot, Snapshot};
use crate::output::render_optimisation;
use crate::{CliError, Result};

/// Arguments of `rwa optimise`.
#[derive(Debug, Clone, Args)]
pub struct OptimiseArgs {
    /// Portfolio snapshot (.json or .csv)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target total RWA
    #[arg(short, long, conflicts_with = "reduction", required_unless_present = "reduction")]
    pub target: Option<f64>,

    /// Required reduction of current RWA in percent
    #[arg(long)]
    pub reduction: Option<f64>,

    /// Field ranking counterparties for reduction
    #[arg(short, long, default_value = "ttc_pd")]
    pub priority: String,

    /// Ranking direction (desc or asc)
    #[arg(short, long, default_value = "desc")]
    pub direction: String,

    /// Write the scaled portfolio to this snapshot file
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl OptimiseArgs {
    fn priority_order(&self) -> Result<PriorityOrder> {
        let key: RiskKey = self.priority.parse()?;
        let direction: SortDirection = self.direction.parse()?;
        Ok(PriorityOrder::new(key, direction))
    }

    fn target_rwa(&self, current: f64) -> Result<f64> {
        match (self.target, self.reduction) {
            (Some(target), None) => Ok(target),
            (None, Some(percent)) if (0.0..=100.0).contains(&percent) => {
                Ok(current * (1.0 - percent / 100.0))
            }
            (None, Some(percent)) => Err(CliError::InvalidArgument(format!(
                "Reduction must be between 0 and 100 percent, got {}",
                percent
            ))),
            _ => Err(CliError::InvalidArgument(
                "Exactly one of --target and --reduction is required".to_string(),
            )),
        }
    }
}

/// Builds the optimisation report, saving the scaled portfolio when requested.
pub fn report(config: &CliConfig, args: &OptimiseArgs) -> Result<String> {
    let priority = args.priority_order()?;
    let optimiser = TargetRwaOptimiser::with_ead_floor(config.ead_floor)?;

    let snapshot = load_snapshot(&args.input)?;
    let results = super::compute_results(config, &snapshot.portfolio, &snapshot.adjustments, &[]);
    let current = total_rwa(&results);
    let target = args.target_rwa(current)?;

    let outcome = optimiser.optimise(&results, current, target, priority);

    if let Some(path) = &args.save {
        if outcome.success {
            let scaled = Snapshot {
                portfolio: apply_ead_multipliers(&snapshot.portfolio, &outcome.ead_multipliers)?,
                adjustments: snapshot.adjustments.clone(),
            };
            let repriced =
                total_rwa(&super::compute_results(config, &scaled.portfolio, &scaled.adjustments, &[]));
            save_snapshot(path, &scaled)?;
            info!(path = %path.display(), repriced_rwa = repriced, "scaled portfolio saved");
        } else {
            warn!(path = %path.display(), "optimisation failed, nothing saved");
        }
    }

    render_optimisation(&outcome, config.output_format)
}

/// Run the optimise command
pub fn run(config: &CliConfig, args: &OptimiseArgs) -> Result<()> {
    let text = report(config, args)?;
    super::emit(&text, args.output.as_deref())
}
