//! Distribute command implementation
//!
//! Spreads a portfolio-level RWA adjustment across selected counterparties
//! and optionally records the resulting overlays in the snapshot.

use std::path::PathBuf;

use capital_risk::distribution::{distribute, AdjustmentRequest, DistributionMethod};
use capital_risk::portfolio::CounterpartyId;
use clap::Args;
use tracing::info;

use crate::config::CliConfig;
use crate::input::{load_snapshot, save_snapshot};
use crate::output::render_adjustment;
use crate::{CliError, Result};

/// Arguments of `rwa distribute`.
#[derive(Debug, Clone, Args)]
pub struct DistributeArgs {
    /// Portfolio snapshot (.json or .csv)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Counterparties to adjust; all when omitted
    #[arg(long = "select", value_name = "ID", value_delimiter = ',')]
    pub select: Vec<String>,

    /// Percentage change of baseline RWA, e.g. -10
    #[arg(long, allow_negative_numbers = true, conflicts_with = "amount", required_unless_present = "amount")]
    pub percent: Option<f64>,

    /// Absolute RWA change, e.g. -500000
    #[arg(long, allow_negative_numbers = true)]
    pub amount: Option<f64>,

    /// Allocation method for absolute changes (proportional, equal,
    /// risk_weighted); proportional when omitted
    #[arg(short, long, conflicts_with = "percent")]
    pub method: Option<String>,

    /// Justification recorded with the adjustment
    #[arg(short, long, default_value = "")]
    pub reason: String,

    /// Store the overlays in this snapshot file (may equal the input)
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl DistributeArgs {
    fn request(&self) -> Result<AdjustmentRequest> {
        match (self.percent, self.amount) {
            (Some(_), None) if self.method.is_some() => Err(CliError::InvalidArgument(
                "--method applies to --amount only".to_string(),
            )),
            (Some(percent), None) => Ok(AdjustmentRequest::percentage(percent)),
            (None, Some(amount)) => {
                let method = match self.method.as_deref() {
                    Some(name) => name
                        .parse::<DistributionMethod>()
                        .map_err(|_| CliError::InvalidArgument(format!("Unknown method: {}", name)))?,
                    None => DistributionMethod::Proportional,
                };
                Ok(AdjustmentRequest::absolute(amount, method))
            }
            _ => Err(CliError::InvalidArgument(
                "Exactly one of --percent and --amount is required".to_string(),
            )),
        }
    }
}

/// Builds the distribution report, saving overlays when requested.
pub fn report(config: &CliConfig, args: &DistributeArgs) -> Result<String> {
    let request = args.request()?;
    let mut snapshot = load_snapshot(&args.input)?;
    let results = super::compute_results(config, &snapshot.portfolio, &snapshot.adjustments, &[]);

    let selected: Vec<CounterpartyId> = if args.select.is_empty() {
        snapshot.portfolio.ids().cloned().collect()
    } else {
        args.select.iter().map(|id| CounterpartyId::new(id.trim())).collect()
    };

    let adjustment = distribute(&results, &selected, &request).with_reason(args.reason.clone());
    info!(
        request = %adjustment.request,
        total_adjustment = adjustment.total_adjustment,
        allocations = adjustment.allocations.len(),
        "portfolio adjustment distributed"
    );

    if let Some(path) = &args.save {
        adjustment.apply_to(&mut snapshot.adjustments);
        save_snapshot(path, &snapshot)?;
        info!(path = %path.display(), "overlays saved");
    }

    render_adjustment(&adjustment, config.output_format)
}

/// Run the distribute command
pub fn run(config: &CliConfig, args: &DistributeArgs) -> Result<()> {
    let text = report(config, args)?;
    super::emit(&text, args.output.as_deref())
}
