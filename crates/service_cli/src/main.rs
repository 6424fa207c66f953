//! rwa - Command Line Operations for IRB Capital
//!
//! Operational entry point for the capital engine.
//!
//! # Commands
//!
//! - `rwa compute --input <file>` - RWA per counterparty, optionally with a summary
//! - `rwa distribute --input <file> --percent <p>` - Spread a portfolio-level adjustment
//! - `rwa optimise --input <file> --target <rwa>` - EAD multipliers reaching a target RWA
//! - `rwa ttc <pit_pd>` - Point-in-time to through-the-cycle PD conversion
//! - `rwa check` - Effective configuration and a reference calculation
//!
//! # Configuration
//!
//! Settings are layered: defaults, then the `--config` TOML file, then
//! `RWA_*` environment variables, then command-line flags.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod input;
mod output;

pub use error::{CliError, Result};

use commands::compute::ComputeArgs;
use commands::distribute::DistributeArgs;
use commands::optimise::OptimiseArgs;
use commands::ttc::TtcArgs;
use config::{build_config, process_env, CliArgs};

/// IRB capital calculation CLI
#[derive(Parser)]
#[command(name = "rwa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format (table, json, csv)
    #[arg(long, global = true)]
    format: Option<String>,

    /// Capital formula (basel, simplified)
    #[arg(long, global = true)]
    formula: Option<String>,

    /// Maturity adjustment method (basel, legacy)
    #[arg(long, global = true)]
    maturity_method: Option<String>,

    /// PD source (pit, ttc)
    #[arg(long, global = true)]
    pd_source: Option<String>,

    /// Apply the 1.25 correlation multiplier to flagged financial institutions
    #[arg(long, global = true)]
    fi_multiplier: bool,

    /// Lower bound on optimiser EAD multipliers, in (0, 1]
    #[arg(long, global = true)]
    ead_floor: Option<f64>,

    /// Macro index for TTC PD derivation, in [0, 1]
    #[arg(long, global = true)]
    macro_index: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute RWA for a portfolio snapshot
    Compute(ComputeArgs),

    /// Distribute a portfolio-level RWA adjustment
    Distribute(DistributeArgs),

    /// Find EAD multipliers that reach a target RWA
    #[command(alias = "optimize")]
    Optimise(OptimiseArgs),

    /// Convert a point-in-time PD to through-the-cycle
    Ttc(TtcArgs),

    /// Check configuration and run a reference calculation
    Check,
}

impl From<&Cli> for CliArgs {
    fn from(cli: &Cli) -> Self {
        Self {
            config_file: cli.config.clone(),
            log_level: if cli.verbose {
                Some("debug".to_string())
            } else {
                cli.log_level.clone()
            },
            output_format: cli.format.clone(),
            formula: cli.formula.clone(),
            maturity_method: cli.maturity_method.clone(),
            pd_source: cli.pd_source.clone(),
            fi_multiplier: cli.fi_multiplier,
            ead_floor: cli.ead_floor,
            macro_index: cli.macro_index,
        }
    }
}

/// Initialise tracing, logging to stderr so reports on stdout stay clean.
fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&CliArgs::from(&cli), process_env)?;

    init_tracing(config.log_level.as_filter_str());
    debug!(?config, "effective configuration");

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match &cli.command {
        Commands::Compute(args) => commands::compute::run(&config, args),
        Commands::Distribute(args) => commands::distribute::run(&config, args),
        Commands::Optimise(args) => commands::optimise::run(&config, args),
        Commands::Ttc(args) => commands::ttc::run(&config, args),
        Commands::Check => commands::check::run(&config),
    }
}
