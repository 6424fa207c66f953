//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands build their
//! report as text and [`emit`] sends it to stdout or a file.

pub mod check;
pub mod compute;
pub mod distribute;
pub mod optimise;
pub mod ttc;

use std::path::Path;

use capital_risk::adjustment::AdjustmentBook;
use capital_risk::engine::{CapitalEngine, RwaResult};
use capital_risk::portfolio::{CounterpartyId, Portfolio};
use tracing::info;

use crate::config::CliConfig;
use crate::Result;

/// Writes a rendered report to `output`, or stdout when absent.
pub fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Computes results for `ids`, or for the whole portfolio when empty.
pub(crate) fn compute_results(
    config: &CliConfig,
    portfolio: &Portfolio,
    book: &AdjustmentBook,
    ids: &[String],
) -> Vec<RwaResult> {
    let engine = CapitalEngine::new(config.rwa_options());
    if ids.is_empty() {
        engine.compute_portfolio(portfolio, book)
    } else {
        ids.iter()
            .map(|id| engine.compute_by_id(portfolio, book, &CounterpartyId::new(id.as_str())))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;

    /// Three-name book used by the command tests.
    pub const BOOK: &str = r#"{
        "counterparties": [
            {"id": "CP001", "industry": "Manufacturing", "region": "EU",
             "pd": 0.01, "lgd": 0.45, "ead": 10000000.0, "maturity": 2.5},
            {"id": "CP002", "industry": "Retail", "region": "US",
             "pd": 0.03, "lgd": 0.40, "ead": 5000000.0, "maturity": 1.0},
            {"id": "CP003", "industry": "Technology", "region": "EU",
             "pd": 0.002, "lgd": 0.45, "ead": 8000000.0, "maturity": 3.0}
        ]
    }"#;

    /// Writes `BOOK` to a fresh temporary file.
    pub fn write_book(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("rwa_{}_{}.json", std::process::id(), name));
        std::fs::write(&path, BOOK).unwrap();
        path
    }
}
