//! Rendering of capital, adjustment and optimisation results.
//!
//! Every renderer returns the full text so commands decide where it goes.

use std::fmt::Write as _;
use std::str::FromStr;

use capital_optimiser::target::OptimisationResult;
use capital_risk::distribution::PortfolioAdjustment;
use capital_risk::engine::RwaResult;
use capital_risk::summary::{PortfolioSummary, SegmentTotals};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Output format of the `rwa` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned plain-text table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// CSV with a header row
    Csv,
}

impl OutputFormat {
    /// Get the name of this format.
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

#[derive(Serialize)]
struct ComputeReport<'a> {
    results: &'a [RwaResult],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a PortfolioSummary>,
}

/// Renders per-counterparty results, optionally followed by a summary.
///
/// CSV output carries the per-counterparty rows only.
pub fn render_results(
    results: &[RwaResult],
    summary: Option<&PortfolioSummary>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ComputeReport { results, summary })?),
        OutputFormat::Csv => to_csv(results),
        OutputFormat::Table => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{:<12} {:>8} {:>8} {:>6} {:>16} {:>7} {:>8} {:>16} {:>16}",
                "ID", "PD", "TTC PD", "LGD", "EAD", "R", "RW %", "Original RWA", "RWA"
            );
            for r in results {
                let _ = writeln!(
                    out,
                    "{:<12} {:>8.4} {:>8.4} {:>6.2} {:>16.2} {:>7.4} {:>8.2} {:>16.2} {:>16.2}",
                    r.counterparty_id.as_str(),
                    r.pd,
                    r.ttc_pd,
                    r.lgd,
                    r.ead,
                    r.correlation,
                    r.risk_weight,
                    r.original_rwa,
                    r.rwa
                );
            }
            if let Some(summary) = summary {
                out.push('\n');
                out.push_str(&summary_table(summary));
            }
            Ok(out)
        }
    }
}

fn summary_table(summary: &PortfolioSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Counterparties:     {}", summary.counterparty_count);
    let _ = writeln!(out, "Total EAD:          {:.2}", summary.total_ead);
    let _ = writeln!(out, "Total original RWA: {:.2}", summary.total_original_rwa);
    let _ = writeln!(out, "Total RWA:          {:.2}", summary.total_rwa);
    let _ = writeln!(out, "Total adjustment:   {:.2}", summary.total_adjustment);
    let _ = writeln!(out, "Weighted PD:        {:.4}", summary.weighted_pd);
    let _ = writeln!(out, "Weighted LGD:       {:.4}", summary.weighted_lgd);
    let _ = writeln!(out, "RWA density:        {:.4}", summary.rwa_density);
    segment_table(&mut out, "Industry", &summary.by_industry);
    segment_table(&mut out, "Region", &summary.by_region);
    out
}

fn segment_table<'a>(
    out: &mut String,
    label: &str,
    segments: impl IntoIterator<Item = (&'a String, &'a SegmentTotals)>,
) {
    let _ = writeln!(out, "\n{:<20} {:>6} {:>16} {:>16}", label, "Count", "EAD", "RWA");
    for (name, totals) in segments {
        let _ = writeln!(
            out,
            "{:<20} {:>6} {:>16.2} {:>16.2}",
            name, totals.count, totals.ead, totals.rwa
        );
    }
}

#[derive(Serialize)]
struct AllocationRow<'a> {
    counterparty_id: &'a str,
    baseline_rwa: f64,
    share: f64,
    adjusted_rwa: f64,
    overlay: String,
}

/// Renders a distributed portfolio adjustment.
pub fn render_adjustment(adjustment: &PortfolioAdjustment, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(adjustment)?),
        OutputFormat::Csv => {
            let rows: Vec<AllocationRow<'_>> = adjustment
                .allocations
                .iter()
                .map(|a| AllocationRow {
                    counterparty_id: a.counterparty_id.as_str(),
                    baseline_rwa: a.baseline_rwa,
                    share: a.share,
                    adjusted_rwa: a.adjusted_rwa,
                    overlay: a.overlay.to_string(),
                })
                .collect();
            to_csv(&rows)
        }
        OutputFormat::Table => {
            let mut out = String::new();
            let _ = writeln!(out, "Request:   {}", adjustment.request);
            if !adjustment.reason.is_empty() {
                let _ = writeln!(out, "Reason:    {}", adjustment.reason);
            }
            let _ = writeln!(out, "Timestamp: {}", adjustment.timestamp.to_rfc3339());
            let _ = writeln!(
                out,
                "\n{:<12} {:>16} {:>16} {:>16} {:>14}",
                "ID", "Baseline RWA", "Share", "Adjusted RWA", "Overlay"
            );
            for a in &adjustment.allocations {
                let _ = writeln!(
                    out,
                    "{:<12} {:>16.2} {:>16.2} {:>16.2} {:>14}",
                    a.counterparty_id.as_str(),
                    a.baseline_rwa,
                    a.share,
                    a.adjusted_rwa,
                    a.overlay.to_string()
                );
            }
            let _ = writeln!(
                out,
                "\nTotal: {:.2} -> {:.2} ({:+.2}, {:+.2}%)",
                adjustment.total_baseline_rwa,
                adjustment.total_adjusted_rwa,
                adjustment.total_adjustment,
                adjustment.percentage_change
            );
            if !adjustment.skipped.is_empty() {
                let skipped: Vec<&str> = adjustment.skipped.iter().map(|id| id.as_str()).collect();
                let _ = writeln!(out, "Skipped: {}", skipped.join(", "));
            }
            Ok(out)
        }
    }
}

#[derive(Serialize)]
struct MultiplierRow<'a> {
    counterparty_id: &'a str,
    ead_multiplier: f64,
}

/// Renders an optimisation outcome.
pub fn render_optimisation(result: &OptimisationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => {
            let rows: Vec<MultiplierRow<'_>> = result
                .ead_multipliers
                .iter()
                .map(|(id, m)| MultiplierRow {
                    counterparty_id: id.as_str(),
                    ead_multiplier: *m,
                })
                .collect();
            to_csv(&rows)
        }
        OutputFormat::Table => {
            let mut out = String::new();
            let status = if result.success { "success" } else { "failed" };
            let _ = writeln!(out, "Status:       {}", status);
            let _ = writeln!(out, "Message:      {}", result.message);
            if let Some(target) = result.target_rwa {
                let _ = writeln!(out, "Target RWA:   {:.2}", target);
            }
            if let Some(achieved) = result.achieved_rwa {
                let _ = writeln!(out, "Achieved RWA: {:.2}", achieved);
            }
            if !result.ead_multipliers.is_empty() {
                let _ = writeln!(out, "\n{:<12} {:>14}", "ID", "EAD multiplier");
                for (id, m) in &result.ead_multipliers {
                    let _ = writeln!(out, "{:<12} {:>14.6}", id.as_str(), m);
                }
            }
            Ok(out)
        }
    }
}

/// Serialises rows as CSV with a header line.
pub(crate) fn to_csv<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
