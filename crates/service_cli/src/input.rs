//! Portfolio snapshots on disk.
//!
//! Two layouts are accepted:
//! - `.csv`: one counterparty per row, no overlays
//! - `.json`: `{ "counterparties": [...], "adjustments": {...} }`
//!
//! Both use the flat [`CounterpartyRow`] record.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use capital_risk::adjustment::AdjustmentBook;
use capital_risk::engine::{DEFAULT_EAD, DEFAULT_LGD, DEFAULT_MATURITY, DEFAULT_PD};
use capital_risk::portfolio::{
    Counterparty, CounterpartyId, CreditRating, InstitutionFlags, Portfolio, PortfolioBuilder,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{CliError, Result};

/// Flat counterparty record shared by the CSV and JSON layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyRow {
    /// Counterparty identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Industry sector
    #[serde(default)]
    pub industry: String,
    /// Region
    #[serde(default)]
    pub region: String,
    /// Point-in-time PD; blank or non-finite falls back to the engine default
    #[serde(default)]
    pub pd: Option<f64>,
    /// Through-the-cycle PD, derived when absent
    #[serde(default)]
    pub ttc_pd: Option<f64>,
    /// Loss given default; blank or non-finite falls back to the engine default
    #[serde(default)]
    pub lgd: Option<f64>,
    /// Exposure at default; blank or non-finite falls back to the engine default
    #[serde(default)]
    pub ead: Option<f64>,
    /// Effective maturity in years; blank or non-finite falls back to the engine default
    #[serde(default)]
    pub maturity: Option<f64>,
    /// Financial institution
    #[serde(default)]
    pub is_financial: bool,
    /// Large financial institution
    #[serde(default)]
    pub is_large_financial: bool,
    /// Prudentially regulated
    #[serde(default)]
    pub is_regulated: bool,
    /// Agency rating symbol
    #[serde(default)]
    pub credit_rating: Option<String>,
    /// Use the rating's indicative PD instead of `pd`
    #[serde(default)]
    pub use_credit_rating_pd: bool,
}

fn value_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

impl TryFrom<CounterpartyRow> for Counterparty {
    type Error = CliError;

    fn try_from(row: CounterpartyRow) -> Result<Self> {
        let mut counterparty = Counterparty::new(
            CounterpartyId::new(row.id),
            value_or(row.pd, DEFAULT_PD),
            value_or(row.lgd, DEFAULT_LGD),
            value_or(row.ead, DEFAULT_EAD),
            value_or(row.maturity, DEFAULT_MATURITY),
        )?
                .with_name(row.name)
                .with_industry(row.industry)
                .with_region(row.region)
                .with_flags(InstitutionFlags {
                    is_financial: row.is_financial,
                    is_large_financial: row.is_large_financial,
                    is_regulated: row.is_regulated,
                })
                .with_rating_pd(row.use_credit_rating_pd);

        if let Some(ttc_pd) = row.ttc_pd.filter(|v| v.is_finite()) {
            counterparty = counterparty.with_ttc_pd(ttc_pd)?;
        }
        if let Some(symbol) = row.credit_rating.as_deref().filter(|s| !s.trim().is_empty()) {
            counterparty = counterparty.with_credit_rating(symbol.parse::<CreditRating>()?);
        }
        Ok(counterparty)
    }
}

impl From<&Counterparty> for CounterpartyRow {
    fn from(cp: &Counterparty) -> Self {
        let flags = cp.flags();
        Self {
            id: cp.id().to_string(),
            name: cp.name().to_string(),
            industry: cp.industry().to_string(),
            region: cp.region().to_string(),
            pd: Some(cp.pd()),
            ttc_pd: cp.ttc_pd(),
            lgd: Some(cp.lgd()),
            ead: Some(cp.ead()),
            maturity: Some(cp.maturity()),
            is_financial: flags.is_financial,
            is_large_financial: flags.is_large_financial,
            is_regulated: flags.is_regulated,
            credit_rating: cp.credit_rating().map(|r| r.symbol().to_string()),
            use_credit_rating_pd: cp.use_credit_rating_pd(),
        }
    }
}

/// Portfolio together with its overlays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Counterparties
    pub portfolio: Portfolio,
    /// Counterparty- and portfolio-level overlays
    pub adjustments: AdjustmentBook,
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    counterparties: Vec<CounterpartyRow>,
    #[serde(default)]
    adjustments: AdjustmentBook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Csv,
    Json,
}

fn file_kind(path: &Path) -> Result<FileKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(FileKind::Csv),
        "json" => Ok(FileKind::Json),
        _ => Err(CliError::UnsupportedFormat(format!(
            "{} (supported: .json, .csv)",
            path.display()
        ))),
    }
}

fn build_portfolio(rows: Vec<CounterpartyRow>) -> Result<Portfolio> {
    let counterparties = rows
        .into_iter()
        .map(Counterparty::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(PortfolioBuilder::new()
        .add_counterparties(counterparties)
        .build()?)
}

/// Reads counterparty rows from CSV with a header line.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<CounterpartyRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Parses a snapshot from JSON text.
pub fn parse_json_snapshot(text: &str) -> Result<Snapshot> {
    let file: SnapshotFile = serde_json::from_str(text)?;
    Ok(Snapshot {
        portfolio: build_portfolio(file.counterparties)?,
        adjustments: file.adjustments,
    })
}

/// Loads a snapshot, choosing the layout from the file extension.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let kind = file_kind(path)?;
    let snapshot = match kind {
        FileKind::Csv => {
            let rows = read_csv_rows(BufReader::new(File::open(path)?))?;
            Snapshot {
                portfolio: build_portfolio(rows)?,
                adjustments: AdjustmentBook::new(),
            }
        }
        FileKind::Json => parse_json_snapshot(&std::fs::read_to_string(path)?)?,
    };

    for id in snapshot.adjustments.iter().map(|(id, _)| id) {
        if !snapshot.portfolio.contains(id) {
            warn!(counterparty = %id, "overlay refers to an unknown counterparty");
        }
    }
    debug!(
        path = %path.display(),
        counterparties = snapshot.portfolio.len(),
        overlays = snapshot.adjustments.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

/// Writes a snapshot, choosing the layout from the file extension.
///
/// CSV output carries no overlays, so a snapshot with overlays can only be
/// written as JSON.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let rows: Vec<CounterpartyRow> = snapshot.portfolio.iter().map(CounterpartyRow::from).collect();
    match file_kind(path)? {
        FileKind::Csv => {
            if !snapshot.adjustments.is_empty() {
                return Err(CliError::UnsupportedFormat(format!(
                    "{} cannot store overlays, save to a .json snapshot",
                    path.display()
                )));
            }
            let mut writer = csv::Writer::from_path(path)?;
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        FileKind::Json => {
            let file = SnapshotFile {
                counterparties: rows,
                adjustments: snapshot.adjustments.clone(),
            };
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &file)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
    }
    debug!(path = %path.display(), "saved snapshot");
    Ok(())
}
