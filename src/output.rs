use crate::types::{Observation, ObservationRow, VendorScore};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub const EXPORT_FILE_NAME: &str = "vendor_performance_filtered.csv";
pub const EXPORT_MIME: &str = "text/csv";

/// Serialize any rows as CSV with a header row.
pub fn rows_to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for r in rows {
        wtr.serialize(r)?;
    }
    into_bytes(wtr)
}

/// Scored vendor table as CSV bytes.
///
/// An empty table still yields a header row so consumers can tell "no
/// vendors" from "no file".
pub fn scores_to_csv(scores: &[VendorScore]) -> Result<Vec<u8>> {
    if scores.is_empty() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(SCORE_COLUMNS)?;
        return into_bytes(wtr);
    }
    rows_to_csv(scores)
}

fn into_bytes(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {}", e.error()))
}

pub fn scores_from_csv(bytes: &[u8]) -> Result<Vec<VendorScore>> {
    let mut rdr = csv::Reader::from_reader(bytes);
    rdr.deserialize()
        .collect::<Result<Vec<VendorScore>, _>>()
        .context("parsing vendor score CSV")
}

pub fn observations_to_csv(records: &[Observation]) -> Result<Vec<u8>> {
    let rows: Vec<ObservationRow<'_>> = records.iter().map(ObservationRow::from).collect();
    rows_to_csv(&rows)
}

const SCORE_COLUMNS: [&str; 16] = [
    "Vendor",
    "OnTimeDeliveries",
    "TotalDeliveries",
    "Defects",
    "TotalUnits",
    "Spend",
    "Compliant",
    "LeadTime",
    "Category",
    "Region",
    "OnTimeDeliveryRate",
    "QualityScore",
    "ComplianceRate",
    "AvgLeadTime",
    "OverallScore",
    "InsufficientData",
];

pub fn write_bytes(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

pub fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Render up to `max_rows` rows as a markdown table.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}
