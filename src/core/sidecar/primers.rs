//! Primers report parsing
//!
//! The report is a set of tables of columns; the `Sample Name` and
//! `Primer Name` columns are zipped positionally.

use crate::domain::errors::SeqferryError;
use crate::domain::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const SAMPLE_HEADER: &str = "Sample Name";
const PRIMER_HEADER: &str = "Primer Name";

#[derive(Debug, Deserialize)]
struct PrimersReport {
    #[serde(default)]
    tables: Vec<ReportTable>,
}

#[derive(Debug, Deserialize)]
struct ReportTable {
    #[serde(default)]
    columns: Vec<ReportColumn>,
}

#[derive(Debug, Deserialize)]
struct ReportColumn {
    header: String,
    #[serde(default)]
    values: Vec<Value>,
}

impl ReportTable {
    fn column(&self, header: &str) -> Option<&ReportColumn> {
        self.columns.iter().find(|c| c.header.trim() == header)
    }
}

/// Parses a primers report into a sample name to primer name table
///
/// A report without the two columns yields an empty table.
///
/// # Errors
///
/// Returns a `Sidecar` error if the document is not valid JSON of the
/// expected shape
pub fn parse_primers_report(json: &str) -> Result<BTreeMap<String, String>> {
    let report: PrimersReport = serde_json::from_str(json)
        .map_err(|e| SeqferryError::Sidecar(format!("Malformed primers report: {e}")))?;

    let mut primers = BTreeMap::new();
    for table in &report.tables {
        let (Some(samples), Some(names)) = (table.column(SAMPLE_HEADER), table.column(PRIMER_HEADER))
        else {
            continue;
        };

        if samples.values.len() != names.values.len() {
            tracing::warn!(
                samples = samples.values.len(),
                primers = names.values.len(),
                "Primers report columns differ in length; extra values ignored"
            );
        }

        for (sample, primer) in samples.values.iter().zip(&names.values) {
            if let (Some(sample), Some(primer)) = (cell_text(sample), cell_text(primer)) {
                primers.insert(sample, primer);
            }
        }
    }

    if primers.is_empty() {
        tracing::warn!("Primers report has no sample/primer columns");
    }
    Ok(primers)
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}
