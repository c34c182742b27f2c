use std::io::BufRead;

use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use epochpeek_parser::{inspect, EpochUnit};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRow {
    pub line: usize,
    pub timestamp: Option<String>,
    pub digits: Option<String>,
    pub unit: Option<EpochUnit>,
}

/// Runs the extractor over every line of `reader`. Line numbers start at 1.
///
/// Lines are decoded lossily so a stray non-UTF-8 byte only affects its own
/// line.
pub fn scan_lines<R: BufRead>(reader: R) -> Result<Vec<ScanRow>> {
    let mut rows = Vec::new();
    for (index, line) in reader.split(b'\n').enumerate() {
        let raw = line?;
        let trimmed = raw.strip_suffix(b"\r").unwrap_or(&raw);
        let line = String::from_utf8_lossy(trimmed);
        let row = match inspect(&line) {
            Ok(extraction) => ScanRow {
                line: index + 1,
                timestamp: Some(extraction.to_iso8601()),
                digits: Some(extraction.digits),
                unit: Some(extraction.unit),
            },
            Err(_) => ScanRow {
                line: index + 1,
                timestamp: None,
                digits: None,
                unit: None,
            },
        };
        rows.push(row);
    }
    Ok(rows)
}

pub fn render_table(rows: &[ScanRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Line", "Timestamp", "Digits", "Unit"]);

    for row in rows {
        table.add_row(vec![
            row.line.to_string(),
            row.timestamp.clone().unwrap_or_else(|| "-".to_string()),
            row.digits.clone().unwrap_or_else(|| "-".to_string()),
            row.unit
                .map(|unit| unit.canonical_name().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}

/// One JSON object per line that produced a timestamp.
pub fn render_json_lines(rows: &[ScanRow]) -> Result<Vec<String>> {
    rows.iter()
        .filter(|row| row.timestamp.is_some())
        .map(|row| serde_json::to_string(row).map_err(Into::into))
        .collect()
}
