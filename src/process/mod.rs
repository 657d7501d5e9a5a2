// src/process/mod.rs
use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;
use tracing::{debug, instrument, warn};

pub mod lan;
pub mod riket;

/// A decoded row: one string per cell, no header handling.
pub type Row = Vec<String>;

/// Open the workbook at `path` and render its first sheet as CSV text.
///
/// Columns are anchored at `A`, so index 1 is always column `B` even when the
/// sheet's used range starts further right.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn render_first_sheet<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {:?}", path))?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook {:?} has no sheets", path))?;
    let range = workbook
        .worksheet_range(&first)
        .with_context(|| format!("Failed to read sheet `{}` of {:?}", first, path))?;

    let lead = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for row in range.rows() {
        let record = std::iter::repeat(String::new())
            .take(lead)
            .chain(row.iter().map(cell_text));
        writer.write_record(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("flushing CSV for {:?}: {}", path, e))?;

    debug!(sheet = %first, rows = range.height(), "rendered sheet");
    String::from_utf8(bytes).context("rendered sheet is not UTF-8")
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::DateTime(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

/// Decode CSV text into rows, tolerating ragged records.
pub fn decode_rows(csv_text: &str) -> Result<Vec<Row>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    rdr.records()
        .enumerate()
        .map(|(idx, record)| {
            let record = record.with_context(|| format!("CSV parse error at record {}", idx))?;
            Ok(record.iter().map(str::to_string).collect())
        })
        .collect()
}

/// Index of the first row at or after `from` that satisfies `pred`.
pub fn find_row<F>(rows: &[Row], from: usize, pred: F) -> Option<usize>
where
    F: Fn(&Row) -> bool,
{
    rows.iter()
        .enumerate()
        .skip(from)
        .find(|(_, row)| pred(row))
        .map(|(idx, _)| idx)
}

/// True if any cell of `row` contains `needle`.
pub fn row_contains(row: &Row, needle: &str) -> bool {
    row.iter().any(|cell| cell.contains(needle))
}

/// Trimmed cell at `idx`, or `""` when the row is shorter.
pub fn cell(row: &Row, idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// Parse a published count such as `"1,234"` or `" 56 "`.
///
/// Commas and all whitespace are stripped first. An empty cell is `0`;
/// a finite decimal is rounded; anything else is logged and becomes `0`.
pub fn to_number(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return 0;
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return n;
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() => f.round() as i64,
        _ => {
            warn!(cell = raw, "non-numeric cell, using 0");
            0
        }
    }
}
