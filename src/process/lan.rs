// src/process/lan.rs
use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info, instrument};

use super::{cell, decode_rows, find_row, render_first_sheet, row_contains, to_number, Row};
use crate::model::{LanStatistics, RegionPoint, RegionRecord};

static YEAR_MONTH_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("valid year-month regex"));

const CLOSING_MARKER: &str = "Källa";

const REGION: usize = 1;
/// The three date columns, oldest first as published.
const SERIES: [usize; 3] = [2, 3, 4];

/// Parse the regional workbook at `path`.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn parse_lan<P: AsRef<Path>>(path: P) -> Result<LanStatistics> {
    let csv = render_first_sheet(path)?;
    let stats = parse_lan_csv(&csv)?;
    info!(regions = stats.lan.len(), "parsed regional table");
    Ok(stats)
}

/// Parse the regional table out of the first sheet rendered as CSV.
///
/// The table starts at the first row carrying three consecutive `YYYY-MM`
/// cells and stops before the row mentioning `Källa`. Date labels are read
/// once from the header row and shared by every region.
pub fn parse_lan_csv(csv: &str) -> Result<LanStatistics> {
    let rows = decode_rows(csv)?;
    let table = locate_table(&rows)?;
    let header = &table[0];

    let dates = SERIES.map(|idx| cell(header, idx).to_string());
    if dates.iter().any(String::is_empty) {
        return Err(anyhow!("regional header row has no dates in columns 3-5: {:?}", header));
    }
    debug!(?dates, "regional series dates");

    let lan = table
        .iter()
        .skip(1)
        .filter(|row| !cell(row, REGION).is_empty())
        .map(|row| RegionRecord {
            lan: cell(row, REGION).to_string(),
            data: SERIES
                .iter()
                .zip(&dates)
                .map(|(&idx, datum)| RegionPoint {
                    berorda_personer: to_number(cell(row, idx)),
                    datum: datum.clone(),
                })
                .collect(),
        })
        .collect();

    Ok(LanStatistics { lan })
}

fn is_date_header(row: &Row) -> bool {
    row.windows(3)
        .any(|w| w.iter().all(|c| YEAR_MONTH_CELL.is_match(c.trim())))
}

fn locate_table(rows: &[Row]) -> Result<&[Row]> {
    let start = find_row(rows, 0, is_date_header)
        .ok_or_else(|| anyhow!("regional table header with three YYYY-MM columns not found"))?;
    let end = find_row(rows, start + 1, |r| row_contains(r, CLOSING_MARKER))
        .ok_or_else(|| anyhow!("regional table end marker `{}` not found", CLOSING_MARKER))?;
    Ok(&rows[start..end])
}
