// src/process/riket.rs
use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::{debug, info, instrument};

use super::{cell, decode_rows, find_row, render_first_sheet, row_contains, to_number, Row};
use crate::model::{Counts, RiketStatistics, SectorData, SectorRecord};

const HEADER_MARKER: &str = "SNI";
const CLOSING_MARKER: &str = "Summa";

// Column positions within a data row.
const LABEL: usize = 1;
const UPPSAGNINGAR_VARSEL: usize = 2;
const UPPSAGNINGAR_BERORDA: usize = 3;
const PERMITTERINGAR_VARSEL: usize = 6;
const PERMITTERINGAR_BERORDA: usize = 7;

/// Parse the national workbook at `path`.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn parse_riket<P: AsRef<Path>>(path: P) -> Result<RiketStatistics> {
    let csv = render_first_sheet(path)?;
    let stats = parse_riket_csv(&csv)?;
    info!(sectors = stats.riket.len(), "parsed national table");
    Ok(stats)
}

/// Parse the national table out of the first sheet rendered as CSV.
///
/// The table runs from the `SNI` header row through the last `Summa` row.
/// Neither of those rows is emitted, and neither is a row with no sector label.
pub fn parse_riket_csv(csv: &str) -> Result<RiketStatistics> {
    let rows = decode_rows(csv)?;
    let table = locate_table(&rows)?;

    let riket = table
        .iter()
        .skip(1)
        .filter_map(|row| {
            let record = sector_record(row);
            if record.is_none() {
                debug!(?row, "skipping row without sector label");
            }
            record
        })
        .collect();

    Ok(RiketStatistics { riket })
}

/// The `SNI` header row and the rows after it, stopping before the last
/// `Summa` row. Earlier `Summa` rows are subtotals and stay in the table.
fn locate_table(rows: &[Row]) -> Result<&[Row]> {
    let start = find_row(rows, 0, |r| row_contains(r, HEADER_MARKER))
        .ok_or_else(|| anyhow!("national table header `{}` not found", HEADER_MARKER))?;
    let end = rows[start + 1..]
        .iter()
        .rposition(|r| row_contains(r, CLOSING_MARKER))
        .map(|offset| start + 1 + offset)
        .ok_or_else(|| anyhow!("national table closing row `{}` not found", CLOSING_MARKER))?;
    Ok(&rows[start..end])
}

fn sector_record(row: &Row) -> Option<SectorRecord> {
    let label = cell(row, LABEL);
    if label.is_empty() {
        return None;
    }
    Some(SectorRecord {
        yrkesomrade: label.to_string(),
        data: SectorData {
            uppsagningar: Counts {
                varsel: to_number(cell(row, UPPSAGNINGAR_VARSEL)),
                berorda_personer: to_number(cell(row, UPPSAGNINGAR_BERORDA)),
            },
            permitteringar: Counts {
                varsel: to_number(cell(row, PERMITTERINGAR_VARSEL)),
                berorda_personer: to_number(cell(row, PERMITTERINGAR_BERORDA)),
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
Varsel om uppsägning och permittering,,,,,,,
Hela riket maj 2024,,,,,,,
,,,,,,,
SNI,Näringsgren,Varsel,Berörda,Andel,Andel,Permitteringsvarsel,Berörda
A,\"Jordbruk, skogsbruk och fiske\",4,\"1,234\",0.1,0.2,2,30
C,Tillverkning,12, 56 ,0.3,0.4,\"1,001\",\"12,500\"
,,,,,,,
F,Byggverksamhet,..,7,0.5,0.6,,3
Summa,,16,\"1,297\",1,1,\"1,003\",\"12,533\"
Källa: Arbetsförmedlingen,,,,,,,
";

    fn counts(varsel: i64, berorda_personer: i64) -> Counts {
        Counts {
            varsel,
            berorda_personer,
        }
    }

    #[test]
    fn parses_sector_rows_between_markers() -> Result<()> {
        let stats = parse_riket_csv(SHEET)?;

        let labels: Vec<_> = stats.riket.iter().map(|r| r.yrkesomrade.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Jordbruk, skogsbruk och fiske", "Tillverkning", "Byggverksamhet"]
        );

        assert_eq!(stats.riket[0].data.uppsagningar, counts(4, 1234));
        assert_eq!(stats.riket[0].data.permitteringar, counts(2, 30));
        assert_eq!(stats.riket[1].data.uppsagningar, counts(12, 56));
        assert_eq!(stats.riket[1].data.permitteringar, counts(1001, 12500));
        // ".." and empty cells normalise to zero
        assert_eq!(stats.riket[2].data.uppsagningar, counts(0, 7));
        assert_eq!(stats.riket[2].data.permitteringar, counts(0, 3));
        Ok(())
    }

    #[test]
    fn closing_row_is_not_emitted_even_with_a_label() -> Result<()> {
        let csv = "SNI,Näringsgren,a,b,c,d,e,f\nA,Bygg,1,2,,,3,4\nTotal,Summa,1,2,,,3,4\n";
        let stats = parse_riket_csv(csv)?;
        assert_eq!(stats.riket.len(), 1);
        assert_eq!(stats.riket[0].yrkesomrade, "Bygg");
        Ok(())
    }

    #[test]
    fn table_runs_to_the_last_summa_row() -> Result<()> {
        let csv = "\
SNI,Näringsgren,a,b,c,d,e,f
A,Bygg,1,2,,,3,4
Delsumma,Summa industri,5,6,,,7,8
C,Handel,9,10,,,11,12
Summa,Totalt,15,18,,,21,24
,Efter tabellen,1,1,,,1,1
";
        let stats = parse_riket_csv(csv)?;
        let labels: Vec<_> = stats.riket.iter().map(|r| r.yrkesomrade.as_str()).collect();
        assert_eq!(labels, vec!["Bygg", "Summa industri", "Handel"]);
        assert_eq!(stats.riket[2].data.permitteringar, counts(11, 12));
        Ok(())
    }

    #[test]
    fn short_rows_are_zero_filled() -> Result<()> {
        let csv = "SNI,Näringsgren\nA,Bygg,5\nSumma\n";
        let stats = parse_riket_csv(csv)?;
        assert_eq!(stats.riket[0].data.uppsagningar, counts(5, 0));
        assert_eq!(stats.riket[0].data.permitteringar, counts(0, 0));
        Ok(())
    }

    #[test]
    fn missing_markers_are_errors() {
        let no_header = "A,Bygg,1,2,,,3,4\nSumma\n";
        let err = parse_riket_csv(no_header).unwrap_err();
        assert!(err.to_string().contains("SNI"));

        let no_closing = "SNI,Näringsgren\nA,Bygg,1,2,,,3,4\n";
        let err = parse_riket_csv(no_closing).unwrap_err();
        assert!(err.to_string().contains("Summa"));
    }
}
