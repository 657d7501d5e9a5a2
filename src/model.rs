// src/model.rs
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two spreadsheets published each month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// National totals per industry sector.
    Riket,
    /// Per-region time series.
    Lan,
}

impl Slot {
    /// Token that identifies the slot inside a filename.
    pub fn token(self) -> &'static str {
        match self {
            Slot::Riket => "riket",
            Slot::Lan => "lan",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A year-month stamp as it appears in filenames (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        Period { year, month }
    }

    /// The period of the local wall clock.
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Period::new(now.year(), now.month())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One downloadable spreadsheet found on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub varsel: i64,
    pub berorda_personer: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorData {
    pub uppsagningar: Counts,
    pub permitteringar: Counts,
}

/// One industry sector row of the national table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRecord {
    pub yrkesomrade: String,
    pub data: SectorData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionPoint {
    pub berorda_personer: i64,
    pub datum: String,
}

/// One region row of the regional table, three points per region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub lan: String,
    pub data: Vec<RegionPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiketStatistics {
    pub riket: Vec<SectorRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanStatistics {
    pub lan: Vec<RegionRecord>,
}

/// Serialises as `[{"riket": [...]}, {"lan": [...]}]`, national first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument(pub RiketStatistics, pub LanStatistics);
