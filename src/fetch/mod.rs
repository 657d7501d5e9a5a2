// src/fetch/mod.rs

/// Locating the current spreadsheets on the statistics page
pub mod urls;

/// Downloading a single spreadsheet to disk
pub mod files;
