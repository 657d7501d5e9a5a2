//! Monthly layoff-notice statistics from Arbetsförmedlingen as JSON.
//!
//! The listing page is scanned for the current national (`riket`) and
//! regional (`lan`) spreadsheets, both are downloaded and parsed
//! concurrently, and the result is written as
//! `[{"riket": [...]}, {"lan": [...]}]`.

pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod process;

pub use pipeline::{Pipeline, Source};
