// src/pipeline.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::{task, time::Instant};
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    fetch,
    model::{DownloadTarget, OutputDocument, Period, Slot},
    process::{lan::parse_lan, riket::parse_riket},
};

/// Site origin that relative download links are resolved against.
pub const AF_ORIGIN: &str = "https://arbetsformedlingen.se";

/// Page listing the monthly statistics spreadsheets.
pub const LISTING_URL: &str = "https://arbetsformedlingen.se/om-oss/statistik-och-analyser/statistik";

/// Where the spreadsheets are published.
#[derive(Debug, Clone)]
pub struct Source {
    pub origin: Url,
    pub listing: Url,
}

impl Source {
    pub fn new(origin: &str, listing: &str) -> Result<Self> {
        Ok(Source {
            origin: Url::parse(origin).with_context(|| format!("parsing origin {}", origin))?,
            listing: Url::parse(listing).with_context(|| format!("parsing listing {}", listing))?,
        })
    }

    /// The agency's public statistics page.
    pub fn arbetsformedlingen() -> Result<Self> {
        Source::new(AF_ORIGIN, LISTING_URL)
    }
}

pub struct Pipeline {
    client: Client,
    source: Source,
    scratch_dir: PathBuf,
}

impl Pipeline {
    pub fn new(client: Client, source: Source) -> Self {
        Pipeline {
            client,
            source,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Put transient downloads in `dir` instead of the system temp directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Scan, download, parse both spreadsheets for `period` and write the JSON
    /// document to `output`.
    ///
    /// Nothing is written unless both branches succeed. Transient downloads are
    /// removed once the output is on disk, or dropped on the error path.
    #[instrument(level = "info", skip(self, period, output), fields(period = %period, output = %output.display()))]
    pub async fn run(&self, period: Period, output: &Path) -> Result<()> {
        let start = Instant::now();

        let targets = fetch::urls::fetch_targets(
            &self.client,
            &self.source.origin,
            &self.source.listing,
            period,
        )
        .await?;
        let riket = targets.require(Slot::Riket, period)?;
        let lan = targets.require(Slot::Lan, period)?;

        let ((riket_stats, riket_file), (lan_stats, lan_file)) = tokio::try_join!(
            self.branch(riket, |p| parse_riket(p)),
            self.branch(lan, |p| parse_lan(p)),
        )?;

        let document = OutputDocument(riket_stats, lan_stats);
        let json = serde_json::to_vec(&document).context("serialising output document")?;
        tokio::fs::write(output, &json)
            .await
            .with_context(|| format!("writing {}", output.display()))?;
        info!(bytes = json.len(), elapsed = ?start.elapsed(), "output written");

        for file in [riket_file, lan_file] {
            let shown = file.display().to_string();
            if let Err(e) = file.close() {
                warn!(path = %shown, "failed to remove transient file: {}", e);
            }
        }
        Ok(())
    }

    /// Download one spreadsheet and parse it on the blocking pool.
    async fn branch<T, F>(&self, target: &DownloadTarget, parse: F) -> Result<(T, TempPath)>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T> + Send + 'static,
    {
        let path = fetch::files::download_to_temp(&self.client, target, &self.scratch_dir).await?;
        let parse_path = path.to_path_buf();
        let parsed = task::spawn_blocking(move || parse(&parse_path))
            .await?
            .with_context(|| format!("parsing {}", target.filename))?;
        Ok((parsed, path))
    }
}
