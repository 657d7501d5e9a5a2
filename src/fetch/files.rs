// src/fetch/files.rs
use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use tempfile::TempPath;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, instrument};

use crate::model::DownloadTarget;

/// Stream `target` into a fresh transient file under `dir` and return its path.
///
/// The file keeps the extension of `target.filename` so the workbook reader
/// can pick the right format. It is deleted when the returned path is closed
/// or dropped. Returns only once every chunk is written, flushed and synced.
#[instrument(level = "info", skip(client, target, dir), fields(file = %target.filename))]
pub async fn download_to_temp(
    client: &Client,
    target: &DownloadTarget,
    dir: &Path,
) -> Result<TempPath> {
    let suffix = Path::new(&target.filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    let tmp = tempfile::Builder::new()
        .prefix("varsel-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .with_context(|| format!("creating transient file in {}", dir.display()))?;
    let (std_file, path) = tmp.into_parts();
    let mut file = File::from_std(std_file);

    let response = client
        .get(&target.url)
        .send()
        .await
        .with_context(|| format!("GET {}", target.url))?
        .error_for_status()?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("reading body from {}", target.url))?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;

    debug!(bytes = written, path = %path.display(), "download complete");
    Ok(path)
}
