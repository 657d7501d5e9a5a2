// src/fetch/urls.rs
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use crate::model::{DownloadTarget, Period, Slot};

/// Any `/download...varsel...` href, up to the closing quote.
static DOWNLOAD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(/download[^"]*?varsel[^"]*?)""#).expect("valid link regex"));

/// The most recent spreadsheet per slot, as selected from the listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    pub riket: Option<DownloadTarget>,
    pub lan: Option<DownloadTarget>,
}

impl Targets {
    pub fn get(&self, slot: Slot) -> Option<&DownloadTarget> {
        match slot {
            Slot::Riket => self.riket.as_ref(),
            Slot::Lan => self.lan.as_ref(),
        }
    }

    /// Returns the target for `slot` or an error naming the missing slot and period.
    pub fn require(&self, slot: Slot, period: Period) -> Result<&DownloadTarget> {
        self.get(slot).ok_or_else(|| {
            anyhow::anyhow!("no `{}` spreadsheet listed for {}", slot, period)
        })
    }
}

/// Fetch the listing page and select the current spreadsheets from it.
#[instrument(level = "info", skip(client, origin, listing), fields(listing = %listing))]
pub async fn fetch_targets(
    client: &Client,
    origin: &Url,
    listing: &Url,
    period: Period,
) -> Result<Targets> {
    let html = client
        .get(listing.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", listing))?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("reading body from {}", listing))?;

    let targets = select_targets(&html, origin, period);
    info!(
        riket = ?targets.riket.as_ref().map(|t| &t.filename),
        lan = ?targets.lan.as_ref().map(|t| &t.filename),
        "selected spreadsheets"
    );
    Ok(targets)
}

/// Every `/download...varsel...` link in `html`, made absolute against `origin`.
pub fn extract_links(html: &str, origin: &Url) -> Vec<DownloadTarget> {
    DOWNLOAD_LINK
        .captures_iter(html)
        .filter_map(|caps| {
            let path = caps.get(1)?.as_str();
            let url = origin.join(path).ok()?;
            let filename = path.rsplit('/').next().unwrap_or(path).to_string();
            Some(DownloadTarget {
                url: url.to_string(),
                filename,
            })
        })
        .collect()
}

/// Classify each link and keep the last one per slot whose filename carries `period`.
///
/// A filename belongs to a slot when the slot token is followed, anywhere
/// later in the name, by the `YYYY-MM` stamp of `period`. It is tested for
/// `riket` before `lan`.
pub fn select_targets(html: &str, origin: &Url, period: Period) -> Targets {
    let stamp = period.to_string();
    let mut targets = Targets::default();

    for target in extract_links(html, origin) {
        if carries_stamp(Slot::Riket, &target.filename, &stamp) {
            targets.riket = Some(target);
        } else if carries_stamp(Slot::Lan, &target.filename, &stamp) {
            targets.lan = Some(target);
        } else {
            debug!(filename = %target.filename, "skipping link");
        }
    }

    targets
}

fn carries_stamp(slot: Slot, filename: &str, stamp: &str) -> bool {
    filename
        .find(slot.token())
        .map(|at| filename[at + slot.token().len()..].contains(stamp))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://arbetsformedlingen.se").unwrap()
    }

    const LISTING: &str = r#"
<ul>
  <li><a href="/download/18.1/varsel-riket-2024-04.xlsx">april</a></li>
  <li><a href="/download/18.2/varsel-lan-2024-04.xlsx">april</a></li>
  <li><a href="/download/18.3/varsel-riket-2024-05.xlsx">maj</a></li>
  <li><a href="/download/18.4/Varsel-lan-2024-05.xls">maj</a></li>
  <li><a href="/download/18.5/statistik-2024-05.pdf">annat</a></li>
  <li><a href="/om-oss/varsel-riket-2024-05.xlsx">not a download</a></li>
</ul>"#;

    #[test]
    fn extracts_absolute_links_and_filenames() {
        let links = extract_links(LISTING, &origin());
        assert_eq!(links.len(), 4);
        assert_eq!(
            links[0],
            DownloadTarget {
                url: "https://arbetsformedlingen.se/download/18.1/varsel-riket-2024-04.xlsx"
                    .into(),
                filename: "varsel-riket-2024-04.xlsx".into(),
            }
        );
        assert_eq!(links[3].filename, "Varsel-lan-2024-05.xls");
    }

    #[test]
    fn selects_current_period_per_slot() {
        let targets = select_targets(LISTING, &origin(), Period::new(2024, 5));
        assert_eq!(
            targets.riket.unwrap().url,
            "https://arbetsformedlingen.se/download/18.3/varsel-riket-2024-05.xlsx"
        );
        assert_eq!(targets.lan.unwrap().filename, "Varsel-lan-2024-05.xls");
    }

    #[test]
    fn last_listed_wins_within_a_period() {
        let html = r#"
<a href="/download/a/varsel-riket-2024-05.xlsx">
<a href="/download/b/varsel-riket-2024-05-rev.xlsx">"#;
        let targets = select_targets(html, &origin(), Period::new(2024, 5));
        assert_eq!(targets.riket.unwrap().filename, "varsel-riket-2024-05-rev.xlsx");
        assert!(targets.lan.is_none());
    }

    #[test]
    fn stale_period_leaves_slot_empty() {
        let targets = select_targets(LISTING, &origin(), Period::new(2024, 6));
        assert_eq!(targets, Targets::default());
        let err = targets.require(Slot::Lan, Period::new(2024, 6)).unwrap_err();
        assert!(err.to_string().contains("`lan`"));
    }

    #[test]
    fn period_must_follow_the_token() {
        let html = r#"<a href="/download/x/2024-05-varsel-riket.xlsx">"#;
        let targets = select_targets(html, &origin(), Period::new(2024, 5));
        assert!(targets.riket.is_none());
    }

    #[test]
    fn stamp_is_found_after_a_false_start() {
        let html = r#"<a href="/download/x/varsel-riket-2024-2024-05.xlsx">"#;
        let targets = select_targets(html, &origin(), Period::new(2024, 5));
        assert_eq!(
            targets.riket.unwrap().filename,
            "varsel-riket-2024-2024-05.xlsx"
        );
    }

    #[test]
    fn riket_is_tested_before_lan() {
        let html = r#"<a href="/download/x/varsel-lan-riket-2024-05.xlsx">"#;
        let targets = select_targets(html, &origin(), Period::new(2024, 5));
        assert!(targets.riket.is_some());
        assert!(targets.lan.is_none());
    }
}
