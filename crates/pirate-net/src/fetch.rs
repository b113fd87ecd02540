//! Resolving page stylesheet listings into text descriptors.
//!
//! The inspected page reports one entry per stylesheet: inline sheets carry
//! their rule text, external sheets only a href. Entries that already carry
//! text are used verbatim; the rest are fetched here. A failed fetch drops
//! that entry only, never the batch.

use std::time::Duration;

use log::{debug, warn};

use pirate_common::{PageStyleSheet, StyleSheetDescriptor, filename_of};

/// User-Agent header sent with all requests.
///
/// Mimics a common desktop browser to avoid basic bot detection.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches stylesheet content over HTTP and normalizes page listings into
/// [`StyleSheetDescriptor`] sequences.
pub struct StylesheetFetcher {
    client: reqwest::Client,
}

impl StylesheetFetcher {
    /// Create a fetcher with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        StylesheetFetcher { client }
    }

    /// Resolve every listing entry to text and assemble descriptors.
    ///
    /// Entries keep their listing order. Sheets without a href are assigned
    /// synthetic `internal_N` sources with a monotonically increasing
    /// counter; entries that yield no text are dropped.
    pub async fn fetch_all(&self, sheets: &[PageStyleSheet]) -> Vec<StyleSheetDescriptor> {
        let mut contents = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            contents.push(self.resolve_content(sheet).await);
        }
        let descriptors = assemble(sheets, contents);
        debug!(
            "resolved {} of {} listed stylesheets",
            descriptors.len(),
            sheets.len()
        );
        descriptors
    }

    /// Text for one listing entry: the reported `cssText` when present
    /// (inline and same-origin sheets), otherwise a fetch of the href.
    /// Failures yield `None` for this entry only.
    async fn resolve_content(&self, sheet: &PageStyleSheet) -> Option<String> {
        if let Some(text) = &sheet.css_text {
            if !text.is_empty() {
                return Some(text.clone());
            }
        }
        let href = sheet.href.as_deref()?;
        if !href.starts_with("http") {
            return None;
        }
        match self.fetch_text(href).await {
            Ok(text) => Some(text),
            Err(error) => {
                warn!("stylesheet fetch failed for {href}: {error}");
                None
            }
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

impl Default for StylesheetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Zip resolved contents back with their listing entries.
///
/// Every href-less entry consumes an `internal_N` id, resolved or not, so
/// the synthetic sources are stable regardless of which fetches succeeded.
fn assemble(
    sheets: &[PageStyleSheet],
    contents: Vec<Option<String>>,
) -> Vec<StyleSheetDescriptor> {
    let mut internal_seq = 0usize;
    let mut descriptors = Vec::new();
    for (sheet, content) in sheets.iter().zip(contents) {
        let (source, is_internal) = match sheet.href.as_deref() {
            Some(href) if !href.is_empty() => (href.to_string(), false),
            _ => {
                let source = format!("internal_{internal_seq}");
                internal_seq += 1;
                (source, true)
            }
        };
        let Some(css_text) = content else { continue };
        descriptors.push(StyleSheetDescriptor {
            filename: filename_of(&source),
            source,
            is_internal,
            css_text,
            selected: true,
        });
    }
    descriptors
}
