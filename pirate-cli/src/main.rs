//! Pirate CLI
//!
//! Headless driver for the extraction pipeline. Plays the host-inspector
//! role against a local file or a fetched URL: selects an element, walks its
//! ancestor chain, lists the page's stylesheets, and drives the session
//! store through capture, stylesheet loading, and simplification.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::info;
use scraper::{ElementRef, Html, Selector};

use pirate_common::{InspectedPayload, PageStyleSheet, resolve_url};
use pirate_net::{DEFAULT_ENDPOINT, StylesheetFetcher, UncssClient};
use pirate_session::{CaptureError, Inspector, Session};

#[derive(Parser)]
#[command(
    name = "pirate",
    version,
    about = "Extract an element's markup and its used CSS into a self-contained snippet"
)]
struct Args {
    /// Page to extract from: a file path or an http(s) URL.
    input: String,

    /// CSS selector of the element to extract (first match wins).
    #[arg(short, long)]
    selector: String,

    /// Depth window over the captured tree, as inclusive `start..end` levels.
    /// Defaults to the full tree.
    #[arg(long)]
    levels: Option<String>,

    /// Unused-CSS service endpoint.
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout for the service call, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Minify the extracted CSS.
    #[arg(long)]
    minify: bool,

    /// Write the result document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base URL for resolving relative references when the input is a local
    /// file. Without it, relative stylesheet hrefs cannot be fetched.
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (html, page_url) = load_page(&args).await?;
    let inspector = PageInspector::new(html, page_url, &args.selector)?;
    let fetcher = StylesheetFetcher::new();
    let client = UncssClient::new(&args.endpoint, Duration::from_secs(args.timeout_secs));
    let session = Session::new(inspector, fetcher, client);

    session.capture_snapshot().await?;
    let snapshot = session
        .snapshot()
        .context("snapshot missing after capture")?;
    info!(
        "captured element of depth {} inside a page tree of depth {}",
        snapshot.element_tree_depth, snapshot.full_tree_depth
    );

    let sheets = session.load_stylesheets().await;
    if sheets.is_empty() {
        bail!("the page has no usable stylesheets");
    }
    for sheet in &sheets {
        info!("loaded {} ({} bytes)", sheet.source, sheet.css_text.len());
    }

    if let Some(levels) = &args.levels {
        let (start, end) = parse_levels(levels)?;
        session.set_depth_window(start, end);
    }
    if !session.can_pirate() {
        bail!("nothing to extract: the depth window selects no content");
    }

    session.compute_result().await?;
    let document = session
        .result_document(args.minify)
        .context("the service reported no used css for this element")?;

    match &args.output {
        Some(path) => {
            fs::write(path, &document)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("result written to {}", path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}

/// Read the page from disk or fetch it, returning its text and its URL
/// (empty for a local file without `--base-url`).
async fn load_page(args: &Args) -> Result<(String, String)> {
    if args.input.starts_with("http://") || args.input.starts_with("https://") {
        let html = reqwest::get(&args.input)
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("failed to fetch {}", args.input))?
            .text()
            .await
            .with_context(|| format!("failed to read {}", args.input))?;
        Ok((html, args.input.clone()))
    } else {
        let html = fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read {}", args.input))?;
        Ok((html, args.base_url.clone().unwrap_or_default()))
    }
}

/// Parse an inclusive `start..end` depth window.
fn parse_levels(spec: &str) -> Result<(usize, usize)> {
    let (start, end) = spec
        .split_once("..")
        .with_context(|| format!("levels must look like 1..3, got '{spec}'"))?;
    let start = start.trim().parse().context("invalid window start")?;
    let end = end.trim().parse().context("invalid window end")?;
    Ok((start, end))
}

/// Headless stand-in for the host inspector: a parsed page plus the
/// user-chosen selector.
struct PageInspector {
    document: Html,
    page_url: String,
    element_selector: Selector,
    sheet_selector: Selector,
}

impl PageInspector {
    fn new(html: String, page_url: String, selector: &str) -> Result<Self> {
        let element_selector = Selector::parse(selector)
            .map_err(|error| anyhow!("invalid selector '{selector}': {error}"))?;
        let sheet_selector = Selector::parse("link[rel=\"stylesheet\"], style")
            .map_err(|error| anyhow!("stylesheet selector: {error}"))?;
        Ok(PageInspector {
            document: Html::parse_document(&html),
            page_url,
            element_selector,
            sheet_selector,
        })
    }
}

impl Inspector for PageInspector {
    async fn last_inspected(&self) -> Result<InspectedPayload, CaptureError> {
        let Some(element) = self.document.select(&self.element_selector).next() else {
            return Err(CaptureError::NoSelection);
        };
        if element.value().name() == "body" {
            return Err(CaptureError::InvalidSelection);
        }
        let full_html = wrap_in_ancestors(element).ok_or(CaptureError::InvalidSelection)?;
        Ok(InspectedPayload {
            element: element.html(),
            full_html,
            href: self.page_url.clone(),
        })
    }

    async fn style_sheets(&self) -> Vec<PageStyleSheet> {
        let mut sheets = Vec::new();
        for element in self.document.select(&self.sheet_selector) {
            if element.value().name() == "link" {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                sheets.push(PageStyleSheet {
                    href: Some(resolve_url(href, Some(&self.page_url))),
                    css_text: None,
                });
            } else {
                sheets.push(PageStyleSheet {
                    href: None,
                    css_text: Some(element.text().collect()),
                });
            }
        }
        sheets
    }
}

/// Rebuild the ancestor chain from `<body>` down to the element, with all
/// siblings outside the chain omitted. `None` when the element has no
/// ancestor chain to a `<body>`.
fn wrap_in_ancestors(element: ElementRef<'_>) -> Option<String> {
    let mut html = element.html();
    let mut node = element;
    loop {
        let parent = node.parent().and_then(ElementRef::wrap)?;
        let data = parent.value();
        let mut open = format!("<{}", data.name());
        for (name, value) in data.attrs() {
            let value = value.replace('&', "&amp;").replace('"', "&quot;");
            open.push_str(&format!(" {name}=\"{value}\""));
        }
        open.push('>');
        html = format!("{open}{html}</{}>", data.name());
        if data.name() == "body" {
            return Some(html);
        }
        node = parent;
    }
}
