//! Collaborator seams injected into the session store.
//!
//! The store never reaches for ambient globals; its three collaborators are
//! passed in at construction. Production wiring uses the `pirate-net` types
//! (implemented below) plus a host-specific inspector; tests use mocks.

use pirate_common::{InspectedPayload, PageStyleSheet, StyleSheetDescriptor};
use pirate_net::{StylesheetFetcher, UncssClient, UncssError};

use crate::error::CaptureError;

/// Access to the inspected page: the selected element and the page's
/// stylesheet listing.
pub trait Inspector {
    /// Payload for the currently selected element.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoSelection`] when nothing is selected,
    /// [`CaptureError::InvalidSelection`] when the selection is unusable.
    async fn last_inspected(&self) -> Result<InspectedPayload, CaptureError>;

    /// The page's stylesheets in document order.
    async fn style_sheets(&self) -> Vec<PageStyleSheet>;
}

/// Resolves a page stylesheet listing into text descriptors.
pub trait StyleFetcher {
    /// Fetch and normalize every listing entry, dropping entries that yield
    /// no text. Failures are isolated per entry.
    async fn fetch_all(&self, sheets: &[PageStyleSheet]) -> Vec<StyleSheetDescriptor>;
}

/// The unused-CSS simplification service.
pub trait Simplifier {
    /// Return the simplified CSS for `input_html` and the merged
    /// `input_css`.
    ///
    /// # Errors
    ///
    /// [`UncssError`] when the service or its transport fails.
    async fn simplify(&self, input_html: &str, input_css: &str) -> Result<String, UncssError>;
}

impl StyleFetcher for StylesheetFetcher {
    async fn fetch_all(&self, sheets: &[PageStyleSheet]) -> Vec<StyleSheetDescriptor> {
        StylesheetFetcher::fetch_all(self, sheets).await
    }
}

impl Simplifier for UncssClient {
    async fn simplify(&self, input_html: &str, input_css: &str) -> Result<String, UncssError> {
        UncssClient::simplify(self, input_html, input_css).await
    }
}
