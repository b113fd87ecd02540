//! Data shapes passed between the pipeline stages.
//!
//! These mirror the message contract between the panel, the privileged
//! backend, and the inspected page, so they all carry serde derives with the
//! original camelCase field names on the wire.

use serde::{Deserialize, Serialize};

/// One entry of a page's stylesheet listing, as reported from the inspected
/// document: inline sheets carry their rule text, external sheets only a href.
///
/// [CSSOM § 6.1 The StyleSheet interface](https://drafts.csswg.org/cssom/#the-stylesheet-interface)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStyleSheet {
    /// Absolute href of an external sheet, if any.
    pub href: Option<String>,
    /// Joined `cssText` of the sheet's rules, when script-level rule access
    /// was possible (inline `<style>` and same-origin sheets).
    #[serde(rename = "cssText")]
    pub css_text: Option<String>,
}

/// A stylesheet whose content has been resolved to text.
///
/// `source` is the canonical unique key (href, or a synthetic `internal_N`
/// identifier for inline sheets); `filename` is derived for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSheetDescriptor {
    /// Unique key: the original href, or `internal_N` for inline sheets.
    pub source: String,
    /// Whether the sheet was inline rather than an external resource.
    #[serde(rename = "isInternal")]
    pub is_internal: bool,
    /// Final path segment of `source`, for display.
    pub filename: String,
    /// The sheet's CSS text.
    #[serde(rename = "cssText")]
    pub css_text: String,
    /// Whether the user wants this sheet included in the extraction.
    pub selected: bool,
}

/// One simplified CSS piece, produced by splitting the service response.
///
/// Pieces correspond one-to-one, by index, with the descriptor sequence that
/// was merged into the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssPiece {
    /// The `source` of the descriptor this piece came from.
    pub source: String,
    /// Whether that descriptor was an inline sheet.
    #[serde(rename = "isInternal")]
    pub is_internal: bool,
    /// Display filename of the descriptor.
    pub filename: String,
    /// Simplified CSS text, block comments stripped and trimmed.
    #[serde(rename = "cssText")]
    pub css_text: String,
}

/// Payload returned by the inspector accessor for the currently selected
/// element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectedPayload {
    /// `outerHTML` of the selected element.
    pub element: String,
    /// `outerHTML` of the ancestor chain from `<body>` down to the element,
    /// with all siblings outside the chain omitted.
    #[serde(rename = "fullHtml")]
    pub full_html: String,
    /// Location of the inspected page.
    pub href: String,
}
