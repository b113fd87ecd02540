//! Error taxonomy of the session pipeline.
//!
//! Nothing here is fatal: capture errors ask the user to pick a different
//! element, and pirate errors leave the previously computed result in place.

use thiserror::Error;

use pirate_css::SplitError;
use pirate_net::UncssError;

/// Snapshot capture failed; the user must pick a different element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Nothing is selected in the inspector.
    #[error("select an element using the inspector first")]
    NoSelection,
    /// The selection is the document body, or is detached from it.
    ///
    /// The whole body is too broad to be useful (and is the default
    /// selection in most inspectors), and a node with no ancestor chain to
    /// the body cannot be placed in the page.
    #[error("invalid element selected (needs to be inside the body tag)")]
    InvalidSelection,
}

/// A simplification round trip failed; the previous result is preserved.
#[derive(Debug, Error)]
pub enum PirateError {
    /// The remote service rejected the call or the transport failed.
    #[error(transparent)]
    Service(#[from] UncssError),
    /// The response did not split back into the expected pieces.
    #[error(transparent)]
    Format(#[from] SplitError),
}
