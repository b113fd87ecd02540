//! Common utilities for the Pirate extractor.
//!
//! This crate provides the pieces shared by every pipeline stage:
//! - **URL resolution** - rebasing relative references against a page URL
//! - **Data shapes** - stylesheet descriptors and simplified CSS pieces

pub mod types;
pub mod url;

pub use types::{CssPiece, InspectedPayload, PageStyleSheet, StyleSheetDescriptor};
pub use url::{filename_of, resolve_url};
