//! Session data store for the Pirate extractor.
//!
//! # Scope
//!
//! This crate provides:
//! - **Session store** - the single owner of mutable pipeline state:
//!   snapshot, stylesheet set, depth window, computed pieces
//! - **Collaborator seams** - traits for the inspected-page accessor, the
//!   stylesheet fetcher, and the simplification client, injected at
//!   construction
//! - **Error taxonomy** - capture and round-trip failures, none of them
//!   fatal
//!
//! The store runs single-threaded and cooperative; staleness across
//! overlapping recomputations is handled by a generation counter.

// Collaborators are consumed through generic parameters, never trait
// objects, so the auto-trait caveats of async trait methods do not apply.
#![allow(async_fn_in_trait)]

pub mod collab;
pub mod error;
pub mod session;

pub use collab::{Inspector, Simplifier, StyleFetcher};
pub use error::{CaptureError, PirateError};
pub use session::{InspectedSnapshot, Session};
