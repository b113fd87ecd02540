//! Network collaborators for the Pirate extractor.
//!
//! This crate provides the two pieces that talk to the outside world:
//! - **Stylesheet fetcher** - resolves a page's stylesheet listing into text,
//!   fetching external sheets and tagging inline ones with synthetic ids
//! - **Unused-CSS client** - posts merged HTML+CSS to the remote
//!   simplification service and validates its response
//!
//! Both are injected into the session store through its collaborator traits,
//! so everything above this crate can run against mocks.

pub mod fetch;
pub mod uncss;

pub use fetch::StylesheetFetcher;
pub use uncss::{DEFAULT_ENDPOINT, UncssClient, UncssError};
