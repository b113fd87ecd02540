//! HTML fragment tree utilities for the Pirate extractor.
//!
//! This crate owns every HTML-shaped step of the pipeline:
//! - **Fragment tree** - an arena tree built from an external fragment parser
//! - **Serialization** - compact and pretty forms, per the HTML serialization
//!   algorithm
//! - **Depth** - tree depth measurement and level-window slicing
//! - **Normalization** - script stripping and relative `src` rebasing
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices, so the slicing and
//! measurement logic walks an owned structure instead of a live parser DOM.
//! Parsing itself is delegated to `scraper`; this crate never tokenizes HTML.

pub mod depth;
pub mod fragment;
pub mod normalize;
pub mod tree;

pub use depth::{measure_depth, slice_levels};
pub use fragment::{parse_fragment, serialize, serialize_pretty};
pub use normalize::{normalize_html, rebase_image_sources, strip_scripts};
pub use tree::{ElementData, Node, NodeId, NodeKind, Tree};
