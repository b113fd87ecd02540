//! CSS rule tree and rewriting for the Pirate extractor.
//!
//! # Scope
//!
//! This crate implements:
//! - **Rule tree** - a small owned tree (style rules, media blocks,
//!   declarations) built on the `cssparser` framework
//!   ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//! - **URL rewriting** - resolving `url(...)` references against a page URL
//! - **Selector scoping** - namespacing every selector under a synthetic
//!   class so extracted rules cannot leak into the preview document
//! - **Formatting** - a token-level beautifier and the newline-folding
//!   minifier built on top of it
//! - **Merge/split** - joining stylesheets with a separator comment for one
//!   round trip to the simplification service, and validating the way back
//!
//! Every rewriting entry point is fail-soft: when the input does not parse,
//! the original text is returned unchanged.

pub mod ast;
pub mod format;
pub mod merge;
pub mod parse;
pub mod transform;

pub use ast::{Declaration, Item, MediaRule, OtherAtRule, StyleRule, Stylesheet};
pub use format::{beautify, minify};
pub use merge::{SEPARATOR, SplitError, combine_pieces, merge, split_simplified, strip_block_comments};
pub use parse::{ParseError, parse_stylesheet};
pub use transform::{rewrite_urls, scope_class, scope_selectors};
