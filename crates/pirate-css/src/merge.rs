//! Merging stylesheets for one service round trip, and splitting the way
//! back.
//!
//! All selected stylesheets go to the simplification service as a single CSS
//! string, joined with [`SEPARATOR`]. The separator is a literal improbable
//! marker embedded as a comment, so the service carries it through untouched
//! and the response splits back into per-source pieces. A piece count that
//! does not match the input count means the service mangled or reflowed the
//! separators, which is a hard contract violation.

use regex::Regex;
use thiserror::Error;

use crate::format::{beautify, minify};
use pirate_common::{CssPiece, StyleSheetDescriptor};

/// Separator comment embedded between merged stylesheets.
pub const SEPARATOR: &str = "/*****-----sep-----*****/";

/// The simplified CSS did not split back into one piece per input sheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("simplified css is not in the expected format: {actual} pieces, expected {expected}")]
pub struct SplitError {
    /// Number of stylesheets that were merged into the request.
    pub expected: usize,
    /// Number of pieces the response split into.
    pub actual: usize,
}

/// Join the stylesheets' text with the separator, in sequence order.
#[must_use]
pub fn merge(sheets: &[StyleSheetDescriptor]) -> String {
    sheets
        .iter()
        .map(|sheet| sheet.css_text.as_str())
        .collect::<Vec<_>>()
        .join(&format!("\n\n{SEPARATOR}\n\n"))
}

/// Split a simplified response back into per-source pieces.
///
/// Pieces correspond to `sheets` by index. Each piece has block comments
/// stripped and is trimmed; pieces left empty by that contributed no used CSS
/// and are dropped from the result.
///
/// # Errors
///
/// Returns [`SplitError`] when the piece count does not match the sheet
/// count.
pub fn split_simplified(
    output_css: &str,
    sheets: &[StyleSheetDescriptor],
) -> Result<Vec<CssPiece>, SplitError> {
    let raw_pieces: Vec<&str> = output_css.split(SEPARATOR).collect();
    if raw_pieces.len() != sheets.len() {
        return Err(SplitError {
            expected: sheets.len(),
            actual: raw_pieces.len(),
        });
    }
    Ok(raw_pieces
        .into_iter()
        .zip(sheets)
        .map(|(raw, sheet)| CssPiece {
            source: sheet.source.clone(),
            is_internal: sheet.is_internal,
            filename: sheet.filename.clone(),
            css_text: strip_block_comments(raw).trim().to_string(),
        })
        .filter(|piece| !piece.css_text.is_empty())
        .collect())
}

/// Remove every block comment from a CSS string.
#[must_use]
pub fn strip_block_comments(css: &str) -> String {
    block_comment_regex().replace_all(css, "").into_owned()
}

fn block_comment_regex() -> Regex {
    Regex::new(r"/\*([^*]|\*+[^*/])*\*+/").expect("block comment pattern")
}

/// Combine simplified pieces into one displayable stylesheet, each piece
/// under a banner comment naming its source.
#[must_use]
pub fn combine_pieces(pieces: &[CssPiece], minify_css: bool) -> String {
    let hr = "-".repeat(if minify_css { 9 } else { 69 });
    let combined = pieces
        .iter()
        .map(|piece| format!("/* {hr}\n * {} \n * {hr} \n */\n\n{}", piece.source, piece.css_text))
        .collect::<Vec<_>>()
        .join("\n\n");
    if minify_css {
        minify(&combined)
    } else {
        beautify(&combined, 2)
    }
}
