//! Rule tree transforms: URL rewriting and selector scoping.
//!
//! Both entry points parse, transform, and re-stringify. When the input does
//! not parse they log and return it unchanged; rewriting is a preview
//! convenience, not correctness-critical.

use log::debug;
use rand::Rng;
use regex::{Captures, Regex};

use crate::ast::{Item, MediaRule, Stylesheet, StyleRule};
use crate::parse::parse_stylesheet;
use pirate_common::resolve_url;

/// `url(...)` reference with an optionally quoted argument.
fn url_regex() -> Regex {
    Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).expect("url reference regex")
}

/// Rewrite every `url(...)` reference in the sheet to an absolute URL
/// resolved against `base_url`. All other declaration text is untouched.
///
/// Returns the input unchanged when it does not parse.
#[must_use]
pub fn rewrite_urls(css: &str, base_url: &str) -> String {
    let sheet = match parse_stylesheet(css) {
        Ok(sheet) => sheet,
        Err(error) => {
            debug!("url rewrite skipped: {error}");
            return css.to_string();
        }
    };
    let pattern = url_regex();
    let rewritten = Stylesheet {
        items: sheet
            .items
            .into_iter()
            .map(|item| rewrite_item_urls(item, base_url, &pattern))
            .collect(),
    };
    rewritten.to_css()
}

fn rewrite_item_urls(item: Item, base_url: &str, pattern: &Regex) -> Item {
    match item {
        Item::Style(rule) => Item::Style(StyleRule {
            selectors: rule.selectors,
            declarations: rule
                .declarations
                .into_iter()
                .map(|mut declaration| {
                    declaration.value = rewrite_value_urls(&declaration.value, base_url, pattern);
                    declaration
                })
                .collect(),
        }),
        Item::Media(media) => Item::Media(MediaRule {
            condition: media.condition,
            items: media
                .items
                .into_iter()
                .map(|nested| rewrite_item_urls(nested, base_url, pattern))
                .collect(),
        }),
        Item::FontFace(declarations) => Item::FontFace(
            declarations
                .into_iter()
                .map(|mut declaration| {
                    declaration.value = rewrite_value_urls(&declaration.value, base_url, pattern);
                    declaration
                })
                .collect(),
        ),
        other @ Item::Other(_) => other,
    }
}

fn rewrite_value_urls(value: &str, base_url: &str, pattern: &Regex) -> String {
    pattern
        .replace_all(value, |captures: &Captures<'_>| {
            let reference = captures[1].trim();
            format!("url({})", resolve_url(reference, Some(base_url)))
        })
        .into_owned()
}

/// Prepend `scope_class` as an ancestor combinator to every selector,
/// recursing into media blocks. Keyframe selectors and other at-rules are
/// left alone.
///
/// Returns the input unchanged when it does not parse.
#[must_use]
pub fn scope_selectors(css: &str, scope_class: &str) -> String {
    let sheet = match parse_stylesheet(css) {
        Ok(sheet) => sheet,
        Err(error) => {
            debug!("selector scoping skipped: {error}");
            return css.to_string();
        }
    };
    let scoped = Stylesheet {
        items: sheet
            .items
            .into_iter()
            .map(|item| scope_item(item, scope_class))
            .collect(),
    };
    scoped.to_css()
}

fn scope_item(item: Item, scope_class: &str) -> Item {
    match item {
        Item::Style(rule) => Item::Style(StyleRule {
            selectors: rule
                .selectors
                .into_iter()
                .map(|selector| format!("{scope_class} {selector}"))
                .collect(),
            declarations: rule.declarations,
        }),
        Item::Media(media) => Item::Media(MediaRule {
            condition: media.condition,
            items: media
                .items
                .into_iter()
                .map(|nested| scope_item(nested, scope_class))
                .collect(),
        }),
        other => other,
    }
}

/// Generate a synthetic scoping class: `__` plus six random alphanumerics.
#[must_use]
pub fn scope_class() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..6)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect();
    format!("__{suffix}")
}
