//! Owned CSS rule tree.
//!
//! [§ 2 Description of CSS's syntax](https://www.w3.org/TR/css-syntax-3/#css-description)
//!
//! The tree keeps raw text for the parts the pipeline never rewrites
//! (selectors, media conditions, declaration values, unknown at-rule bodies),
//! so stringifying a parsed sheet loses nothing the rewriters did not touch.
//! Transforms produce a new tree instead of mutating in place, which keeps
//! the return-original-on-parse-error fallback a clean boundary.

/// A parsed stylesheet: top-level items in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Style rules and at-rules in source order.
    pub items: Vec<Item>,
}

/// One top-level (or media-nested) stylesheet item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A style rule: selector list plus declaration block.
    Style(StyleRule),
    /// [CSS Conditional Rules § 7](https://www.w3.org/TR/css-conditional-3/#at-media)
    /// A `@media` block with nested items.
    Media(MediaRule),
    /// [CSS Fonts § 4.1](https://www.w3.org/TR/css-fonts-4/#font-face-rule)
    /// A `@font-face` declaration block. Carried separately from style rules
    /// because its declarations are rewritten but never scoped.
    FontFace(Vec<Declaration>),
    /// Any other at-rule, kept verbatim.
    Other(OtherAtRule),
}

/// A style rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw selectors, one entry per comma-separated selector.
    pub selectors: Vec<String>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

/// A `@media` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRule {
    /// Raw media condition text.
    pub condition: String,
    /// Nested items, possibly including further media blocks.
    pub items: Vec<Item>,
}

/// An at-rule the pipeline does not model (`@keyframes`, `@import`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherAtRule {
    /// Rule name without the `@`.
    pub name: String,
    /// Raw prelude text, possibly empty.
    pub prelude: String,
    /// Raw block interior, `None` for statement-style rules like `@import`.
    pub block: Option<String>,
}

/// A single declaration (`property: value [!important]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name with its source casing.
    pub name: String,
    /// Raw value text, without any trailing `!important`.
    pub value: String,
    /// Whether the declaration was marked `!important`.
    pub important: bool,
}

impl Stylesheet {
    /// Serialize the tree back to CSS text, two-space indented.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        write_items(&self.items, 0, &mut out);
        out.trim_end().to_string()
    }
}

fn write_items(items: &[Item], depth: usize, out: &mut String) {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        write_item(item, depth, out);
    }
}

fn write_item(item: &Item, depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    match item {
        Item::Style(rule) => {
            let head = rule
                .selectors
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(&format!(",\n{pad}"));
            out.push_str(&format!("{pad}{head} {{\n"));
            write_declarations(&rule.declarations, depth + 1, out);
            out.push_str(&format!("{pad}}}\n"));
        }
        Item::Media(media) => {
            out.push_str(&format!("{pad}@media {} {{\n", media.condition));
            write_items(&media.items, depth + 1, out);
            out.push_str(&format!("{pad}}}\n"));
        }
        Item::FontFace(declarations) => {
            out.push_str(&format!("{pad}@font-face {{\n"));
            write_declarations(declarations, depth + 1, out);
            out.push_str(&format!("{pad}}}\n"));
        }
        Item::Other(rule) => {
            out.push_str(&pad);
            out.push('@');
            out.push_str(&rule.name);
            if !rule.prelude.is_empty() {
                out.push(' ');
                out.push_str(&rule.prelude);
            }
            match &rule.block {
                Some(interior) => out.push_str(&format!(" {{{interior}}}\n")),
                None => out.push_str(";\n"),
            }
        }
    }
}

fn write_declarations(declarations: &[Declaration], depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    for declaration in declarations {
        let bang = if declaration.important {
            " !important"
        } else {
            ""
        };
        out.push_str(&format!(
            "{pad}{}: {}{bang};\n",
            declaration.name, declaration.value
        ));
    }
}
