//! Raw capture normalization.
//!
//! Captured `outerHTML` is messy: it carries `<script>` elements that must
//! never reach the preview, relative image references that break outside the
//! origin page, and whatever formatting the page shipped with. Normalization
//! turns it into a stable, self-contained form before any slicing happens.

use log::debug;

use crate::fragment::{parse_fragment, serialize, serialize_pretty};
use crate::tree::{NodeId, Tree};
use pirate_common::resolve_url;

/// Indent used for normalized markup.
const INDENT: usize = 2;

/// [§ 4.12.1 The script element](https://html.spec.whatwg.org/multipage/scripting.html#the-script-element)
///
/// Remove every `<script>` element from a fragment.
#[must_use]
pub fn strip_scripts(html: &str) -> String {
    let mut tree = parse_fragment(html);
    remove_scripts(&mut tree);
    serialize(&tree, NodeId::ROOT)
}

/// Rewrite relative `<img src>` references to absolute URLs against the page
/// the fragment was captured from.
#[must_use]
pub fn rebase_image_sources(html: &str, base_url: &str) -> String {
    let mut tree = parse_fragment(html);
    rebase_images(&mut tree, base_url);
    serialize(&tree, NodeId::ROOT)
}

/// Normalize a raw capture: strip scripts, rebase image sources when the page
/// URL is known, and pretty-print with a two-space indent.
#[must_use]
pub fn normalize_html(html: &str, base_url: Option<&str>) -> String {
    debug!("raw html length: {}", html.len());
    let mut tree = parse_fragment(html);
    remove_scripts(&mut tree);
    if let Some(base) = base_url {
        rebase_images(&mut tree, base);
    }
    serialize_pretty(&tree, NodeId::ROOT, INDENT)
}

fn remove_scripts(tree: &mut Tree) {
    for id in tree.elements_named("script") {
        if let Some(parent) = tree.parent(id) {
            tree.remove_child(parent, id);
        }
    }
}

fn rebase_images(tree: &mut Tree, base_url: &str) {
    for id in tree.elements_named("img") {
        let Some(data) = tree.as_element_mut(id) else {
            continue;
        };
        if let Some(src) = data.attr("src") {
            let resolved = resolve_url(src, Some(base_url));
            data.set_attr("src", resolved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_are_removed() {
        let html = "<div><script>alert(1)</script><p>hi</p></div>";
        assert_eq!(strip_scripts(html), "<div><p>hi</p></div>");
    }

    #[test]
    fn image_sources_are_rebased() {
        let html = "<div><img src=\"a.png\"></div>";
        assert_eq!(
            rebase_image_sources(html, "https://x.com/dir/"),
            "<div><img src=\"https://x.com/dir/a.png\"></div>"
        );
    }

    #[test]
    fn absolute_image_sources_are_untouched() {
        let html = "<div><img src=\"https://cdn.com/a.png\"></div>";
        assert_eq!(rebase_image_sources(html, "https://x.com/"), html);
    }

    #[test]
    fn normalize_strips_scripts_and_indents() {
        let html = "<div><script src=\"x.js\"></script><p>hi</p></div>";
        let out = normalize_html(html, None);
        assert_eq!(out, "<div>\n  <p>hi</p>\n</div>");
    }

    #[test]
    fn normalize_keeps_body_roots() {
        let out = normalize_html("<body><div><p>x</p></div></body>", None);
        assert!(out.starts_with("<body>"));
        assert!(out.ends_with("</body>"));
    }
}
