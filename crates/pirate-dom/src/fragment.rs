//! Fragment parsing and serialization.
//!
//! Parsing is delegated to `scraper`; the parsed nodes are copied into an
//! owned [`Tree`] so the rest of the crate never touches parser internals.
//!
//! # The `<body>` root workaround
//!
//! [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
//!
//! Fragment parsers treat a literal `<body>` root specially and merge it into
//! the implicit host element, losing the node. Since a captured ancestor chain
//! always starts at `<body>`, that tag is renamed to a neutral placeholder
//! before parsing and renamed back after serializing.

use crate::tree::{ElementData, NodeId, NodeKind, Tree};

/// Neutral stand-in tag for a fragment rooted at `<body>`.
const BODY_PLACEHOLDER: &str = "bodytag";

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
];

/// [§ 13.1.2.6 Restrictions on the contents of raw text elements](https://html.spec.whatwg.org/multipage/syntax.html#cdata-rcdata-restrictions)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "noscript"];

/// Swap a leading `<body>` root for the placeholder tag.
fn mask_body_root(html: &str) -> String {
    if html.starts_with("<body") {
        html.replacen("<body", &format!("<{BODY_PLACEHOLDER}"), 1)
            .replacen("</body", &format!("</{BODY_PLACEHOLDER}"), 1)
    } else {
        html.to_string()
    }
}

/// Swap a leading placeholder root back to `<body>`.
fn unmask_body_root(html: &str) -> String {
    if html.starts_with(&format!("<{BODY_PLACEHOLDER}")) {
        html.replacen(&format!("<{BODY_PLACEHOLDER}"), "<body", 1)
            .replacen(&format!("</{BODY_PLACEHOLDER}"), "</body", 1)
    } else {
        html.to_string()
    }
}

/// Parse an HTML fragment into an owned tree.
///
/// The fragment's top-level nodes become children of [`NodeId::ROOT`]. A
/// `<body>` root survives as the placeholder element; [`serialize`] and
/// [`serialize_pretty`] restore the original tag.
#[must_use]
pub fn parse_fragment(html: &str) -> Tree {
    let masked = mask_body_root(html);
    let parsed = scraper::Html::parse_fragment(&masked);
    let mut tree = Tree::new();
    // scraper wraps fragment contents in a synthetic <html> element.
    let wrapper = parsed.root_element();
    for child in wrapper.children() {
        copy_node(&mut tree, NodeId::ROOT, child);
    }
    tree
}

/// Copy one parser node (and its subtree) into the arena.
fn copy_node(
    tree: &mut Tree,
    parent: NodeId,
    node: ego_tree::NodeRef<'_, scraper::Node>,
) {
    let id = match node.value() {
        scraper::Node::Element(element) => {
            let attrs = element
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            tree.alloc(NodeKind::Element(ElementData {
                tag_name: element.name().to_string(),
                attrs,
            }))
        }
        scraper::Node::Text(text) => tree.alloc(NodeKind::Text(text.text.to_string())),
        scraper::Node::Comment(comment) => {
            tree.alloc(NodeKind::Comment(comment.comment.to_string()))
        }
        _ => return,
    };
    tree.append_child(parent, id);
    for child in node.children() {
        copy_node(tree, id, child);
    }
}

/// [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
///
/// Serialize a node (or the whole fragment via [`NodeId::ROOT`]) to compact
/// HTML, restoring a masked `<body>` root tag.
#[must_use]
pub fn serialize(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, false, &mut out);
    unmask_body_root(&out)
}

/// Serialize a node to indented HTML, two spaces per level by default in
/// callers. Whitespace-only text nodes are dropped and text is trimmed, which
/// keeps the output stable across captures of the same markup.
#[must_use]
pub fn serialize_pretty(tree: &Tree, id: NodeId, indent: usize) -> String {
    let mut out = String::new();
    write_node_pretty(tree, id, 0, indent, &mut out);
    let trimmed = out.trim_end().to_string();
    unmask_body_root(&trimmed)
}

/// "Escaping a string" per the serialization algorithm: `&`, `<` and `>` in
/// text; `&` and `"` in attribute values.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

fn write_open_tag(data: &ElementData, out: &mut String) {
    out.push('<');
    out.push_str(&data.tag_name);
    for (name, value) in &data.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');
}

fn write_node(tree: &Tree, id: NodeId, raw_text: bool, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.kind {
        NodeKind::Fragment => {
            for &child in tree.children(id) {
                write_node(tree, child, false, out);
            }
        }
        NodeKind::Element(data) => {
            write_open_tag(data, out);
            if is_void(data.tag_name.as_str()) {
                return;
            }
            let raw = is_raw_text(data.tag_name.as_str());
            for &child in tree.children(id) {
                write_node(tree, child, raw, out);
            }
            out.push_str("</");
            out.push_str(&data.tag_name);
            out.push('>');
        }
        NodeKind::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeKind::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
    }
}

/// True when every child is a text or comment node, so the element can sit on
/// one line.
fn has_only_inline_content(tree: &Tree, id: NodeId) -> bool {
    tree.children(id)
        .iter()
        .all(|&child| tree.as_element(child).is_none())
}

fn write_node_pretty(tree: &Tree, id: NodeId, depth: usize, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    let pad = " ".repeat(depth * indent);
    match &node.kind {
        NodeKind::Fragment => {
            for &child in tree.children(id) {
                write_node_pretty(tree, child, depth, indent, out);
            }
        }
        NodeKind::Element(data) => {
            out.push_str(&pad);
            if is_void(data.tag_name.as_str()) {
                write_open_tag(data, out);
                out.push('\n');
                return;
            }
            if has_only_inline_content(tree, id) {
                // Leaf-ish element: keep tag and text on a single line.
                write_node(tree, id, false, out);
                out.push('\n');
                return;
            }
            write_open_tag(data, out);
            out.push('\n');
            for &child in tree.children(id) {
                write_node_pretty(tree, child, depth + 1, indent, out);
            }
            out.push_str(&pad);
            out.push_str("</");
            out.push_str(&data.tag_name);
            out.push_str(">\n");
        }
        NodeKind::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push_str(&pad);
                out.push_str(&escape_text(trimmed));
                out.push('\n');
            }
        }
        NodeKind::Comment(comment) => {
            out.push_str(&pad);
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_simple_fragment() {
        let tree = parse_fragment("<div class=\"a\"><span>hi</span></div>");
        assert_eq!(
            serialize(&tree, NodeId::ROOT),
            "<div class=\"a\"><span>hi</span></div>"
        );
    }

    #[test]
    fn body_root_survives_parsing() {
        let tree = parse_fragment("<body class=\"page\"><div>x</div></body>");
        let out = serialize(&tree, NodeId::ROOT);
        assert_eq!(out, "<body class=\"page\"><div>x</div></body>");
    }

    #[test]
    fn void_elements_have_no_close_tag() {
        let tree = parse_fragment("<div><img src=\"a.png\"><br></div>");
        assert_eq!(
            serialize(&tree, NodeId::ROOT),
            "<div><img src=\"a.png\"><br></div>"
        );
    }

    #[test]
    fn text_is_escaped_outside_raw_elements() {
        let tree = parse_fragment("<p>a &amp; b</p>");
        assert_eq!(serialize(&tree, NodeId::ROOT), "<p>a &amp; b</p>");
    }

    #[test]
    fn style_content_is_not_escaped() {
        let tree = parse_fragment("<style>a > b { color: red; }</style>");
        let out = serialize(&tree, NodeId::ROOT);
        assert!(out.contains("a > b"));
    }

    #[test]
    fn pretty_form_indents_nested_elements() {
        let tree = parse_fragment("<div><p>hi</p></div>");
        let out = serialize_pretty(&tree, NodeId::ROOT, 2);
        assert_eq!(out, "<div>\n  <p>hi</p>\n</div>");
    }
}
