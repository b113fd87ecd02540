//! Tree depth measurement and level-window slicing.
//!
//! Levels are counted over element nodes only: a leaf element is depth 1, an
//! element is one deeper than its deepest element child. Text nodes do not
//! add levels but are removed together with their parent's other children
//! when a node's depth budget runs out.

use crate::fragment::{parse_fragment, serialize};
use crate::tree::{NodeId, Tree};

/// Measure the element-tree depth of an HTML fragment.
///
/// A fragment with no elements measures 0. A lone `<div></div>` measures 1;
/// `<div><span>x</span></div>` measures 2.
#[must_use]
pub fn measure_depth(html: &str) -> usize {
    let tree = parse_fragment(html);
    tree.element_children(NodeId::ROOT)
        .into_iter()
        .map(|id| depth_of(&tree, id))
        .max()
        .unwrap_or(0)
}

fn depth_of(tree: &Tree, id: NodeId) -> usize {
    let children = tree.element_children(id);
    1 + children
        .into_iter()
        .map(|child| depth_of(tree, child))
        .max()
        .unwrap_or(0)
}

/// Slice a fragment to a level window.
///
/// Viewing the fragment as a tree of depth `H`:
/// - `slice_levels(html, 0, H)` returns the fragment unchanged,
/// - `slice_levels(html, 0, H - 1)` removes the deepest leaves,
/// - `slice_levels(html, 1, H)` returns the first child's subtree.
///
/// Descending past the deepest first-child chain degrades to an empty string
/// rather than an error; callers treat `level_start` at the maximum depth as
/// "no content" and skip the slice.
#[must_use]
pub fn slice_levels(html: &str, level_start: usize, level_end: usize) -> String {
    let mut tree = parse_fragment(html);

    let mut cursor = tree.first_element_child(NodeId::ROOT);
    for _ in 0..level_start {
        cursor = cursor.and_then(|id| tree.first_element_child(id));
    }
    let Some(root) = cursor else {
        return String::new();
    };

    let budget = level_end.saturating_sub(level_start);
    prune_deeper_than(&mut tree, root, budget);
    serialize(&tree, root)
}

/// Empty out every node whose remaining depth budget reaches zero.
fn prune_deeper_than(tree: &mut Tree, id: NodeId, budget: usize) {
    if budget == 0 {
        tree.clear_children(id);
        return;
    }
    for child in tree.element_children(id) {
        prune_deeper_than(tree, child, budget - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_element_is_depth_one() {
        assert_eq!(measure_depth("<div></div>"), 1);
    }

    #[test]
    fn nested_element_adds_a_level() {
        assert_eq!(measure_depth("<div><span>x</span></div>"), 2);
    }

    #[test]
    fn text_does_not_add_depth() {
        assert_eq!(measure_depth("<div>just text</div>"), 1);
    }

    #[test]
    fn depth_takes_the_deepest_branch() {
        assert_eq!(
            measure_depth("<div><p>a</p><section><ul><li>x</li></ul></section></div>"),
            4
        );
    }

    #[test]
    fn body_root_is_counted() {
        assert_eq!(measure_depth("<body><div><p>x</p></div></body>"), 3);
    }

    #[test]
    fn full_window_is_identity() {
        let html = "<div><section><p>hi</p></section></div>";
        let depth = measure_depth(html);
        assert_eq!(slice_levels(html, 0, depth), html);
    }

    #[test]
    fn shrinking_the_end_removes_leaves() {
        let html = "<div><section><p>hi</p></section></div>";
        assert_eq!(
            slice_levels(html, 0, 2),
            "<div><section></section></div>"
        );
    }

    #[test]
    fn budget_zero_keeps_the_tag_but_empties_it() {
        assert_eq!(slice_levels("<div><p>hi</p></div>", 0, 0), "<div></div>");
    }

    #[test]
    fn raising_the_start_descends_into_the_first_child() {
        let html = "<div><section><p>hi</p></section><aside>no</aside></div>";
        assert_eq!(slice_levels(html, 1, 3), "<section><p>hi</p></section>");
    }

    #[test]
    fn descending_past_the_tree_returns_empty() {
        assert_eq!(slice_levels("<div><p>hi</p></div>", 5, 7), "");
    }

    #[test]
    fn body_root_window_round_trips() {
        let html = "<body><div><p>x</p></div></body>";
        let depth = measure_depth(html);
        assert_eq!(slice_levels(html, 0, depth), html);
        assert_eq!(slice_levels(html, 1, depth), "<div><p>x</p></div>");
    }
}
