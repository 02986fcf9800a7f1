//! Tests for DOM tree construction, tag interning and traversal.

use quarry_dom::{DomTree, NodeId, NodeKind};

/// Helper: a `<div>` under the document with the given child tags.
fn div_with(tree: &mut DomTree, tags: &[&str]) -> (NodeId, Vec<NodeId>) {
    let parent = tree.append_element(NodeId::ROOT, "div");
    let children = tags
        .iter()
        .map(|tag| tree.append_element(parent, tag))
        .collect();
    (parent, children)
}

// ========== tag interning ==========

#[test]
fn test_intern_tag_is_stable_and_case_insensitive() {
    let mut tree = DomTree::new();
    let div = tree.intern_tag("div");
    let span = tree.intern_tag("span");

    assert_ne!(div, span);
    assert_eq!(tree.intern_tag("DIV"), div);
    assert_eq!(tree.lookup_tag("Span"), Some(span));
    assert_eq!(tree.lookup_tag("p"), None);
    assert_eq!(tree.tag_name_of(span), Some("span"));
}

#[test]
fn test_create_element_records_tag_id() {
    let mut tree = DomTree::new();
    let (_, children) = div_with(&mut tree, &["p", "P", "em"]);

    assert_eq!(tree.tag_id(children[0]), tree.tag_id(children[1]));
    assert_ne!(tree.tag_id(children[0]), tree.tag_id(children[2]));
    assert_eq!(tree.tag_name(children[1]), Some("p"));
}

// ========== append / insert / remove ==========

#[test]
fn test_append_child_links_siblings() {
    let mut tree = DomTree::new();
    let (parent, c) = div_with(&mut tree, &["a", "b", "c"]);

    assert_eq!(tree.children(parent), c.as_slice());
    assert_eq!(tree.prev_sibling(c[0]), None);
    assert_eq!(tree.next_sibling(c[0]), Some(c[1]));
    assert_eq!(tree.prev_sibling(c[2]), Some(c[1]));
    assert_eq!(tree.next_sibling(c[2]), None);
    assert_eq!(tree.parent(c[1]), Some(parent));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let (parent, c) = div_with(&mut tree, &["a", "c"]);
    let b = tree.create_element("b", [("id", "x")]);

    tree.insert_before(parent, b, c[1]);

    assert_eq!(tree.children(parent), &[c[0], b, c[1]]);
    assert_eq!(tree.next_sibling(c[0]), Some(b));
    assert_eq!(tree.prev_sibling(c[1]), Some(b));
    assert_eq!(tree.get_attribute(b, "id"), Some("x"));
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let (parent, c) = div_with(&mut tree, &["a", "b", "c"]);

    tree.remove_child(parent, c[1]);

    assert_eq!(tree.children(parent), &[c[0], c[2]]);
    assert_eq!(tree.next_sibling(c[0]), Some(c[2]));
    assert_eq!(tree.prev_sibling(c[2]), Some(c[0]));
    assert_eq!(tree.parent(c[1]), None);
}

#[test]
fn test_append_child_moves_attached_node() {
    let mut tree = DomTree::new();
    let (a, a_kids) = div_with(&mut tree, &["x", "p", "y"]);
    let (b, b_kids) = div_with(&mut tree, &["z"]);
    let p = a_kids[1];

    tree.append_child(b, p);

    assert_eq!(tree.children(a), &[a_kids[0], a_kids[2]]);
    assert_eq!(tree.children(b), &[b_kids[0], p]);
    assert_eq!(tree.parent(p), Some(b));
    assert_eq!(tree.next_sibling(a_kids[0]), Some(a_kids[2]));
    assert_eq!(tree.prev_sibling(a_kids[2]), Some(a_kids[0]));
    assert_eq!(tree.prev_sibling(p), Some(b_kids[0]));
    assert_eq!(tree.next_sibling(p), None);

    let paragraphs = tree
        .descendants(NodeId::ROOT)
        .filter(|&id| tree.tag_name(id) == Some("p"))
        .count();
    assert_eq!(paragraphs, 1);
}

#[test]
fn test_insert_before_moves_within_and_across_parents() {
    let mut tree = DomTree::new();
    let (a, c) = div_with(&mut tree, &["a", "b", "c"]);
    let (b, d) = div_with(&mut tree, &["d"]);

    // Within the same parent: move the last child to the front.
    tree.insert_before(a, c[2], c[0]);
    assert_eq!(tree.children(a), &[c[2], c[0], c[1]]);
    assert_eq!(tree.prev_sibling(c[2]), None);
    assert_eq!(tree.next_sibling(c[2]), Some(c[0]));
    assert_eq!(tree.next_sibling(c[1]), None);

    // Across parents.
    tree.insert_before(b, c[0], d[0]);
    assert_eq!(tree.children(a), &[c[2], c[1]]);
    assert_eq!(tree.children(b), &[c[0], d[0]]);
    assert_eq!(tree.next_sibling(c[2]), Some(c[1]));
    assert_eq!(tree.prev_sibling(d[0]), Some(c[0]));
    assert_eq!(tree.parent(c[0]), Some(b));

    // Before itself: unchanged.
    tree.insert_before(b, d[0], d[0]);
    assert_eq!(tree.children(b), &[c[0], d[0]]);
}

// ========== traversal ==========

#[test]
fn test_child_elements_skips_text_and_comments() {
    let mut tree = DomTree::new();
    let parent = tree.append_element(NodeId::ROOT, "ul");
    let _ = tree.append_text(parent, "\n  ");
    let first = tree.append_element(parent, "li");
    let comment = tree.create_comment("gap");
    tree.append_child(parent, comment);
    let second = tree.append_element(parent, "li");

    let elements: Vec<_> = tree.child_elements(parent).collect();
    assert_eq!(elements, vec![first, second]);
    assert_eq!(tree.children(parent).len(), 4);
    assert_eq!(tree.node_kind(comment), Some(NodeKind::Comment));
    assert_eq!(tree.child_elements(parent).next_back(), Some(second));
}

#[test]
fn test_descendants_in_document_order() {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html");
    let body = tree.append_element(html, "body");
    let p = tree.append_element(body, "p");
    let text = tree.append_text(p, "hi");
    let footer = tree.append_element(body, "footer");

    let order: Vec<_> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![html, body, p, text, footer]);
    assert_eq!(tree.document_element(), Some(html));
    assert!(tree.is_descendant_of(text, html));
    assert!(!tree.is_descendant_of(html, text));
}

#[test]
fn test_ancestors_and_preceding_siblings() {
    let mut tree = DomTree::new();
    let (parent, c) = div_with(&mut tree, &["a", "b", "c"]);

    let ancestors: Vec<_> = tree.ancestors(c[0]).collect();
    assert_eq!(ancestors, vec![parent, NodeId::ROOT]);

    let preceding: Vec<_> = tree.preceding_siblings(c[2]).collect();
    assert_eq!(preceding, vec![c[1], c[0]]);
}

#[test]
fn test_attribute_lookup() {
    let mut tree = DomTree::new();
    let a = tree.create_element("a", [("href", "/home"), ("class", "nav  active")]);
    tree.append_child(NodeId::ROOT, a);

    assert!(tree.has_attribute(a, "href"));
    assert!(!tree.has_attribute(a, "title"));
    assert_eq!(tree.get_attribute(a, "href"), Some("/home"));

    let element = tree.as_element(a).unwrap();
    let classes: Vec<_> = element.classes().collect();
    assert_eq!(classes, vec!["nav", "active"]);
    assert_eq!(element.id(), None);
}
