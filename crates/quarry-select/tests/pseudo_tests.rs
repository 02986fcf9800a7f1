//! Integration tests for the pseudo-class registry and pseudo-class semantics.

use quarry_dom::{DomTree, NodeId};
use quarry_select::pseudo::{Contains, OnlyOfType};
use quarry_select::{EngineConfig, Error, PseudoSelector, SelectorEngine};

fn engine() -> SelectorEngine {
    SelectorEngine::new(EngineConfig::default())
}

/// A `<div>` whose element children have the given tags.
fn children(tags: &[&str]) -> (DomTree, NodeId, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let root = tree.root();
    let div = tree.append_element(root, "div");
    let kids = tags.iter().map(|tag| tree.append_element(div, tag)).collect();
    (tree, div, kids)
}

#[test]
fn test_only_of_type() {
    let (tree, div, kids) = children(&["a", "b", "a", "c"]);
    let only: Vec<_> = OnlyOfType.child_matches(&tree, div).collect();
    assert_eq!(only, vec![kids[1], kids[3]]);

    let tested: Vec<_> = kids.iter().copied().filter(|&k| OnlyOfType.matches(&tree, k)).collect();
    assert_eq!(tested, only);
}

#[test]
fn test_not_first_child() -> anyhow::Result<()> {
    let (tree, div, kids) = children(&["li", "li", "li", "li"]);
    let not = engine().pseudo("not", Some(":first-child"))?;

    assert_eq!(not.filter(&tree, div, &kids), kids[1..].to_vec());
    assert_eq!(not.child_matches(&tree, div).collect::<Vec<_>>(), kids[1..].to_vec());
    assert!(!not.matches(&tree, kids[0]));
    assert!(not.matches(&tree, kids[3]));
    Ok(())
}

#[test]
fn test_not_sees_only_the_candidate_set() -> anyhow::Result<()> {
    let (tree, div, kids) = children(&["p", "span", "p"]);
    let not = engine().pseudo("not", Some("p"))?;

    // Only the candidates are filtered; other siblings never appear.
    assert_eq!(not.filter(&tree, div, &kids[..2]), vec![kids[1]]);
    assert_eq!(not.filter(&tree, div, &[]), Vec::<NodeId>::new());
    Ok(())
}

#[test]
fn test_contains_does_not_concatenate_text_nodes() -> anyhow::Result<()> {
    let mut tree = DomTree::new();
    let root = tree.root();
    let div = tree.append_element(root, "div");
    let span = tree.append_element(div, "span");
    let _ = tree.append_text(span, "fo");
    let _ = tree.append_text(div, "o");

    let engine = engine();
    assert!(!engine.pseudo("contains", Some("\"foo\""))?.matches(&tree, div));
    assert!(engine.pseudo("contains", Some("fo"))?.matches(&tree, div));
    assert!(engine.pseudo("contains", Some("'o'"))?.matches(&tree, div));
    assert!(!engine.pseudo("contains", Some("FO"))?.matches(&tree, div));
    Ok(())
}

#[test]
fn test_contains_case_folding_from_config() -> anyhow::Result<()> {
    let mut tree = DomTree::new();
    let root = tree.root();
    let p = tree.append_element(root, "p");
    let _ = tree.append_text(p, "Quarry");

    let config: EngineConfig = serde_json::from_str(r#"{ "case_sensitive_contains": false }"#)?;
    let engine = SelectorEngine::new(config);
    assert!(engine.pseudo("contains", Some("QUARRY"))?.matches(&tree, p));
    assert_eq!(Contains::new("QUARRY", false).needle(), "quarry");
    Ok(())
}

#[test]
fn test_contains_enumerates_matching_children() -> anyhow::Result<()> {
    let mut tree = DomTree::new();
    let root = tree.root();
    let ul = tree.append_element(root, "ul");
    let apple = tree.append_element(ul, "li");
    let _ = tree.append_text(apple, "apple pie");
    let plum = tree.append_element(ul, "li");
    let _ = tree.append_text(plum, "plum");
    let nested = tree.append_element(ul, "li");
    let em = tree.append_element(nested, "em");
    let _ = tree.append_text(em, "crab apple");

    let contains = engine().pseudo("contains", Some("apple"))?;
    let found: Vec<_> = contains.child_matches(&tree, ul).collect();
    assert_eq!(found, vec![apple, nested]);
    Ok(())
}

#[test]
fn test_arity_is_checked_first() {
    let engine = engine();
    assert!(matches!(engine.pseudo("first-child", Some("2")), Err(Error::InvalidSelector(_))));
    assert!(matches!(engine.pseudo("nth-child", None), Err(Error::InvalidSelector(_))));
    assert!(matches!(engine.pseudo("not", None), Err(Error::InvalidSelector(_))));
    assert!(matches!(engine.pseudo("contains", None), Err(Error::InvalidSelector(_))));
    // A malformed argument is not scanned when the count is already wrong.
    assert!(matches!(engine.pseudo("empty", Some("[[[")), Err(Error::InvalidSelector(_))));
}

#[test]
fn test_unknown_pseudo_class() {
    assert!(matches!(engine().pseudo("hover", None), Err(Error::InvalidSelector(_))));
}

#[test]
fn test_nth_pseudo_classes() -> anyhow::Result<()> {
    let (tree, div, kids) = children(&["p", "span", "p", "span", "p"]);
    let engine = engine();

    let nth_last = engine.pseudo("nth-last-child", Some("2"))?;
    assert_eq!(nth_last.child_matches(&tree, div).collect::<Vec<_>>(), vec![kids[3]]);

    let nth_of_type = engine.pseudo("nth-of-type", Some("even"))?;
    assert_eq!(nth_of_type.child_matches(&tree, div).collect::<Vec<_>>(), vec![kids[2], kids[3]]);

    let nth_last_of_type = engine.pseudo("NTH-LAST-OF-TYPE", Some("n+2"))?;
    assert!(nth_last_of_type.matches(&tree, kids[0]));
    assert!(nth_last_of_type.matches(&tree, kids[1]));
    assert!(!nth_last_of_type.matches(&tree, kids[4]));
    Ok(())
}

#[test]
fn test_empty_and_root() -> anyhow::Result<()> {
    let mut tree = DomTree::new();
    let root = tree.root();
    let html = tree.append_element(root, "html");
    let blank = tree.append_element(html, "div");
    let _ = tree.append_text(blank, "  \n ");
    let comment = tree.create_comment("note");
    tree.append_child(blank, comment);
    let full = tree.append_element(html, "div");
    let _ = tree.append_text(full, "x");
    let parent = tree.append_element(html, "div");
    let _ = tree.append_element(parent, "br");

    let engine = engine();
    let empty = engine.pseudo("empty", None)?;
    assert!(empty.matches(&tree, blank));
    assert!(!empty.matches(&tree, full));
    assert!(!empty.matches(&tree, parent));

    let root_pseudo = engine.pseudo("root", None)?;
    assert!(root_pseudo.matches(&tree, html));
    assert!(!root_pseudo.matches(&tree, blank));
    assert!(!root_pseudo.matches(&tree, root));
    Ok(())
}
