//! Sibling-position and tree-shape pseudo-classes.
//!
//! Only element siblings take part. "Of type" variants compare interned
//! tag ids, never tag name strings.

use std::collections::{HashMap, HashSet};
use std::iter;

use quarry_dom::{DomTree, NodeId, NodeType, TagId};

use super::PseudoSelector;

/// The element children of `node`'s parent, or `None` for a detached node
/// or one that is not an element.
fn element_siblings(
    tree: &DomTree,
    node: NodeId,
) -> Option<impl DoubleEndedIterator<Item = NodeId> + '_> {
    if !tree.is_element(node) {
        return None;
    }
    tree.parent(node).map(|parent| tree.child_elements(parent))
}

/// Whether `sibling` shares `tag`.
fn has_tag(tree: &DomTree, sibling: NodeId, tag: TagId) -> bool {
    tree.tag_id(sibling) == Some(tag)
}

/// [§ 14.3.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
/// "The :first-child pseudo-class represents an element that is first among its
/// inclusive siblings."
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChild;

impl PseudoSelector for FirstChild {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        element_siblings(tree, node).is_some_and(|mut siblings| siblings.next() == Some(node))
    }

    fn child_matches<'a>(
        &'a self,
        tree: &'a DomTree,
        container: NodeId,
    ) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        Box::new(tree.child_elements(container).take(1))
    }
}

/// [§ 14.3.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
/// "The :last-child pseudo-class represents an element that is last among its
/// inclusive siblings."
#[derive(Debug, Clone, Copy, Default)]
pub struct LastChild;

impl PseudoSelector for LastChild {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        element_siblings(tree, node).is_some_and(|mut siblings| siblings.next_back() == Some(node))
    }

    fn child_matches<'a>(
        &'a self,
        tree: &'a DomTree,
        container: NodeId,
    ) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        Box::new(tree.child_elements(container).rev().take(1))
    }
}

/// [§ 14.3.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
/// "The :only-child pseudo-class represents an element that has no siblings."
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlyChild;

impl PseudoSelector for OnlyChild {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        element_siblings(tree, node).is_some_and(|siblings| siblings.take(2).count() == 1)
    }

    fn child_matches<'a>(
        &'a self,
        tree: &'a DomTree,
        container: NodeId,
    ) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        let mut children = tree.child_elements(container);
        match (children.next(), children.next()) {
            (Some(only), None) => Box::new(iter::once(only)),
            _ => Box::new(iter::empty()),
        }
    }
}

/// [§ 14.4.5 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
/// "The :first-of-type pseudo-class represents an element that is the first sibling
/// of its type."
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOfType;

impl PseudoSelector for FirstOfType {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(tag) = tree.tag_id(node) else {
            return false;
        };
        element_siblings(tree, node)
            .is_some_and(|mut siblings| siblings.find(|&s| has_tag(tree, s, tag)) == Some(node))
    }

    fn child_matches<'a>(
        &'a self,
        tree: &'a DomTree,
        container: NodeId,
    ) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        let mut seen = HashSet::new();
        Box::new(
            tree.child_elements(container)
                .filter(move |&child| tree.tag_id(child).is_some_and(|tag| seen.insert(tag))),
        )
    }
}

/// [§ 14.4.6 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
/// "The :last-of-type pseudo-class represents an element that is the last sibling
/// of its type."
#[derive(Debug, Clone, Copy, Default)]
pub struct LastOfType;

impl PseudoSelector for LastOfType {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(tag) = tree.tag_id(node) else {
            return false;
        };
        element_siblings(tree, node)
            .is_some_and(|siblings| siblings.rev().find(|&s| has_tag(tree, s, tag)) == Some(node))
    }

    fn child_matches<'a>(
        &'a self,
        tree: &'a DomTree,
        container: NodeId,
    ) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        let mut last: HashMap<TagId, NodeId> = HashMap::new();
        for child in tree.child_elements(container) {
            if let Some(tag) = tree.tag_id(child) {
                let _ = last.insert(tag, child);
            }
        }
        Box::new(tree.child_elements(container).filter(move |&child| {
            tree.tag_id(child).and_then(|tag| last.get(&tag)) == Some(&child)
        }))
    }
}

/// [§ 14.4.7 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
/// "The :only-of-type pseudo-class represents an element that has no siblings
/// with the same expanded element name."
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlyOfType;

impl PseudoSelector for OnlyOfType {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(tag) = tree.tag_id(node) else {
            return false;
        };
        element_siblings(tree, node).is_some_and(|siblings| {
            siblings.filter(|&s| has_tag(tree, s, tag)).take(2).count() == 1
        })
    }

    /// Counts every tag once per container, then yields the children whose
    /// tag occurred exactly once.
    fn child_matches<'a>(
        &'a self,
        tree: &'a DomTree,
        container: NodeId,
    ) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        let mut counts: HashMap<TagId, usize> = HashMap::new();
        for tag in tree.child_elements(container).filter_map(|child| tree.tag_id(child)) {
            *counts.entry(tag).or_insert(0) += 1;
        }
        Box::new(tree.child_elements(container).filter(move |&child| {
            tree.tag_id(child).and_then(|tag| counts.get(&tag)) == Some(&1)
        }))
    }
}

/// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
///
/// An element with no element children and no text other than whitespace.
/// Comments are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl PseudoSelector for Empty {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.is_element(node)
            && tree
                .children(node)
                .iter()
                .all(|&child| match tree.get(child).map(|n| &n.node_type) {
                    Some(NodeType::Text(text)) => text.trim().is_empty(),
                    Some(NodeType::Comment(_)) => true,
                    _ => false,
                })
    }
}

/// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
/// "The :root pseudo-class represents an element that is the root of the document."
#[derive(Debug, Clone, Copy, Default)]
pub struct Root;

impl PseudoSelector for Root {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.document_element() == Some(node)
    }
}
