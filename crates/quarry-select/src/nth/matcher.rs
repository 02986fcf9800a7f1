//! Position tests and enumeration for `:nth-child`, `:nth-last-child`,
//! `:nth-of-type` and `:nth-last-of-type`.
//!
//! [§ 14.4 Child-indexed Pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
//!
//! Positions count element siblings only (optionally only those sharing a
//! tag), 1-based, from the first or from the last sibling. Counting from
//! the end mirrors the position; the formula itself is never rewritten.

use std::collections::HashMap;
use std::sync::Arc;

use quarry_dom::{DomTree, NodeId, TagId};

use super::cache::{FormulaCache, FormulaEntry};
use crate::error::Result;

/// Rewrite the `even` and `odd` keywords into formulas. Other text is
/// trimmed and ASCII-lowercased.
#[must_use]
pub fn normalize(formula: &str) -> String {
    let formula = formula.trim().to_ascii_lowercase();
    match formula.as_str() {
        "even" => "2n".to_string(),
        "odd" => "2n+1".to_string(),
        _ => formula,
    }
}

/// A compiled nth formula.
#[derive(Debug, Clone)]
pub enum Formula {
    /// A bare integer: exactly that 1-based position. Never cached.
    Literal(i64),
    /// Anything else, shared through a [`FormulaCache`].
    Expression(Arc<FormulaEntry>),
}

impl Formula {
    /// Compile `text`, consulting `cache` for non-literal formulas.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`](crate::Error::InvalidSelector) for
    /// text that is neither an integer nor a formula in `n`.
    pub fn compile(text: &str, cache: &FormulaCache) -> Result<Self> {
        let normalized = normalize(text);
        if let Ok(position) = normalized.parse::<i64>() {
            return Ok(Self::Literal(position));
        }
        cache.get_or_compute(&normalized).map(Self::Expression)
    }

    /// Whether the 0-based sibling index `index` is selected.
    #[must_use]
    pub fn index_matches(&self, index: usize) -> bool {
        let Ok(index) = i64::try_from(index) else {
            return false;
        };
        match self {
            Self::Literal(position) => position.checked_sub(1) == Some(index),
            Self::Expression(entry) => entry.contains(index + 1),
        }
    }
}

/// Elements of `tag` only, or all elements.
fn same_type(tree: &DomTree, tag: Option<TagId>) -> impl Fn(&NodeId) -> bool + '_ {
    move |&id| tag.is_none_or(|tag| tree.tag_id(id) == Some(tag))
}

/// 0-based position of `node` among its parent's element children, or
/// `None` for a node without a parent or that is not an element.
///
/// With `only_of_same_type`, only siblings sharing the node's tag count.
/// With `from_last`, positions are counted from the last sibling.
#[must_use]
pub fn index_of(
    tree: &DomTree,
    node: NodeId,
    only_of_same_type: bool,
    from_last: bool,
) -> Option<usize> {
    let parent = tree.parent(node)?;
    let tag = tree.tag_id(node)?;
    let filter = same_type(tree, only_of_same_type.then_some(tag));

    let siblings = tree.child_elements(parent);
    if from_last {
        siblings.rev().filter(&filter).position(|id| id == node)
    } else {
        siblings.filter(&filter).position(|id| id == node)
    }
}

/// Lazy, document-order enumeration of the element children of a container
/// whose position a formula selects.
///
/// The children are walked once, with a running 1-based count per group
/// (all elements, or one group per tag). Counting from the last sibling
/// needs the group sizes, which are tallied on the first call to `next`.
pub struct MatchingChildren<'t> {
    tree: &'t DomTree,
    children: &'t [NodeId],
    cursor: usize,
    formula: Formula,
    of_type: bool,
    from_last: bool,
    seen: HashMap<Option<TagId>, usize>,
    totals: Option<HashMap<Option<TagId>, usize>>,
}

impl MatchingChildren<'_> {
    fn group(&self, id: NodeId) -> Option<TagId> {
        if self.of_type { self.tree.tag_id(id) } else { None }
    }

    fn tally(&self) -> HashMap<Option<TagId>, usize> {
        let mut totals = HashMap::new();
        for &id in self.children {
            if self.tree.is_element(id) {
                *totals.entry(self.group(id)).or_insert(0) += 1;
            }
        }
        totals
    }
}

impl Iterator for MatchingChildren<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.from_last && self.totals.is_none() {
            self.totals = Some(self.tally());
        }

        while let Some(&id) = self.children.get(self.cursor) {
            self.cursor += 1;
            if !self.tree.is_element(id) {
                continue;
            }

            let group = self.group(id);
            let seen = self.seen.entry(group).or_insert(0);
            *seen += 1;
            let mut position = *seen;
            if let Some(totals) = &self.totals {
                position = totals.get(&group).copied().unwrap_or(position) + 1 - position;
            }

            if self.formula.index_matches(position - 1) {
                return Some(id);
            }
        }
        None
    }
}

/// Enumerate the element children of `container` selected by `formula`.
#[must_use]
pub fn matching_children(
    tree: &DomTree,
    container: NodeId,
    formula: Formula,
    of_type: bool,
    from_last: bool,
) -> MatchingChildren<'_> {
    MatchingChildren {
        tree,
        children: tree.children(container),
        cursor: 0,
        formula,
        of_type,
        from_last,
        seen: HashMap::new(),
        totals: None,
    }
}

/// Front end for nth-child matching against one [`FormulaCache`].
#[derive(Debug, Clone, Copy)]
pub struct NthChildMatcher<'c> {
    cache: &'c FormulaCache,
}

impl<'c> NthChildMatcher<'c> {
    /// A matcher compiling formulas through `cache`.
    #[must_use]
    pub const fn new(cache: &'c FormulaCache) -> Self {
        Self { cache }
    }

    /// Compile `formula` through this matcher's cache.
    ///
    /// # Errors
    ///
    /// See [`Formula::compile`].
    pub fn compile(&self, formula: &str) -> Result<Formula> {
        Formula::compile(formula, self.cache)
    }

    /// Whether `node`'s position among its element siblings satisfies
    /// `formula`.
    ///
    /// # Errors
    ///
    /// See [`Formula::compile`].
    pub fn is_nth_child(
        &self,
        tree: &DomTree,
        node: NodeId,
        formula: &str,
        from_last: bool,
    ) -> Result<bool> {
        let formula = self.compile(formula)?;
        Ok(index_of(tree, node, false, from_last).is_some_and(|i| formula.index_matches(i)))
    }

    /// Whether `node`'s position among same-tag siblings satisfies
    /// `formula`.
    ///
    /// # Errors
    ///
    /// See [`Formula::compile`].
    pub fn is_nth_child_of_type(
        &self,
        tree: &DomTree,
        node: NodeId,
        formula: &str,
        from_last: bool,
    ) -> Result<bool> {
        let formula = self.compile(formula)?;
        Ok(index_of(tree, node, true, from_last).is_some_and(|i| formula.index_matches(i)))
    }

    /// The element children of `container` selected by `formula`, lazily
    /// and in document order.
    ///
    /// # Errors
    ///
    /// See [`Formula::compile`].
    pub fn nth_children<'t>(
        &self,
        tree: &'t DomTree,
        container: NodeId,
        formula: &str,
        from_last: bool,
    ) -> Result<MatchingChildren<'t>> {
        let formula = self.compile(formula)?;
        Ok(matching_children(tree, container, formula, false, from_last))
    }

    /// Like [`NthChildMatcher::nth_children`], counting positions among
    /// same-tag siblings.
    ///
    /// # Errors
    ///
    /// See [`Formula::compile`].
    pub fn nth_children_of_type<'t>(
        &self,
        tree: &'t DomTree,
        container: NodeId,
        formula: &str,
        from_last: bool,
    ) -> Result<MatchingChildren<'t>> {
        let formula = self.compile(formula)?;
        Ok(matching_children(tree, container, formula, true, from_last))
    }
}
