//! Pseudo-class predicates.
//!
//! [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
//!
//! Every pseudo-class answers the same three questions: does one node match
//! ([`PseudoSelector::matches`]), which children of a container match, in
//! document order ([`PseudoSelector::child_matches`]), and what survives of
//! a filter stage's candidate set ([`PseudoSelector::filter`]). The two
//! enumerating forms always agree with the point test, except that
//! `:not()` defines its point test in terms of its candidate set.

mod contains;
mod not;
mod nth;
mod structural;

use std::fmt;

use quarry_dom::{DomTree, NodeId};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub use contains::Contains;
pub use not::Not;
pub use nth::NthPseudo;
pub use structural::{
    Empty, FirstChild, FirstOfType, LastChild, LastOfType, OnlyChild, OnlyOfType, Root,
};

/// A structural or textual pseudo-class, ready to test nodes.
pub trait PseudoSelector: fmt::Debug + Send + Sync {
    /// Whether `node` matches.
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool;

    /// The element children of `container` that match, lazily and in
    /// document order. Partially consuming the iterator is always safe.
    fn child_matches<'a>(
        &'a self,
        tree: &'a DomTree,
        container: NodeId,
    ) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        Box::new(
            tree.child_elements(container)
                .filter(move |&child| self.matches(tree, child)),
        )
    }

    /// The members of `candidates` that survive this pseudo-class, in
    /// their original order. `root` is the scope the candidates were drawn
    /// from.
    fn filter(&self, tree: &DomTree, _root: NodeId, candidates: &[NodeId]) -> Vec<NodeId> {
        candidates
            .iter()
            .copied()
            .filter(|&node| self.matches(tree, node))
            .collect()
    }
}

/// Names of the supported pseudo-classes, as written after the `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PseudoClassKind {
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-of-type`
    OnlyOfType,
    /// `:nth-child(an+b)`
    NthChild,
    /// `:nth-last-child(an+b)`
    NthLastChild,
    /// `:nth-of-type(an+b)`
    NthOfType,
    /// `:nth-last-of-type(an+b)`
    NthLastOfType,
    /// `:not(selector)`
    Not,
    /// `:contains(text)`
    Contains,
    /// `:empty`
    Empty,
    /// `:root`
    Root,
}

impl PseudoClassKind {
    /// Number of arguments the pseudo-class takes: 0 or 1.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::NthChild
            | Self::NthLastChild
            | Self::NthOfType
            | Self::NthLastOfType
            | Self::Not
            | Self::Contains => 1,
            Self::FirstChild
            | Self::LastChild
            | Self::OnlyChild
            | Self::FirstOfType
            | Self::LastOfType
            | Self::OnlyOfType
            | Self::Empty
            | Self::Root => 0,
        }
    }
}
