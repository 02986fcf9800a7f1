use quarry_dom::{DomTree, NodeId};

use super::PseudoSelector;
use crate::nth::{Formula, index_of, matching_children};

/// [§ 14.4 Child-indexed Pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
///
/// `:nth-child`, `:nth-last-child`, `:nth-of-type` and `:nth-last-of-type`
/// over one compiled [`Formula`].
#[derive(Debug, Clone)]
pub struct NthPseudo {
    formula: Formula,
    of_type: bool,
    from_last: bool,
}

impl NthPseudo {
    /// A pseudo-class selecting positions produced by `formula`, counted
    /// among same-tag siblings when `of_type` and from the last sibling
    /// when `from_last`.
    #[must_use]
    pub const fn new(formula: Formula, of_type: bool, from_last: bool) -> Self {
        Self {
            formula,
            of_type,
            from_last,
        }
    }
}

impl PseudoSelector for NthPseudo {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        index_of(tree, node, self.of_type, self.from_last)
            .is_some_and(|i| self.formula.index_matches(i))
    }

    fn child_matches<'a>(
        &'a self,
        tree: &'a DomTree,
        container: NodeId,
    ) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        Box::new(matching_children(
            tree,
            container,
            self.formula.clone(),
            self.of_type,
            self.from_last,
        ))
    }
}
