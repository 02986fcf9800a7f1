use std::collections::HashSet;
use std::sync::Arc;

use quarry_dom::{DomTree, NodeId};

use super::PseudoSelector;
use crate::selector::SelectorProgram;

/// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
///
/// Removes from a filter stage the candidates its inner selector accepts
/// when run over that same stage. The inner selector never sees nodes
/// outside the candidate set.
#[derive(Debug, Clone)]
pub struct Not {
    inner: Arc<dyn SelectorProgram>,
}

impl Not {
    /// Negate `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn SelectorProgram>) -> Self {
        Self { inner }
    }
}

impl PseudoSelector for Not {
    /// The single-candidate case of [`Not::filter`], scoped to the
    /// document.
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.is_element(node) && self.inner.apply(tree, tree.root(), &[node]).is_empty()
    }

    fn child_matches<'a>(
        &'a self,
        tree: &'a DomTree,
        container: NodeId,
    ) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        let children: Vec<NodeId> = tree.child_elements(container).collect();
        Box::new(self.filter(tree, container, &children).into_iter())
    }

    fn filter(&self, tree: &DomTree, root: NodeId, candidates: &[NodeId]) -> Vec<NodeId> {
        let excluded: HashSet<NodeId> = self
            .inner
            .apply(tree, root, candidates)
            .into_iter()
            .collect();
        candidates
            .iter()
            .copied()
            .filter(|node| !excluded.contains(node))
            .collect()
    }
}
