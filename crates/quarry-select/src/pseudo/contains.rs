use quarry_dom::{DomTree, NodeId, NodeKind};

use super::PseudoSelector;

/// `:contains(text)`: the node, or a text node below it, contains `text`.
///
/// Each text node is tested on its own. Text split across nodes, such as
/// `fo` and `o` in `<div><span>fo</span>o</div>`, does not match `foo`.
#[derive(Debug, Clone)]
pub struct Contains {
    needle: String,
    case_sensitive: bool,
}

impl Contains {
    /// Look for `needle`, optionally ignoring case.
    #[must_use]
    pub fn new(needle: impl Into<String>, case_sensitive: bool) -> Self {
        let needle = needle.into();
        Self {
            needle: if case_sensitive { needle } else { needle.to_lowercase() },
            case_sensitive,
        }
    }

    /// The text searched for, lowercased when matching ignores case.
    #[must_use]
    pub fn needle(&self) -> &str {
        &self.needle
    }

    fn text_matches(&self, text: &str) -> bool {
        if self.case_sensitive {
            text.contains(&self.needle)
        } else {
            text.to_lowercase().contains(&self.needle)
        }
    }

    fn subtree_matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match tree.node_kind(node) {
            Some(NodeKind::Text) => tree.as_text(node).is_some_and(|text| self.text_matches(text)),
            Some(NodeKind::Element | NodeKind::Document) => tree
                .children(node)
                .iter()
                .any(|&child| self.subtree_matches(tree, child)),
            Some(NodeKind::Comment) | None => false,
        }
    }
}

impl PseudoSelector for Contains {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.subtree_matches(tree, node)
    }
}
