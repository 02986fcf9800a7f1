//! Compiled selectors and the filter-stage matcher that runs them.
//!
//! This module implements the selector grammar and matching per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/), restricted to
//! what the pseudo-classes in [`crate::pseudo`] need.
//!
//! A selector runs over a candidate set, not over a whole document: each
//! complex selector first narrows the candidates with the subject's plain
//! simple selectors, then hands the survivors to each pseudo-class in turn
//! (so `:not()` sees exactly the current stage), and finally checks the
//! combinator chain for each survivor.

mod parser;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use quarry_dom::{DomTree, ElementData, NodeId};

use crate::error::Result;
use crate::pseudo::PseudoSelector;

pub(crate) use parser::{parse_selector_list, parse_text_argument};
pub use parser::parse_attribute;

/// A compiled selector that filters candidate nodes.
pub trait SelectorProgram: fmt::Debug + Send + Sync {
    /// The members of `candidates` the selector accepts, in candidate
    /// order. `root` is the scope the candidates were drawn from.
    fn apply(&self, tree: &DomTree, root: NodeId, candidates: &[NodeId]) -> Vec<NodeId>;
}

/// Turns selector text into a [`SelectorProgram`].
pub trait SelectorCompiler {
    /// Compile `text`.
    ///
    /// # Errors
    ///
    /// Returns a scanner error or [`Error::InvalidSelector`](crate::Error::InvalidSelector)
    /// for text that is not a supported selector.
    fn compile(&self, text: &str) -> Result<Arc<dyn SelectorProgram>>;
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    ///
    /// Stored lowercased. Examples: `div`, `p`, `span`
    Type(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    ///
    /// Examples: `.highlight`, `.nav-item`
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    ///
    /// Examples: `#main`, `#nav-bar`
    Id(String),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    /// "The universal selector is a single asterisk (*) and represents the
    /// qualified name of any element type."
    Universal,

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// Examples: `[href]`, `[type=text]`, `[data-x="a]b"]`
    Attribute(AttributeSelector),

    /// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
    ///
    /// Examples: `:first-child`, `:nth-of-type(2n+1)`, `:not(.x)`
    Pseudo(Arc<dyn PseudoSelector>),
}

/// Attribute selectors per [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelector {
    /// `[attr]`: the attribute is present.
    Exists(String),
    /// `[attr=value]`: exactly `value`.
    Equals(String, String),
    /// `[attr~=value]`: one of its whitespace-separated words is `value`.
    Includes(String, String),
    /// `[attr|=value]`: `value`, or `value` followed by `-`.
    DashMatch(String, String),
    /// `[attr^=value]`: starts with `value`.
    PrefixMatch(String, String),
    /// `[attr$=value]`: ends with `value`.
    SuffixMatch(String, String),
    /// `[attr*=value]`: contains `value`.
    SubstringMatch(String, String),
}

impl AttributeSelector {
    /// Whether `element` satisfies this attribute condition.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        let value = |name: &str| element.attrs.get(name).map(String::as_str);
        match self {
            Self::Exists(name) => element.attrs.contains_key(name),
            Self::Equals(name, val) => value(name) == Some(val.as_str()),
            Self::Includes(name, val) => {
                value(name).is_some_and(|v| v.split_ascii_whitespace().any(|w| w == val))
            }
            Self::DashMatch(name, val) => value(name).is_some_and(|v| {
                v.strip_prefix(val.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
            }),
            // Empty values never match the substring forms.
            Self::PrefixMatch(name, val) => {
                !val.is_empty() && value(name).is_some_and(|v| v.starts_with(val.as_str()))
            }
            Self::SuffixMatch(name, val) => {
                !val.is_empty() && value(name).is_some_and(|v| v.ends_with(val.as_str()))
            }
            Self::SubstringMatch(name, val) => {
                !val.is_empty() && value(name).is_some_and(|v| v.contains(val.as_str()))
            }
        }
    }
}

impl SimpleSelector {
    /// Check if this simple selector matches `node`, whose element data is
    /// `element`.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId, element: &ElementData) -> bool {
        match self {
            Self::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            Self::Class(class_name) => element.classes().any(|c| c == class_name),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Universal => true,
            Self::Attribute(attribute) => attribute.matches(element),
            Self::Pseudo(pseudo) => pseudo.matches(tree, node),
        }
    }

    const fn is_pseudo(&self) -> bool {
        matches!(self, Self::Pseudo(_))
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone)]
pub struct CompoundSelector {
    /// The list of simple selectors that make up this compound selector.
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// Whether `node` is an element satisfying every simple selector.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(element) = tree.as_element(node) else {
            return false;
        };
        self.simple_selectors
            .iter()
            .all(|simple| simple.matches(tree, node, element))
    }

    /// Run this compound over a candidate set: plain conditions first, then
    /// each pseudo-class as its own filter stage.
    fn filter(&self, tree: &DomTree, root: NodeId, candidates: &[NodeId]) -> Vec<NodeId> {
        let mut stage: Vec<NodeId> = candidates
            .iter()
            .copied()
            .filter(|&node| {
                tree.as_element(node).is_some_and(|element| {
                    self.simple_selectors
                        .iter()
                        .filter(|simple| !simple.is_pseudo())
                        .all(|simple| simple.matches(tree, node, element))
                })
            })
            .collect();

        for simple in &self.simple_selectors {
            if let SimpleSelector::Pseudo(pseudo) = simple {
                stage = pseudo.filter(tree, root, &stage);
            }
        }
        stage
    }

    fn specificity(&self) -> Specificity {
        let mut spec = Specificity::default();
        for simple in &self.simple_selectors {
            match simple {
                // [§ 17](https://www.w3.org/TR/selectors-4/#specificity-rules)
                // "count the number of ID selectors in the selector (= A)"
                SimpleSelector::Id(_) => spec.0 += 1,
                // "count the number of class selectors, attributes selectors,
                // and pseudo-classes in the selector (= B)"
                SimpleSelector::Class(_)
                | SimpleSelector::Attribute(_)
                | SimpleSelector::Pseudo(_) => {
                    spec.1 += 1;
                }
                // "count the number of type selectors and pseudo-elements
                // in the selector (= C)"
                SimpleSelector::Type(_) => spec.2 += 1,
                // "ignore the universal selector"
                SimpleSelector::Universal => {}
            }
        }
        spec
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// `A B`: B is an arbitrary descendant of A.
    Descendant,

    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// `A > B`: B is a direct child of A.
    Child,

    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// `A + B`: B immediately follows A among element siblings.
    NextSibling,

    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// `A ~ B`: B follows A, not necessarily immediately.
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// Example: `div.container > ul.nav li a.active`
/// This would be parsed as:
/// ```text
/// [div.container] --(Child)--> [ul.nav] --(Descendant)--> [li] --(Descendant)--> [a.active]
/// ```
#[derive(Debug, Clone)]
pub struct ComplexSelector {
    /// The rightmost compound selector (the subject of the selector).
    pub subject: CompoundSelector,

    /// Chain of (combinator, `compound_selector`) pairs going left from the subject.
    /// Empty if this is a simple compound selector with no combinators.
    ///
    /// For `A > B C`, this would be:
    /// - subject: C
    /// - combinators: [(Descendant, B), (Child, A)]
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
    ///
    /// Sum of the specificities of every compound in the chain.
    #[must_use]
    pub fn calculate_specificity(&self) -> Specificity {
        let mut spec = self.subject.specificity();
        for (_, compound) in &self.combinators {
            let compound_spec = compound.specificity();
            spec.0 += compound_spec.0;
            spec.1 += compound_spec.1;
            spec.2 += compound_spec.2;
        }
        spec
    }

    /// Whether the combinator chain from `depth` onward holds for `node`,
    /// which already matched the compound to its right.
    ///
    /// Every candidate relative is tried, so `a b c` matches even when the
    /// nearest `b` ancestor has no `a` above it but a farther one does.
    fn matches_chain(&self, tree: &DomTree, node: NodeId, depth: usize) -> bool {
        let Some((combinator, compound)) = self.combinators.get(depth) else {
            return true;
        };
        let accept = |relative: NodeId| {
            compound.matches(tree, relative) && self.matches_chain(tree, relative, depth + 1)
        };
        match combinator {
            Combinator::Descendant => tree.ancestors(node).any(accept),
            Combinator::Child => tree.parent(node).is_some_and(accept),
            Combinator::NextSibling => previous_element_sibling(tree, node).is_some_and(accept),
            Combinator::SubsequentSibling => tree
                .preceding_siblings(node)
                .filter(|&sibling| tree.is_element(sibling))
                .any(accept),
        }
    }
}

/// Find the immediately preceding element sibling (skipping text/comment nodes).
fn previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node)
        .find(|&sibling| tree.is_element(sibling))
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
///
/// Specificities are compared by comparing the three components in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Create a new specificity with (A, B, C) components.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self(a, b, c)
    }
}

/// One complex selector of a group, with its specificity.
#[derive(Debug, Clone)]
pub struct ParsedSelector {
    /// The complex selector (compound selectors with combinators).
    pub complex: ComplexSelector,
    /// The specificity of this selector.
    pub specificity: Specificity,
}

impl ParsedSelector {
    /// Wrap `complex`, computing its specificity.
    #[must_use]
    pub fn new(complex: ComplexSelector) -> Self {
        let specificity = complex.calculate_specificity();
        Self {
            complex,
            specificity,
        }
    }

    /// Check if this is a simple selector (no combinators).
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.complex.combinators.is_empty()
    }

    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Point test of one element, with full tree context.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node: NodeId) -> bool {
        self.complex.subject.matches(tree, node) && self.complex.matches_chain(tree, node, 0)
    }

    fn filter(&self, tree: &DomTree, root: NodeId, candidates: &[NodeId]) -> Vec<NodeId> {
        let mut stage = self.complex.subject.filter(tree, root, candidates);
        stage.retain(|&node| self.complex.matches_chain(tree, node, 0));
        stage
    }
}

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
///
/// A comma-separated group of selectors; a node matches if any member does.
#[derive(Debug, Clone)]
pub struct SelectorList {
    selectors: Vec<ParsedSelector>,
}

impl SelectorList {
    /// A group of one or more selectors.
    #[must_use]
    pub const fn new(selectors: Vec<ParsedSelector>) -> Self {
        Self { selectors }
    }

    /// The selectors of the group, in source order.
    #[must_use]
    pub fn selectors(&self) -> &[ParsedSelector] {
        &self.selectors
    }

    /// Whether any selector of the group matches `node`.
    #[must_use]
    pub fn matches_in_tree(&self, tree: &DomTree, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches_in_tree(tree, node))
    }
}

impl SelectorProgram for SelectorList {
    fn apply(&self, tree: &DomTree, root: NodeId, candidates: &[NodeId]) -> Vec<NodeId> {
        if let [only] = self.selectors.as_slice() {
            return only.filter(tree, root, candidates);
        }
        let matched: HashSet<NodeId> = self
            .selectors
            .iter()
            .flat_map(|selector| selector.filter(tree, root, candidates))
            .collect();
        candidates
            .iter()
            .copied()
            .filter(|node| matched.contains(node))
            .collect()
    }
}
