//! `:nth-child` family matching: formulas, sibling indexing and the shared
//! formula cache.

mod cache;
mod matcher;

pub use cache::{FormulaCache, FormulaEntry};
pub use matcher::{
    Formula, MatchingChildren, NthChildMatcher, index_of, matching_children, normalize,
};
