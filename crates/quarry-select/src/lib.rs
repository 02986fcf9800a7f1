//! Selector matching core for the Quarry query engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Character classification**: one table lookup per character for
//!   every grammar decision, plus bracket and quote pairing.
//! - **Scanner**: an `expect`/`try_get` cursor over selector text with
//!   single-level undo.
//! - **Pattern matchers**: bounded and quoted strings, optionally quoted
//!   values, numbers, CSS identifiers, attribute and tag names.
//! - **Structural pseudo-classes** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/#structural-pseudos))
//!   - `:first-child`, `:last-child`, `:only-child`
//!   - `:first-of-type`, `:last-of-type`, `:only-of-type`
//!   - `:nth-child()`, `:nth-last-child()`, `:nth-of-type()`, `:nth-last-of-type()`
//!   - `:empty`, `:root`
//! - **Other pseudo-classes**: `:not()` over a filter stage's candidates,
//!   `:contains()` over individual text nodes.
//! - **Formula cache**: nth formulas compiled once per text and extended
//!   incrementally, shared across documents and threads.
//! - **Selectors**: groups, combinators, type, class, ID and attribute
//!   selectors, compiled by [`SelectorEngine`].
//!
//! # Example
//!
//! ```
//! use quarry_dom::DomTree;
//! use quarry_select::{EngineConfig, SelectorEngine};
//!
//! let mut tree = DomTree::new();
//! let root = tree.root();
//! let ul = tree.append_element(root, "ul");
//! let items: Vec<_> = (0..5).map(|_| tree.append_element(ul, "li")).collect();
//!
//! let engine = SelectorEngine::new(EngineConfig::default());
//! let odd = engine.select(&tree, root, "li:nth-child(odd)").unwrap();
//! assert_eq!(odd, vec![items[0], items[2], items[4]]);
//! ```

/// Character classes and bracket pairing.
pub mod chars;
/// Engine configuration.
pub mod config;
/// The selector engine.
pub mod engine;
/// Formulas for nth matching.
pub mod equation;
/// Error taxonomy.
pub mod error;
/// Nth-child matching and the formula cache.
pub mod nth;
/// Single-purpose grammars over character buffers.
pub mod patterns;
/// Pseudo-class predicates per [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes).
pub mod pseudo;
/// Character-level scanner.
pub mod scanner;
/// Selector structures and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;

pub use config::EngineConfig;
pub use engine::SelectorEngine;
pub use equation::{Equation, EquationParser, LinearEquation, LinearEquationParser};
pub use error::{Error, Result};
pub use nth::{Formula, FormulaCache, FormulaEntry, NthChildMatcher};
pub use pseudo::{PseudoClassKind, PseudoSelector};
pub use scanner::Scanner;
pub use selector::{SelectorCompiler, SelectorList, SelectorProgram};
