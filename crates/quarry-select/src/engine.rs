//! The entry point tying the grammar, the pseudo-class registry and the
//! formula cache together.

use std::sync::Arc;

use quarry_dom::{DomTree, NodeId};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::nth::{FormulaCache, NthChildMatcher};
use crate::pseudo::{
    Contains, Empty, FirstChild, FirstOfType, LastChild, LastOfType, Not, NthPseudo, OnlyChild,
    OnlyOfType, PseudoClassKind, PseudoSelector, Root,
};
use crate::selector::{
    SelectorCompiler, SelectorList, SelectorProgram, parse_selector_list, parse_text_argument,
};

/// Compiles selectors and owns (or shares) the nth formula cache they use.
///
/// [`SelectorEngine::default`] shares the process-wide
/// [`FormulaCache::global`]; [`SelectorEngine::new`] gets a cache of its
/// own, which is what tests wanting isolation should use.
#[derive(Debug, Clone)]
pub struct SelectorEngine {
    config: EngineConfig,
    cache: Arc<FormulaCache>,
}

impl SelectorEngine {
    /// An engine with a fresh cache built from `config`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let cache = config
            .formula_cache_capacity
            .map_or_else(FormulaCache::new, FormulaCache::with_capacity);
        Self::with_cache(config, Arc::new(cache))
    }

    /// An engine using `cache`, which may be shared with other engines.
    /// `config.formula_cache_capacity` is ignored.
    #[must_use]
    pub const fn with_cache(config: EngineConfig, cache: Arc<FormulaCache>) -> Self {
        Self { config, cache }
    }

    /// The configuration this engine was built with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The formula cache behind this engine's nth pseudo-classes.
    #[must_use]
    pub fn cache(&self) -> &FormulaCache {
        &self.cache
    }

    /// An [`NthChildMatcher`] over this engine's cache.
    #[must_use]
    pub fn nth(&self) -> NthChildMatcher<'_> {
        NthChildMatcher::new(&self.cache)
    }

    /// Build the pseudo-class `name`, with `argument` being the text
    /// between its parentheses, if any.
    ///
    /// The argument count is checked before the argument is looked at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] for an unknown name or a wrong
    /// argument count, and whatever compiling the argument fails with.
    pub fn pseudo(&self, name: &str, argument: Option<&str>) -> Result<Arc<dyn PseudoSelector>> {
        let kind: PseudoClassKind = name
            .parse()
            .map_err(|_| Error::invalid(format!("unsupported pseudo-class ':{name}'")))?;

        let argument = match (kind.arity(), argument) {
            (0, None) => "",
            (1, Some(argument)) => argument,
            (arity, _) => {
                return Err(Error::invalid(format!(
                    "':{kind}' takes {arity} argument{}",
                    if arity == 1 { "" } else { "s" }
                )));
            }
        };

        let nth = |of_type, from_last| -> Result<Arc<dyn PseudoSelector>> {
            let formula = self.nth().compile(argument)?;
            Ok(Arc::new(NthPseudo::new(formula, of_type, from_last)))
        };

        let pseudo: Arc<dyn PseudoSelector> = match kind {
            PseudoClassKind::FirstChild => Arc::new(FirstChild),
            PseudoClassKind::LastChild => Arc::new(LastChild),
            PseudoClassKind::OnlyChild => Arc::new(OnlyChild),
            PseudoClassKind::FirstOfType => Arc::new(FirstOfType),
            PseudoClassKind::LastOfType => Arc::new(LastOfType),
            PseudoClassKind::OnlyOfType => Arc::new(OnlyOfType),
            PseudoClassKind::Empty => Arc::new(Empty),
            PseudoClassKind::Root => Arc::new(Root),
            PseudoClassKind::NthChild => nth(false, false)?,
            PseudoClassKind::NthLastChild => nth(false, true)?,
            PseudoClassKind::NthOfType => nth(true, false)?,
            PseudoClassKind::NthLastOfType => nth(true, true)?,
            PseudoClassKind::Not => Arc::new(Not::new(self.compile(argument)?)),
            PseudoClassKind::Contains => Arc::new(Contains::new(
                parse_text_argument(argument)?,
                self.config.case_sensitive_contains,
            )),
        };
        Ok(pseudo)
    }

    /// Parse `text` into a selector group.
    ///
    /// # Errors
    ///
    /// Returns a scanner error for malformed text and
    /// [`Error::InvalidSelector`] for unsupported pseudo-classes or bad
    /// arguments.
    pub fn parse(&self, text: &str) -> Result<SelectorList> {
        parse_selector_list(self, text)
    }

    /// The elements below `root` matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// See [`SelectorEngine::parse`].
    pub fn select(&self, tree: &DomTree, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let program = self.parse(selector)?;
        let candidates: Vec<NodeId> = tree
            .descendants(root)
            .filter(|&node| tree.is_element(node))
            .collect();
        Ok(program.apply(tree, root, &candidates))
    }
}

impl Default for SelectorEngine {
    fn default() -> Self {
        Self::with_cache(EngineConfig::default(), FormulaCache::global())
    }
}

impl SelectorCompiler for SelectorEngine {
    fn compile(&self, text: &str) -> Result<Arc<dyn SelectorProgram>> {
        Ok(Arc::new(self.parse(text)?))
    }
}
