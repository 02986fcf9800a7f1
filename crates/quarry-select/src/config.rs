//! Engine configuration.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Options for a [`SelectorEngine`](crate::SelectorEngine).
///
/// Every field has a default, so an empty document (`{}` in JSON)
/// deserializes to [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of nth formulas the engine's cache keeps.
    ///
    /// `None` keeps every formula ever compiled, for the life of the cache.
    /// `Some(n)` evicts the least recently used formula beyond `n`.
    pub formula_cache_capacity: Option<NonZeroUsize>,

    /// Whether `:contains()` compares text case-sensitively.
    pub case_sensitive_contains: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            formula_cache_capacity: None,
            case_sensitive_contains: true,
        }
    }
}
