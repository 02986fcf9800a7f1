//! Shared, incrementally extended membership sets for nth formulas.
//!
//! An entry records which 1-based positions a formula produces. Coverage
//! only ever grows: asking about a position beyond what has been computed
//! evaluates the formula for the next few values of `n` and keeps them.
//! Entries are keyed by formula text alone, never by document or node, so
//! one entry serves every tree and survives mutations of any of them.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use log::{debug, trace};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};

use crate::equation::{Equation, EquationParser, LinearEquationParser};
use crate::error::{Error, Result};

/// The variable nth formulas are written in.
const VARIABLE: &str = "n";

/// Membership data computed so far for one formula.
#[derive(Debug, Default)]
struct Coverage {
    matching: HashSet<i64>,
    /// Next value of `n` to evaluate.
    next_iterator: i64,
    /// Every formula output up to here is in `matching`.
    max_index: i64,
    /// Last value produced and the step that led to it.
    previous: Option<i64>,
    previous_step: Option<i64>,
    /// No further evaluation can add a positive value.
    exhausted: bool,
}

impl Coverage {
    fn covers(&self, index: i64) -> bool {
        self.exhausted || index <= self.max_index
    }

    /// Evaluate successive values of `n` until `index` is decided.
    ///
    /// Stops once a value passes `index` while the sequence is not falling,
    /// or once it is falling (or flat) at or below zero without curving
    /// back up.
    fn extend_to(&mut self, index: i64, equation: &dyn Equation) {
        if self.covers(index) {
            return;
        }
        let from = self.next_iterator;
        loop {
            let value = equation.evaluate(self.next_iterator);
            self.next_iterator += 1;
            if value > 0 {
                let _ = self.matching.insert(value);
            }

            let step = self.previous.map(|previous| value.saturating_sub(previous));
            let previous_step = self.previous_step;
            self.previous = Some(value);
            self.previous_step = step;

            let Some(step) = step else { continue };
            if value > index && step >= 0 {
                break;
            }
            let curving_up = previous_step.is_some_and(|p| step > p);
            if previous_step.is_some() && step <= 0 && !curving_up && (value <= 0 || step == 0) {
                self.exhausted = true;
                break;
            }
        }
        self.max_index = self.max_index.max(index);
        trace!(
            "nth coverage extended to {index} (n {from}..{}, exhausted: {})",
            self.next_iterator, self.exhausted
        );
    }
}

/// A formula together with the positions it is known to produce.
#[derive(Debug)]
pub struct FormulaEntry {
    text: String,
    equation: Box<dyn Equation>,
    coverage: RwLock<Coverage>,
}

impl FormulaEntry {
    fn new(text: String, equation: Box<dyn Equation>) -> Self {
        Self {
            text,
            equation,
            coverage: RwLock::new(Coverage::default()),
        }
    }

    /// The normalized formula text this entry is keyed by.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the formula produces the 1-based position `index` for some
    /// `n >= 0`. Extends the entry's coverage when needed.
    pub fn contains(&self, index: i64) -> bool {
        {
            let coverage = self.coverage.read();
            if coverage.covers(index) {
                return coverage.matching.contains(&index);
            }
        }
        let mut coverage = self.coverage.write();
        coverage.extend_to(index, self.equation.as_ref());
        coverage.matching.contains(&index)
    }

    /// Highest position whose membership has been decided.
    #[must_use]
    pub fn max_index(&self) -> i64 {
        self.coverage.read().max_index
    }
}

enum Store {
    Unbounded(DashMap<String, Arc<FormulaEntry>>),
    Bounded(Mutex<LruCache<String, Arc<FormulaEntry>>>),
}

/// Cache of [`FormulaEntry`] values keyed by normalized formula text.
///
/// By default nothing is ever evicted. [`FormulaCache::with_capacity`]
/// bounds the number of formulas kept, evicting the least recently used.
/// Lookups of different formulas never contend on one lock; extending one
/// entry only locks that entry.
pub struct FormulaCache {
    store: Store,
    parser: Arc<dyn EquationParser>,
}

static GLOBAL: LazyLock<Arc<FormulaCache>> = LazyLock::new(|| Arc::new(FormulaCache::new()));

impl FormulaCache {
    /// An empty, unbounded cache using [`LinearEquationParser`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Store::Unbounded(DashMap::new()),
            parser: Arc::new(LinearEquationParser),
        }
    }

    /// An empty cache holding at most `capacity` formulas.
    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            store: Store::Bounded(Mutex::new(LruCache::new(capacity))),
            parser: Arc::new(LinearEquationParser),
        }
    }

    /// Use `parser` for formulas that are not bare integers.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn EquationParser>) -> Self {
        self.parser = parser;
        self
    }

    /// The process-wide cache shared by engines that do not bring their own.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Number of formulas currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.store {
            Store::Unbounded(map) => map.len(),
            Store::Bounded(lru) => lru.lock().len(),
        }
    }

    /// Whether no formula is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the cache evicts.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        matches!(self.store, Store::Bounded(_))
    }

    fn lookup(&self, text: &str) -> Option<Arc<FormulaEntry>> {
        match &self.store {
            Store::Unbounded(map) => map.get(text).map(|entry| Arc::clone(entry.value())),
            Store::Bounded(lru) => lru.lock().get(text).cloned(),
        }
    }

    /// The entry for already normalized `text`, parsing and inserting it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns the parser's error for malformed text, and
    /// [`Error::InvalidSelector`] unless the formula's only variable is `n`.
    pub fn get_or_compute(&self, text: &str) -> Result<Arc<FormulaEntry>> {
        if let Some(entry) = self.lookup(text) {
            return Ok(entry);
        }

        let equation = self.parser.parse(text)?;
        if equation.variables() != [VARIABLE] {
            return Err(Error::invalid(format!(
                "nth formula \"{text}\" must use exactly one variable, 'n'"
            )));
        }
        let entry = Arc::new(FormulaEntry::new(text.to_string(), equation));
        debug!("caching nth formula \"{text}\"");

        Ok(match &self.store {
            Store::Unbounded(map) => {
                Arc::clone(map.entry(text.to_string()).or_insert(entry).value())
            }
            Store::Bounded(lru) => {
                let mut lru = lru.lock();
                if let Some(existing) = lru.get(text) {
                    return Ok(Arc::clone(existing));
                }
                if let Some((evicted, _)) = lru.push(text.to_string(), Arc::clone(&entry)) {
                    debug!("evicted nth formula \"{evicted}\"");
                }
                entry
            }
        })
    }
}

impl Default for FormulaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormulaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormulaCache")
            .field("len", &self.len())
            .field("bounded", &self.is_bounded())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(entry: &FormulaEntry, upto: i64) -> Vec<i64> {
        (1..=upto).filter(|&i| entry.contains(i)).collect()
    }

    #[test]
    fn test_descending_formula_terminates() {
        let cache = FormulaCache::new();
        let entry = cache.get_or_compute("-n+3").unwrap();
        assert_eq!(members(&entry, 10), vec![1, 2, 3]);
        assert!(entry.coverage.read().exhausted);
    }

    #[test]
    fn test_descending_start_above_index_is_not_cut_short() {
        let cache = FormulaCache::new();
        let entry = cache.get_or_compute("-n+10").unwrap();
        assert!(entry.contains(3));
        assert!(!entry.contains(11));
    }

    #[test]
    fn test_flat_formula_terminates() {
        let cache = FormulaCache::new();
        let entry = cache.get_or_compute("0n+4").unwrap();
        assert_eq!(members(&entry, 9), vec![4]);
    }

    #[test]
    fn test_negative_offsets_are_discarded() {
        let cache = FormulaCache::new();
        let entry = cache.get_or_compute("3n-4").unwrap();
        assert_eq!(members(&entry, 12), vec![2, 5, 8, 11]);
        assert!(!entry.contains(-1));
    }

    #[test]
    fn test_coverage_grows_monotonically() {
        let cache = FormulaCache::new();
        let entry = cache.get_or_compute("2n").unwrap();
        assert!(entry.contains(4));
        let covered = entry.max_index();
        assert!(covered >= 4);
        assert!(!entry.contains(3));
        assert_eq!(entry.max_index(), covered);
        assert!(entry.contains(100));
        assert!(entry.max_index() >= 100);
    }

    #[test]
    fn test_lru_bound_evicts_oldest() {
        let cache = FormulaCache::with_capacity(NonZeroUsize::new(2).unwrap());
        let first = cache.get_or_compute("n+1").unwrap();
        let _ = cache.get_or_compute("n+2").unwrap();
        let _ = cache.get_or_compute("n+3").unwrap();
        assert_eq!(cache.len(), 2);
        let again = cache.get_or_compute("n+1").unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
    }
}
