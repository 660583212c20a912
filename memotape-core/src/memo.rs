//! Memoization: evaluate a deferred computation at most once.
//!
//! The cell behind every memoizing wrapper in this workspace is the tagged
//! [`CacheEntry`]: `Empty | Value | Failed`. What a failed first attempt does
//! to the cell is not left implicit - it is fixed at construction by an
//! explicit [`FailurePolicy`] and never mixed silently across call sites.

use std::cell::RefCell;

use tracing::debug;

use crate::scalar::Scalar;

/// The state of a memoizing cell.
///
/// Transitions:
///
/// ```text
/// Empty ── evaluation succeeds ──→ Value(T)     (terminal)
/// Empty ── evaluation fails ─────→ Empty        (FailurePolicy::Retry)
/// Empty ── evaluation fails ─────→ Failed(E)    (FailurePolicy::Sticky, terminal)
/// ```
///
/// Once `Value`, the cell never reverts and never changes value for the
/// owning cache's lifetime, absent an explicit refresh policy
/// ([`RefreshMemo`]).
///
/// [`RefreshMemo`]: crate::RefreshMemo
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CacheEntry<T, E> {
    /// No evaluation has succeeded (or stuck) yet.
    #[default]
    Empty,
    /// The first successful result, served to every later caller.
    Value(T),
    /// A stuck failure, replayed to every later caller.
    Failed(E),
}

impl<T, E> CacheEntry<T, E> {
    /// Returns true if no outcome is stored.
    pub fn is_empty(&self) -> bool {
        matches!(self, CacheEntry::Empty)
    }

    /// Returns true if a successful value is stored.
    pub fn is_value(&self) -> bool {
        matches!(self, CacheEntry::Value(_))
    }

    /// Returns true if a failure is stored.
    pub fn is_failed(&self) -> bool {
        matches!(self, CacheEntry::Failed(_))
    }

    /// Get the stored value, if any.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            CacheEntry::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// What a failed first evaluation does to the memoizing cell.
///
/// The policy materially changes observable behavior (spurious retries vs.
/// replayed failures), so it is part of the constructor surface rather than
/// a hidden default buried in the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// A failed attempt leaves the cell `Empty`; the next call re-invokes
    /// the wrapped computation.
    ///
    /// The right choice for idempotent, retryable work: file reads, network
    /// fetches, derivations over stable inputs.
    #[default]
    Retry,

    /// The first failure is stored and replayed on every later call without
    /// re-invoking the wrapped computation.
    ///
    /// Compute-or-fail-exactly-once semantics; use when re-running the
    /// computation after a failure would be wrong, not merely wasteful.
    Sticky,
}

impl FailurePolicy {
    /// Returns true for the retry-on-failure rule.
    pub fn is_retry(&self) -> bool {
        matches!(self, FailurePolicy::Retry)
    }

    /// Returns true for the cache-the-failure rule.
    pub fn is_sticky(&self) -> bool {
        matches!(self, FailurePolicy::Sticky)
    }
}

/// Single-threaded memoizing wrapper: at most one successful evaluation.
///
/// The first call executes the wrapped computation; on success the result is
/// stored and every later call serves a clone of it without re-invoking the
/// computation. Failures follow the constructor-chosen [`FailurePolicy`].
///
/// `Memo` holds its cell in a `RefCell` and is therefore `!Sync`. That is
/// deliberate: an unsynchronized memo shared across threads could run the
/// computation twice under racing first calls, so the type system rules the
/// sharing out. For cross-thread use, reach for [`SyncMemo`] - the
/// lock-outside/memo-inside composite.
///
/// [`SyncMemo`]: crate::SyncMemo
///
/// # Example
///
/// ```
/// use memotape_core::{scalar, Memo, Scalar};
/// use std::cell::Cell;
///
/// let runs = Cell::new(0u32);
/// let memo = Memo::new(scalar::from_fn(|| {
///     runs.set(runs.get() + 1);
///     Ok::<_, String>("expensive".to_string())
/// }));
///
/// assert_eq!(memo.value().unwrap(), "expensive");
/// assert_eq!(memo.value().unwrap(), "expensive");
/// assert_eq!(runs.get(), 1);
/// ```
pub struct Memo<S: Scalar> {
    inner: S,
    entry: RefCell<CacheEntry<S::Item, S::Error>>,
    policy: FailurePolicy,
}

impl<S> Memo<S>
where
    S: Scalar,
    S::Item: Clone,
    S::Error: Clone,
{
    /// Memoize with the default [`FailurePolicy::Retry`].
    pub fn new(inner: S) -> Self {
        Self::with_policy(inner, FailurePolicy::Retry)
    }

    /// Memoize with [`FailurePolicy::Sticky`]: the first failure is cached
    /// and replayed.
    pub fn caching_failures(inner: S) -> Self {
        Self::with_policy(inner, FailurePolicy::Sticky)
    }

    /// Memoize with an explicit failure policy.
    pub fn with_policy(inner: S, policy: FailurePolicy) -> Self {
        Self {
            inner,
            entry: RefCell::new(CacheEntry::Empty),
            policy,
        }
    }

    /// The failure policy fixed at construction.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Returns true once the cell holds an outcome (value or stuck failure).
    pub fn is_cached(&self) -> bool {
        !self.entry.borrow().is_empty()
    }

    /// Consume the wrapper and return the wrapped scalar, discarding any
    /// cached outcome.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Scalar for Memo<S>
where
    S: Scalar,
    S::Item: Clone,
    S::Error: Clone,
{
    type Item = S::Item;
    type Error = S::Error;

    fn value(&self) -> Result<S::Item, S::Error> {
        {
            let entry = self.entry.borrow();
            match &*entry {
                CacheEntry::Value(value) => return Ok(value.clone()),
                CacheEntry::Failed(err) => return Err(err.clone()),
                CacheEntry::Empty => {}
            }
        }

        // The borrow is released before evaluation so a wrapped computation
        // that inspects this memo does not trip the RefCell.
        let outcome = self.inner.value();
        let mut entry = self.entry.borrow_mut();
        match outcome {
            Ok(value) => {
                *entry = CacheEntry::Value(value.clone());
                debug!("memo cell populated");
                Ok(value)
            }
            Err(err) => {
                if self.policy.is_sticky() {
                    *entry = CacheEntry::Failed(err.clone());
                    debug!("memo cell stuck on failure");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::from_fn;
    use std::cell::Cell;

    #[test]
    fn test_memo_evaluates_once() {
        let calls = Cell::new(0usize);
        let memo = Memo::new(from_fn(|| {
            calls.set(calls.get() + 1);
            Ok::<_, String>(calls.get())
        }));

        for _ in 0..5 {
            assert_eq!(memo.value().unwrap(), 1);
        }
        assert_eq!(calls.get(), 1);
        assert!(memo.is_cached());
    }

    #[test]
    fn test_retry_policy_reinvokes_after_failure() {
        let calls = Cell::new(0usize);
        let memo = Memo::new(from_fn(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(format!("attempt {} failed", calls.get()))
            } else {
                Ok("finally".to_string())
            }
        }));

        assert!(memo.value().is_err());
        assert!(!memo.is_cached());
        assert!(memo.value().is_err());
        assert_eq!(memo.value().unwrap(), "finally");
        assert_eq!(calls.get(), 3);

        // The success is now terminal.
        assert_eq!(memo.value().unwrap(), "finally");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_sticky_policy_replays_failure_without_reinvoking() {
        let calls = Cell::new(0usize);
        let memo = Memo::caching_failures(from_fn(|| {
            calls.set(calls.get() + 1);
            Err::<i32, _>("permanent".to_string())
        }));

        assert_eq!(memo.value().unwrap_err(), "permanent");
        assert_eq!(memo.value().unwrap_err(), "permanent");
        assert_eq!(calls.get(), 1);
        assert!(memo.is_cached());
        assert!(memo.policy().is_sticky());
    }

    #[test]
    fn test_all_results_identical_after_first_success() {
        let memo = Memo::new(from_fn(|| Ok::<_, String>(vec![3u8, 1, 4, 1, 5])));
        let first = memo.value().unwrap();
        for _ in 0..10 {
            assert_eq!(memo.value().unwrap(), first);
        }
    }

    #[test]
    fn test_cache_entry_predicates() {
        let empty: CacheEntry<i32, String> = CacheEntry::Empty;
        assert!(empty.is_empty());
        assert!(!empty.is_value());

        let value: CacheEntry<i32, String> = CacheEntry::Value(9);
        assert!(value.is_value());
        assert_eq!(value.as_value(), Some(&9));

        let failed: CacheEntry<i32, String> = CacheEntry::Failed("x".to_string());
        assert!(failed.is_failed());
        assert_eq!(failed.as_value(), None);
    }

    #[test]
    fn test_default_policy_is_retry() {
        assert!(FailurePolicy::default().is_retry());
    }
}
