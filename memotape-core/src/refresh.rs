//! Refreshing memoization: thread-safe caching with bounded validity.
//!
//! [`RefreshMemo`] composes the exactly-once cell of [`SyncMemo`] with a
//! [`RefreshPolicy`] that decides whether a populated entry is still valid
//! when queried. Entry and fill timestamp live under ONE mutex, so
//! revalidation (the transition back to empty) and reads never interleave
//! unsafely.
//!
//! Validity is age-based against a monotonic clock; event-driven
//! invalidation is the explicit [`RefreshMemo::invalidate`] call.
//!
//! [`SyncMemo`]: crate::SyncMemo

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::memo::{CacheEntry, FailurePolicy};
use crate::scalar::Scalar;

/// Whether a populated entry is still considered valid when queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RefreshPolicy {
    /// A populated entry never expires; only [`RefreshMemo::invalidate`]
    /// empties the cell.
    #[default]
    Never,

    /// A populated entry older than `max_age` is discarded and recomputed
    /// on the next read. Applies to cached failures as well as cached
    /// values: a stuck failure also ages out.
    MaxAge(Duration),
}

impl RefreshPolicy {
    /// Entries never expire.
    pub fn never() -> Self {
        RefreshPolicy::Never
    }

    /// Entries expire once older than `max_age`.
    pub fn max_age(max_age: Duration) -> Self {
        RefreshPolicy::MaxAge(max_age)
    }

    /// Returns true if an entry filled at `filled_at` has expired by `now`.
    pub fn is_expired(&self, filled_at: Instant, now: Instant) -> bool {
        match self {
            RefreshPolicy::Never => false,
            RefreshPolicy::MaxAge(max_age) => now.duration_since(filled_at) >= *max_age,
        }
    }
}

struct RefreshState<T, E> {
    entry: CacheEntry<T, E>,
    filled_at: Option<Instant>,
}

/// Thread-safe memoizing cache with a validity policy.
///
/// For computations that are expensive (deriving, sorting, or copying a
/// whole collection or stream), read by many threads, and computed once per
/// validity window. Behaves exactly like [`SyncMemo`] while the entry is
/// valid; an expired entry is emptied under the read lock and recomputed by
/// the caller that observed the expiry.
///
/// [`SyncMemo`]: crate::SyncMemo
///
/// # Example
///
/// ```
/// use memotape_core::{scalar, RefreshMemo, RefreshPolicy, Scalar};
/// use std::time::Duration;
///
/// let cache = RefreshMemo::new(
///     scalar::from_fn(|| Ok::<_, String>(vec![1u8, 2, 3])),
///     RefreshPolicy::max_age(Duration::from_secs(300)),
/// );
/// assert_eq!(cache.value().unwrap(), vec![1, 2, 3]);
/// ```
pub struct RefreshMemo<S: Scalar> {
    inner: S,
    state: Mutex<RefreshState<S::Item, S::Error>>,
    refresh: RefreshPolicy,
    policy: FailurePolicy,
}

impl<S> RefreshMemo<S>
where
    S: Scalar,
    S::Item: Clone,
    S::Error: Clone,
{
    /// Cache with the given validity policy and the default
    /// [`FailurePolicy::Retry`].
    pub fn new(inner: S, refresh: RefreshPolicy) -> Self {
        Self::with_policies(inner, refresh, FailurePolicy::Retry)
    }

    /// Cache with explicit validity and failure policies.
    pub fn with_policies(inner: S, refresh: RefreshPolicy, policy: FailurePolicy) -> Self {
        Self {
            inner,
            state: Mutex::new(RefreshState {
                entry: CacheEntry::Empty,
                filled_at: None,
            }),
            refresh,
            policy,
        }
    }

    /// The validity policy fixed at construction.
    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh
    }

    /// The failure policy fixed at construction.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Returns true if the cell currently holds an unexpired outcome.
    pub fn is_cached(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.filled_at {
            Some(filled_at) => {
                !state.entry.is_empty() && !self.refresh.is_expired(filled_at, Instant::now())
            }
            None => false,
        }
    }

    /// Empty the cell so the next read recomputes.
    ///
    /// Runs under the same lock as reads: an in-flight evaluation finishes
    /// and publishes first, then this invalidation empties the cell.
    pub fn invalidate(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entry = CacheEntry::Empty;
        state.filled_at = None;
        debug!("refresh memo invalidated");
    }

    /// Consume the wrapper and return the wrapped scalar.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Scalar for RefreshMemo<S>
where
    S: Scalar,
    S::Item: Clone,
    S::Error: Clone,
{
    type Item = S::Item;
    type Error = S::Error;

    fn value(&self) -> Result<S::Item, S::Error> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(filled_at) = state.filled_at {
            if !state.entry.is_empty() && self.refresh.is_expired(filled_at, Instant::now()) {
                state.entry = CacheEntry::Empty;
                state.filled_at = None;
                debug!("refresh memo entry expired");
            }
        }

        match &state.entry {
            CacheEntry::Value(value) => Ok(value.clone()),
            CacheEntry::Failed(err) => Err(err.clone()),
            CacheEntry::Empty => match self.inner.value() {
                Ok(value) => {
                    state.entry = CacheEntry::Value(value.clone());
                    state.filled_at = Some(Instant::now());
                    debug!("refresh memo populated");
                    Ok(value)
                }
                Err(err) => {
                    if self.policy.is_sticky() {
                        state.entry = CacheEntry::Failed(err.clone());
                        state.filled_at = Some(Instant::now());
                    }
                    Err(err)
                }
            },
        }
    }
}
