//! Thread-safety wrappers: serialize invocations through an explicit mutex.
//!
//! The lock is never derived from the identity of the protected resource; it
//! is an explicit [`SharedLock`] stored alongside the wrapped computation,
//! and may be supplied at construction so multiple wrappers serialize
//! against one another.
//!
//! The lock is held for the FULL duration of the wrapped call, including any
//! blocking I/O inside it. That coarse grain is the contract: it is what
//! makes check-then-populate atomic in [`SyncMemo`]. The cost is that
//! unrelated readers sharing a lock serialize behind a slow first
//! evaluation; callers needing finer concurrency must not nest unrelated
//! slow work under one shared lock.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::memo::{CacheEntry, FailurePolicy};
use crate::scalar::Scalar;

/// An explicit lock handle, shareable across wrappers.
pub type SharedLock = Arc<Mutex<()>>;

/// Serialize invocations of a scalar through a mutex.
///
/// On invocation the lock is acquired for the whole wrapped call and
/// released on every exit path, success or failure (the guard drops either
/// way). `SyncScalar` adds no caching: to get "compute exactly once, safely,
/// under concurrency", use [`SyncMemo`], which holds the lock while checking
/// and populating the cell. Wrapping a `Memo` in a `SyncScalar` instead does
/// not compile (`Memo` is `!Sync`), which is the point.
///
/// [`SyncMemo`]: crate::SyncMemo
pub struct SyncScalar<S> {
    inner: S,
    lock: SharedLock,
}

impl<S: Scalar> SyncScalar<S> {
    /// Wrap `inner` with a fresh private lock.
    pub fn new(inner: S) -> Self {
        Self::with_lock(inner, Arc::new(Mutex::new(())))
    }

    /// Wrap `inner`, serializing on a caller-supplied lock.
    ///
    /// Supply the same lock to several wrappers to serialize them against
    /// each other.
    pub fn with_lock(inner: S, lock: SharedLock) -> Self {
        Self { inner, lock }
    }

    /// A handle to this wrapper's lock, for sharing.
    pub fn lock(&self) -> SharedLock {
        Arc::clone(&self.lock)
    }

    /// Consume the wrapper and return the wrapped scalar.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Scalar> Scalar for SyncScalar<S> {
    type Item = S::Item;
    type Error = S::Error;

    fn value(&self) -> Result<S::Item, S::Error> {
        // A poisoned lock means a previous caller panicked mid-evaluation.
        // Nothing guarded here is left torn by that (the inner scalar owns
        // its own state), so recover the guard rather than forcing a poison
        // variant into every caller-chosen error type.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.value()
    }
}

/// Thread-safe memoization: exactly one evaluation under concurrency.
///
/// The composite the composition rule calls for - lock outside, memo inside.
/// The mutex guards the [`CacheEntry`] across the whole
/// check-evaluate-populate sequence, so K concurrent first callers invoke
/// the wrapped computation exactly once and all observe the identical
/// stored value. Failures follow the constructor-chosen [`FailurePolicy`],
/// exactly as in [`Memo`].
///
/// [`Memo`]: crate::Memo
///
/// # Example
///
/// ```
/// use memotape_core::{scalar, Scalar, SyncMemo};
/// use std::sync::Arc;
///
/// let memo = Arc::new(SyncMemo::new(scalar::from_fn(|| {
///     Ok::<_, String>("derived".to_string())
/// })));
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let memo = Arc::clone(&memo);
///         std::thread::spawn(move || memo.value().unwrap())
///     })
///     .collect();
/// for handle in handles {
///     assert_eq!(handle.join().unwrap(), "derived");
/// }
/// ```
pub struct SyncMemo<S: Scalar> {
    inner: S,
    entry: Mutex<CacheEntry<S::Item, S::Error>>,
    policy: FailurePolicy,
}

impl<S> SyncMemo<S>
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
            entry: Mutex::new(CacheEntry::Empty),
            policy,
        }
    }

    /// The failure policy fixed at construction.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Returns true once the cell holds an outcome (value or stuck failure).
    pub fn is_cached(&self) -> bool {
        !self
            .entry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Consume the wrapper and return the wrapped scalar, discarding any
    /// cached outcome.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Scalar for SyncMemo<S>
where
    S: Scalar,
    S::Item: Clone,
    S::Error: Clone,
{
    type Item = S::Item;
    type Error = S::Error;

    fn value(&self) -> Result<S::Item, S::Error> {
        // Held across evaluation: releasing between the emptiness check and
        // the populate would reopen the duplicate-first-execution race this
        // type exists to close. Entries are written only after evaluation
        // returns, so a panicking evaluation leaves the cell Empty and the
        // poison recovery below stays sound.
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        match &*entry {
            CacheEntry::Value(value) => Ok(value.clone()),
            CacheEntry::Failed(err) => Err(err.clone()),
            CacheEntry::Empty => match self.inner.value() {
                Ok(value) => {
                    *entry = CacheEntry::Value(value.clone());
                    debug!("sync memo cell populated");
                    Ok(value)
                }
                Err(err) => {
                    if self.policy.is_sticky() {
                        *entry = CacheEntry::Failed(err.clone());
                        debug!("sync memo cell stuck on failure");
                    }
                    Err(err)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::from_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_sync_scalar_passes_through() {
        let wrapped = SyncScalar::new(from_fn(|| Ok::<_, String>(11i32)));
        assert_eq!(wrapped.value().unwrap(), 11);
        assert_eq!(wrapped.value().unwrap(), 11);
    }

    #[test]
    fn test_sync_scalar_releases_lock_on_failure() {
        let wrapped = SyncScalar::new(from_fn(|| Err::<i32, _>("nope".to_string())));
        assert!(wrapped.value().is_err());
        // A held lock would deadlock this second call.
        assert!(wrapped.value().is_err());
    }

    #[test]
    fn test_shared_lock_is_the_same_handle() {
        let lock: SharedLock = Arc::new(Mutex::new(()));
        let a = SyncScalar::with_lock(from_fn(|| Ok::<_, String>(1)), Arc::clone(&lock));
        let b = SyncScalar::with_lock(from_fn(|| Ok::<_, String>(2)), Arc::clone(&lock));
        assert!(Arc::ptr_eq(&a.lock(), &b.lock()));
    }

    #[test]
    fn test_sync_memo_evaluates_once_sequentially() {
        let calls = AtomicUsize::new(0);
        let memo = SyncMemo::new(from_fn(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>("once".to_string())
        }));

        for _ in 0..4 {
            assert_eq!(memo.value().unwrap(), "once");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sync_memo_exactly_once_under_concurrency() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = {
            let calls = Arc::clone(&calls);
            Arc::new(SyncMemo::new(from_fn(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                // Widen the race window: without the lock held across
                // evaluation, several threads would get here.
                std::thread::sleep(std::time::Duration::from_millis(20));
                Ok::<_, String>(vec![1u8, 2, 3])
            })))
        };

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                std::thread::spawn(move || memo.value().unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sync_memo_sticky_failure_under_concurrency() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = {
            let calls = Arc::clone(&calls);
            Arc::new(SyncMemo::caching_failures(from_fn(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>("stuck".to_string())
            })))
        };

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let memo = Arc::clone(&memo);
                std::thread::spawn(move || memo.value().unwrap_err())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "stuck");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
