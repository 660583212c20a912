//! memotape core - deferred computations with execution contracts.
//!
//! A [`Scalar`] is a zero-argument, possibly-failing computation evaluated on
//! demand. This crate wraps scalars in decorators that pin down *how often*
//! and *how safely* the computation runs:
//!
//! - [`Memo`] evaluates at most once (single-threaded) and serves the cached
//!   result thereafter, with an explicit [`FailurePolicy`].
//! - [`SyncScalar`] serializes invocations through an explicit, shareable
//!   mutex held for the full duration of the call.
//! - [`SyncMemo`] is the lock-outside/memo-inside composite: exactly one
//!   evaluation even under concurrent first calls.
//! - [`RefreshMemo`] adds an age-based [`RefreshPolicy`] on top of
//!   [`SyncMemo`], with revalidation and reads guarded by one lock.
//! - [`MapErr`] and [`Unchecked`] translate failures: to a call-site error
//!   type, or to an unrecoverable panic that is never silently swallowed.
//!
//! # Composition order
//!
//! Locking must sit *outside* memoization: holding the lock only around an
//! already-populated cell does not prevent duplicate first-time execution.
//! [`Memo`] is deliberately `!Sync` (interior `RefCell`), so the broken
//! ordering fails to compile; [`SyncMemo`] is the safe composite.
//!
//! # Example
//!
//! ```
//! use memotape_core::{scalar, Memo, Scalar};
//!
//! let expensive = scalar::from_fn(|| Ok::<_, String>(6 * 7));
//! let memo = Memo::new(expensive);
//! assert_eq!(memo.value().unwrap(), 42);
//! assert!(memo.is_cached());
//! ```

pub mod error;
pub mod memo;
pub mod refresh;
pub mod scalar;
pub mod sync;
pub mod translate;

pub use error::{MemotapeResult, ValueError};
pub use memo::{CacheEntry, FailurePolicy, Memo};
pub use refresh::{RefreshMemo, RefreshPolicy};
pub use scalar::{constant, from_fn, Constant, FromFn, Scalar};
pub use sync::{SharedLock, SyncMemo, SyncScalar};
pub use translate::{MapErr, Unchecked};
