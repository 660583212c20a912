//! Thread-safety wrapper for byte-source opens.
//!
//! The same serialize-through-an-explicit-mutex contract the core crate
//! applies to deferred computations, applied to `open()`: the lock is held
//! for the whole open - including a wrapped tape's drain - and released on
//! every exit path.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::SourceResult;
use crate::source::ByteSource;

/// An explicit lock handle, shareable across wrappers.
pub type SharedLock = Arc<Mutex<()>>;

/// Serialize `open()` calls through a mutex.
///
/// Useful when several wrappers must not touch a shared origin at the same
/// time: give them one lock and their opens serialize against each other.
pub struct SyncSource<S> {
    inner: S,
    lock: SharedLock,
}

impl<S: ByteSource> SyncSource<S> {
    /// Wrap `inner` with a fresh private lock.
    pub fn new(inner: S) -> Self {
        Self::with_lock(inner, Arc::new(Mutex::new(())))
    }

    /// Wrap `inner`, serializing on a caller-supplied lock.
    pub fn with_lock(inner: S, lock: SharedLock) -> Self {
        Self { inner, lock }
    }

    /// A handle to this wrapper's lock, for sharing.
    pub fn lock(&self) -> SharedLock {
        Arc::clone(&self.lock)
    }

    /// Consume the wrapper and return the wrapped source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ByteSource> ByteSource for SyncSource<S> {
    type Stream = S::Stream;

    fn open(&self) -> SourceResult<Self::Stream> {
        // Recover poisoned locks: a panic mid-open leaves no torn state in
        // the wrappers of this crate (buffers publish only when complete).
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.open()
    }
}
