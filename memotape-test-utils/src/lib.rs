//! memotape test utilities
//!
//! Centralized test infrastructure for the memotape workspace:
//! - Instrumented scalars (invocation counting, scripted failures, delays)
//! - A one-shot byte source with a consumption marker
//!
//! Everything here is thread-safe so the same fakes serve both sequential
//! contract tests and multi-threaded exactly-once tests.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use memotape_bytes::{ByteSource, SourceError, SourceResult};
use memotape_core::Scalar;

// Re-export core types for convenience
pub use memotape_bytes::{MemSource, TapeConfig};
pub use memotape_core::{CacheEntry, FailurePolicy, Memo, RefreshPolicy, SyncMemo};

/// Counts how often the wrapped scalar is actually invoked.
///
/// Wrap the computation under test, then assert on [`calls`](Self::calls)
/// to pin down at-most-once contracts.
pub struct CountingScalar<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S: Scalar> CountingScalar<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times the wrapped scalar has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<S: Scalar> Scalar for CountingScalar<S> {
    type Item = S::Item;
    type Error = S::Error;

    fn value(&self) -> Result<S::Item, S::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.value()
    }
}

/// Error produced by [`FlakyScalar`] while it is still failing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("flaky failure on attempt {attempt}")]
pub struct FlakyError {
    pub attempt: usize,
}

/// Fails a scripted number of times, then succeeds forever.
pub struct FlakyScalar<T> {
    value: T,
    failures: usize,
    attempts: AtomicUsize,
}

impl<T: Clone> FlakyScalar<T> {
    /// Succeed with `value` after `failures` failed attempts.
    pub fn new(value: T, failures: usize) -> Self {
        Self {
            value,
            failures,
            attempts: AtomicUsize::new(0),
        }
    }

    /// How many attempts have been made so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<T: Clone> Scalar for FlakyScalar<T> {
    type Item = T;
    type Error = FlakyError;

    fn value(&self) -> Result<T, FlakyError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            Err(FlakyError { attempt })
        } else {
            Ok(self.value.clone())
        }
    }
}

/// Delays every evaluation, widening race windows in concurrency tests.
pub struct SlowScalar<S> {
    inner: S,
    delay: Duration,
}

impl<S: Scalar> SlowScalar<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<S: Scalar> Scalar for SlowScalar<S> {
    type Item = S::Item;
    type Error = S::Error;

    fn value(&self) -> Result<S::Item, S::Error> {
        std::thread::sleep(self.delay);
        self.inner.value()
    }
}

/// A single-pass byte origin with a consumption marker.
///
/// The first `open()` yields the bytes; every later open fails with
/// [`SourceError::Exhausted`], the way a socket or pipe would. [`opens`]
/// counts every attempt, consumed or not.
///
/// [`opens`]: Self::opens
pub struct OneShotSource {
    bytes: Arc<[u8]>,
    opens: AtomicUsize,
}

impl OneShotSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
            opens: AtomicUsize::new(0),
        }
    }

    /// How many opens have been attempted.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Returns true once the single pass has been handed out.
    pub fn was_consumed(&self) -> bool {
        self.opens() > 0
    }
}

impl ByteSource for OneShotSource {
    type Stream = Cursor<Arc<[u8]>>;

    fn open(&self) -> SourceResult<Self::Stream> {
        if self.opens.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(Cursor::new(Arc::clone(&self.bytes)))
        } else {
            Err(SourceError::Exhausted)
        }
    }
}
