//! The stream-replay buffer.
//!
//! A tape wraps a byte source whose stream may be consumable only once and
//! exposes the same "open a stream" operation with a replay contract: the
//! first open fully drains the origin through a duplicating read into an
//! owned buffer, and every open - the first included - serves a fresh
//! cursor over that buffer at offset 0. The origin is never reopened.
//!
//! Failure handling: a partial drain publishes nothing. The buffer stays
//! empty, the failure propagates to that caller, and a later open re-drains
//! from scratch.

use std::cell::RefCell;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::config::TapeConfig;
use crate::error::{SourceError, SourceResult};
use crate::source::ByteSource;

/// Duplicates every byte read from `reader` into `sink`.
struct TeeReader<R, W> {
    reader: R,
    sink: W,
}

impl<R: Read, W: Write> Read for TeeReader<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.sink.write_all(&buf[..n])?;
        }
        Ok(n)
    }
}

/// Drain `origin` completely, capturing every byte.
///
/// Returns the captured bytes only if the origin was read to EOF within the
/// configured bound; any failure discards the partial capture.
fn fill<S: ByteSource>(origin: &S, config: &TapeConfig) -> SourceResult<Arc<[u8]>> {
    let stream = origin.open()?;
    let mut tee = TeeReader {
        reader: stream,
        sink: Vec::with_capacity(config.initial_capacity),
    };

    let mut chunk = [0u8; 8 * 1024];
    loop {
        let n = tee.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        if let Some(limit) = config.max_bytes {
            if tee.sink.len() as u64 > limit {
                return Err(SourceError::TapeOverflow { limit });
            }
        }
    }

    let captured = tee.sink;
    debug!(bytes = captured.len(), "tape filled from origin");
    Ok(Arc::from(captured))
}

/// Single-threaded stream-replay buffer.
///
/// Holds its buffer in a `RefCell` and is `!Sync`; two concurrent first
/// opens could each drain a non-idempotent origin, so cross-thread sharing
/// is ruled out at the type level. Use [`SharedTapeSource`] across threads.
///
/// # Example
///
/// ```
/// use memotape_bytes::{ByteSource, MemSource, TapeSource};
/// use std::io::Read;
///
/// let tape = TapeSource::new(MemSource::new(b"replay me".to_vec()));
/// let mut first = String::new();
/// tape.open().unwrap().read_to_string(&mut first).unwrap();
/// let mut second = String::new();
/// tape.open().unwrap().read_to_string(&mut second).unwrap();
/// assert_eq!(first, second);
/// ```
pub struct TapeSource<S> {
    origin: S,
    config: TapeConfig,
    tape: RefCell<Option<Arc<[u8]>>>,
}

impl<S: ByteSource> TapeSource<S> {
    /// Wrap `origin` with an unbounded tape.
    pub fn new(origin: S) -> Self {
        Self::with_config(origin, TapeConfig::default())
    }

    /// Wrap `origin` with an explicit tape configuration.
    pub fn with_config(origin: S, config: TapeConfig) -> Self {
        Self {
            origin,
            config,
            tape: RefCell::new(None),
        }
    }

    /// The tape configuration.
    pub fn config(&self) -> &TapeConfig {
        &self.config
    }

    /// Returns true once the origin has been drained and the buffer
    /// published.
    pub fn is_filled(&self) -> bool {
        self.tape.borrow().is_some()
    }

    /// Consume the wrapper and return the wrapped origin, discarding any
    /// captured bytes.
    pub fn into_origin(self) -> S {
        self.origin
    }
}

impl<S: ByteSource> ByteSource for TapeSource<S> {
    type Stream = Cursor<Arc<[u8]>>;

    fn open(&self) -> SourceResult<Self::Stream> {
        if let Some(tape) = self.tape.borrow().as_ref() {
            return Ok(Cursor::new(Arc::clone(tape)));
        }

        let filled = fill(&self.origin, &self.config)?;
        *self.tape.borrow_mut() = Some(Arc::clone(&filled));
        Ok(Cursor::new(filled))
    }
}

/// Thread-safe stream-replay buffer: at-most-once drain under concurrency.
///
/// The buffer cell is a `OnceCell`, so concurrent first opens elect one
/// drainer; the rest block until the buffer is published and then read from
/// it. A failed drain leaves the cell empty and a later open retries -
/// the same policy as [`TapeSource`], made atomic.
pub struct SharedTapeSource<S> {
    origin: S,
    config: TapeConfig,
    tape: OnceCell<Arc<[u8]>>,
}

impl<S: ByteSource> SharedTapeSource<S> {
    /// Wrap `origin` with an unbounded tape.
    pub fn new(origin: S) -> Self {
        Self::with_config(origin, TapeConfig::default())
    }

    /// Wrap `origin` with an explicit tape configuration.
    pub fn with_config(origin: S, config: TapeConfig) -> Self {
        Self {
            origin,
            config,
            tape: OnceCell::new(),
        }
    }

    /// The tape configuration.
    pub fn config(&self) -> &TapeConfig {
        &self.config
    }

    /// Returns true once the origin has been drained and the buffer
    /// published.
    pub fn is_filled(&self) -> bool {
        self.tape.get().is_some()
    }

    /// Consume the wrapper and return the wrapped origin, discarding any
    /// captured bytes.
    pub fn into_origin(self) -> S {
        self.origin
    }
}

impl<S: ByteSource> ByteSource for SharedTapeSource<S> {
    type Stream = Cursor<Arc<[u8]>>;

    fn open(&self) -> SourceResult<Self::Stream> {
        let tape = self
            .tape
            .get_or_try_init(|| fill(&self.origin, &self.config))?;
        Ok(Cursor::new(Arc::clone(tape)))
    }
}
