//! memotape bytes - replayable byte sources.
//!
//! A [`ByteSource`] is "something a byte stream can be opened from". Most
//! real origins (files, sockets, process output) hand back a stream that is
//! consumable only once; the tape wrappers in this crate capture such a
//! stream into an owned buffer on first open and serve every open - the
//! first included - from that buffer, so multiple independent consumers each
//! get a full read without re-triggering the underlying I/O.
//!
//! - [`TapeSource`] - single-threaded replay buffer.
//! - [`SharedTapeSource`] - same contract with at-most-once drain under
//!   concurrent first opens.
//! - [`SyncSource`] - serialize any source's `open()` through an explicit,
//!   shareable mutex.
//! - [`MemSource`] / [`FileSource`] - replayable origins for composition
//!   roots and tests.
//!
//! A failed or partial drain publishes nothing: the buffer stays empty, the
//! error propagates to that caller, and a later open re-drains from scratch.
//!
//! # Example
//!
//! ```
//! use memotape_bytes::{ByteSource, MemSource, TapeSource};
//! use std::io::Read;
//!
//! let tape = TapeSource::new(MemSource::new(b"hello".to_vec()));
//! for _ in 0..3 {
//!     let mut out = String::new();
//!     tape.open().unwrap().read_to_string(&mut out).unwrap();
//!     assert_eq!(out, "hello");
//! }
//! ```

pub mod config;
pub mod error;
pub mod source;
pub mod sync_source;
pub mod tape;

pub use config::TapeConfig;
pub use error::{SourceError, SourceResult};
pub use source::{ByteSource, FileSource, MemSource};
pub use sync_source::{SharedLock, SyncSource};
pub use tape::{SharedTapeSource, TapeSource};
