//! The byte-origin seam and the replayable origins.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::SourceResult;

/// Something a byte stream can be opened from.
///
/// `open()` may be called any number of times; whether a second open
/// succeeds depends on the origin. Files and in-memory buffers reopen
/// freely; sockets and pipes are single-pass and should be wrapped in a
/// tape ([`TapeSource`]/[`SharedTapeSource`]) before anything opens them
/// twice.
///
/// [`TapeSource`]: crate::TapeSource
/// [`SharedTapeSource`]: crate::SharedTapeSource
pub trait ByteSource {
    /// The stream an open yields.
    type Stream: Read;

    /// Open a fresh stream over this origin.
    fn open(&self) -> SourceResult<Self::Stream>;
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    type Stream = S::Stream;

    fn open(&self) -> SourceResult<Self::Stream> {
        (**self).open()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Arc<S> {
    type Stream = S::Stream;

    fn open(&self) -> SourceResult<Self::Stream> {
        (**self).open()
    }
}

/// An in-memory origin; every open yields an independent cursor at offset 0.
///
/// The bytes live behind an `Arc`, so opens are cheap and the source clones
/// freely.
#[derive(Debug, Clone)]
pub struct MemSource {
    bytes: Arc<[u8]>,
}

impl MemSource {
    /// Own `bytes` as a replayable origin.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
        }
    }

    /// The stored bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of stored bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the source holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl ByteSource for MemSource {
    type Stream = Cursor<Arc<[u8]>>;

    fn open(&self) -> SourceResult<Self::Stream> {
        Ok(Cursor::new(Arc::clone(&self.bytes)))
    }
}

/// A file-backed origin; every open reopens the path read-only.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Origin over the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    type Stream = File;

    fn open(&self) -> SourceResult<Self::Stream> {
        Ok(File::open(&self.path)?)
    }
}
