//! memotape text - the text-shaped client of the caching layer.
//!
//! Text values are where derived strings get expensive (summaries, rendered
//! templates, decoded payloads) and where callers most often want either a
//! cached copy or an unchecked "this cannot fail here" view. This crate
//! adapts the core contracts to a minimal [`Text`] seam:
//!
//! - [`TextOf`] lifts any string-producing [`Scalar`] into a [`Text`].
//! - [`CachedText`] derives the string at most once and serves the cached
//!   copy thereafter (success-only caching; a failed derivation is retried).
//! - [`UncheckedText`] converts derivation failures into unrecoverable
//!   panics for call sites where failure is a programming error.

use std::fmt;

use once_cell::unsync::OnceCell;
use thiserror::Error;

use memotape_core::Scalar;

/// Failures raised while deriving a text value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TextError {
    #[error("Text derivation failed: {reason}")]
    Derivation { reason: String },
}

impl TextError {
    /// Build a derivation error from any displayable failure.
    pub fn from_failure<E: fmt::Display>(err: E) -> Self {
        TextError::Derivation {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for text operations.
pub type TextResult<T> = Result<T, TextError>;

/// A text value derived on demand.
pub trait Text {
    /// Derive the string.
    fn text(&self) -> TextResult<String>;
}

impl<T: Text + ?Sized> Text for &T {
    fn text(&self) -> TextResult<String> {
        (**self).text()
    }
}

/// Adapt a string-producing scalar into a [`Text`].
pub struct TextOf<S> {
    scalar: S,
}

impl<S> TextOf<S>
where
    S: Scalar<Item = String>,
    S::Error: fmt::Display,
{
    pub fn new(scalar: S) -> Self {
        Self { scalar }
    }
}

impl<S> Text for TextOf<S>
where
    S: Scalar<Item = String>,
    S::Error: fmt::Display,
{
    fn text(&self) -> TextResult<String> {
        self.scalar.value().map_err(TextError::from_failure)
    }
}

/// Derive the string at most once; serve the cached copy thereafter.
///
/// Success-only caching: a failed derivation leaves the cell empty and the
/// next call retries, matching the core default of retrying idempotent
/// work. Single-threaded (`!Sync`); wrap the underlying computation in the
/// core's thread-safe cache if the string must be shared across threads.
///
/// # Example
///
/// ```
/// use memotape_core::scalar;
/// use memotape_text::{CachedText, Text, TextOf};
/// use std::cell::Cell;
///
/// let derivations = Cell::new(0u32);
/// let text = CachedText::new(TextOf::new(scalar::from_fn(|| {
///     derivations.set(derivations.get() + 1);
///     Ok::<_, std::io::Error>("rendered".to_string())
/// })));
///
/// assert_eq!(text.text().unwrap(), "rendered");
/// assert_eq!(text.text().unwrap(), "rendered");
/// assert_eq!(derivations.get(), 1);
/// ```
pub struct CachedText<T> {
    inner: T,
    cell: OnceCell<String>,
}

impl<T: Text> CachedText<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cell: OnceCell::new(),
        }
    }

    /// Returns true once a derivation has succeeded.
    pub fn is_cached(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: Text> Text for CachedText<T> {
    fn text(&self) -> TextResult<String> {
        self.cell
            .get_or_try_init(|| self.inner.text())
            .map(Clone::clone)
    }
}

/// Fail-fast text: a derivation failure becomes an unrecoverable panic.
pub struct UncheckedText<T> {
    inner: T,
}

impl<T: Text> UncheckedText<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Derive, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the underlying derivation error if it fails.
    pub fn get(&self) -> String {
        match self.inner.text() {
            Ok(text) => text,
            Err(err) => panic!("unrecoverable text derivation failure: {err}"),
        }
    }
}

impl<T: Text> Text for UncheckedText<T> {
    fn text(&self) -> TextResult<String> {
        Ok(self.get())
    }
}
