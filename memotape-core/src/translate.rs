//! Failure translation for deferred computations.
//!
//! Two standard instantiations of "convert a failure from one representation
//! to another":
//!
//! - [`MapErr`] narrows the error to a type declared at the call site via a
//!   caller-supplied mapping. No caching, no other side effects.
//! - [`Unchecked`] converts failure into an unrecoverable panic that
//!   propagates to the top of the call stack and is never silently swallowed.

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;

use crate::scalar::Scalar;

/// Error-translating wrapper around a [`Scalar`].
///
/// On invocation it calls the wrapped computation; on failure it applies the
/// mapping and returns the translated error. The target error type is pinned
/// by the `E` parameter so a chain of wrappers reads unambiguously at the
/// call site.
///
/// # Example
///
/// ```
/// use memotape_core::{scalar, MapErr, Scalar, ValueError};
///
/// let failing = scalar::from_fn(|| Err::<String, _>("disk on fire"));
/// let translated = MapErr::new(failing, ValueError::from_failure);
/// let err = translated.value().unwrap_err();
/// assert!(matches!(err, ValueError::EvalFailed { .. }));
/// ```
pub struct MapErr<S, F, E> {
    inner: S,
    map: F,
    _target: PhantomData<fn() -> E>,
}

impl<S, F, E> MapErr<S, F, E>
where
    S: Scalar,
    F: Fn(S::Error) -> E,
{
    /// Wrap `inner`, translating its failures through `map`.
    pub fn new(inner: S, map: F) -> Self {
        Self {
            inner,
            map,
            _target: PhantomData,
        }
    }

    /// Consume the wrapper and return the wrapped scalar.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, F, E> Scalar for MapErr<S, F, E>
where
    S: Scalar,
    F: Fn(S::Error) -> E,
{
    type Item = S::Item;
    type Error = E;

    fn value(&self) -> Result<Self::Item, E> {
        self.inner.value().map_err(&self.map)
    }
}

/// Fail-fast wrapper: a failure becomes an unrecoverable panic.
///
/// For call sites where a failure is a programming error that must surface
/// at the top of the call stack. The panic message carries the original
/// failure, so nothing is swallowed. The `Scalar` impl advertises
/// `Error = Infallible`: downstream wrappers see a computation that cannot
/// fail, which is exactly the contract a panic enforces.
pub struct Unchecked<S> {
    inner: S,
}

impl<S> Unchecked<S>
where
    S: Scalar,
    S::Error: fmt::Display,
{
    /// Wrap `inner` so its failures abort instead of propagating.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Evaluate, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the wrapped computation's error message if evaluation
    /// fails.
    pub fn get(&self) -> S::Item {
        match self.inner.value() {
            Ok(value) => value,
            Err(err) => panic!("unrecoverable deferred evaluation failure: {err}"),
        }
    }

    /// Consume the wrapper and return the wrapped scalar.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> Scalar for Unchecked<S>
where
    S: Scalar,
    S::Error: fmt::Display,
{
    type Item = S::Item;
    type Error = Infallible;

    fn value(&self) -> Result<Self::Item, Infallible> {
        Ok(self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;
    use crate::scalar::from_fn;

    #[derive(Debug, PartialEq, Eq)]
    struct SiteError(String);

    #[test]
    fn test_map_err_translates_failure() {
        let failing = from_fn(|| Err::<i32, _>("generic failure"));
        let translated = MapErr::new(failing, |e| SiteError(format!("wrapped: {e}")));

        let err = translated.value().unwrap_err();
        assert_eq!(err, SiteError("wrapped: generic failure".to_string()));
    }

    #[test]
    fn test_map_err_passes_success_through() {
        let ok = from_fn(|| Ok::<_, &str>(5i32));
        let translated = MapErr::new(ok, |e| SiteError(e.to_string()));
        assert_eq!(translated.value().unwrap(), 5);
    }

    #[test]
    fn test_map_err_to_value_error() {
        let failing = from_fn(|| Err::<i32, _>("disk on fire"));
        let translated = MapErr::new(failing, ValueError::from_failure);

        let err = translated.value().unwrap_err();
        assert_eq!(
            err,
            ValueError::EvalFailed {
                reason: "disk on fire".to_string()
            }
        );
    }

    #[test]
    fn test_unchecked_passes_success_through() {
        let ok = from_fn(|| Ok::<_, &str>("fine"));
        let unchecked = Unchecked::new(ok);
        assert_eq!(unchecked.get(), "fine");
        assert_eq!(unchecked.value().unwrap(), "fine");
    }

    #[test]
    #[should_panic(expected = "unrecoverable deferred evaluation failure: boom")]
    fn test_unchecked_panics_on_failure() {
        let failing = from_fn(|| Err::<i32, _>("boom"));
        Unchecked::new(failing).get();
    }
}
