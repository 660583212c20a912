//! Property-based tests for the memoization contract.
//!
//! Property: however many times a memo is read, the wrapped computation
//! runs at most once after its first success, and every read observes the
//! value of that first success - even when the computation would produce a
//! different value on a later run.

use std::cell::Cell;

use proptest::prelude::*;

use memotape_core::{scalar, FailurePolicy, Memo, Scalar};

proptest! {
    #[test]
    fn every_read_observes_the_first_success(seed in any::<u64>(), reads in 1usize..25) {
        let calls = Cell::new(0u64);
        let memo = Memo::new(scalar::from_fn(|| {
            calls.set(calls.get() + 1);
            // A later run would yield a different value; the memo must
            // never let one happen.
            Ok::<_, String>(seed.wrapping_mul(calls.get()))
        }));

        let first = memo.value().unwrap();
        prop_assert_eq!(first, seed);
        for _ in 1..reads {
            prop_assert_eq!(memo.value().unwrap(), first);
        }
        prop_assert_eq!(calls.get(), 1);
    }

    #[test]
    fn retry_runs_once_per_read_until_first_success(failures in 0usize..10, extra_reads in 1usize..10) {
        let calls = Cell::new(0usize);
        let memo = Memo::new(scalar::from_fn(|| {
            calls.set(calls.get() + 1);
            if calls.get() <= failures {
                Err(format!("attempt {}", calls.get()))
            } else {
                Ok(calls.get())
            }
        }));

        for _ in 0..failures {
            prop_assert!(memo.value().is_err());
        }
        let settled = memo.value().unwrap();
        prop_assert_eq!(settled, failures + 1);

        for _ in 0..extra_reads {
            prop_assert_eq!(memo.value().unwrap(), settled);
        }
        prop_assert_eq!(calls.get(), failures + 1);
    }

    #[test]
    fn sticky_failure_is_replayed_verbatim(reads in 1usize..15) {
        let calls = Cell::new(0usize);
        let memo = Memo::with_policy(
            scalar::from_fn(|| {
                calls.set(calls.get() + 1);
                Err::<u32, _>(format!("failure from run {}", calls.get()))
            }),
            FailurePolicy::Sticky,
        );

        let first = memo.value().unwrap_err();
        for _ in 0..reads {
            prop_assert_eq!(memo.value().unwrap_err(), first.clone());
        }
        prop_assert_eq!(calls.get(), 1);
    }
}
