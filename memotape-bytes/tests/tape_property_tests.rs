//! Property-based tests for the replay contract.
//!
//! Property: for any byte sequence B, a tape over a source of B yields B on
//! every full drain, regardless of how often it is drained; a configured
//! bound either admits B whole or publishes nothing.

use std::io::Read;

use proptest::prelude::*;

use memotape_bytes::{ByteSource, MemSource, SharedTapeSource, TapeConfig, TapeSource};

fn read_all<S: ByteSource>(source: &S) -> Vec<u8> {
    let mut out = Vec::new();
    source.open().unwrap().read_to_end(&mut out).unwrap();
    out
}

proptest! {
    #[test]
    fn every_drain_equals_the_source_bytes(
        bytes in proptest::collection::vec(any::<u8>(), 0..4096),
        drains in 1usize..5,
    ) {
        let tape = TapeSource::new(MemSource::new(bytes.clone()));
        for _ in 0..drains {
            prop_assert_eq!(&read_all(&tape), &bytes);
        }
    }

    #[test]
    fn shared_tape_matches_single_threaded_tape(
        bytes in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let tape = TapeSource::new(MemSource::new(bytes.clone()));
        let shared = SharedTapeSource::new(MemSource::new(bytes));
        prop_assert_eq!(read_all(&tape), read_all(&shared));
    }

    #[test]
    fn bound_admits_whole_or_publishes_nothing(
        bytes in proptest::collection::vec(any::<u8>(), 0..2048),
        limit in 0u64..2048,
    ) {
        let config = TapeConfig::new().with_max_bytes(limit);
        let tape = TapeSource::with_config(MemSource::new(bytes.clone()), config);

        if bytes.len() as u64 <= limit {
            prop_assert_eq!(&read_all(&tape), &bytes);
            prop_assert!(tape.is_filled());
        } else {
            prop_assert!(tape.open().is_err());
            prop_assert!(!tape.is_filled());
        }
    }
}
