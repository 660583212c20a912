//! Sorted View Demo
//!
//! The collection-decorator call shape: a sorted copy of a collection is
//! expensive to derive, read by many threads, and must be computed once.
//! Wrapping the derivation in `SyncMemo` gives every reader the identical
//! sorted copy while the derivation runs exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use memotape_core::{scalar, Scalar, SyncMemo};

fn main() {
    println!("=== memotape Sorted View Demo ===\n");

    let raw = vec![42u32, 7, 19, 3, 88, 23, 5, 61];
    println!("raw collection: {raw:?}");

    let derivations = Arc::new(AtomicUsize::new(0));
    let sorted_view = {
        let derivations = Arc::clone(&derivations);
        let raw = raw.clone();
        Arc::new(SyncMemo::new(scalar::from_fn(move || {
            derivations.fetch_add(1, Ordering::SeqCst);
            let mut copy = raw.clone();
            copy.sort_unstable();
            Ok::<_, std::convert::Infallible>(copy)
        })))
    };

    let readers: Vec<_> = (0..4)
        .map(|i| {
            let view = Arc::clone(&sorted_view);
            std::thread::spawn(move || {
                let sorted = view.value().expect("infallible");
                println!("reader {i} sees {sorted:?}");
                sorted
            })
        })
        .collect();

    let mut results = Vec::new();
    for reader in readers {
        results.push(reader.join().expect("reader thread panicked"));
    }

    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    println!(
        "\nsort ran {} time(s) for {} readers",
        derivations.load(Ordering::SeqCst),
        results.len()
    );
}
