//! Digest and Persist Demo
//!
//! The file/temp-resource call shape: one byte source consumed more than
//! once - hashed AND persisted - while the origin itself is drained a
//! single time. The tape captures the stream on the first open; the digest
//! pass and the persist pass each get an independent, fully-readable view.

use std::io::{Read, Write};

use sha2::{Digest, Sha256};

use memotape_bytes::{ByteSource, MemSource, SharedTapeSource, SourceResult};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn main() -> SourceResult<()> {
    println!("=== memotape Digest and Persist Demo ===\n");

    // Stands in for a single-pass origin (socket, pipe, process output).
    let origin = MemSource::new(b"payload worth keeping".to_vec());
    let tape = SharedTapeSource::new(origin);

    // Pass 1: hash the stream.
    let mut hasher = Sha256::new();
    let mut stream = tape.open()?;
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        hasher.update(&chunk[..n]);
    }
    let digest = hasher.finalize();
    println!("sha256: {}", hex(digest.as_slice()));

    // Pass 2: persist the same bytes, replayed from the tape.
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("payload.bin");
    let mut out = std::fs::File::create(&path)?;
    let mut persisted = Vec::new();
    tape.open()?.read_to_end(&mut persisted)?;
    out.write_all(&persisted)?;
    println!("persisted {} bytes to {}", persisted.len(), path.display());

    assert!(tape.is_filled());
    println!("\norigin drained once; both passes read the tape");
    Ok(())
}
