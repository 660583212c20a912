//! Configuration for tape buffers.

use serde::{Deserialize, Serialize};

/// Configuration for a tape's capture buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeConfig {
    /// Capacity the capture buffer is allocated with before the drain.
    pub initial_capacity: usize,
    /// Hard bound on captured bytes; a drain that would exceed it fails
    /// without publishing anything. `None` means unbounded.
    pub max_bytes: Option<u64>,
}

impl Default for TapeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 8 * 1024,
            max_bytes: None,
        }
    }
}

impl TapeConfig {
    /// Create a tape config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capture buffer's initial capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Bound the captured byte count.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tape_config_builder() {
        let config = TapeConfig::new()
            .with_initial_capacity(512)
            .with_max_bytes(1 << 20);

        assert_eq!(config.initial_capacity, 512);
        assert_eq!(config.max_bytes, Some(1 << 20));
    }

    #[test]
    fn test_tape_config_default_is_unbounded() {
        let config = TapeConfig::default();
        assert_eq!(config.max_bytes, None);
        assert!(config.initial_capacity > 0);
    }

    #[test]
    fn test_tape_config_serde_roundtrip() {
        let config = TapeConfig::new().with_max_bytes(4096);
        let json = serde_json::to_string(&config).unwrap();
        let back: TapeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
