//! Parse configuration
//!
//! This module provides the options that control how a heap dump is mapped and how strictly
//! its record stream is interpreted.

use crate::{
    file::{DEFAULT_PADDING, DEFAULT_SHARD_SIZE},
    Error, Result,
};

/// Configuration for parsing a heap dump
///
/// The shard settings only affect how the file is mapped, never what is parsed: any valid
/// `shard_size` / `padding` combination yields the same snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Primary window length in bytes (default: 1 GiB)
    pub shard_size: usize,

    /// Overlap between adjacent windows in bytes, must be smaller than `shard_size`
    /// (default: 1 KiB)
    pub padding: usize,

    /// Skip top-level records with unknown tags (with a warning) instead of failing
    pub skip_unknown_records: bool,

    /// Decode instance field values during resolution
    ///
    /// When disabled, instances keep their raw field bytes only. Object references inside
    /// that data are then neither resolved nor reported as dangling.
    pub resolve_fields: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            shard_size: DEFAULT_SHARD_SIZE,
            padding: DEFAULT_PADDING,
            skip_unknown_records: false,
            resolve_fields: true,
        }
    }
}

impl ParseOptions {
    /// Creates a configuration that tolerates unknown top-level records
    ///
    /// Dumps written by newer or vendor-specific runtimes may carry record kinds this parser
    /// does not know; they are skipped and reported as diagnostics.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            skip_unknown_records: true,
            ..Self::default()
        }
    }

    /// Creates a default configuration with explicit window geometry
    #[must_use]
    pub fn sharded(shard_size: usize, padding: usize) -> Self {
        Self {
            shard_size,
            padding,
            ..Self::default()
        }
    }

    /// Checks the window geometry
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidOptions`] if `shard_size` is zero or `padding` is not
    /// smaller than `shard_size`.
    pub fn validate(&self) -> Result<()> {
        if self.shard_size == 0 {
            return Err(Error::InvalidOptions(
                "shard size must be non-zero".to_string(),
            ));
        }
        if self.padding >= self.shard_size {
            return Err(Error::InvalidOptions(format!(
                "padding ({}) must be smaller than the shard size ({})",
                self.padding, self.shard_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParseOptions::default();
        assert_eq!(config.shard_size, 1 << 30);
        assert_eq!(config.padding, 1024);
        assert!(!config.skip_unknown_records);
        assert!(config.resolve_fields);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let lenient = ParseOptions::lenient();
        assert!(lenient.skip_unknown_records);
        assert_eq!(lenient.shard_size, ParseOptions::default().shard_size);

        let sharded = ParseOptions::sharded(4096, 128);
        assert_eq!(sharded.shard_size, 4096);
        assert_eq!(sharded.padding, 128);
        assert!(!sharded.skip_unknown_records);
    }

    #[test]
    fn test_validation() {
        assert!(ParseOptions::sharded(9973, 8).validate().is_ok());
        assert!(ParseOptions::sharded(1, 0).validate().is_ok());
        assert!(matches!(
            ParseOptions::sharded(0, 0).validate(),
            Err(Error::InvalidOptions(_))
        ));
        assert!(matches!(
            ParseOptions::sharded(128, 128).validate(),
            Err(Error::InvalidOptions(_))
        ));
    }
}
