//! Output size ceiling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bytes per kilobyte used for every budget comparison.
pub const BYTES_PER_KILOBYTE: u64 = 1024;

/// Maximum acceptable size of a re-encoded image, in kilobytes.
///
/// Read-only once configured. Comparisons scale the candidate size into
/// kilobytes and accept ties, so a buffer of exactly
/// `max_kilobytes * 1024` bytes fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBudget {
    max_kilobytes: u32,
}

impl SizeBudget {
    /// The reference ceiling: 800 KB.
    pub const DEFAULT_KILOBYTES: u32 = 800;

    /// Create a budget of `max_kilobytes` KB.
    pub const fn from_kilobytes(max_kilobytes: u32) -> Self {
        Self { max_kilobytes }
    }

    /// Ceiling in kilobytes.
    pub fn max_kilobytes(&self) -> u32 {
        self.max_kilobytes
    }

    /// Ceiling in bytes.
    pub fn max_bytes(&self) -> u64 {
        u64::from(self.max_kilobytes) * BYTES_PER_KILOBYTE
    }

    /// Whether a buffer of `size_bytes` bytes satisfies the budget.
    pub fn fits(&self, size_bytes: usize) -> bool {
        size_bytes as f64 / BYTES_PER_KILOBYTE as f64 <= f64::from(self.max_kilobytes)
    }
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self::from_kilobytes(Self::DEFAULT_KILOBYTES)
    }
}

impl fmt::Display for SizeBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} KB", self.max_kilobytes)
    }
}
