use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PzipError;

pub type Result<T> = std::result::Result<T, PzipError>;

/// A maximal repetition of one byte value.
///
/// `count` is always at least 1. The encoder never caps it; wire formats
/// with a fixed-width length field split long runs when serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
    pub value: u8,
    pub count: u64,
}

impl Run {
    /// `count` must be non-zero.
    pub fn new(value: u8, count: u64) -> Self {
        debug_assert!(count > 0, "run length must be at least 1");
        Self { value, count }
    }

    /// Expands the run back into `count` copies of `value`, appending to `out`.
    pub fn expand_into(&self, out: &mut Vec<u8>) {
        let count = usize::try_from(self.count).unwrap_or(usize::MAX);
        out.resize(out.len().saturating_add(count), self.value);
    }
}

/// Converts a duration to whole microseconds, clamped to `u64::MAX`.
#[inline]
pub fn duration_to_us(duration: Duration) -> u64 {
    duration.as_micros().min(u64::MAX as u128) as u64
}
