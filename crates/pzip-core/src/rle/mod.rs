//! Run-length encoding of byte buffers.

use std::iter::FusedIterator;

use crate::types::Run;

/// Lazily scans a buffer left to right and yields one [`Run`] per maximal
/// repetition of a byte.
///
/// Without a cap, adjacent runs never share a value and expanding every run
/// in order reproduces the input exactly. With [`RunEncoder::with_max_run`],
/// a repetition longer than the cap is yielded as several consecutive runs
/// of at most `max_run` bytes each.
#[derive(Debug, Clone)]
pub struct RunEncoder<'a> {
    data: &'a [u8],
    cursor: usize,
    max_run: u64,
}

impl<'a> RunEncoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: 0,
            max_run: u64::MAX,
        }
    }

    /// Caps the length of each emitted run. A cap of zero is treated as one.
    pub fn with_max_run(data: &'a [u8], max_run: u64) -> Self {
        Self {
            data,
            cursor: 0,
            max_run: max_run.max(1),
        }
    }

    /// Number of input bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Bytes not yet scanned.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.cursor..]
    }
}

impl Iterator for RunEncoder<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let rest = self.remaining();
        let &value = rest.first()?;

        let limit = usize::try_from(self.max_run).unwrap_or(usize::MAX);
        let window = &rest[..rest.len().min(limit)];
        let count = window
            .iter()
            .position(|&byte| byte != value)
            .unwrap_or(window.len());

        self.cursor += count;
        Some(Run::new(value, count as u64))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.data.len() - self.cursor;
        (usize::from(rest > 0), Some(rest))
    }
}

impl FusedIterator for RunEncoder<'_> {}

/// Encodes a whole buffer eagerly.
///
/// Workers stream through [`RunEncoder`] instead; this is for callers that
/// want the full sequence in hand.
pub fn encode(data: &[u8]) -> Vec<Run> {
    RunEncoder::new(data).collect()
}

/// Expands runs back into bytes.
pub fn expand<'r>(runs: impl IntoIterator<Item = &'r Run>) -> Vec<u8> {
    let mut out = Vec::new();
    for run in runs {
        run.expand_into(&mut out);
    }
    out
}
