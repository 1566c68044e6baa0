//! Wire encodings for a single [`Run`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Run;

/// Size of one binary record: a little-endian `u32` count then the byte.
pub const BINARY_RECORD_SIZE: usize = 5;
/// Longest run a single binary record can carry.
pub const MAX_BINARY_RUN: u64 = u32::MAX as u64;

/// How each run is laid out in the output artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunFormat {
    /// Fixed-width records: `count: u32 LE` followed by `value: u8`.
    ///
    /// Runs longer than [`MAX_BINARY_RUN`] become several records.
    #[default]
    Binary,
    /// Legacy debug form: the literal byte followed by its decimal count,
    /// with no delimiter between records. Not unambiguously decodable.
    Text,
}

impl RunFormat {
    /// Appends the complete encoding of `run` to `out` and returns the
    /// number of bytes appended.
    pub fn encode_into(self, run: &Run, out: &mut Vec<u8>) -> usize {
        let before = out.len();
        match self {
            Self::Binary => {
                let mut remaining = run.count;
                while remaining > 0 {
                    let chunk = remaining.min(MAX_BINARY_RUN);
                    out.extend_from_slice(&(chunk as u32).to_le_bytes());
                    out.push(run.value);
                    remaining -= chunk;
                }
            }
            Self::Text => {
                out.push(run.value);
                out.extend_from_slice(run.count.to_string().as_bytes());
            }
        }
        out.len() - before
    }

    /// Upper bound on the encoded size of `run`, used to size scratch space.
    pub fn max_encoded_len(self, run: &Run) -> usize {
        match self {
            Self::Binary => {
                let records = run.count.div_ceil(MAX_BINARY_RUN).max(1);
                usize::try_from(records)
                    .unwrap_or(usize::MAX)
                    .saturating_mul(BINARY_RECORD_SIZE)
            }
            // One byte for the value plus at most 20 decimal digits.
            Self::Text => 21,
        }
    }

    /// Lowercase name accepted by `--format`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for RunFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `binary`/`bin` and `text`/`txt`, ignoring case.
impl FromStr for RunFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(Self::Binary),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!("unknown run format '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_record_layout() {
        let mut out = Vec::new();
        let written = RunFormat::Binary.encode_into(&Run::new(b'x', 258), &mut out);
        assert_eq!(written, BINARY_RECORD_SIZE);
        assert_eq!(out, vec![0x02, 0x01, 0x00, 0x00, b'x']);
    }

    #[test]
    fn binary_splits_runs_longer_than_u32() {
        let run = Run::new(7, MAX_BINARY_RUN + 3);
        let mut out = Vec::new();
        let written = RunFormat::Binary.encode_into(&run, &mut out);

        assert_eq!(written, 2 * BINARY_RECORD_SIZE);
        assert_eq!(written, RunFormat::Binary.max_encoded_len(&run));
        assert_eq!(&out[..4], &u32::MAX.to_le_bytes());
        assert_eq!(out[4], 7);
        assert_eq!(&out[5..9], &3u32.to_le_bytes());
        assert_eq!(out[9], 7);
    }

    #[test]
    fn text_record_is_byte_then_decimal() {
        let mut out = Vec::new();
        RunFormat::Text.encode_into(&Run::new(b'a', 3), &mut out);
        RunFormat::Text.encode_into(&Run::new(b'b', 12), &mut out);
        assert_eq!(out, b"a3b12");
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("binary".parse::<RunFormat>(), Ok(RunFormat::Binary));
        assert_eq!(" TEXT ".parse::<RunFormat>(), Ok(RunFormat::Text));
        assert!("csv".parse::<RunFormat>().is_err());
    }
}
