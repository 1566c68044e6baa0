#![allow(dead_code)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pzip_core::Run;
use pzip_core::format::BINARY_RECORD_SIZE;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn write_fixture(dir: &Path, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// Splits binary sink output back into runs.
pub fn parse_binary_records(bytes: &[u8]) -> Vec<Run> {
    assert_eq!(
        bytes.len() % BINARY_RECORD_SIZE,
        0,
        "output is not a whole number of records"
    );
    bytes
        .chunks_exact(BINARY_RECORD_SIZE)
        .map(|record| {
            let count = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
            Run::new(record[4], u64::from(count))
        })
        .collect()
}

/// Keeps the runs whose byte value belongs to `alphabet`, in output order.
pub fn runs_in_alphabet(runs: &[Run], alphabet: &[u8]) -> Vec<Run> {
    runs.iter()
        .filter(|run| alphabet.contains(&run.value))
        .copied()
        .collect()
}

/// Deterministic bytes drawn from `alphabet`, with runs of varying length.
pub fn runny_bytes(len: usize, alphabet: &[u8], seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let value = alphabet[(state >> 33) as usize % alphabet.len()];
        let run = 1 + ((state >> 17) as usize % 9);
        for _ in 0..run.min(len - out.len()) {
            out.push(value);
        }
    }
    out
}

/// Writer that rejects any binary record carrying `poison` as its value.
#[derive(Debug, Default)]
pub struct PoisonByteWriter {
    pub poison: u8,
    pub accepted: Vec<u8>,
}

impl PoisonByteWriter {
    pub fn new(poison: u8) -> Self {
        Self {
            poison,
            accepted: Vec::new(),
        }
    }
}

impl Write for PoisonByteWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() == BINARY_RECORD_SIZE && buf[BINARY_RECORD_SIZE - 1] == self.poison {
            return Err(io::Error::other("poisoned record"));
        }
        self.accepted.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that accepts everything but fails to flush.
#[derive(Debug, Default)]
pub struct UnflushableWriter {
    pub accepted: Vec<u8>,
}

impl Write for UnflushableWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.accepted.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

/// Writer that panics on any binary record carrying `trigger` as its value.
#[derive(Debug, Default)]
pub struct PanickingWriter {
    pub trigger: u8,
    pub accepted: Vec<u8>,
}

impl PanickingWriter {
    pub fn new(trigger: u8) -> Self {
        Self {
            trigger,
            accepted: Vec::new(),
        }
    }
}

impl Write for PanickingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() == BINARY_RECORD_SIZE && buf[BINARY_RECORD_SIZE - 1] == self.trigger {
            panic!("writer bug");
        }
        self.accepted.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
