use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use memmap2::{Mmap, MmapOptions};

use crate::PzipError;
use crate::telemetry::{self, profile, tags};
use crate::types::Result;

const PROFILE_TAG_STACK_MMAP: [&str; 2] = [tags::TAG_SYSTEM, tags::TAG_MMAP];

/// Read-only, memory-mapped view of a whole input file.
///
/// The mapping is established once in [`MmapInput::open`]; afterwards every
/// byte in `[0, len)` is addressable without further I/O. The view is not
/// `Clone`: exactly one worker owns it while encoding.
///
/// # Safety
///
/// The mapping is private and read-only, but the kernel does not prevent
/// another process from truncating or rewriting the file while it is mapped.
/// See the `memmap2` documentation for the platform-specific caveats.
///
/// # Example
/// ```no_run
/// use pzip_core::MmapInput;
/// use std::path::Path;
///
/// let input = MmapInput::open(Path::new("data.bin"))?;
/// let first = input.byte_at(0);
/// # Ok::<(), pzip_core::PzipError>(())
/// ```
#[derive(Debug)]
pub struct MmapInput {
    mmap: Option<Mmap>,
    path: PathBuf,
    len: u64,
}

impl MmapInput {
    /// Opens `path` read-only and maps its full current size.
    ///
    /// # Errors
    /// [`PzipError::NotFound`] or [`PzipError::PermissionDenied`] when the
    /// open fails with those kinds, [`PzipError::Io`] (with context) when
    /// the open, the size query, or the mapping fails otherwise.
    pub fn open(path: &Path) -> Result<Self> {
        let started_at = Instant::now();
        let result = Self::open_inner(path);
        let elapsed_us = profile::elapsed_us(started_at);

        telemetry::record_histogram(
            tags::METRIC_MMAP_OPEN_LATENCY_US,
            elapsed_us,
            &[("subsystem", "mmap"), ("op", "open")],
        );

        match &result {
            Ok(input) => {
                telemetry::increment_counter(
                    tags::METRIC_MMAP_OPEN_COUNT,
                    1,
                    &[("subsystem", "mmap"), ("op", "open")],
                );
                telemetry::increment_counter(
                    tags::METRIC_MMAP_MAPPED_BYTES,
                    input.len_u64(),
                    &[("subsystem", "mmap"), ("op", "open")],
                );
                profile::event(
                    tags::PROFILE_MMAP,
                    &PROFILE_TAG_STACK_MMAP,
                    "open",
                    "ok",
                    elapsed_us,
                    "mmap open completed",
                );
                tracing::debug!(
                    path = %path.display(),
                    len = input.len_u64(),
                    elapsed_us,
                    "mapped input"
                );
            }
            Err(error) => {
                telemetry::increment_counter(
                    tags::METRIC_MMAP_OPEN_FAIL_COUNT,
                    1,
                    &[("subsystem", "mmap"), ("op", "open"), ("result", "error")],
                );
                profile::event(
                    tags::PROFILE_MMAP,
                    &PROFILE_TAG_STACK_MMAP,
                    "open",
                    "error",
                    elapsed_us,
                    "mmap open failed",
                );
                tracing::debug!(path = %path.display(), %error, "failed to map input");
            }
        }

        result
    }

    fn open_inner(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|error| PzipError::from_open(path, error))?;
        let metadata = file.metadata().map_err(|error| {
            PzipError::Io(error).with_context(format!("failed to stat {}", path.display()))
        })?;
        if metadata.is_dir() {
            let error = io::Error::new(io::ErrorKind::IsADirectory, "is a directory");
            return Err(PzipError::Io(error).with_context(format!("cannot map {}", path.display())));
        }

        // Mapping zero bytes is an error on most platforms.
        let mmap = if metadata.len() == 0 {
            None
        } else {
            let map = unsafe { MmapOptions::new().map(&file) }.map_err(|error| {
                PzipError::Io(error).with_context(format!("failed to map {}", path.display()))
            })?;
            Some(map)
        };
        // The file may have changed size since `metadata`; trust the mapping.
        let len = mmap.as_ref().map_or(0, |map| map.len() as u64);

        Ok(Self {
            mmap,
            path: path.to_path_buf(),
            len,
        })
    }

    /// Path the view was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the mapping, captured when the view was acquired.
    pub fn len_u64(&self) -> u64 {
        self.len
    }

    /// File length as a usize, clamped to `usize::MAX`.
    pub fn len(&self) -> usize {
        self.len.min(usize::MAX as u64) as usize
    }

    /// True for zero-length files, which are never mapped.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The whole mapped content.
    pub fn as_slice(&self) -> &[u8] {
        match &self.mmap {
            Some(map) => &map[..],
            None => &[],
        }
    }

    /// Borrows `[start, end)` of the mapping without copying.
    ///
    /// # Errors
    /// Returns [`PzipError::InvalidRange`] if `start > end` or `end` lies
    /// past the mapped bytes.
    pub fn slice(&self, start: u64, end: u64) -> Result<&[u8]> {
        let (start, end) = self.validate_range(start, end)?;
        Ok(&self.as_slice()[start..end])
    }

    /// Byte at `offset`, or `None` past the end of the file.
    pub fn byte_at(&self, offset: u64) -> Option<u8> {
        let offset = usize::try_from(offset).ok()?;
        self.as_slice().get(offset).copied()
    }

    fn validate_range(&self, start: u64, end: u64) -> Result<(usize, usize)> {
        let invalid = || PzipError::InvalidRange {
            start,
            end,
            len: self.len,
        };
        let start = usize::try_from(start).map_err(|_| invalid())?;
        let end = usize::try_from(end).map_err(|_| invalid())?;
        if start > end || end > self.as_slice().len() {
            return Err(invalid());
        }
        Ok((start, end))
    }
}

impl AsRef<[u8]> for MmapInput {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
