use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PzipError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{}: no such file or directory", path.display())]
    NotFound { path: PathBuf },
    #[error("{}: permission denied", path.display())]
    PermissionDenied { path: PathBuf },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid range {start}..{end} for input of {len} bytes")]
    InvalidRange { start: u64, end: u64, len: u64 },
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<PzipError>,
    },
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PzipError {
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Classifies a failed `open` of `path` into the per-file error kinds.
    pub fn from_open(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io(error).with_context(format!("failed to open {}", path.display())),
        }
    }

    /// Short machine-friendly label used in logs and diagnostics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::Io(_) => "io",
            Self::InvalidRange { .. } => "invalid_range",
            Self::WorkerPanicked(_) => "worker_panicked",
            Self::Context { source, .. } => source.kind_label(),
            Self::Other(_) => "other",
        }
    }
}
