use std::io;
use std::path::{Path, PathBuf};

use pzip_core::PzipError;

#[test]
fn converts_io_error() {
    let io_error = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
    let error: PzipError = io_error.into();

    match error {
        PzipError::Io(err) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn converts_anyhow_error() {
    let error: PzipError = anyhow::anyhow!("boom").into();

    match error {
        PzipError::Other(err) => assert_eq!(err.to_string(), "boom"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn classifies_open_failures_per_file() {
    let path = Path::new("inputs/a.txt");

    let missing = PzipError::from_open(path, io::Error::from(io::ErrorKind::NotFound));
    assert!(matches!(&missing, PzipError::NotFound { path: p } if p == &PathBuf::from("inputs/a.txt")));
    assert_eq!(missing.kind_label(), "not_found");
    assert_eq!(missing.to_string(), "inputs/a.txt: no such file or directory");

    let denied = PzipError::from_open(path, io::Error::from(io::ErrorKind::PermissionDenied));
    assert!(matches!(denied, PzipError::PermissionDenied { .. }));

    let other = PzipError::from_open(path, io::Error::other("weird"));
    assert_eq!(other.kind_label(), "io");
    assert!(other.to_string().starts_with("failed to open inputs/a.txt"));
}

#[test]
fn attaches_context() {
    let error = PzipError::WorkerPanicked("boom".into()).with_context("while emitting");

    match error {
        PzipError::Context { context, source } => {
            assert_eq!(context, "while emitting");
            assert!(matches!(*source, PzipError::WorkerPanicked(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
