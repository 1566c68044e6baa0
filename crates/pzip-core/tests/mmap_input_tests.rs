use std::io::Write;

use pzip_core::{MmapInput, PzipError};
use tempfile::NamedTempFile;

#[test]
fn maps_whole_file_for_random_access() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    let data = b"hello memory map";
    file.write_all(data)?;
    file.flush()?;

    let input = MmapInput::open(file.path())?;
    assert_eq!(input.path(), file.path());
    assert_eq!(input.len_u64(), data.len() as u64);
    assert_eq!(input.len(), data.len());
    assert!(!input.is_empty());
    assert_eq!(input.as_slice(), data);

    assert_eq!(input.byte_at(0), Some(b'h'));
    assert_eq!(input.byte_at(15), Some(b'p'));
    assert_eq!(input.byte_at(16), None);
    assert_eq!(input.slice(6, 12)?, b"memory");

    Ok(())
}

#[test]
fn empty_file_maps_to_empty_view() -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new()?;
    let input = MmapInput::open(file.path())?;

    assert!(input.is_empty());
    assert_eq!(input.len_u64(), 0);
    assert!(input.as_slice().is_empty());
    assert_eq!(input.slice(0, 0)?.len(), 0);
    assert_eq!(input.byte_at(0), None);

    Ok(())
}

#[test]
fn invalid_ranges_return_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"abc")?;
    file.flush()?;

    let input = MmapInput::open(file.path())?;
    assert!(input.slice(3, 2).is_err());
    assert!(input.slice(2, 4).is_err());
    match input.slice(10, 11) {
        Err(PzipError::InvalidRange { start, end, len }) => {
            assert_eq!((start, end, len), (10, 11, 3));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    Ok(())
}

#[test]
fn missing_file_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.bin");

    match MmapInput::open(&path) {
        Err(PzipError::NotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("unexpected result: {other:?}"),
    }

    Ok(())
}

#[test]
fn directory_is_reported_as_io_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    let error = MmapInput::open(dir.path()).expect_err("directories cannot be mapped");
    assert!(!matches!(error, PzipError::NotFound { .. }));
    assert!(error.to_string().contains(&dir.path().display().to_string()));

    Ok(())
}
