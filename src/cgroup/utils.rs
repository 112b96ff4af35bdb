use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};
use crate::fsutil;

use super::stats::SingleLineStat;

/// Opens the stat file at `path` and parses it with `S`.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
///
/// - [`Error::FileOpen`] if the file exists but cannot be opened.
/// - [`Error::UnexpectedEof`] if the file is empty.
/// - [`Error::Stat`] if reading or parsing the value fails.
pub(crate) fn read_stat_file<S: SingleLineStat>(path: impl AsRef<Path>) -> Result<Option<S>> {
    let path = fsutil::clean_path(path);
    let mut reader = match fsutil::open_file_reader(&path) {
        Ok(reader) => reader,
        Err(err) if err.source.kind() == ErrorKind::NotFound => {
            log::trace!("stat file `{}` does not exist", path.display());
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    match S::from_reader(&mut reader) {
        Ok(stat) => Ok(Some(stat)),
        Err(source) if source.kind() == ErrorKind::UnexpectedEof => {
            Err(Error::UnexpectedEof { path })
        }
        Err(source) => Err(Error::Stat { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgroup::stats::MemoryUsage;

    #[test]
    fn test_read_stat_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let stat = read_stat_file::<MemoryUsage>(dir.path().join("memory.current")).unwrap();
        assert_eq!(stat, None);
    }

    #[test]
    fn test_read_stat_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.current");
        std::fs::write(&path, "4096\n").unwrap();

        let stat = read_stat_file::<MemoryUsage>(&path).unwrap();
        assert_eq!(stat, Some(MemoryUsage { usage_bytes: 4096 }));
    }

    #[test]
    fn test_read_stat_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.current");

        std::fs::write(&path, "").unwrap();
        let err = read_stat_file::<MemoryUsage>(&path).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));

        std::fs::write(&path, "garbage\n").unwrap();
        match read_stat_file::<MemoryUsage>(&path).unwrap_err() {
            Error::Stat { path: err_path, source } => {
                assert_eq!(err_path, path);
                assert_eq!(source.kind(), ErrorKind::InvalidData);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
