use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, LineParseError, Result};

/// Error that occurs when opening a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open file `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use cgroup_quota::fsutil;
/// let reader = fsutil::open_file_reader("/proc/self/cgroup")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Lexically normalizes a path: drops `.` components, resolves `..` against the
/// preceding component and collapses repeated separators.
///
/// `..` never climbs above the root of an absolute path. No filesystem access is
/// performed, so symlinks are not resolved.
pub fn clean_path(path: impl AsRef<Path>) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                Some(Component::ParentDir) | Some(Component::CurDir) | None => {
                    cleaned.push("..");
                }
            },
            other => cleaned.push(other.as_os_str()),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Streams the file at `path` line by line, handing every line to `parse` and every
/// parsed record to `sink`.
///
/// Lines are decoded lossily: procfs passes most bytes of mount points and cgroup names
/// through unescaped, so invalid UTF-8 becomes U+FFFD instead of failing the scan.
/// Trailing line terminators are stripped before parsing. Scanning stops at the first
/// parse, sink or read error, which is returned. The file handle is dropped on every
/// exit path.
///
/// # Errors
///
/// - [`Error::FileOpen`] if the file cannot be opened.
/// - [`Error::ReadLine`] if reading a line fails.
/// - [`Error::Parse`] if `parse` rejects a line.
/// - Any error returned by `sink`.
pub fn scan_lines<T, E>(
    path: impl AsRef<Path>,
    mut parse: impl FnMut(&str) -> std::result::Result<T, E>,
    mut sink: impl FnMut(T) -> Result<()>,
) -> Result<()>
where
    E: Into<LineParseError>,
{
    let path = clean_path(path);
    let mut reader = open_file_reader(&path)?;
    let mut buf = Vec::with_capacity(256);

    while read_line_lossy(&mut reader, &mut buf).map_err(|source| Error::ReadLine {
        path: path.clone(),
        source,
    })? {
        let line = String::from_utf8_lossy(&buf);
        let record = parse(line.trim_end_matches(['\n', '\r'])).map_err(|source| {
            Error::Parse {
                path: path.clone(),
                source: source.into(),
            }
        })?;
        sink(record)?;
    }

    Ok(())
}

/// Reads the next line of `reader` into `buf` as raw bytes, replacing its previous
/// contents. Returns `false` at end of file.
pub(crate) fn read_line_lossy<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<bool> {
    buf.clear();
    Ok(reader.read_until(b'\n', buf)? != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mountinfo::{self, MountInfo};
    use std::io::Write;

    #[test]
    fn test_open_file_reader_success() {
        let tmp = tempfile::NamedTempFile::new().expect("failed to create temp file");
        let path = tmp.path();
        let reader = open_file_reader(path).expect("should open test file");
        let metadata = reader.get_ref().metadata().unwrap();
        assert!(metadata.is_file());
    }

    #[test]
    fn test_open_file_reader_error() {
        let result = open_file_reader("/definitely/does/not/exist");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.path, PathBuf::from("/definitely/does/not/exist"));
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/a/b/../c"), PathBuf::from("/a/c"));
        assert_eq!(clean_path("/a/./b//c/"), PathBuf::from("/a/b/c"));
        assert_eq!(clean_path("/../../etc"), PathBuf::from("/etc"));
        assert_eq!(clean_path("a/../../b"), PathBuf::from("../b"));
        assert_eq!(clean_path("a/.."), PathBuf::from("."));
        assert_eq!(clean_path(""), PathBuf::from("."));
    }

    #[test]
    fn test_scan_lines_feeds_every_record_to_sink() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp,
            "36 25 0:32 / /sys rw - sysfs sysfs rw\n25 1 0:24 / /proc rw,relatime - proc proc rw"
        )
        .unwrap();

        let mut seen = Vec::new();
        scan_lines(tmp.path(), mountinfo::parse_mount_info_line, |mi: MountInfo| {
            seen.push(mi.mount_point);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, vec!["/sys".to_string(), "/proc".to_string()]);
    }

    #[test]
    fn test_scan_lines_stops_at_first_parse_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "36 25 0:32 / /sys rw - sysfs sysfs rw").unwrap();
        writeln!(tmp, "garbage").unwrap();
        writeln!(tmp, "25 1 0:24 / /proc rw,relatime - proc proc rw").unwrap();

        let mut count = 0;
        let err = scan_lines(tmp.path(), mountinfo::parse_mount_info_line, |_| {
            count += 1;
            Ok(())
        })
        .unwrap_err();

        assert_eq!(count, 1);
        match err {
            Error::Parse { path, .. } => assert_eq!(path, tmp.path()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_scan_lines_propagates_sink_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "36 25 0:32 / /sys rw - sysfs sysfs rw").unwrap();
        writeln!(tmp, "25 1 0:24 / /proc rw,relatime - proc proc rw").unwrap();

        let mut count = 0;
        let err = scan_lines(tmp.path(), mountinfo::parse_mount_info_line, |_| {
            count += 1;
            Err(Error::UnexpectedEof {
                path: PathBuf::from("/sink"),
            })
        })
        .unwrap_err();

        assert_eq!(count, 1);
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }

    #[test]
    fn test_scan_lines_decodes_invalid_utf8_lossily() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"50 25 8:1 / /mnt/caf\xe9 rw - ext4 /dev/sda1 rw\n")
            .unwrap();
        tmp.write_all(b"25 1 0:24 / /proc rw,relatime - proc proc rw\n")
            .unwrap();

        let mut seen = Vec::new();
        scan_lines(tmp.path(), mountinfo::parse_mount_info_line, |mi: MountInfo| {
            seen.push(mi.mount_point);
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, vec!["/mnt/caf\u{FFFD}".to_string(), "/proc".to_string()]);
    }

    #[test]
    fn test_scan_lines_missing_file() {
        let err = scan_lines(
            "/definitely/does/not/exist",
            mountinfo::parse_mount_info_line,
            |_| Ok(()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileOpen(_)));
    }
}
