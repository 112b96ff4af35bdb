use std::path::Path;

use crate::error::{Error, Result};
use crate::fsutil;

/// Substrings of `/proc/self/cgroup` that only appear inside a container.
const CONTAINER_CGROUP_MARKERS: &[&str] = &[":/docker/", ":/kubepods/"];

/// Returns true if the Docker marker file (usually `/.dockerenv`) exists.
///
/// # Errors
///
/// Returns [`Error::ExistenceCheck`] if checking the existence of the file fails.
pub fn has_dockerenv(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    path.try_exists().map_err(|source| Error::ExistenceCheck {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns true if the given `cgroup` file places the process in a Docker or
/// Kubernetes group.
///
/// # Errors
///
/// * [`Error::FileOpen`] if the file cannot be opened.
/// * [`Error::ReadLine`] if a line from the file cannot be read.
pub fn matches_container_cgroup(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let mut reader = fsutil::open_file_reader(path)?;
    let mut buf = Vec::with_capacity(256);

    while fsutil::read_line_lossy(&mut reader, &mut buf).map_err(|source| Error::ReadLine {
        path: path.to_path_buf(),
        source,
    })? {
        let line = String::from_utf8_lossy(&buf);
        if CONTAINER_CGROUP_MARKERS
            .iter()
            .any(|marker| line.contains(marker))
        {
            return Ok(true);
        }
    }

    Ok(false)
}
