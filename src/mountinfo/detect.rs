use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fsutil;

use super::parser::{MountInfo, parse_mount_info_line};

/// Filesystem type of a cgroup v1 controller hierarchy.
pub const CGROUP_FS_TYPE: &str = "cgroup";
/// Filesystem type of the cgroup v2 unified hierarchy.
pub const CGROUP2_FS_TYPE: &str = "cgroup2";
/// Canonical mount point of the cgroup v2 unified hierarchy.
pub const CGROUP2_MOUNT_POINT: &str = "/sys/fs/cgroup";

/// Calls `sink` for every record of the given `mountinfo` file.
///
/// # Errors
///
/// Returns the first open, read or parse error, or the first error returned by `sink`.
pub fn for_each_mount_info(
    path: impl AsRef<Path>,
    sink: impl FnMut(MountInfo) -> Result<()>,
) -> Result<()> {
    fsutil::scan_lines(path, parse_mount_info_line, sink)
}

/// Reports whether the host presents a cgroup v2 unified hierarchy.
///
/// Returns `true` iff the `mountinfo` file at `path` contains a `cgroup2` mount at
/// `/sys/fs/cgroup`. Hybrid layouts that mount `cgroup2` elsewhere yield `false`.
///
/// # Errors
///
/// Returns any I/O or parse error encountered while scanning the file.
///
/// # Example
///
/// ```no_run
/// use cgroup_quota::mountinfo::is_cgroup_v2;
///
/// let unified = is_cgroup_v2("/proc/self/mountinfo").unwrap();
/// println!("cgroup v2: {unified}");
/// ```
pub fn is_cgroup_v2(path: impl AsRef<Path>) -> Result<bool> {
    let mut unified = false;
    for_each_mount_info(path, |mount_info| {
        if mount_info.fs_type == CGROUP2_FS_TYPE && mount_info.mount_point == CGROUP2_MOUNT_POINT {
            unified = true;
        }
        Ok(())
    })?;

    Ok(unified)
}

/// Detects the cgroup v2 mount point by parsing a Linux `mountinfo` file.
///
/// If multiple `cgroup2` entries exist, the first one is returned.
///
/// # Errors
///
/// - [`Error::FileOpen`] if the file can't be opened.
/// - [`Error::ReadLine`] if reading from the file fails.
/// - [`Error::Parse`] if parsing any line fails.
/// - [`Error::MissingCgroup2Mount`] if no `cgroup2` mount is found.
pub fn detect_cgroup2_mount_point(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut mount_point = None;

    for_each_mount_info(path, |mount_info| {
        if mount_point.is_none() && mount_info.fs_type == CGROUP2_FS_TYPE {
            log::debug!(
                "Found `cgroup2` mount point with root `{}`: {}",
                mount_info.root,
                mount_info.mount_point
            );
            mount_point = Some(PathBuf::from(mount_info.mount_point));
        }
        Ok(())
    })?;

    mount_point.ok_or_else(|| Error::MissingCgroup2Mount {
        path: path.to_path_buf(),
    })
}
