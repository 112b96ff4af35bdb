use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fsutil;
use crate::mountinfo::{self, CGROUP_FS_TYPE, MountInfo};

use super::parser::{CGroupEntry, parse_cgroup_line};
use super::stats::{CfsPeriod, CfsQuota, MemoryLimitInBytes, MemoryUsage, SingleLineStat};
use super::utils::read_stat_file;

/// Name of the CPU bandwidth controller.
pub const CPU_SUBSYSTEM: &str = "cpu";
/// Name of the memory controller.
pub const MEMORY_SUBSYSTEM: &str = "memory";

const CPU_CFS_QUOTA_US: &str = "cpu.cfs_quota_us";
const CPU_CFS_PERIOD_US: &str = "cpu.cfs_period_us";
const MEMORY_LIMIT_IN_BYTES: &str = "memory.limit_in_bytes";
const MEMORY_USAGE_IN_BYTES: &str = "memory.usage_in_bytes";

/// A cgroup directory as seen from the current mount namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CGroup {
    path: PathBuf,
}

impl CGroup {
    /// Binds a handle to the cgroup directory at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the directory holding the attribute files of this cgroup.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the attribute file `param` inside this cgroup.
    pub fn param_path(&self, param: &str) -> PathBuf {
        self.path.join(param)
    }

    /// Reads and parses the attribute file `param`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn read_stat<S: SingleLineStat>(&self, param: &str) -> Result<Option<S>> {
        read_stat_file(self.param_path(param))
    }
}

/// Mapping from cgroup v1 controller name to the cgroup directory of the current process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CGroups {
    subsystems: HashMap<String, CGroup>,
}

impl CGroups {
    /// Builds the controller map from a `mountinfo` and a `cgroup` file of the same process.
    ///
    /// Every `cgroup` (v1) mount contributes one entry per super option naming a controller
    /// listed in the `cgroup` file. The group path of that controller is translated from
    /// the root of the mounted hierarchy to a path under the mount point. A later mount of
    /// the same controller overwrites an earlier one.
    ///
    /// # Errors
    ///
    /// - Any open, read or parse error of either file.
    /// - [`Error::PathNotExposedFromMountPoint`] if a group lies outside of the root its
    ///   hierarchy is mounted from.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cgroup_quota::cgroup::CGroups;
    ///
    /// let cgroups = CGroups::new("/proc/self/mountinfo", "/proc/self/cgroup").unwrap();
    /// if let Some(cpu) = cgroups.get("cpu") {
    ///     println!("cpu controller at {}", cpu.path().display());
    /// }
    /// ```
    pub fn new(mountinfo_path: impl AsRef<Path>, cgroup_path: impl AsRef<Path>) -> Result<Self> {
        let entries = read_cgroup_entries(cgroup_path)?;
        let mut subsystems = HashMap::new();

        mountinfo::for_each_mount_info(mountinfo_path, |mount_info| {
            if mount_info.fs_type != CGROUP_FS_TYPE {
                return Ok(());
            }

            for option in &mount_info.super_options {
                let Some(entry) = entries.get(option) else {
                    continue;
                };
                let path = host_path(&mount_info, &entry.name)?;
                log::debug!("cgroup controller `{option}` mapped to `{}`", path.display());
                subsystems.insert(option.clone(), CGroup::new(path));
            }
            Ok(())
        })?;

        Ok(Self { subsystems })
    }

    /// Returns the cgroup bound to `subsystem`, if any.
    pub fn get(&self, subsystem: &str) -> Option<&CGroup> {
        self.subsystems.get(subsystem)
    }

    pub fn len(&self) -> usize {
        self.subsystems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsystems.is_empty()
    }

    /// Iterates over all `(controller, cgroup)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CGroup)> {
        self.subsystems
            .iter()
            .map(|(name, cgroup)| (name.as_str(), cgroup))
    }

    /// Reads the CFS bandwidth of the `cpu` controller as a number of CPU core equivalents.
    ///
    /// Returns `Ok(None)` if the controller is not mounted, either file is missing, the
    /// quota is unset (`<= 0`) or the period is not positive.
    pub fn cpu_quota(&self) -> Result<Option<f64>> {
        let Some(cpu) = self.get(CPU_SUBSYSTEM) else {
            return Ok(None);
        };

        let Some(quota_us) = cpu
            .read_stat::<CfsQuota>(CPU_CFS_QUOTA_US)?
            .and_then(|quota| quota.quota_us)
        else {
            return Ok(None);
        };

        let period_us = match cpu.read_stat::<CfsPeriod>(CPU_CFS_PERIOD_US)? {
            Some(period) if period.period_us > 0 => period.period_us,
            _ => return Ok(None),
        };

        Ok(Some(quota_us as f64 / period_us as f64))
    }

    /// Reads `memory.limit_in_bytes` of the `memory` controller.
    ///
    /// Returns `Ok(None)` if the controller is not mounted, the file is missing or the
    /// value means "unlimited".
    pub fn memory_limit(&self) -> Result<Option<i64>> {
        let Some(memory) = self.get(MEMORY_SUBSYSTEM) else {
            return Ok(None);
        };

        Ok(memory
            .read_stat::<MemoryLimitInBytes>(MEMORY_LIMIT_IN_BYTES)?
            .and_then(|limit| limit.limit_bytes))
    }

    /// Reads `memory.usage_in_bytes` of the `memory` controller.
    ///
    /// Returns `Ok(None)` if the controller is not mounted or the file is missing.
    pub fn memory_usage(&self) -> Result<Option<i64>> {
        let Some(memory) = self.get(MEMORY_SUBSYSTEM) else {
            return Ok(None);
        };

        Ok(memory
            .read_stat::<MemoryUsage>(MEMORY_USAGE_IN_BYTES)?
            .map(|usage| usage.usage_bytes))
    }
}

/// Reads a `cgroup` file into a map from controller name to its entry.
fn read_cgroup_entries(path: impl AsRef<Path>) -> Result<HashMap<String, CGroupEntry>> {
    let mut entries = HashMap::new();
    fsutil::scan_lines(path, parse_cgroup_line, |entry: CGroupEntry| {
        for subsystem in &entry.subsystems {
            entries.insert(subsystem.clone(), entry.clone());
        }
        Ok(())
    })?;

    Ok(entries)
}

/// Translates `group`, relative to the root of the hierarchy mounted by `mount_info`,
/// into a path under the mount point.
fn host_path(mount_info: &MountInfo, group: &str) -> Result<PathBuf> {
    let root = fsutil::clean_path(&mount_info.root);
    let group = fsutil::clean_path(group);

    let relative = group
        .strip_prefix(&root)
        .map_err(|_| Error::PathNotExposedFromMountPoint {
            mount_point: PathBuf::from(&mount_info.mount_point),
            root: root.clone(),
            path: group.clone(),
        })?;

    Ok(fsutil::clean_path(
        Path::new(&mount_info.mount_point).join(relative),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MOUNTINFO: &str = "\
25 1 0:24 / /proc rw,relatime - proc proc rw
30 25 0:26 / /sys/fs/cgroup ro,nosuid,nodev,noexec shared:9 - tmpfs tmpfs ro,mode=755
33 30 0:29 / /sys/fs/cgroup/cpu,cpuacct rw,nosuid,nodev,noexec,relatime shared:15 - cgroup cgroup rw,cpu,cpuacct
34 30 0:30 / /sys/fs/cgroup/cpuset rw,nosuid,nodev,noexec,relatime shared:16 - cgroup cgroup rw,cpuset
35 30 0:31 / /sys/fs/cgroup/memory rw,nosuid,nodev,noexec,relatime shared:17 - cgroup cgroup rw,memory
";

    const CGROUP: &str = "\
3:cpu,cpuacct:/
4:cpuset:/
5:memory:/large
";

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(contents.as_bytes()).unwrap();
        tmp
    }

    fn mount(root: &str, mount_point: &str) -> MountInfo {
        format!("33 30 0:29 {root} {mount_point} rw - cgroup cgroup rw,cpu")
            .parse()
            .unwrap()
    }

    fn cgroups_with(subsystem: &str, dir: &Path) -> CGroups {
        let mut subsystems = HashMap::new();
        subsystems.insert(subsystem.to_string(), CGroup::new(dir));
        CGroups { subsystems }
    }

    #[test]
    fn test_new_cgroups() {
        let mountinfo = temp_file(MOUNTINFO);
        let cgroup = temp_file(CGROUP);

        let cgroups = CGroups::new(mountinfo.path(), cgroup.path()).unwrap();

        assert_eq!(cgroups.len(), 4);
        let expected = [
            ("cpu", "/sys/fs/cgroup/cpu,cpuacct"),
            ("cpuacct", "/sys/fs/cgroup/cpu,cpuacct"),
            ("cpuset", "/sys/fs/cgroup/cpuset"),
            ("memory", "/sys/fs/cgroup/memory/large"),
        ];
        for (subsystem, path) in expected {
            assert_eq!(
                cgroups.get(subsystem).map(CGroup::path),
                Some(Path::new(path)),
                "subsystem {subsystem}"
            );
        }

        let mut listed: Vec<(&str, &Path)> = cgroups
            .iter()
            .map(|(subsystem, cgroup)| (subsystem, cgroup.path()))
            .collect();
        listed.sort();
        let expected: Vec<(&str, &Path)> = expected
            .iter()
            .map(|(subsystem, path)| (*subsystem, Path::new(*path)))
            .collect();
        assert_eq!(listed, expected);
    }

    #[test]
    fn test_new_cgroups_is_deterministic() {
        let mountinfo = temp_file(MOUNTINFO);
        let cgroup = temp_file(CGROUP);

        let first = CGroups::new(mountinfo.path(), cgroup.path()).unwrap();
        let second = CGroups::new(mountinfo.path(), cgroup.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_cgroups_ignores_non_v1_mounts() {
        let mountinfo = temp_file(
            "\
42 35 0:39 / /sys/fs/cgroup rw,nosuid,nodev,noexec,relatime - cgroup2 cgroup2 rw,memory
36 25 0:32 / /sys rw - sysfs sysfs rw,cpu
",
        );
        let cgroup = temp_file("0::/\n5:memory:/\n3:cpu:/\n");

        let cgroups = CGroups::new(mountinfo.path(), cgroup.path()).unwrap();
        assert!(cgroups.is_empty());
    }

    #[test]
    fn test_new_cgroups_later_mount_overwrites() {
        let mountinfo = temp_file(
            "\
35 30 0:31 / /sys/fs/cgroup/memory rw - cgroup cgroup rw,memory
36 30 0:31 / /mnt/memory rw - cgroup cgroup rw,memory
",
        );
        let cgroup = temp_file("5:memory:/\n");

        let cgroups = CGroups::new(mountinfo.path(), cgroup.path()).unwrap();
        assert_eq!(
            cgroups.get("memory").map(CGroup::path),
            Some(Path::new("/mnt/memory"))
        );
    }

    #[test]
    fn test_new_cgroups_inside_container() {
        let mountinfo = temp_file(
            "1270 1268 0:31 /docker/abc /sys/fs/cgroup/memory ro,nosuid,nodev,noexec,relatime master:17 - cgroup cgroup rw,memory\n",
        );
        let cgroup = temp_file("5:memory:/docker/abc\n");

        let cgroups = CGroups::new(mountinfo.path(), cgroup.path()).unwrap();
        assert_eq!(
            cgroups.get("memory").map(CGroup::path),
            Some(Path::new("/sys/fs/cgroup/memory"))
        );
    }

    #[test]
    fn test_new_cgroups_path_not_exposed() {
        let mountinfo = temp_file(
            "1270 1268 0:31 /docker/abc /sys/fs/cgroup/memory rw - cgroup cgroup rw,memory\n",
        );
        let cgroup = temp_file("5:memory:/docker/other\n");

        let err = CGroups::new(mountinfo.path(), cgroup.path()).unwrap_err();
        match err {
            Error::PathNotExposedFromMountPoint {
                mount_point,
                root,
                path,
            } => {
                assert_eq!(mount_point, PathBuf::from("/sys/fs/cgroup/memory"));
                assert_eq!(root, PathBuf::from("/docker/abc"));
                assert_eq!(path, PathBuf::from("/docker/other"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_new_cgroups_invalid_cgroup_file() {
        let mountinfo = temp_file(MOUNTINFO);
        let cgroup = temp_file("1:cpu\n");

        let err = CGroups::new(mountinfo.path(), cgroup.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_new_cgroups_missing_files() {
        let cgroup = temp_file(CGROUP);
        let err = CGroups::new("/definitely/does/not/exist", cgroup.path()).unwrap_err();
        assert!(matches!(err, Error::FileOpen(_)));
    }

    #[test]
    fn test_host_path() {
        assert_eq!(
            host_path(&mount("/", "/sys/fs/cgroup/cpu"), "/").unwrap(),
            PathBuf::from("/sys/fs/cgroup/cpu")
        );
        assert_eq!(
            host_path(&mount("/a", "/sys/fs/cgroup/cpu"), "/a/b/c").unwrap(),
            PathBuf::from("/sys/fs/cgroup/cpu/b/c")
        );
        assert!(host_path(&mount("/a/b", "/mnt"), "/a").is_err());
        assert!(host_path(&mount("/a/b", "/mnt"), "/a/bc").is_err());
        assert!(host_path(&mount("/a/b", "/mnt"), "/a/b/../c").is_err());
    }

    #[test]
    fn test_host_path_stays_under_mount_point() {
        let mount_info = mount("/kubepods", "/sys/fs/cgroup/cpu");
        for group in ["/kubepods", "/kubepods/pod1", "/kubepods/pod1/./c1/../c2"] {
            let path = host_path(&mount_info, group).unwrap();
            assert!(path.starts_with("/sys/fs/cgroup/cpu"), "{}", path.display());
        }
    }

    #[test]
    fn test_cpu_quota() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CPU_CFS_QUOTA_US), "150000\n").unwrap();
        fs::write(dir.path().join(CPU_CFS_PERIOD_US), "100000\n").unwrap();

        let cgroups = cgroups_with(CPU_SUBSYSTEM, dir.path());
        assert_eq!(cgroups.cpu_quota().unwrap(), Some(1.5));
    }

    #[test]
    fn test_cpu_quota_undefined() {
        let dir = tempfile::tempdir().unwrap();
        let cgroups = cgroups_with(CPU_SUBSYSTEM, dir.path());

        // Both files missing.
        assert_eq!(cgroups.cpu_quota().unwrap(), None);

        fs::write(dir.path().join(CPU_CFS_QUOTA_US), "-1\n").unwrap();
        fs::write(dir.path().join(CPU_CFS_PERIOD_US), "100000\n").unwrap();
        assert_eq!(cgroups.cpu_quota().unwrap(), None);

        fs::write(dir.path().join(CPU_CFS_QUOTA_US), "50000\n").unwrap();
        fs::remove_file(dir.path().join(CPU_CFS_PERIOD_US)).unwrap();
        assert_eq!(cgroups.cpu_quota().unwrap(), None);

        assert_eq!(CGroups::default().cpu_quota().unwrap(), None);
    }

    #[test]
    fn test_cpu_quota_invalid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CPU_CFS_QUOTA_US), "fast\n").unwrap();

        let cgroups = cgroups_with(CPU_SUBSYSTEM, dir.path());
        assert!(matches!(
            cgroups.cpu_quota().unwrap_err(),
            Error::Stat { .. }
        ));
    }

    #[test]
    fn test_memory_limit() {
        let dir = tempfile::tempdir().unwrap();
        let cgroups = cgroups_with(MEMORY_SUBSYSTEM, dir.path());
        assert_eq!(cgroups.memory_limit().unwrap(), None);

        fs::write(dir.path().join(MEMORY_LIMIT_IN_BYTES), "536870912\n").unwrap();
        assert_eq!(cgroups.memory_limit().unwrap(), Some(536_870_912));

        fs::write(dir.path().join(MEMORY_LIMIT_IN_BYTES), "9223372036854771712\n").unwrap();
        assert_eq!(cgroups.memory_limit().unwrap(), None);
    }

    #[test]
    fn test_memory_usage() {
        let dir = tempfile::tempdir().unwrap();
        let cgroups = cgroups_with(MEMORY_SUBSYSTEM, dir.path());
        assert_eq!(cgroups.memory_usage().unwrap(), None);

        fs::write(dir.path().join(MEMORY_USAGE_IN_BYTES), "1048576\n").unwrap();
        assert_eq!(cgroups.memory_usage().unwrap(), Some(1_048_576));
    }
}
