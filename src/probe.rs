use std::path::PathBuf;

use crate::cgroup::{CGroupV2, CGroups};
use crate::environment::{self, ContainerDetector};
use crate::error::{Result, ResultOkLogExt};
use crate::host;
use crate::mountinfo::{self, CGROUP2_MOUNT_POINT};

/// Default location of the mount table of the current process.
pub const SELF_MOUNTINFO_PATH: &str = "/proc/self/mountinfo";

/// Resolves CPU and memory quotas of a process from its procfs and cgroupfs files.
///
/// Every query re-reads the files it needs; nothing besides the container detection
/// result is cached.
#[derive(Debug)]
pub struct Probe {
    mountinfo_path: PathBuf,
    cgroup_path: PathBuf,
    cgroup_v2_root: PathBuf,
    meminfo_path: PathBuf,
    container: Containerized,
}

#[derive(Debug)]
enum Containerized {
    /// Use the process-wide latched detection.
    Process,
    /// Use a detector owned by this probe.
    Detector(ContainerDetector),
    Fixed(bool),
}

impl Probe {
    /// Reports whether the probed process runs in a container.
    pub fn in_container(&self) -> bool {
        match &self.container {
            Containerized::Process => environment::process_in_container(),
            Containerized::Detector(detector) => detector.is_container(),
            Containerized::Fixed(value) => *value,
        }
    }

    /// Reports whether the unified cgroup v2 hierarchy is mounted at `/sys/fs/cgroup`.
    pub fn is_cgroup_v2(&self) -> Result<bool> {
        mountinfo::is_cgroup_v2(&self.mountinfo_path)
    }

    /// Builds the cgroup v1 controller map of the probed process.
    pub fn cgroups(&self) -> Result<CGroups> {
        CGroups::new(&self.mountinfo_path, &self.cgroup_path)
    }

    /// Returns the unified hierarchy reader.
    pub fn cgroup_v2(&self) -> CGroupV2 {
        CGroupV2::new(&self.cgroup_v2_root)
    }

    /// Returns the CPU quota in (fractional) CPU cores.
    ///
    /// Outside of a container, or when no quota is enforced, the number of online host
    /// CPUs is returned. Failures to read the quota files also fall back to the host
    /// count and are logged.
    ///
    /// # Errors
    ///
    /// Fails if the mount table or the cgroup membership cannot be read.
    pub fn cpu_quota(&self) -> Result<f64> {
        if !self.in_container() {
            log::debug!("Not running in a container, using host CPU count");
            return Ok(host::cpu_count() as f64);
        }

        let quota = if self.is_cgroup_v2()? {
            self.cgroup_v2().cpu_quota()
        } else {
            self.cgroups()?.cpu_quota()
        };

        match quota.ok_log().flatten() {
            Some(quota) => Ok(quota),
            None => {
                log::debug!("No CPU quota enforced, using host CPU count");
                Ok(host::cpu_count() as f64)
            }
        }
    }

    /// Returns the memory limit in bytes.
    ///
    /// Reads `memory.max` on a unified hierarchy and `memory.limit_in_bytes` of the memory
    /// controller otherwise. Without a limit, the total host memory is returned.
    ///
    /// # Errors
    ///
    /// Any failure to detect the hierarchy, read the limit or read the host memory.
    pub fn memory_quota(&self) -> Result<i64> {
        let limit = if self.is_cgroup_v2()? {
            self.cgroup_v2().memory_limit()?
        } else {
            self.cgroups()?.memory_limit()?
        };

        match limit {
            Some(limit) => Ok(limit),
            None => {
                log::debug!("No memory limit enforced, using host total memory");
                host::total_memory(&self.meminfo_path)
            }
        }
    }

    /// Returns the memory usage in bytes.
    ///
    /// Reads `memory.current` on a unified hierarchy and `memory.usage_in_bytes` of the
    /// memory controller otherwise. Without a usage file, the memory in use on the host
    /// is returned.
    ///
    /// # Errors
    ///
    /// Any failure to detect the hierarchy, read the usage or read the host memory.
    pub fn memory_usage(&self) -> Result<i64> {
        let usage = if self.is_cgroup_v2()? {
            self.cgroup_v2().memory_usage()?
        } else {
            self.cgroups()?.memory_usage()?
        };

        match usage {
            Some(usage) => Ok(usage),
            None => {
                log::debug!("No memory usage reported by cgroup, using host used memory");
                host::used_memory(&self.meminfo_path)
            }
        }
    }
}

impl Default for Probe {
    fn default() -> Self {
        ProbeBuilder::default().build()
    }
}

/// Builder for a [`Probe`]. Unset locations default to the files of the current process.
#[derive(Debug, Default)]
pub struct ProbeBuilder {
    mountinfo_path: Option<PathBuf>,
    cgroup_path: Option<PathBuf>,
    cgroup_v2_root: Option<PathBuf>,
    meminfo_path: Option<PathBuf>,
    dockerenv_path: Option<PathBuf>,
    container: Option<bool>,
}

impl ProbeBuilder {
    /// Sets the path to the `mountinfo` file (default `/proc/self/mountinfo`).
    pub fn set_mountinfo_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.mountinfo_path = Some(path.into());
        self
    }

    /// Sets the path to the `cgroup` file (default `/proc/self/cgroup`).
    pub fn set_cgroup_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.cgroup_path = Some(path.into());
        self
    }

    /// Sets the directory of the unified hierarchy (default `/sys/fs/cgroup`).
    pub fn set_cgroup_v2_root(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.cgroup_v2_root = Some(path.into());
        self
    }

    /// Sets the path to the `meminfo` file (default `/proc/meminfo`).
    pub fn set_meminfo_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.meminfo_path = Some(path.into());
        self
    }

    /// Sets the Docker marker file probed for container detection (default `/.dockerenv`).
    ///
    /// Setting it, or a custom `cgroup` file, gives the probe its own latched detector
    /// instead of the process-wide one.
    pub fn set_dockerenv_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.dockerenv_path = Some(path.into());
        self
    }

    /// Skips container detection and uses `container` instead.
    pub fn set_container(&mut self, container: bool) -> &mut Self {
        self.container = Some(container);
        self
    }

    pub fn build(&self) -> Probe {
        let cgroup_path = self
            .cgroup_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(environment::SELF_CGROUP_PATH));

        let container = match (self.container, &self.dockerenv_path) {
            (Some(value), _) => Containerized::Fixed(value),
            (None, None) if self.cgroup_path.is_none() => Containerized::Process,
            (None, dockerenv) => Containerized::Detector(ContainerDetector::new(
                dockerenv
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(environment::DOCKERENV_PATH)),
                cgroup_path.clone(),
            )),
        };

        Probe {
            mountinfo_path: self
                .mountinfo_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(SELF_MOUNTINFO_PATH)),
            cgroup_path,
            cgroup_v2_root: self
                .cgroup_v2_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(CGROUP2_MOUNT_POINT)),
            meminfo_path: self
                .meminfo_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(host::MEMINFO_PATH)),
            container,
        }
    }
}
