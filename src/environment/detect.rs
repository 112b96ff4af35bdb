use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};

use crate::error::ResultOkLogExt;

use super::checks::{has_dockerenv, matches_container_cgroup};

/// Default location of the Docker marker file.
pub const DOCKERENV_PATH: &str = "/.dockerenv";
/// Default location of the cgroup membership of the current process.
pub const SELF_CGROUP_PATH: &str = "/proc/self/cgroup";

/// Available runtime environments of the current process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Running directly on the host.
    Host,
    /// Running inside a containerized environment (e.g., Docker, Kubernetes).
    Container,
}

/// Detects whether the process runs in a container or on the host.
///
/// The process is considered containerized if the `dockerenv` marker exists or the
/// `cgroup` file names a Docker or Kubernetes group. Errors of individual checks are
/// logged as warnings and count as "not containerized".
pub fn detect_runtime_environment(
    dockerenv: impl AsRef<Path>,
    cgroup: impl AsRef<Path>,
) -> RuntimeEnvironment {
    if has_dockerenv(dockerenv).ok_log().unwrap_or(false) {
        return RuntimeEnvironment::Container;
    }

    if matches_container_cgroup(cgroup).ok_log().unwrap_or(false) {
        return RuntimeEnvironment::Container;
    }

    RuntimeEnvironment::Host
}

/// Container detection that probes at most once and serves the latched result after.
#[derive(Debug)]
pub struct ContainerDetector {
    dockerenv: PathBuf,
    cgroup: PathBuf,
    environment: OnceLock<RuntimeEnvironment>,
}

impl ContainerDetector {
    /// Creates a detector probing the given marker file and `cgroup` file.
    pub fn new(dockerenv: impl Into<PathBuf>, cgroup: impl Into<PathBuf>) -> Self {
        Self {
            dockerenv: dockerenv.into(),
            cgroup: cgroup.into(),
            environment: OnceLock::new(),
        }
    }

    /// Returns the detected environment, probing on the first call only.
    ///
    /// Concurrent first callers block until the probing caller has published the result.
    pub fn environment(&self) -> RuntimeEnvironment {
        *self.environment.get_or_init(|| {
            let environment = detect_runtime_environment(&self.dockerenv, &self.cgroup);
            log::debug!("Detected runtime environment: {environment:?}");
            environment
        })
    }

    pub fn is_container(&self) -> bool {
        self.environment() == RuntimeEnvironment::Container
    }
}

impl Default for ContainerDetector {
    fn default() -> Self {
        Self::new(DOCKERENV_PATH, SELF_CGROUP_PATH)
    }
}

static PROCESS_DETECTOR: LazyLock<ContainerDetector> = LazyLock::new(ContainerDetector::default);

/// Reports whether the current process runs inside a container.
///
/// The probe runs once per process; every later call returns the latched result.
pub fn process_in_container() -> bool {
    PROCESS_DETECTOR.is_container()
}
