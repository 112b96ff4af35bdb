use std::path::{Path, PathBuf};

use crate::error::Result;

use super::stats::{CpuLimit, MemoryLimit, MemoryUsage};
use super::subsystems::CGroup;

const CPU_MAX: &str = "cpu.max";
const MEMORY_MAX: &str = "memory.max";
const MEMORY_CURRENT: &str = "memory.current";

/// Reader for the controllers of a cgroup v2 unified hierarchy directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CGroupV2 {
    cgroup: CGroup,
}

impl CGroupV2 {
    /// Binds a reader to the unified cgroup directory at `path`, usually `/sys/fs/cgroup`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            cgroup: CGroup::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.cgroup.path()
    }

    /// Reads `memory.max`.
    ///
    /// Returns `Ok(None)` if the file is missing or holds `max`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::UnexpectedEof`] if the file is empty.
    /// - [`crate::Error::Stat`] if the value is not a signed 64-bit integer.
    pub fn memory_limit(&self) -> Result<Option<i64>> {
        Ok(self
            .cgroup
            .read_stat::<MemoryLimit>(MEMORY_MAX)?
            .and_then(|limit| limit.limit_bytes))
    }

    /// Reads `memory.current`. Returns `Ok(None)` if the file is missing.
    pub fn memory_usage(&self) -> Result<Option<i64>> {
        Ok(self
            .cgroup
            .read_stat::<MemoryUsage>(MEMORY_CURRENT)?
            .map(|usage| usage.usage_bytes))
    }

    /// Reads `cpu.max` as a number of CPU core equivalents.
    ///
    /// Returns `Ok(None)` if the file is missing or the quota is `max`.
    pub fn cpu_quota(&self) -> Result<Option<f64>> {
        Ok(self
            .cgroup
            .read_stat::<CpuLimit>(CPU_MAX)?
            .and_then(|limit| limit.cores()))
    }
}
