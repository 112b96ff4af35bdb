//! Typed parsers for the controller attribute files read by the quota queries.
//!
//! # Main types
//!
//! - [`CfsQuota`] / [`CfsPeriod`]: cgroup v1 CPU bandwidth (`cpu.cfs_quota_us`, `cpu.cfs_period_us`).
//! - [`CpuLimit`]: cgroup v2 CPU bandwidth (`cpu.max`).
//! - [`OnlineCpus`]: host CPU list (`/sys/devices/system/cpu/online`).
//! - [`MemoryLimitInBytes`]: cgroup v1 memory limit (`memory.limit_in_bytes`).
//! - [`MemoryLimit`]: cgroup v2 memory limit (`memory.max`).
//! - [`MemoryUsage`]: current usage (`memory.current`, `memory.usage_in_bytes`).
//! - [`MemInfo`]: host memory summary (`/proc/meminfo`).
//!
//! Single-value files implement [`SingleLineStat`], multi-line files [`KeyValueStat`].

mod cpu;
pub(crate) mod error;
mod meminfo;
mod memory;
mod parser;

pub use cpu::{CfsPeriod, CfsQuota, CpuLimit, OnlineCpus};
pub use error::StatParseError;
pub use meminfo::MemInfo;
pub use memory::{MemoryLimit, MemoryLimitInBytes, MemoryUsage, UNLIMITED_MEMORY_SENTINELS};
pub use parser::{KeyValueStat, SingleLineStat};
