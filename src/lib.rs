//! Cgroup Quota: discovers the CPU and memory quotas enforced on the current process.
//!
//! The crate reads `/proc/self/mountinfo` and `/proc/self/cgroup` to locate the cgroup
//! hierarchies of the process, then reads the CFS bandwidth and memory limit files of
//! cgroup v1 or the `cpu.max` and `memory.max` files of the cgroup v2 unified hierarchy.
//! When no quota is enforced, the queries fall back to the host CPU count and the host
//! memory reported by `/proc/meminfo`.
//!
//! The free functions at the crate root query the current process. [`probe::ProbeBuilder`]
//! builds a [`probe::Probe`] that reads from arbitrary file locations instead.
pub mod cgroup;
pub mod environment;
pub mod error;
pub mod fsutil;
pub mod host;
pub mod mountinfo;
pub mod probe;
mod quota;

pub use error::{Error, Result};
pub use quota::{cpu_quota, is_cgroup_v2, memory_quota, memory_usage, process_in_container};
