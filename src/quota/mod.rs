//! Process-level quota queries.
//!
//! On Linux the queries read the files of the current process through a default
//! [`crate::probe::Probe`]. On every other platform they fail with
//! [`crate::Error::UnsupportedPlatform`] without touching the filesystem.
#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod unsupported;

#[cfg(target_os = "linux")]
pub use linux::{cpu_quota, is_cgroup_v2, memory_quota, memory_usage, process_in_container};
#[cfg(not(target_os = "linux"))]
pub use unsupported::{cpu_quota, is_cgroup_v2, memory_quota, memory_usage, process_in_container};
