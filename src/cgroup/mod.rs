//! Introspection of the cgroup hierarchies the current process belongs to.
//!
//! # Key Components
//!
//! - [`parse_cgroup_line`] / [`CGroupEntry`] — one line of `/proc/[pid]/cgroup`.
//! - [`CGroups`] — cgroup v1 controller map built from `mountinfo` and `cgroup`, with
//!   readers for CPU bandwidth and memory limit/usage.
//! - [`CGroupV2`] — readers for the unified hierarchy.
//! - [`stats`] — typed parsers for the attribute files.
//!
//! All readers report "no limit" as `Ok(None)` and keep real failures as errors, so
//! callers can fall back to host values without masking broken files.
mod parser;
pub mod stats;
mod subsystems;
pub(crate) mod utils;
mod v2;

pub use parser::{CGroupEntry, ParseError, parse_cgroup_line};
pub use subsystems::{CGroup, CGroups, CPU_SUBSYSTEM, MEMORY_SUBSYSTEM};
pub use v2::CGroupV2;
