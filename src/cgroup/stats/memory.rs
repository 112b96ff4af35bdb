//! Parsers for memory controller files of both cgroup hierarchies.
//!
//! - **`memory.max`** (v2): a byte count, or the literal `max` for no limit.
//! - **`memory.limit_in_bytes`** (v1): a byte count. The kernel initializes it to
//!   `PAGE_COUNTER_MAX * PAGE_SIZE`, so an unlimited cgroup reports a huge value that
//!   depends on the page size of the architecture. See [`UNLIMITED_MEMORY_SENTINELS`].
//! - **`memory.current`** (v2) and **`memory.usage_in_bytes`** (v1): current usage in bytes.
//!
//! # Examples
//!
//! ```rust
//! use cgroup_quota::cgroup::stats::{MemoryLimit, MemoryLimitInBytes, MemoryUsage, SingleLineStat};
//!
//! let limit = MemoryLimit::from_reader(&mut "max\n".as_bytes()).unwrap();
//! assert_eq!(limit.limit_bytes, None);
//!
//! let limit = MemoryLimitInBytes::from_reader(&mut "9223372036854771712\n".as_bytes()).unwrap();
//! assert_eq!(limit.limit_bytes, None);
//!
//! let usage = MemoryUsage::from_reader(&mut "8192\n".as_bytes()).unwrap();
//! assert_eq!(usage.usage_bytes, 8192);
//! ```

use std::io::BufRead;

use super::parser::{parse_i64, read_value_line};
use super::{SingleLineStat, StatParseError};

/// Values of `memory.limit_in_bytes` that mean "no limit".
///
/// New entries appear whenever an architecture with a different `PAGE_SIZE` rounds
/// `LONG_MAX` to its own page boundary.
pub const UNLIMITED_MEMORY_SENTINELS: &[u64] = &[
    // LONG_MAX rounded down to 4 KiB pages.
    9_223_372_036_854_771_712,
    // LONG_MAX rounded down to 64 KiB pages.
    9_223_372_036_854_710_272,
    // LONG_MAX.
    9_223_372_036_854_775_807,
    // UINT64_MAX.
    18_446_744_073_709_551_615,
];

/// Represents current memory usage from `memory.current` or `memory.usage_in_bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Total memory usage in bytes.
    pub usage_bytes: i64,
}

impl SingleLineStat for MemoryUsage {
    /// # Errors
    ///
    /// `UnexpectedEof` if the file is empty, `InvalidData` if the value is not an integer.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        Ok(MemoryUsage {
            usage_bytes: parse_i64(&read_value_line(buf)?)?,
        })
    }
}

/// Represents memory limits from `memory.max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLimit {
    /// Memory usage limit in bytes.
    ///
    /// A value of `None` represents "max", meaning no memory limit is set.
    pub limit_bytes: Option<i64>,
}

impl SingleLineStat for MemoryLimit {
    /// Parses a `memory.max`-style file.
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` if the file is empty, `InvalidData` if the value is neither `max`
    /// nor a signed 64-bit integer.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let limit_bytes = match read_value_line(buf)?.as_str() {
            "max" => None,
            value => Some(parse_i64(value)?),
        };

        Ok(MemoryLimit { limit_bytes })
    }
}

/// Represents the cgroup v1 memory limit from `memory.limit_in_bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLimitInBytes {
    /// Memory limit in bytes; `None` if the kernel reports no effective limit.
    pub limit_bytes: Option<i64>,
}

impl SingleLineStat for MemoryLimitInBytes {
    /// Parses a `memory.limit_in_bytes` file.
    ///
    /// Zero, negative values, values listed in [`UNLIMITED_MEMORY_SENTINELS`] and values
    /// beyond `i64::MAX` are all reported as unset.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let value = read_value_line(buf)?;
        if value.starts_with('-') {
            parse_i64(&value)?;
            return Ok(MemoryLimitInBytes { limit_bytes: None });
        }

        let raw = value
            .parse::<u64>()
            .map_err(|source| StatParseError::InvalidValue {
                value: value.clone(),
                line: 1,
                source,
            })?;
        if raw == 0 || UNLIMITED_MEMORY_SENTINELS.contains(&raw) {
            return Ok(MemoryLimitInBytes { limit_bytes: None });
        }

        Ok(MemoryLimitInBytes {
            limit_bytes: i64::try_from(raw).ok(),
        })
    }
}
