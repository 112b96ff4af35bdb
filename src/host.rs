//! Host facts used when the cgroup layer reports no limit.

use std::path::Path;

use crate::cgroup::stats::{KeyValueStat, MemInfo, OnlineCpus};
use crate::cgroup::utils::read_stat_file;
use crate::error::{Error, Result, ResultOkLogExt};
use crate::fsutil;

/// Default location of the host memory summary.
pub const MEMINFO_PATH: &str = "/proc/meminfo";
/// Default location of the list of online CPUs.
pub const CPU_ONLINE_PATH: &str = "/sys/devices/system/cpu/online";

/// Returns the number of online hardware threads of the host.
///
/// Counts the CPUs listed in `/sys/devices/system/cpu/online`, which is not affected by
/// cgroup CPU quotas. Only if that list cannot be read does it fall back to
/// [`num_cpus::get`].
pub fn cpu_count() -> usize {
    cpu_count_from(CPU_ONLINE_PATH)
}

fn cpu_count_from(online: impl AsRef<Path>) -> usize {
    match online_cpus(online).ok_log().flatten() {
        Some(count) if count > 0 => count,
        _ => {
            log::debug!("Online CPU list unavailable, using num_cpus");
            num_cpus::get()
        }
    }
}

/// Counts the CPUs of a sysfs CPU list file such as `/sys/devices/system/cpu/online`.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn online_cpus(path: impl AsRef<Path>) -> Result<Option<usize>> {
    Ok(read_stat_file::<OnlineCpus>(path)?.map(|cpus| cpus.count))
}

/// Reads and parses a `meminfo` file.
///
/// # Errors
///
/// - [`Error::FileOpen`] if the file cannot be opened.
/// - [`Error::Stat`] if reading or parsing fails.
/// - [`Error::UnexpectedEof`] if the file does not report `MemTotal`.
pub fn read_meminfo(path: impl AsRef<Path>) -> Result<MemInfo> {
    let path = fsutil::clean_path(path);
    let mut reader = fsutil::open_file_reader(&path)?;
    let info = MemInfo::from_reader(&mut reader).map_err(|source| Error::Stat {
        path: path.clone(),
        source,
    })?;

    if info.total_bytes == 0 {
        return Err(Error::UnexpectedEof { path });
    }
    Ok(info)
}

/// Returns the total physical memory of the host in bytes.
pub fn total_memory(meminfo: impl AsRef<Path>) -> Result<i64> {
    let info = read_meminfo(meminfo)?;
    Ok(clamp_to_i64(info.total_bytes))
}

/// Returns the memory in use on the host in bytes.
pub fn used_memory(meminfo: impl AsRef<Path>) -> Result<i64> {
    let info = read_meminfo(meminfo)?;
    Ok(clamp_to_i64(info.used_bytes()))
}

fn clamp_to_i64(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}
