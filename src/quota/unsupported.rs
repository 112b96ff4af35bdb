use crate::error::{Error, Result};

/// Always `false`: container detection relies on Linux procfs.
pub fn process_in_container() -> bool {
    false
}

/// Always fails with [`Error::UnsupportedPlatform`].
pub fn is_cgroup_v2() -> Result<bool> {
    Err(Error::UnsupportedPlatform)
}

/// Always fails with [`Error::UnsupportedPlatform`].
pub fn cpu_quota() -> Result<f64> {
    Err(Error::UnsupportedPlatform)
}

/// Always fails with [`Error::UnsupportedPlatform`].
pub fn memory_quota() -> Result<i64> {
    Err(Error::UnsupportedPlatform)
}

/// Always fails with [`Error::UnsupportedPlatform`].
pub fn memory_usage() -> Result<i64> {
    Err(Error::UnsupportedPlatform)
}
