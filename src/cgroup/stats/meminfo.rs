//! Parser for `/proc/meminfo`.
//!
//! Every line has the shape `Key:   <value> kB`. Only the fields needed for host
//! fallbacks are kept; values are stored in bytes.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::KeyValueStat;

/// Bytes per `kB` unit used by `/proc/meminfo`.
const KIB: u64 = 1024;

/// Represents the host memory summary from `/proc/meminfo`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemInfo {
    /// Total usable physical memory in bytes.
    pub total_bytes: u64,
    /// Memory left completely unused, in bytes.
    pub free_bytes: u64,
    /// Estimate of memory available for new workloads without swapping, in bytes.
    ///
    /// `None` on kernels older than 3.14 which do not export `MemAvailable`.
    pub available_bytes: Option<u64>,
}

impl MemInfo {
    fn set_total(&mut self, kib: u64) {
        self.total_bytes = kib.saturating_mul(KIB);
    }

    fn set_free(&mut self, kib: u64) {
        self.free_bytes = kib.saturating_mul(KIB);
    }

    fn set_available(&mut self, kib: u64) {
        self.available_bytes = Some(kib.saturating_mul(KIB));
    }

    /// Memory in use by the host, in bytes.
    ///
    /// Uses `MemAvailable` when exported and `MemFree` otherwise.
    pub fn used_bytes(&self) -> u64 {
        let available = self.available_bytes.unwrap_or(self.free_bytes);
        self.total_bytes.saturating_sub(available)
    }
}

type Setter = fn(&mut MemInfo, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(3);

    m.insert("MemTotal", MemInfo::set_total);
    m.insert("MemFree", MemInfo::set_free);
    m.insert("MemAvailable", MemInfo::set_available);

    m
});

impl KeyValueStat for MemInfo {
    const KEY_SUFFIX: &'static str = ":";
    const ALLOW_DUPLICATE_KEYS: bool = false;

    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}
