use crate::environment;
use crate::error::Result;
use crate::probe::Probe;

/// Reports whether the current process runs inside a container.
///
/// Probes `/.dockerenv` and `/proc/self/cgroup` once per process and returns the latched
/// result afterwards. Probe failures count as "not containerized".
pub fn process_in_container() -> bool {
    environment::process_in_container()
}

/// Reports whether the host mounts the cgroup v2 unified hierarchy at `/sys/fs/cgroup`.
pub fn is_cgroup_v2() -> Result<bool> {
    Probe::default().is_cgroup_v2()
}

/// Returns the CPU quota of the current process in (fractional) CPU cores.
///
/// Falls back to the number of online host CPUs outside of a container or when no
/// quota is enforced.
///
/// # Example
///
/// ```no_run
/// let cores = cgroup_quota::cpu_quota().unwrap();
/// println!("allowed to use {cores} cores");
/// ```
pub fn cpu_quota() -> Result<f64> {
    Probe::default().cpu_quota()
}

/// Returns the memory limit of the current process in bytes.
///
/// Falls back to the total host memory when no limit is enforced.
pub fn memory_quota() -> Result<i64> {
    Probe::default().memory_quota()
}

/// Returns the memory usage of the cgroup of the current process in bytes.
///
/// Falls back to the memory in use on the host when the cgroup reports none.
pub fn memory_usage() -> Result<i64> {
    Probe::default().memory_usage()
}
