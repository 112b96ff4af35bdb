//! Environment detection module.
//!
//! Determines whether the current process runs on the host or inside a container.
mod checks;
mod detect;

pub use checks::{has_dockerenv, matches_container_cgroup};
pub use detect::{
    ContainerDetector, DOCKERENV_PATH, RuntimeEnvironment, SELF_CGROUP_PATH,
    detect_runtime_environment, process_in_container,
};
