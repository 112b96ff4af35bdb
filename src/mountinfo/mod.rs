//! Parsing of `/proc/[pid]/mountinfo` and detection of the cgroup v2 hierarchy.
mod detect;
mod parser;

pub use detect::{
    CGROUP_FS_TYPE, CGROUP2_FS_TYPE, CGROUP2_MOUNT_POINT, detect_cgroup2_mount_point,
    for_each_mount_info, is_cgroup_v2,
};
pub use parser::{MountInfo, MountInfoField, ParseError, parse_mount_info_line};
