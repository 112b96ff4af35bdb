//! Mountinfo line parser for Linux systems.
//!
//! Parses lines in `/proc/[pid]/mountinfo` format. See
//! [`proc_pid_mountinfo(5)`](https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html)
//! for details on the structure.

use std::num::ParseIntError;
use std::str::FromStr;

/// Number of fields preceding the optional fields.
const PRE_OPTIONAL_FIELDS: usize = 6;
/// Number of fields following the ` - ` separator.
const POST_SEPARATOR_FIELDS: usize = 3;
const SEPARATOR: &str = "-";

/// Represents a parsed mountinfo line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// Unique ID of the mount.
    pub mount_id: u32,
    /// ID of the parent mount.
    pub parent_id: u32,
    /// Major:Minor device identifier.
    pub device_id: String,
    /// Root of the mount within the filesystem.
    pub root: String,
    /// Mount point relative to the process's root.
    pub mount_point: String,
    /// Per-mount options.
    pub options: Vec<String>,
    /// Optional fields (can be empty).
    pub optional_fields: Vec<String>,
    /// Filesystem type (e.g., `ext4`, `cgroup2`).
    pub fs_type: String,
    /// Source of the mount (e.g., device).
    pub source: String,
    /// Superblock options.
    pub super_options: Vec<String>,
}

/// Named integer fields in a mountinfo line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountInfoField {
    MountId,
    ParentId,
}

impl std::fmt::Display for MountInfoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MountInfoField::MountId => "mount_id",
            MountInfoField::ParentId => "parent_id",
        };
        write!(f, "{name}")
    }
}

/// Errors that may occur when parsing a mountinfo line.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid mountinfo line: `{0}`")]
    InvalidMountLine(String),

    #[error("invalid `{field}` in line `{line}`: {source}")]
    InvalidInteger {
        field: MountInfoField,
        line: String,
        #[source]
        source: ParseIntError,
    },
}

fn split_options(field: &str) -> Vec<String> {
    field.split(',').map(str::to_owned).collect()
}

/// Parses a single line of mountinfo data.
///
/// Fields are separated by single spaces. The optional fields end at the first `-`
/// found at or after the seventh field, and exactly three fields must follow it.
///
/// # Errors
///
/// - [`ParseError::InvalidMountLine`] if the line has fewer than ten fields, lacks the
///   `-` separator, or does not have exactly three fields after it.
/// - [`ParseError::InvalidInteger`] if the mount ID or parent ID is not a decimal integer.
pub fn parse_mount_info_line(line: &str) -> Result<MountInfo, ParseError> {
    let fields: Vec<&str> = line.split(' ').collect();
    if fields.len() < PRE_OPTIONAL_FIELDS + 1 + POST_SEPARATOR_FIELDS {
        return Err(ParseError::InvalidMountLine(line.to_owned()));
    }

    let parse_id = |value: &str, field| {
        value
            .parse::<u32>()
            .map_err(|source| ParseError::InvalidInteger {
                field,
                line: line.to_owned(),
                source,
            })
    };
    let mount_id = parse_id(fields[0], MountInfoField::MountId)?;
    let parent_id = parse_id(fields[1], MountInfoField::ParentId)?;

    let separator = fields[PRE_OPTIONAL_FIELDS..]
        .iter()
        .position(|&field| field == SEPARATOR)
        .map(|offset| PRE_OPTIONAL_FIELDS + offset)
        .ok_or_else(|| ParseError::InvalidMountLine(line.to_owned()))?;

    let post = &fields[separator + 1..];
    if post.len() != POST_SEPARATOR_FIELDS {
        return Err(ParseError::InvalidMountLine(line.to_owned()));
    }

    Ok(MountInfo {
        mount_id,
        parent_id,
        device_id: fields[2].to_owned(),
        root: fields[3].to_owned(),
        mount_point: fields[4].to_owned(),
        options: split_options(fields[5]),
        optional_fields: fields[PRE_OPTIONAL_FIELDS..separator]
            .iter()
            .map(|&field| field.to_owned())
            .collect(),
        fs_type: post[0].to_owned(),
        source: post[1].to_owned(),
        super_options: split_options(post[2]),
    })
}

impl FromStr for MountInfo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_mount_info_line(s)
    }
}
