//! Parser for `/proc/[pid]/cgroup` lines.
//!
//! Every line has the form `<hierarchy-id>:<controller-list>:<cgroup-path>`:
//!
//! - `<hierarchy-id>`: arbitrary number for v1, always `0` for v2.
//! - `<controller-list>`: comma-separated controllers for v1, empty for v2.
//! - `<cgroup-path>`: path of the group relative to the root of its hierarchy.

use std::num::ParseIntError;
use std::str::FromStr;

/// Represents a parsed line of `/proc/[pid]/cgroup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CGroupEntry {
    /// Hierarchy ID.
    pub id: u32,
    /// Controllers bound to the hierarchy. Holds a single empty name on cgroup v2.
    pub subsystems: Vec<String>,
    /// Path of the group inside the hierarchy.
    pub name: String,
}

/// Errors that may occur when parsing a cgroup line.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid cgroup line: `{0}`")]
    InvalidCGroupLine(String),

    #[error("invalid hierarchy id in line `{line}`: {source}")]
    InvalidInteger {
        line: String,
        #[source]
        source: ParseIntError,
    },
}

/// Parses a single line of `/proc/[pid]/cgroup`.
///
/// # Errors
///
/// - [`ParseError::InvalidCGroupLine`] if the line does not consist of exactly three
///   colon-separated fields.
/// - [`ParseError::InvalidInteger`] if the hierarchy ID is not a decimal integer.
///
/// # Example
///
/// ```rust
/// use cgroup_quota::cgroup::parse_cgroup_line;
///
/// let entry = parse_cgroup_line("4:memory:/large").unwrap();
/// assert_eq!(entry.subsystems, vec!["memory"]);
/// assert_eq!(entry.name, "/large");
/// ```
pub fn parse_cgroup_line(line: &str) -> Result<CGroupEntry, ParseError> {
    let fields: Vec<&str> = line.split(':').collect();
    let &[id, subsystems, name] = fields.as_slice() else {
        return Err(ParseError::InvalidCGroupLine(line.to_owned()));
    };

    let id = id
        .parse::<u32>()
        .map_err(|source| ParseError::InvalidInteger {
            line: line.to_owned(),
            source,
        })?;

    Ok(CGroupEntry {
        id,
        subsystems: subsystems.split(',').map(str::to_owned).collect(),
        name: name.to_owned(),
    })
}

impl FromStr for CGroupEntry {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cgroup_line(s)
    }
}
