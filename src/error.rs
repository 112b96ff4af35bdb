use std::path::PathBuf;

use crate::fsutil;

/// Errors that may occur while introspecting cgroup quotas.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileOpen(#[from] fsutil::FileOpenError),
    #[error("failed to read line for file `{path}`: {source}")]
    ReadLine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse line in file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: LineParseError,
    },
    #[error(
        "cgroup path `{path}` is not exposed from mount point `{mount_point}` with root `{root}`"
    )]
    PathNotExposedFromMountPoint {
        mount_point: PathBuf,
        root: PathBuf,
        path: PathBuf,
    },
    #[error("failed to check if path `{path}` exists: {source}")]
    ExistenceCheck {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read stat file `{path}`: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to detect cgroup v2 mount point in file `{path}`")]
    MissingCgroup2Mount { path: PathBuf },
    #[error("unexpected end of file `{path}`")]
    UnexpectedEof { path: PathBuf },
    #[error("cgroup introspection is not supported on this platform")]
    UnsupportedPlatform,
}

/// A line of `mountinfo` or `cgroup` that could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum LineParseError {
    #[error(transparent)]
    MountInfo(#[from] crate::mountinfo::ParseError),
    #[error(transparent)]
    CGroup(#[from] crate::cgroup::ParseError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Downgrades an error to `None` after logging it as a warning.
///
/// Used where a failed probe must not abort the query, e.g. container detection and
/// the CPU quota readers.
pub trait ResultOkLogExt<T, E> {
    /// Returns the success value, or logs the error and returns `None`.
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }
}
