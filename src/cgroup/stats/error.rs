//! Error raised by the stat parsers.
//!
//! The stat parsers speak [`std::io::Result`], so [`StatParseError`] is carried inside an
//! [`io::Error`]: value problems map to [`io::ErrorKind::InvalidData`] and an empty file to
//! [`io::ErrorKind::UnexpectedEof`]. [`crate::cgroup::CGroup::read_stat`] relies on these
//! kinds to tell "empty" apart from "malformed".

use std::io;
use std::num::ParseIntError;

use thiserror::Error;

/// A malformed or missing value in a cgroup or procfs stat file.
#[derive(Debug, Error)]
pub enum StatParseError {
    /// A key appeared twice in a key/value file that forbids repetition.
    #[error("field `{field}` repeated at line {line}")]
    DuplicateField { field: String, line: usize },

    /// The value of a key/value pair is not an unsigned integer.
    #[error("line {line}: `{key}` has non-numeric value `{value}`: {source}")]
    InvalidKeyValue {
        key: String,
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    /// A single-value file holds something other than an integer or a known keyword.
    #[error("line {line}: cannot parse `{value}` as integer: {source}")]
    InvalidValue {
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    /// A CPU list holds a range whose end precedes its start.
    #[error("line {line}: invalid CPU range `{value}`")]
    InvalidRange { value: String, line: usize },

    /// A single-value file is empty.
    #[error("stat file holds no value")]
    UnexpectedEof,
}

impl From<StatParseError> for io::Error {
    fn from(err: StatParseError) -> Self {
        let kind = match err {
            StatParseError::UnexpectedEof => io::ErrorKind::UnexpectedEof,
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

/// Unwraps the [`StatParseError`] carried by `err`. Panics if there is none.
#[cfg(test)]
pub(crate) fn extract_stat_parse_error(err: &io::Error) -> &StatParseError {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<StatParseError>())
        .unwrap()
}
