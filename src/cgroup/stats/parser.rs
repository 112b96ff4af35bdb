//! Generic traits for parsing Linux cgroup and procfs stat files into structured types.
//!
//! # Traits
//!
//! - [`KeyValueStat`]: multi-line files with one `key value [unit]` entry per line, such as
//!   `/proc/meminfo`. Keys may carry a fixed suffix (e.g., `MemTotal:`).
//! - [`SingleLineStat`]: files holding a single value on their first line, such as
//!   `memory.max`, `memory.current` or `cpu.cfs_quota_us`.
//!
//! # Example: Implementing `KeyValueStat`
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::LazyLock;
//! use cgroup_quota::cgroup::stats::KeyValueStat;
//!
//! #[derive(Default)]
//! struct Swap {
//!     total: u64,
//! }
//!
//! static HANDLERS: LazyLock<HashMap<&'static str, fn(&mut Swap, u64)>> = LazyLock::new(|| {
//!     let mut map: HashMap<&'static str, fn(&mut Swap, u64)> = HashMap::new();
//!     map.insert("SwapTotal", |s, v| s.total = v);
//!     map
//! });
//!
//! impl KeyValueStat for Swap {
//!     const KEY_SUFFIX: &'static str = ":";
//!     const ALLOW_DUPLICATE_KEYS: bool = false;
//!
//!     fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
//!         &HANDLERS
//!     }
//! }
//!
//! let swap = Swap::from_reader(&mut "SwapTotal:  2048 kB\n".as_bytes()).unwrap();
//! assert_eq!(swap.total, 2048);
//! ```

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use super::StatParseError;

/// A trait for parsing key-value style stat files where every line holds one key
/// followed by a value and an optional unit, separated by whitespace.
///
/// Implementors define a set of known keys and how to set values for them. Unknown
/// keys and lines without a value are ignored.
pub trait KeyValueStat: Default
where
    Self: 'static,
{
    /// Suffix stripped from every key before lookup, e.g. `":"` for `/proc/meminfo`.
    const KEY_SUFFIX: &'static str;

    /// If `false`, encountering the same known key more than once is an error and
    /// parsing stops as soon as every known key was seen.
    const ALLOW_DUPLICATE_KEYS: bool;

    /// Returns a map of known field names and the handler that stores a parsed value.
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)>;

    /// Parses a key-value formatted buffer into `Self`.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading fails, or a [`StatParseError`] wrapped in an
    /// `io::Error` of kind `InvalidData` if a known key has a malformed value or is
    /// duplicated.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut stat = Self::default();
        let handlers = Self::field_handlers();
        let mut seen_keys = HashSet::with_capacity(handlers.len());

        let mut line = String::new();
        let mut lineno = 0;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            let mut parts = line.split_whitespace();
            if let (Some(key), Some(val)) = (parts.next(), parts.next()) {
                let key = key.strip_suffix(Self::KEY_SUFFIX).unwrap_or(key);
                Self::parse_and_set(key, val, &mut stat, lineno, handlers, &mut seen_keys)?;
            }

            if !Self::ALLOW_DUPLICATE_KEYS && seen_keys.len() == handlers.len() {
                break;
            }
            line.clear();
        }

        Ok(stat)
    }

    /// Parses a single value and hands it to the handler registered for `key`.
    ///
    /// # Errors
    ///
    /// [`StatParseError::InvalidKeyValue`] if the value is not a `u64`,
    /// [`StatParseError::DuplicateField`] if the key repeats and duplicates are disallowed.
    fn parse_and_set(
        key: &str,
        val: &str,
        stat: &mut Self,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> std::io::Result<()> {
        let Some((k, handler)) = handlers.get_key_value(key) else {
            return Ok(());
        };

        let parsed = val
            .parse::<u64>()
            .map_err(|source| StatParseError::InvalidKeyValue {
                key: key.to_string(),
                value: val.to_string(),
                line: lineno,
                source,
            })?;
        if !Self::ALLOW_DUPLICATE_KEYS && !seen_keys.insert(k) {
            return Err(StatParseError::DuplicateField {
                field: key.to_string(),
                line: lineno,
            }
            .into());
        }
        handler(stat, parsed);
        Ok(())
    }
}

/// A trait for parsing single-value stat files such as `memory.max` or
/// `cpu.cfs_period_us`.
pub trait SingleLineStat: Sized {
    /// Parses the statistic from the provided buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading fails or the value is malformed.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self>;
}

/// Reads the first line of `buf` and returns it with surrounding whitespace removed.
///
/// # Errors
///
/// Returns [`StatParseError::UnexpectedEof`] (as an `io::Error` of kind
/// `UnexpectedEof`) if the reader holds no data at all.
pub(crate) fn read_value_line<R: BufRead>(buf: &mut R) -> std::io::Result<String> {
    let mut line = String::new();
    if buf.read_line(&mut line)? == 0 {
        return Err(StatParseError::UnexpectedEof.into());
    }
    Ok(line.trim().to_owned())
}

/// Parses a signed decimal value read from the first line of a stat file.
pub(crate) fn parse_i64(value: &str) -> Result<i64, StatParseError> {
    value
        .parse::<i64>()
        .map_err(|source| StatParseError::InvalidValue {
            value: value.to_string(),
            line: 1,
            source,
        })
}
