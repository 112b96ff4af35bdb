//! Parsers for CPU bandwidth files of both cgroup hierarchies.
//!
//! - cgroup v1 exposes the bandwidth as two files, `cpu.cfs_quota_us` and
//!   `cpu.cfs_period_us`. A quota of `-1` (or any value `<= 0`) means no limit.
//! - cgroup v2 combines both into `cpu.max`, holding `"<quota> <period>"` where the
//!   quota can be the literal `max`.
//!
//! [`OnlineCpus`] parses the sysfs CPU list (`/sys/devices/system/cpu/online`) the host
//! fallback counts CPUs from.
//!
//! # Examples
//!
//! ```rust
//! use cgroup_quota::cgroup::stats::{CfsQuota, CpuLimit, SingleLineStat};
//!
//! let quota = CfsQuota::from_reader(&mut "-1\n".as_bytes()).unwrap();
//! assert_eq!(quota.quota_us, None);
//!
//! let limit = CpuLimit::from_reader(&mut "150000 100000\n".as_bytes()).unwrap();
//! assert_eq!(limit.cores(), Some(1.5));
//! ```

use std::io::BufRead;

use super::parser::{parse_i64, read_value_line};
use super::{SingleLineStat, StatParseError};

/// Period assumed by the kernel when `cpu.max` carries no period.
const DEFAULT_PERIOD: u64 = 100_000;

/// Represents CPU limits from `cpu.max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuLimit {
    /// CPU time (in microseconds) allowed per period.
    ///
    /// A value of `None` represents "max", meaning no quota is enforced.
    pub quota: Option<u64>,
    /// Length of one enforcement period in microseconds.
    pub period: u64,
}

impl CpuLimit {
    /// Returns the limit as a number of CPU core equivalents, or `None` if unlimited.
    pub fn cores(&self) -> Option<f64> {
        match self.quota {
            Some(quota) if quota > 0 && self.period > 0 => Some(quota as f64 / self.period as f64),
            _ => None,
        }
    }
}

impl SingleLineStat for CpuLimit {
    /// Parses a `cpu.max`-style file.
    ///
    /// A missing period falls back to the kernel default of 100ms.
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` if the file is empty, `InvalidData` if either number is malformed.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let line = read_value_line(buf)?;
        let mut parts = line.split_whitespace();
        let quota_str = parts.next().unwrap_or_default();

        let quota = match quota_str {
            "max" => None,
            value => Some(parse_i64(value)?.max(0) as u64),
        };
        let period = match parts.next() {
            Some(value) => parse_i64(value)?.max(0) as u64,
            None => DEFAULT_PERIOD,
        };

        Ok(CpuLimit { quota, period })
    }
}

/// Represents the CFS quota from `cpu.cfs_quota_us`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfsQuota {
    /// Allowed CPU time per period in microseconds; `None` if no quota is set.
    pub quota_us: Option<i64>,
}

impl SingleLineStat for CfsQuota {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let quota = parse_i64(&read_value_line(buf)?)?;
        Ok(CfsQuota {
            quota_us: (quota > 0).then_some(quota),
        })
    }
}

/// Represents the CFS period from `cpu.cfs_period_us`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfsPeriod {
    /// Length of one enforcement period in microseconds.
    pub period_us: i64,
}

impl SingleLineStat for CfsPeriod {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        Ok(CfsPeriod {
            period_us: parse_i64(&read_value_line(buf)?)?,
        })
    }
}

/// Number of CPUs in a sysfs CPU list such as `0-3,6,8-11`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineCpus {
    pub count: usize,
}

impl SingleLineStat for OnlineCpus {
    /// Parses a comma-separated list of CPU ids and inclusive `first-last` ranges.
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` if the file is empty, `InvalidData` if an id is not a number or a
    /// range runs backwards.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let line = read_value_line(buf)?;
        let mut count = 0;

        for part in line.split(',').filter(|part| !part.is_empty()) {
            count += match part.split_once('-') {
                Some((first, last)) => {
                    let (first, last) = (parse_i64(first)?, parse_i64(last)?);
                    if last < first {
                        return Err(StatParseError::InvalidRange {
                            value: part.to_string(),
                            line: 1,
                        }
                        .into());
                    }
                    (last - first + 1) as usize
                }
                None => {
                    parse_i64(part)?;
                    1
                }
            };
        }

        Ok(OnlineCpus { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgroup::stats::error::extract_stat_parse_error;

    #[test]
    fn test_parse_cfs_quota() {
        let quota = CfsQuota::from_reader(&mut "50000\n".as_bytes()).unwrap();
        assert_eq!(quota.quota_us, Some(50000));
    }

    #[test]
    fn test_parse_unset_cfs_quota() {
        for data in ["-1\n", "0\n", "-100"] {
            let quota = CfsQuota::from_reader(&mut data.as_bytes()).unwrap();
            assert_eq!(quota.quota_us, None, "input {data:?}");
        }
    }

    #[test]
    fn test_parse_invalid_cfs_quota() {
        let err = CfsQuota::from_reader(&mut "abc\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        match extract_stat_parse_error(&err) {
            StatParseError::InvalidValue { value, line, .. } => {
                assert_eq!(value, "abc");
                assert_eq!(*line, 1);
            }
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_parse_cfs_period() {
        let period = CfsPeriod::from_reader(&mut " 100000 \n".as_bytes()).unwrap();
        assert_eq!(period.period_us, 100_000);

        let err = CfsPeriod::from_reader(&mut "".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_parse_complete_cpu_limit() {
        let data = b"\
50000 100000
";
        let limit = CpuLimit::from_reader(&mut &data[..]).unwrap();
        assert_eq!(limit.quota, Some(50000));
        assert_eq!(limit.period, 100000);
        assert_eq!(limit.cores(), Some(0.5));
    }

    #[test]
    fn test_parse_cpu_limit_max_quota() {
        let data = b"max 250000";
        let limit = CpuLimit::from_reader(&mut &data[..]).unwrap();
        assert_eq!(limit.quota, None);
        assert_eq!(limit.period, 250000);
        assert_eq!(limit.cores(), None);
    }

    #[test]
    fn test_parse_cpu_limit_missing_period() {
        let data = b"max";
        let limit = CpuLimit::from_reader(&mut &data[..]).unwrap();
        assert_eq!(limit.quota, None);
        assert_eq!(limit.period, 100_000);
    }

    #[test]
    fn test_parse_online_cpus() {
        for (data, expected) in [("0\n", 1), ("0-7\n", 8), ("0-3,6,8-11\n", 9)] {
            let cpus = OnlineCpus::from_reader(&mut data.as_bytes()).unwrap();
            assert_eq!(cpus.count, expected, "input {data:?}");
        }
    }

    #[test]
    fn test_parse_invalid_online_cpus() {
        let err = OnlineCpus::from_reader(&mut "0-3,7-5\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        match extract_stat_parse_error(&err) {
            StatParseError::InvalidRange { value, .. } => assert_eq!(value, "7-5"),
            other => panic!("Expected InvalidRange error, got {other:?}"),
        }

        let err = OnlineCpus::from_reader(&mut "0-x\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

        let err = OnlineCpus::from_reader(&mut "".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_parse_invalid_cpu_limit() {
        let err = CpuLimit::from_reader(&mut "lots 100000".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
