//! Run configuration
//!
//! There is no configuration file; the binary builds a [`Config`] from its
//! command-line flags and hands it to the pipeline.

use std::fmt;
use std::str::FromStr;

/// Default snapshot memory budget (100 MB)
pub const DEFAULT_SNAPSHOT_MEMORY_LIMIT: usize = 100 * 1024 * 1024;

/// How printf arguments are matched against `%d` / `%f`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatPolicy {
    /// `%d` needs an int and `%f` a float; anything else is rejected
    #[default]
    Strict,
    /// `%d` prints a float truncated toward zero, `%f` prints an int widened
    Convert,
}

impl fmt::Display for FormatPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatPolicy::Strict => write!(f, "strict"),
            FormatPolicy::Convert => write!(f, "convert"),
        }
    }
}

impl FromStr for FormatPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(FormatPolicy::Strict),
            "convert" => Ok(FormatPolicy::Convert),
            other => Err(format!(
                "unknown format policy '{}' (expected 'strict' or 'convert')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub format_policy: FormatPolicy,
    /// Per-loop iteration ceiling; `None` lets loops run forever
    pub max_loop_iterations: Option<u64>,
    /// Record a snapshot after every executed statement
    pub record_snapshots: bool,
    pub snapshot_memory_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            format_policy: FormatPolicy::Strict,
            max_loop_iterations: None,
            record_snapshots: false,
            snapshot_memory_limit: DEFAULT_SNAPSHOT_MEMORY_LIMIT,
        }
    }
}

impl Config {
    pub fn with_format_policy(mut self, policy: FormatPolicy) -> Self {
        self.format_policy = policy;
        self
    }

    pub fn with_max_loop_iterations(mut self, limit: u64) -> Self {
        self.max_loop_iterations = Some(limit);
        self
    }

    pub fn with_snapshots(mut self) -> Self {
        self.record_snapshots = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.format_policy, FormatPolicy::Strict);
        assert_eq!(config.max_loop_iterations, None);
        assert!(!config.record_snapshots);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("convert".parse(), Ok(FormatPolicy::Convert));
        assert!("lenient".parse::<FormatPolicy>().is_err());
        assert_eq!(FormatPolicy::Strict.to_string(), "strict");
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_format_policy(FormatPolicy::Convert)
            .with_max_loop_iterations(10)
            .with_snapshots();
        assert_eq!(config.max_loop_iterations, Some(10));
        assert!(config.record_snapshots);
    }
}
