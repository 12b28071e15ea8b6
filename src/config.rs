//! Tuning knobs for the multiply strategies.

use std::env;
use std::str::FromStr;

use crate::error::{MatrixError, Result};

/// Multiplication settings.
///
/// The defaults reproduce the plain algorithms: naive runs on the global
/// rayon pool, Strassen recurses all the way down to 1x1 on one thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Worker threads for the naive strategy. `0` uses the global rayon pool.
    pub num_threads: usize,
    /// Naive products under this many FLOPs (`2 * m * n * k`) stay on the
    /// calling thread.
    pub parallel_threshold: usize,
    /// Side length at or below which Strassen stops splitting and
    /// multiplies directly.
    pub strassen_leaf: usize,
    /// Run the seven Strassen sub-products concurrently.
    pub parallel_strassen: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: 0,
            parallel_threshold: 1 << 20,
            strassen_leaf: 1,
            parallel_strassen: false,
        }
    }
}

impl Config {
    /// Defaults, overridden by any of `HAIFISCH_NUM_THREADS`,
    /// `HAIFISCH_PARALLEL_THRESHOLD`, `HAIFISCH_STRASSEN_LEAF` and
    /// `HAIFISCH_PARALLEL_STRASSEN` that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse(&lookup, "HAIFISCH_NUM_THREADS")? {
            config.num_threads = v;
        }
        if let Some(v) = parse(&lookup, "HAIFISCH_PARALLEL_THRESHOLD")? {
            config.parallel_threshold = v;
        }
        if let Some(v) = parse(&lookup, "HAIFISCH_STRASSEN_LEAF")? {
            config.strassen_leaf = v;
        }
        if let Some(v) = parse(&lookup, "HAIFISCH_PARALLEL_STRASSEN")? {
            config.parallel_strassen = v;
        }
        Ok(config)
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_parallel_threshold(mut self, flops: usize) -> Self {
        self.parallel_threshold = flops;
        self
    }

    pub fn with_strassen_leaf(mut self, side: usize) -> Self {
        self.strassen_leaf = side;
        self
    }

    pub fn with_parallel_strassen(mut self, enabled: bool) -> Self {
        self.parallel_strassen = enabled;
        self
    }
}

fn parse<F, V>(lookup: &F, key: &'static str) -> Result<Option<V>>
where
    F: Fn(&'static str) -> Option<String>,
    V: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| MatrixError::Config { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_overrides_defaults() {
        let config = Config::from_lookup(|key| match key {
            "HAIFISCH_NUM_THREADS" => Some("4".to_string()),
            "HAIFISCH_PARALLEL_STRASSEN" => Some("true".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.num_threads, 4);
        assert!(config.parallel_strassen);
        assert_eq!(config.strassen_leaf, Config::default().strassen_leaf);
    }

    #[test]
    fn test_bad_value_is_reported() {
        let err = Config::from_lookup(|key| match key {
            "HAIFISCH_STRASSEN_LEAF" => Some("sixteen".to_string()),
            _ => None,
        })
        .unwrap_err();

        match err {
            MatrixError::Config { key, value } => {
                assert_eq!(key, "HAIFISCH_STRASSEN_LEAF");
                assert_eq!(value, "sixteen");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_num_threads(2)
            .with_parallel_threshold(0)
            .with_strassen_leaf(32)
            .with_parallel_strassen(true);
        assert_eq!(config.num_threads, 2);
        assert_eq!(config.parallel_threshold, 0);
        assert_eq!(config.strassen_leaf, 32);
        assert!(config.parallel_strassen);
    }
}
