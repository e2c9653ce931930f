//! Configuration for a saturation run.
//!
//! ```toml
//! workers = 4
//!
//! [threshold]
//! base = 64
//! per_worker = 32
//!
//! [statistics]
//! rule_timings = false
//! ```
//!
//! Every field is optional. `SATURATE_WORKERS` overrides `workers`.

use std::{
    env, fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    thread,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const WORKERS_ENV: &str = "SATURATE_WORKERS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: workers must be at least 1")]
    NoWorkers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaturationConfig {
    /// Number of worker threads sharing one saturation factory.
    pub workers: usize,
    pub threshold: ThresholdConfig,
    pub statistics: StatisticsConfig,
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            threshold: ThresholdConfig::default(),
            statistics: StatisticsConfig::default(),
        }
    }
}

/// Bound on simultaneously unprocessed contexts before new jobs are paused.
///
/// Larger values improve throughput; smaller values shorten the time until an
/// individual job is reported finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdConfig {
    pub base: usize,
    pub per_worker: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            base: 64,
            per_worker: 32,
        }
    }
}

impl ThresholdConfig {
    #[must_use]
    pub fn for_workers(&self, workers: usize) -> usize {
        self.base
            .saturating_add(self.per_worker.saturating_mul(workers))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatisticsConfig {
    /// Measure wall time spent in each rule kind.
    pub rule_timings: bool,
}

fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

impl SaturationConfig {
    /// Threshold for the configured number of workers.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold.for_workers(self.workers)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(self)
    }

    /// Reads and validates the file at `path`, then applies environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content, path)?;
        config.apply_overrides(env::var(WORKERS_ENV).ok().as_deref());
        Ok(config)
    }

    /// Loads `~/.saturate/config.toml`, falling back to defaults.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = config_path().filter(|path| path.exists()) else {
            let mut config = Self::default();
            config.apply_overrides(env::var(WORKERS_ENV).ok().as_deref());
            return config;
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("{err}; using default saturation config");
                Self::default()
            }
        }
    }

    fn apply_overrides(&mut self, workers: Option<&str>) {
        let Some(raw) = workers else {
            return;
        };
        match raw.trim().parse::<usize>() {
            Ok(workers) if workers > 0 => self.workers = workers,
            _ => tracing::warn!("Ignoring invalid {WORKERS_ENV}={raw:?}"),
        }
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".saturate").join("config.toml"))
}
