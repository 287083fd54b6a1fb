// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervision configuration
//!
//! Defaults, then an optional TOML file named by `VIGIL_CONFIG`, then
//! individual `VIGIL_*` environment overrides. Spawned peers inherit the
//! environment, so both sides of a pair resolve the same configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_ENV: &str = "VIGIL_CONFIG";
pub const BEACON_INTERVAL_ENV: &str = "VIGIL_BEACON_INTERVAL";
pub const CHECK_INTERVAL_ENV: &str = "VIGIL_CHECK_INTERVAL";
pub const STOP_INTERVAL_ENV: &str = "VIGIL_STOP_INTERVAL";
pub const POLL_INTERVAL_ENV: &str = "VIGIL_POLL_INTERVAL";
pub const MISS_THRESHOLD_ENV: &str = "VIGIL_MISS_THRESHOLD";
pub const NAMESPACE_ENV: &str = "VIGIL_NAMESPACE";
pub const WATCHDOG_BINARY_ENV: &str = "VIGIL_WATCHDOG_BINARY";

/// Name of the watchdog executable
pub const WATCHDOG_BINARY: &str = "vigild";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchdogConfig {
    /// How often each side signals it is alive
    #[serde(with = "humantime_serde")]
    pub beacon_interval: Duration,
    /// How often each side checks its miss counter
    #[serde(with = "humantime_serde")]
    pub check_interval: Duration,
    /// How often each side checks for a stop request
    #[serde(with = "humantime_serde")]
    pub stop_interval: Duration,
    /// Upper bound on one sleep of the scheduler's due-time wait
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Missed beacons tolerated before the peer is presumed dead
    pub miss_threshold: u32,
    /// Prefix of the rendezvous semaphore names
    pub namespace: String,
    /// Explicit path to the watchdog executable
    pub watchdog_binary: Option<PathBuf>,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            beacon_interval: Duration::from_secs(1),
            check_interval: Duration::from_secs(1),
            stop_interval: Duration::from_secs(2),
            poll_interval: Duration::from_secs(1),
            miss_threshold: 5,
            namespace: "vigil".to_string(),
            watchdog_binary: None,
        }
    }
}

impl WatchdogConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        let config = config.with_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let duration = |key: &'static str, current: Duration| -> Result<Duration, ConfigError> {
            match lookup(key) {
                Some(value) => humantime::parse_duration(&value).map_err(|e| ConfigError::Invalid {
                    key,
                    reason: format!("{:?}: {}", value, e),
                }),
                None => Ok(current),
            }
        };

        let miss_threshold = match lookup(MISS_THRESHOLD_ENV) {
            Some(value) => value.parse().map_err(|e| ConfigError::Invalid {
                key: MISS_THRESHOLD_ENV,
                reason: format!("{:?}: {}", value, e),
            })?,
            None => self.miss_threshold,
        };

        Ok(Self {
            beacon_interval: duration(BEACON_INTERVAL_ENV, self.beacon_interval)?,
            check_interval: duration(CHECK_INTERVAL_ENV, self.check_interval)?,
            stop_interval: duration(STOP_INTERVAL_ENV, self.stop_interval)?,
            poll_interval: duration(POLL_INTERVAL_ENV, self.poll_interval)?,
            miss_threshold,
            namespace: lookup(NAMESPACE_ENV).unwrap_or(self.namespace),
            watchdog_binary: lookup(WATCHDOG_BINARY_ENV)
                .map(PathBuf::from)
                .or(self.watchdog_binary),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("beacon_interval", self.beacon_interval),
            ("check_interval", self.check_interval),
            ("stop_interval", self.stop_interval),
            ("poll_interval", self.poll_interval),
        ];
        for (key, interval) in intervals {
            if interval.is_zero() {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if self.namespace.is_empty() || self.namespace.contains('/') {
            return Err(ConfigError::Invalid {
                key: "namespace",
                reason: format!("{:?} must be non-empty and contain no '/'", self.namespace),
            });
        }

        Ok(())
    }

    pub fn with_namespace(self, namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..self
        }
    }

    /// Semaphore the guarded side waits on
    pub fn guarded_semaphore(&self) -> String {
        format!("/{}.guarded", self.namespace)
    }

    /// Semaphore the watchdog side waits on
    pub fn watchdog_semaphore(&self) -> String {
        format!("/{}.watchdog", self.namespace)
    }

    /// Locate the watchdog executable
    pub fn resolve_watchdog_binary(&self) -> PathBuf {
        if let Some(path) = &self.watchdog_binary {
            return path.clone();
        }

        // Installed next to the current executable
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let sibling = dir.join(WATCHDOG_BINARY);
                if sibling.exists() {
                    return sibling;
                }
            }
        }

        // Running from cargo (development)
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let dev_path = PathBuf::from(manifest_dir)
                .parent()
                .and_then(|p| p.parent())
                .map(|p| p.join("target/debug").join(WATCHDOG_BINARY));
            if let Some(path) = dev_path {
                if path.exists() {
                    return path;
                }
            }
        }

        // Fall back to PATH lookup
        PathBuf::from(WATCHDOG_BINARY)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
