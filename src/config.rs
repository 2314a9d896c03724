//! Layered runtime configuration.
//!
//! Settings are resolved in order, later sources winning:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config pulsewatch.toml`)
//! 3. Environment variables prefixed with `PULSEWATCH_` (e.g. `PULSEWATCH_STATUS_URL`)
//! 4. Command-line flags ([`Overrides`])
//!
//! ```toml
//! status_url = "http://localhost:8000"
//! poll_interval = "1s"
//! request_timeout = "10s"
//! history_capacity = 50
//! unhealthy_latency_ms = 500.0
//! range_floor_ms = 50.0
//! accepted_schemes = ["http://", "https://"]
//! log_file = "pulsewatch.log"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::history::DEFAULT_HISTORY_CAPACITY;
use crate::sync::SyncOptions;
use crate::ui::trend::TrendConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PULSEWATCH";

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the status/control source.
    pub status_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    /// Samples kept per target.
    pub history_capacity: usize,
    /// Latest latency above which a trend chart switches to the unhealthy palette.
    pub unhealthy_latency_ms: f64,
    /// Minimum vertical span of a trend chart.
    pub range_floor_ms: f64,
    /// Address prefixes accepted when starting a monitor.
    pub accepted_schemes: Vec<String>,
    /// Log destination; `None` disables logging.
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            status_url: "http://localhost:8000".to_string(),
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            unhealthy_latency_ms: TrendConfig::DEFAULT_UNHEALTHY_LATENCY_MS,
            range_floor_ms: TrendConfig::DEFAULT_RANGE_FLOOR_MS,
            accepted_schemes: vec!["http://".to_string(), "https://".to_string()],
            log_file: Some(PathBuf::from("pulsewatch.log")),
        }
    }
}

/// Values given on the command line. `None` keeps the loaded value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub status_url: Option<String>,
    /// Duration string, e.g. "500ms".
    pub poll_interval: Option<String>,
    pub history_capacity: Option<usize>,
}

/// Settings as they appear in files and the environment.
#[derive(Debug, Deserialize)]
struct RawSettings {
    status_url: String,
    poll_interval: String,
    request_timeout: String,
    history_capacity: usize,
    unhealthy_latency_ms: f64,
    range_floor_ms: f64,
    accepted_schemes: Vec<String>,
    log_file: String,
}

impl Settings {
    /// Load settings from defaults, an optional file, and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// Load settings with an explicit environment map instead of the process
    /// environment (`None` reads the real environment).
    pub fn load_from(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("status_url", defaults.status_url.clone())?
            .set_default("poll_interval", "1s")?
            .set_default("request_timeout", "10s")?
            .set_default("history_capacity", defaults.history_capacity as u64)?
            .set_default("unhealthy_latency_ms", defaults.unhealthy_latency_ms)?
            .set_default("range_floor_ms", defaults.range_floor_ms)?
            .set_default("accepted_schemes", defaults.accepted_schemes.clone())?
            .set_default("log_file", "pulsewatch.log")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("accepted_schemes")
            .source(env);

        let raw: RawSettings = builder
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let settings = Self {
            status_url: raw.status_url.trim().trim_end_matches('/').to_string(),
            poll_interval: parse_duration(&raw.poll_interval)
                .with_context(|| format!("poll_interval = {:?}", raw.poll_interval))?,
            request_timeout: parse_duration(&raw.request_timeout)
                .with_context(|| format!("request_timeout = {:?}", raw.request_timeout))?,
            history_capacity: raw.history_capacity,
            unhealthy_latency_ms: raw.unhealthy_latency_ms,
            range_floor_ms: raw.range_floor_ms,
            accepted_schemes: raw.accepted_schemes,
            log_file: match raw.log_file.trim() {
                "" => None,
                path => Some(PathBuf::from(path)),
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants that the rest of the crate relies on.
    pub fn validate(&self) -> Result<()> {
        if self.status_url.is_empty() {
            bail!("status_url must not be empty");
        }
        if self.poll_interval.is_zero() {
            bail!("poll_interval must be greater than zero");
        }
        if self.request_timeout.is_zero() {
            bail!("request_timeout must be greater than zero");
        }
        if self.history_capacity < 2 {
            bail!("history_capacity must be at least 2 to draw a trend");
        }
        if !(self.unhealthy_latency_ms > 0.0) {
            bail!("unhealthy_latency_ms must be positive");
        }
        if !(self.range_floor_ms > 0.0) {
            bail!("range_floor_ms must be positive");
        }
        if self.accepted_schemes.iter().all(|s| s.trim().is_empty()) {
            bail!("accepted_schemes must contain at least one prefix");
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded settings.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(url) = overrides.status_url {
            self.status_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(interval) = overrides.poll_interval {
            self.poll_interval =
                parse_duration(&interval).with_context(|| format!("--refresh {:?}", interval))?;
        }
        if let Some(capacity) = overrides.history_capacity {
            self.history_capacity = capacity;
        }
        self.validate()?;
        Ok(self)
    }

    /// Trend chart constants derived from these settings.
    pub fn trend(&self) -> TrendConfig {
        TrendConfig {
            unhealthy_latency_ms: self.unhealthy_latency_ms,
            range_floor_ms: self.range_floor_ms,
        }
    }

    /// Sync loop options derived from these settings.
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            poll_interval: self.poll_interval,
            history_capacity: self.history_capacity,
            accepted_schemes: self.accepted_schemes.clone(),
        }
    }
}
