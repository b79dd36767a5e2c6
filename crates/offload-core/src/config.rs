//! Runtime configuration

use crate::stream::StreamOptions;
use std::env;
use std::str::FromStr;

/// Settings for devices and streams
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of emulated devices to create
    pub device_count: usize,
    /// Wait for every kernel launch and report its error at the call site
    pub blocking_launches: bool,
    /// Only log kernel timings at least this long
    pub perf_threshold_us: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            device_count: 1,
            blocking_launches: false,
            perf_threshold_us: None,
        }
    }
}

impl RuntimeConfig {
    /// Read overrides from the environment
    ///
    /// - `OFFLOAD_DEVICE_COUNT`: number of devices (positive integer)
    /// - `OFFLOAD_BLOCKING_LAUNCHES`: `true`/`1`/`yes` or `false`/`0`/`no`
    /// - `OFFLOAD_PERF_THRESHOLD_US`: minimum logged kernel duration
    ///
    /// Unparseable values keep the default and log a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(count) = parse_var::<usize>("OFFLOAD_DEVICE_COUNT") {
            if count == 0 {
                tracing::warn!(var = "OFFLOAD_DEVICE_COUNT", "device count must be positive, using default");
            } else {
                config.device_count = count;
            }
        }

        if let Ok(raw) = env::var("OFFLOAD_BLOCKING_LAUNCHES") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => config.blocking_launches = true,
                "false" | "0" | "no" => config.blocking_launches = false,
                _ => tracing::warn!(var = "OFFLOAD_BLOCKING_LAUNCHES", value = %raw, "invalid boolean, using default"),
            }
        }

        if let Some(threshold) = parse_var::<u64>("OFFLOAD_PERF_THRESHOLD_US") {
            config.perf_threshold_us = Some(threshold);
        }

        config
    }

    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            blocking_launches: self.blocking_launches,
            perf_threshold_us: self.perf_threshold_us,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "invalid value, using default");
            None
        }
    }
}
