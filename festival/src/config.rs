//! Configuration management for the festival monitor.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Call `dotenvy::dotenv()` first if a `.env` file should be honoured.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Milliseconds between simulation ticks
pub const TICK_INTERVAL_MS_VAR: &str = "FESTPULSE_TICK_INTERVAL_MS";
/// Largest per-venue movement applied on a tick
pub const TICK_DELTA_VAR: &str = "FESTPULSE_TICK_DELTA";
/// Number of alerts the feed keeps
pub const ALERT_FEED_CAP_VAR: &str = "FESTPULSE_ALERT_FEED_CAP";
/// Seconds to wait for in-flight work on shutdown
pub const SHUTDOWN_TIMEOUT_SECS_VAR: &str = "FESTPULSE_SHUTDOWN_TIMEOUT_SECS";
/// Ticks between dashboard log lines
pub const REPORT_EVERY_TICKS_VAR: &str = "FESTPULSE_REPORT_EVERY_TICKS";
/// Log filter directives
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "festpulse=info,festpulse_runtime=info";

/// Upper bound accepted for the tick delta
pub const MAX_TICK_DELTA: i32 = 1000;

/// A configuration value that could not be used
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is set but its value is unusable
    #[error("{key}={value:?} is invalid: expected {expected}")]
    Invalid {
        /// Environment variable name
        key: &'static str,
        /// Raw value found
        value: String,
        /// What an acceptable value looks like
        expected: &'static str,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Time between simulation ticks
    pub tick_interval: Duration,
    /// Per-venue movement bound for each tick
    pub tick_delta: i32,
    /// Alerts kept in the feed
    pub alert_feed_cap: usize,
    /// Graceful shutdown timeout
    pub shutdown_timeout: Duration,
    /// Log a dashboard line every this many ticks
    pub report_every_ticks: u32,
    /// `tracing` filter directives
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(5000),
            tick_delta: 10,
            alert_feed_cap: crate::alerts::ALERT_FEED_CAP,
            shutdown_timeout: Duration::from_secs(5),
            report_every_ticks: 1,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or invalid values fall back to their defaults; invalid ones
    /// are logged at `warn`, so install the subscriber before calling this.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from environment variables, rejecting bad values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first variable that is set
    /// but cannot be parsed or is out of range.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::try_from_lookup(|key| std::env::var(key).ok())
    }

    /// Lenient load from an arbitrary source of variables
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            tick_interval: or_default(tick_interval(&lookup), defaults.tick_interval),
            tick_delta: or_default(tick_delta(&lookup), defaults.tick_delta),
            alert_feed_cap: or_default(alert_feed_cap(&lookup), defaults.alert_feed_cap),
            shutdown_timeout: or_default(shutdown_timeout(&lookup), defaults.shutdown_timeout),
            report_every_ticks: or_default(
                report_every_ticks(&lookup),
                defaults.report_every_ticks,
            ),
            log_filter: lookup(LOG_FILTER_VAR).unwrap_or(defaults.log_filter),
        }
    }

    /// Strict load from an arbitrary source of variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first unusable value.
    pub fn try_from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            tick_interval: tick_interval(&lookup)?,
            tick_delta: tick_delta(&lookup)?,
            alert_feed_cap: alert_feed_cap(&lookup)?,
            shutdown_timeout: shutdown_timeout(&lookup)?,
            report_every_ticks: report_every_ticks(&lookup)?,
            log_filter: lookup(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

fn tick_interval(lookup: &impl Fn(&str) -> Option<String>) -> Result<Duration, ConfigError> {
    parse(lookup, TICK_INTERVAL_MS_VAR, 5000_u64, |ms| *ms > 0, "a positive number of milliseconds")
        .map(Duration::from_millis)
}

fn tick_delta(lookup: &impl Fn(&str) -> Option<String>) -> Result<i32, ConfigError> {
    parse(
        lookup,
        TICK_DELTA_VAR,
        10,
        |delta| (0..=MAX_TICK_DELTA).contains(delta),
        "an integer between 0 and 1000",
    )
}

fn alert_feed_cap(lookup: &impl Fn(&str) -> Option<String>) -> Result<usize, ConfigError> {
    parse(
        lookup,
        ALERT_FEED_CAP_VAR,
        crate::alerts::ALERT_FEED_CAP,
        |cap| *cap > 0,
        "a positive integer",
    )
}

fn shutdown_timeout(lookup: &impl Fn(&str) -> Option<String>) -> Result<Duration, ConfigError> {
    parse(lookup, SHUTDOWN_TIMEOUT_SECS_VAR, 5_u64, |_| true, "a number of seconds")
        .map(Duration::from_secs)
}

fn report_every_ticks(lookup: &impl Fn(&str) -> Option<String>) -> Result<u32, ConfigError> {
    parse(lookup, REPORT_EVERY_TICKS_VAR, 1, |n| *n > 0, "a positive integer")
}

fn or_default<T>(result: Result<T, ConfigError>, default: T) -> T {
    result.unwrap_or_else(|error| {
        tracing::warn!(%error, "Using default configuration value");
        default
    })
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    valid: impl Fn(&T) -> bool,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Ok(value),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            expected,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Ok(mut bytes) = self.0.lock() {
                bytes.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            self.0
                .lock()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default()
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(Config::from_lookup(vars(&[])), Config::default());
        assert_eq!(Config::try_from_lookup(vars(&[])), Ok(Config::default()));
        assert_eq!(Config::default().tick_interval, Duration::from_secs(5));
        assert_eq!(Config::default().alert_feed_cap, 10);
    }

    #[test]
    fn values_are_read() {
        let config = Config::from_lookup(vars(&[
            (TICK_INTERVAL_MS_VAR, "250"),
            (TICK_DELTA_VAR, " 25 "),
            (ALERT_FEED_CAP_VAR, "20"),
            (SHUTDOWN_TIMEOUT_SECS_VAR, "0"),
            (REPORT_EVERY_TICKS_VAR, "12"),
            (LOG_FILTER_VAR, "festpulse=debug"),
        ]));
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.tick_delta, 25);
        assert_eq!(config.alert_feed_cap, 20);
        assert_eq!(config.shutdown_timeout, Duration::ZERO);
        assert_eq!(config.report_every_ticks, 12);
        assert_eq!(config.log_filter, "festpulse=debug");
    }

    #[test]
    fn strict_load_rejects_zero_interval() {
        let result = Config::try_from_lookup(vars(&[(TICK_INTERVAL_MS_VAR, "0")]));
        assert_eq!(
            result,
            Err(ConfigError::Invalid {
                key: TICK_INTERVAL_MS_VAR,
                value: "0".to_string(),
                expected: "a positive number of milliseconds",
            })
        );
    }

    #[test]
    fn strict_load_rejects_out_of_range_delta() {
        for raw in ["-1", "1001", "ten"] {
            let result = Config::try_from_lookup(vars(&[(TICK_DELTA_VAR, raw)]));
            assert!(
                matches!(result, Err(ConfigError::Invalid { key: TICK_DELTA_VAR, .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn lenient_load_falls_back_per_field() {
        let config = Config::from_lookup(vars(&[
            (TICK_INTERVAL_MS_VAR, "fast"),
            (TICK_DELTA_VAR, "3"),
        ]));
        assert_eq!(config.tick_interval, Duration::from_secs(5));
        assert_eq!(config.tick_delta, 3);
    }

    #[test]
    fn lenient_fallback_is_logged_to_the_active_subscriber() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let config = tracing::subscriber::with_default(subscriber, || {
            Config::from_lookup(vars(&[(TICK_INTERVAL_MS_VAR, "fast")]))
        });

        assert_eq!(config.tick_interval, Duration::from_secs(5));
        let text = logs.text();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("Using default configuration value"), "{text}");
        assert!(text.contains("FESTPULSE_TICK_INTERVAL_MS"), "{text}");
    }

    #[test]
    fn valid_values_log_nothing() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            Config::from_lookup(vars(&[(TICK_INTERVAL_MS_VAR, "250")]))
        });

        assert!(logs.text().is_empty());
    }

    #[test]
    fn error_message_names_the_variable() {
        let error = ConfigError::Invalid {
            key: ALERT_FEED_CAP_VAR,
            value: "0".to_string(),
            expected: "a positive integer",
        };
        assert_eq!(
            error.to_string(),
            "FESTPULSE_ALERT_FEED_CAP=\"0\" is invalid: expected a positive integer"
        );
    }
}
