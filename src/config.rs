//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Queue service configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Broker connection string (informational for the in-memory transport).
    pub broker_url: String,
    /// Result store connection string (informational for the in-memory store).
    pub result_backend_url: String,
    /// Number of workers in the pool.
    pub workers: usize,
    /// Bounded capacity of the job queue.
    pub queue_capacity: usize,
    /// How long terminal statuses remain queryable.
    pub result_retention: Duration,
    /// Whether Success snapshots keep their result value.
    pub track_results: bool,
    /// Interval between expiry sweeps of the registry.
    pub expiry_sweep_interval: Duration,
    /// Duration of one simulated work tick in the handlers.
    pub tick: Duration,
    /// HTTP listen port.
    pub port: u16,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            broker_url: "memory://local".to_string(),
            result_backend_url: "memory://local".to_string(),
            workers: 4,
            queue_capacity: 256,
            result_retention: Duration::from_secs(3600), // 1 hour
            track_results: true,
            expiry_sweep_interval: Duration::from_secs(60),
            tick: Duration::from_secs(1),
            port: 8080,
        }
    }
}

impl QueueConfig {
    /// Build a configuration from `JOBQ_*` environment variables, falling
    /// back to defaults for unset variables. Set-but-unparsable values are
    /// an error rather than a silent default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            broker_url: std::env::var("JOBQ_BROKER_URL").unwrap_or(defaults.broker_url),
            result_backend_url: std::env::var("JOBQ_RESULT_BACKEND_URL")
                .unwrap_or(defaults.result_backend_url),
            workers: parse_var("JOBQ_WORKERS")?.unwrap_or(defaults.workers),
            queue_capacity: parse_var("JOBQ_QUEUE_CAPACITY")?.unwrap_or(defaults.queue_capacity),
            result_retention: parse_var("JOBQ_RESULT_EXPIRES_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.result_retention),
            track_results: parse_var("JOBQ_TRACK_RESULTS")?.unwrap_or(defaults.track_results),
            expiry_sweep_interval: parse_var("JOBQ_SWEEP_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.expiry_sweep_interval),
            tick: parse_var("JOBQ_TICK_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick),
            port: parse_var("JOBQ_PORT")?.unwrap_or(defaults.port),
        })
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("cannot parse {raw:?}"),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference() {
        let config = QueueConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.result_retention, Duration::from_secs(3600));
        assert!(config.track_results);
        assert_eq!(config.tick, Duration::from_secs(1));
    }

    #[test]
    fn from_env_falls_back_to_defaults() {
        // SAFETY: no other thread reads this variable concurrently.
        unsafe { std::env::remove_var("JOBQ_WORKERS") };
        let config = QueueConfig::from_env().unwrap();
        assert_eq!(config.workers, QueueConfig::default().workers);
    }

    #[test]
    fn unparsable_value_is_an_error() {
        // SAFETY: this test owns the variable; value restored below.
        unsafe { std::env::set_var("JOBQ_TEST_PARSE", "not-a-number") };
        let result: Result<Option<usize>, _> = parse_var("JOBQ_TEST_PARSE");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        unsafe { std::env::remove_var("JOBQ_TEST_PARSE") };
    }
}
