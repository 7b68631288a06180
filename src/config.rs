//! Timing and endpoint configuration.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_COUNT_PATH: &str = "/notifications/count";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);
pub const DEFAULT_ALERT_DISMISS_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_BUSY_FALLBACK: Duration = Duration::from_secs(10);

/// Delay between a toast losing its `show` class and being removed.
/// Fixed so exit animations always get their full run.
pub const TOAST_GRACE_PERIOD: Duration = Duration::from_millis(300);

/// Page controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    /// Origin the count path is resolved against, e.g. `https://app.example`.
    pub base_url: Option<String>,
    pub count_path: String,
    pub poll_interval: Duration,
    pub toast_duration: Duration,
    pub alert_dismiss_delay: Duration,
    pub busy_fallback: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            count_path: DEFAULT_COUNT_PATH.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            toast_duration: DEFAULT_TOAST_DURATION,
            alert_dismiss_delay: DEFAULT_ALERT_DISMISS_DELAY,
            busy_fallback: DEFAULT_BUSY_FALLBACK,
        }
    }
}

impl UiConfig {
    /// Builds a configuration from defaults overridden by environment.
    ///
    /// # Environment Variables
    ///
    /// - `CHAMALINK_BASE_URL`: origin for the count endpoint
    /// - `CHAMALINK_COUNT_PATH`: count endpoint path (default `/notifications/count`)
    /// - `CHAMALINK_POLL_INTERVAL_MS`: poll period (default 30000)
    /// - `CHAMALINK_TOAST_DURATION_MS`: default toast lifetime (default 5000)
    /// - `CHAMALINK_ALERT_DISMISS_MS`: alert auto-dismiss delay (default 5000)
    /// - `CHAMALINK_BUSY_FALLBACK_MS`: busy-state safety release (default 10000)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a duration is not a whole
    /// number of milliseconds, or when the poll interval is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = env_string("CHAMALINK_BASE_URL") {
            config.base_url = Some(url.trim_end_matches('/').to_string());
        }
        if let Some(path) = env_string("CHAMALINK_COUNT_PATH") {
            config.count_path = path;
        }
        if let Some(interval) = env_millis("CHAMALINK_POLL_INTERVAL_MS")? {
            if interval.is_zero() {
                return Err(ConfigError::InvalidValue {
                    key: "CHAMALINK_POLL_INTERVAL_MS",
                    value: "0".to_string(),
                });
            }
            config.poll_interval = interval;
        }
        if let Some(duration) = env_millis("CHAMALINK_TOAST_DURATION_MS")? {
            config.toast_duration = duration;
        }
        if let Some(delay) = env_millis("CHAMALINK_ALERT_DISMISS_MS")? {
            config.alert_dismiss_delay = delay;
        }
        if let Some(fallback) = env_millis("CHAMALINK_BUSY_FALLBACK_MS")? {
            config.busy_fallback = fallback;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("UI config loaded: {:?}", config);

        Ok(config)
    }

    /// Absolute URL of the count endpoint.
    pub fn count_url(&self) -> Result<String, ConfigError> {
        let base = self.base_url.as_deref().ok_or(ConfigError::MissingBaseUrl)?;
        let path = self.count_path.trim_start_matches('/');
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_millis(key: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env_string(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 6] = [
        "CHAMALINK_BASE_URL",
        "CHAMALINK_COUNT_PATH",
        "CHAMALINK_POLL_INTERVAL_MS",
        "CHAMALINK_TOAST_DURATION_MS",
        "CHAMALINK_ALERT_DISMISS_MS",
        "CHAMALINK_BUSY_FALLBACK_MS",
    ];

    /// Helper to safely set env var in tests
    fn set_env(key: &str, value: &str) {
        // SAFETY: serialized tests, no other thread reads the environment
        unsafe { std::env::set_var(key, value); }
    }

    fn clear_env() {
        for key in KEYS {
            // SAFETY: serialized tests, no other thread reads the environment
            unsafe { std::env::remove_var(key); }
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = UiConfig::from_env().unwrap();
        assert_eq!(config, UiConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.busy_fallback, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        set_env("CHAMALINK_BASE_URL", "https://chama.example/");
        set_env("CHAMALINK_POLL_INTERVAL_MS", "1500");
        set_env("CHAMALINK_TOAST_DURATION_MS", "0");

        let config = UiConfig::from_env().unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://chama.example"));
        assert_eq!(config.poll_interval, Duration::from_millis(1500));
        assert_eq!(config.toast_duration, Duration::ZERO);
        assert_eq!(
            config.count_url().unwrap(),
            "https://chama.example/notifications/count"
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_values() {
        clear_env();
        set_env("CHAMALINK_BUSY_FALLBACK_MS", "ten seconds");
        assert_eq!(
            UiConfig::from_env(),
            Err(ConfigError::InvalidValue {
                key: "CHAMALINK_BUSY_FALLBACK_MS",
                value: "ten seconds".to_string(),
            })
        );

        clear_env();
        set_env("CHAMALINK_POLL_INTERVAL_MS", "0");
        assert!(matches!(
            UiConfig::from_env(),
            Err(ConfigError::InvalidValue { key: "CHAMALINK_POLL_INTERVAL_MS", .. })
        ));

        clear_env();
    }

    #[test]
    fn test_count_url_requires_base() {
        let config = UiConfig::default();
        assert_eq!(config.count_url(), Err(ConfigError::MissingBaseUrl));
    }
}
