//! Application configuration. Backend endpoint, timeouts, analysis windows.

use serde::Deserialize;

/// Backend API served by the analytics service.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Per-request timeout in seconds. The summary stream is exempt (it is a
/// long-lived connection and only honors the connect timeout).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Base URL of the backend API. Read from APR_API_BASE_URL.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Per-request timeout in seconds (default 30). Read from APR_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Serve canned data instead of calling the backend. Read from APR_DEMO_MODE.
    #[serde(default)]
    pub demo_mode: Option<bool>,

    /// Drift detection window in days (default 30). Read from APR_DRIFT_WINDOW_DAYS.
    #[serde(default)]
    pub drift_window_days: Option<u32>,

    /// Anomaly scan lookback in days (default 30). Read from APR_ANOMALY_DAYS.
    #[serde(default)]
    pub anomaly_days: Option<u32>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("APR"));
        if let Ok(path) = std::env::var("APR_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Base URL with any trailing slash intact (the client normalizes).
    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode.unwrap_or(false)
    }

    pub fn drift_window_days_or_default(&self) -> u32 {
        self.drift_window_days.unwrap_or(30)
    }

    pub fn anomaly_days_or_default(&self) -> u32 {
        self.anomaly_days.unwrap_or(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_base_url_or_default(), DEFAULT_API_BASE_URL);
        assert_eq!(cfg.request_timeout_secs_or_default(), 30);
        assert!(!cfg.demo_mode());
        assert_eq!(cfg.drift_window_days_or_default(), 30);
        assert_eq!(cfg.anomaly_days_or_default(), 30);
    }
}
