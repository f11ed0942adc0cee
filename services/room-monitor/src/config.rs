//! Configuration types for the room monitor service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::RoomMonitorError;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Remote sensor record location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub base_url: String,
    #[serde(default = "default_source_path")]
    pub path: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_fetch_timeout", with = "humantime_serde")]
    pub fetch_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_source_url(),
            path: default_source_path(),
            auth_token: None,
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trend_threshold: default_trend_threshold(),
        }
    }
}

/// High temperature alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_alert_threshold")]
    pub threshold_celsius: f64,
    #[serde(default = "default_alert_cooldown", with = "humantime_serde")]
    pub cooldown: Duration,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(default = "default_alert_log_size")]
    pub log_size: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: String::new(),
            threshold_celsius: default_alert_threshold(),
            cooldown: default_alert_cooldown(),
            request_timeout: default_request_timeout(),
            log_size: default_alert_log_size(),
        }
    }
}

/// Status API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
        }
    }
}

fn default_source_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_source_path() -> String {
    "sensores/sala".to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_history_capacity() -> usize {
    10
}

fn default_trend_threshold() -> f64 {
    5.0
}

fn default_alert_threshold() -> f64 {
    35.0
}

fn default_alert_cooldown() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_alert_log_size() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    11120
}

impl Config {
    /// Apply `ROOM_MONITOR_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> crate::Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using the given variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ROOM_MONITOR_SOURCE_URL") {
            self.source.base_url = v;
        }
        if let Some(v) = lookup("ROOM_MONITOR_SOURCE_PATH") {
            self.source.path = v;
        }
        if let Some(v) = lookup("ROOM_MONITOR_SOURCE_TOKEN") {
            self.source.auth_token = Some(v);
        }
        if let Some(v) = lookup("ROOM_MONITOR_FETCH_TIMEOUT") {
            self.source.fetch_timeout = parse_duration_var("ROOM_MONITOR_FETCH_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("ROOM_MONITOR_POLL_INTERVAL") {
            self.poller.interval = parse_duration_var("ROOM_MONITOR_POLL_INTERVAL", &v)?;
        }
        if let Some(v) = lookup("ROOM_MONITOR_HISTORY_CAPACITY") {
            self.history.capacity = parse_var("ROOM_MONITOR_HISTORY_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("ROOM_MONITOR_TREND_THRESHOLD") {
            self.analysis.trend_threshold = parse_var("ROOM_MONITOR_TREND_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("ROOM_MONITOR_ALERT_THRESHOLD") {
            self.alert.threshold_celsius = parse_var("ROOM_MONITOR_ALERT_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("ROOM_MONITOR_ALERT_COOLDOWN") {
            self.alert.cooldown = parse_duration_var("ROOM_MONITOR_ALERT_COOLDOWN", &v)?;
        }
        if let Some(v) = lookup("ROOM_MONITOR_ALERT_ENDPOINT") {
            self.alert.endpoint = v;
        }
        if let Some(v) = lookup("ROOM_MONITOR_DASHBOARD_PORT") {
            self.dashboard.port = parse_var("ROOM_MONITOR_DASHBOARD_PORT", &v)?;
        }
        Ok(())
    }

    /// Check the configuration for values the service cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(config_error("source.base_url must not be empty"));
        }
        if self.poller.interval.is_zero() {
            return Err(config_error("poller.interval must be greater than zero"));
        }
        if self.source.fetch_timeout.is_zero() {
            return Err(config_error("source.fetch_timeout must be greater than zero"));
        }
        if self.source.fetch_timeout >= self.poller.interval {
            return Err(config_error(format!(
                "source.fetch_timeout ({}) must be shorter than poller.interval ({})",
                humantime::format_duration(self.source.fetch_timeout),
                humantime::format_duration(self.poller.interval)
            )));
        }
        if self.history.capacity == 0 {
            return Err(config_error("history.capacity must be at least 1"));
        }
        check_threshold("analysis.trend_threshold", self.analysis.trend_threshold)?;
        check_threshold("alert.threshold_celsius", self.alert.threshold_celsius)?;
        if self.alert.enabled && self.alert.endpoint.trim().is_empty() {
            return Err(config_error(
                "alert.endpoint is required when alerts are enabled",
            ));
        }
        Ok(())
    }
}

fn check_threshold(name: &str, value: f64) -> crate::Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(config_error(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn config_error(msg: impl Into<String>) -> RoomMonitorError {
    RoomMonitorError::Config(msg.into())
}

fn parse_var<T>(name: &str, value: &str) -> crate::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| config_error(format!("Invalid value {:?} for {}: {}", value, name, e)))
}

fn parse_duration_var(name: &str, value: &str) -> crate::Result<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| config_error(format!("Invalid duration {:?} for {}: {}", value, name, e)))
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RoomMonitorError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
