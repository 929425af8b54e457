//! Configuration structures.
//!
//! Configuration is loaded from a JSON file and environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::errors::{Error, Result};

/// Default visit idle timeout, in milliseconds.
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 300_000;

/// Global backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Forwarder configuration.
    #[serde(default)]
    pub woopra: WoopraConfig,

    /// HTTP tracking client configuration.
    #[serde(default)]
    pub client: ClientConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from a JSON file. Missing sections take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }

    /// Apply `WOOPRA_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognized keys: `WOOPRA_URL`, `WOOPRA_IDLE_TIMEOUT` (ms), `WOOPRA_SECURE`,
    /// `WOOPRA_EVENT_BLACK_LIST` (comma separated, appended) and
    /// `WOOPRA_LOG_FORMAT` (`json` switches to JSON logs).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("WOOPRA_URL") {
            self.woopra.url = Some(url);
        }

        if let Some(raw) = lookup("WOOPRA_IDLE_TIMEOUT") {
            self.woopra.idle_timeout = raw.trim().parse().map_err(|_| {
                Error::config(format!("WOOPRA_IDLE_TIMEOUT is not an integer: {raw}"))
            })?;
        }

        if let Some(raw) = lookup("WOOPRA_SECURE") {
            self.woopra.secure = parse_bool(&raw)
                .ok_or_else(|| Error::config(format!("WOOPRA_SECURE is not a boolean: {raw}")))?;
        }

        if let Some(raw) = lookup("WOOPRA_EVENT_BLACK_LIST") {
            self.woopra.event_black_list.extend(
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from),
            );
        }

        if let Some(raw) = lookup("WOOPRA_LOG_FORMAT") {
            self.observability.json_logs = raw.trim().eq_ignore_ascii_case("json");
        }

        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Options recognized by the Woopra forwarder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WoopraConfig {
    /// Project domain registered in Woopra. Absent or empty disables forwarding.
    pub url: Option<String>,

    /// Milliseconds after which a visit is marked offline.
    pub idle_timeout: u64,

    /// Track over https.
    pub secure: bool,

    /// Event names that are never forwarded.
    pub event_black_list: Vec<String>,
}

impl WoopraConfig {
    /// Configuration pointing at the given project domain, all else default.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// The configured destination, treating an empty string as absent.
    pub fn destination(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn idle_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.idle_timeout)
    }

    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout == 0 {
            return Err(Error::validation("idle_timeout must be positive"));
        }
        Ok(())
    }
}

impl Default for WoopraConfig {
    fn default() -> Self {
        Self {
            url: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT_MS,
            secure: true,
            event_black_list: Vec::new(),
        }
    }
}

/// HTTP tracking client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Host serving the tracking API.
    pub endpoint_host: String,

    /// Per-request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_host: "www.woopra.com".to_string(),
            request_timeout: Duration::from_secs(10),
            user_agent: concat!("woopra-tracking/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
