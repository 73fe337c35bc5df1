//! Domain types and validators for discovery configuration.
//!
//! Pure functions only: no I/O and no filesystem access.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::error::ConfigError;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_WAPI_VERSION: &str = "v2.12";
pub const DEFAULT_LOG_FILE: &str = "discovery.log";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_START_CONFIRM_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_READ_FAILURES: u32 = 3;
pub const DEFAULT_SCAN_MODE: &str = "ICMP";
pub const DEFAULT_PING_RETRIES: u32 = 5;
pub const DEFAULT_PING_TIMEOUT_MS: u32 = 1500;

// ── File schema ──────────────────────────────────────────────────────────────

/// Configuration file as written by operators (`config.yaml`).
///
/// Required keys are optional here so validation can report all of them at
/// once instead of failing on the first missing one.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiscoveryConfig {
    #[serde(rename = "INFOBLOX_API_URL")]
    pub api_url: Option<String>,
    #[serde(rename = "INFOBLOX_API_USERNAME")]
    pub username: Option<String>,
    #[serde(rename = "INFOBLOX_API_PASSWORD")]
    pub password: Option<String>,
    #[serde(rename = "INFOBLOX_WAPI_VERSION")]
    pub wapi_version: Option<String>,
    #[serde(rename = "INFOBLOX_VERIFY_SSL")]
    pub verify_ssl: Option<bool>,
    #[serde(rename = "SCHEDULED_DISCOVERY_NETWORK_VIEW")]
    pub network_view: Option<String>,
    #[serde(rename = "SCHEDULED_DISCOVERY_DEFAULT_NETWORK")]
    pub default_network: Option<String>,
    #[serde(rename = "DISCOVERY_POLL_INTERVAL_SECS")]
    pub poll_interval_secs: Option<u64>,
    #[serde(rename = "DISCOVERY_STOP_TIMEOUT_SECS")]
    pub stop_timeout_secs: Option<u64>,
    #[serde(rename = "DISCOVERY_START_CONFIRM_TIMEOUT_SECS")]
    pub start_confirm_timeout_secs: Option<u64>,
    #[serde(rename = "DISCOVERY_MAX_READ_FAILURES")]
    pub max_read_failures: Option<u32>,
    #[serde(rename = "DISCOVERY_MODE")]
    pub scan_mode: Option<String>,
    #[serde(rename = "DISCOVERY_PING_RETRIES")]
    pub ping_retries: Option<u32>,
    #[serde(rename = "DISCOVERY_PING_TIMEOUT_MS")]
    pub ping_timeout_ms: Option<u32>,
    #[serde(rename = "DISCOVERY_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl DiscoveryConfig {
    /// Log file to use, even when the rest of the file is invalid.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
    }

    /// Validate and resolve into an immutable [`RunConfig`].
    ///
    /// `view_override` replaces the configured view (the `current` flow takes
    /// it from the command line).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] listing every invalid or missing setting.
    pub fn resolve(&self, view_override: Option<&str>, force: bool) -> Result<RunConfig, ConfigError> {
        let mut problems = Vec::new();

        let endpoint = match non_empty(self.api_url.as_deref()) {
            None => {
                problems.push("INFOBLOX_API_URL is empty or missing.".to_string());
                None
            }
            Some(raw) => match validate_api_url(raw) {
                Ok(url) => Some(url),
                Err(problem) => {
                    problems.push(problem);
                    None
                }
            },
        };

        let username = non_empty(self.username.as_deref());
        if username.is_none() {
            problems.push("INFOBLOX_API_USERNAME is empty or missing.".to_string());
        }
        let password = non_empty(self.password.as_deref());
        if password.is_none() {
            problems.push("INFOBLOX_API_PASSWORD is empty or missing.".to_string());
        }

        let target_view = match view_override {
            Some(view) => non_empty(Some(view)).or_else(|| {
                problems.push("--network_view must not be empty.".to_string());
                None
            }),
            None => non_empty(self.network_view.as_deref()).or_else(|| {
                problems.push("SCHEDULED_DISCOVERY_NETWORK_VIEW is empty or missing.".to_string());
                None
            }),
        };

        let fallback_network = match non_empty(self.default_network.as_deref()) {
            None => None,
            Some(raw) => match validate_cidr(raw) {
                Ok(net) => Some(net),
                Err(problem) => {
                    problems.push(problem);
                    None
                }
            },
        };

        let poll = PollSettings {
            interval: positive_secs(
                "DISCOVERY_POLL_INTERVAL_SECS",
                self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
                &mut problems,
            ),
            stop_timeout: positive_secs(
                "DISCOVERY_STOP_TIMEOUT_SECS",
                self.stop_timeout_secs.unwrap_or(DEFAULT_STOP_TIMEOUT_SECS),
                &mut problems,
            ),
            start_timeout: positive_secs(
                "DISCOVERY_START_CONFIRM_TIMEOUT_SECS",
                self.start_confirm_timeout_secs
                    .unwrap_or(DEFAULT_START_CONFIRM_TIMEOUT_SECS),
                &mut problems,
            ),
            max_read_failures: self.max_read_failures.unwrap_or(DEFAULT_MAX_READ_FAILURES),
        };

        let (Some(endpoint), Some(username), Some(password), Some(target_view)) =
            (endpoint, username, password, target_view)
        else {
            return Err(ConfigError { problems });
        };
        if !problems.is_empty() {
            return Err(ConfigError { problems });
        }

        Ok(RunConfig {
            endpoint,
            wapi_version: non_empty(self.wapi_version.as_deref())
                .unwrap_or(DEFAULT_WAPI_VERSION)
                .to_string(),
            verify_tls: self.verify_ssl.unwrap_or(false),
            username: username.to_string(),
            password: password.to_string(),
            target_view: target_view.to_string(),
            fallback_network,
            force,
            poll,
            scan: ScanSettings {
                mode: non_empty(self.scan_mode.as_deref())
                    .unwrap_or(DEFAULT_SCAN_MODE)
                    .to_string(),
                ping_retries: self.ping_retries.unwrap_or(DEFAULT_PING_RETRIES),
                ping_timeout_ms: self.ping_timeout_ms.unwrap_or(DEFAULT_PING_TIMEOUT_MS),
            },
            log_file: self.log_file(),
        })
    }
}

// ── Resolved configuration ───────────────────────────────────────────────────

/// Timing of state polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Upper bound on waiting for a stopped task after END.
    pub stop_timeout: Duration,
    /// Upper bound on waiting for RUNNING after START.
    pub start_timeout: Duration,
    /// Consecutive failed or unrecognised reads tolerated while polling.
    pub max_read_failures: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            stop_timeout: Duration::from_secs(DEFAULT_STOP_TIMEOUT_SECS),
            start_timeout: Duration::from_secs(DEFAULT_START_CONFIRM_TIMEOUT_SECS),
            max_read_failures: DEFAULT_MAX_READ_FAILURES,
        }
    }
}

/// Scan parameters written with the network assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub mode: String,
    pub ping_retries: u32,
    pub ping_timeout_ms: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            mode: DEFAULT_SCAN_MODE.to_string(),
            ping_retries: DEFAULT_PING_RETRIES,
            ping_timeout_ms: DEFAULT_PING_TIMEOUT_MS,
        }
    }
}

/// Validated configuration of a single run. Never mutated after resolution.
#[derive(Clone)]
pub struct RunConfig {
    pub endpoint: Url,
    pub wapi_version: String,
    pub verify_tls: bool,
    pub username: String,
    pub password: String,
    pub target_view: String,
    pub fallback_network: Option<IpNetwork>,
    /// Skip the interactive confirmation before stopping a task.
    pub force: bool,
    pub poll: PollSettings,
    pub scan: ScanSettings,
    pub log_file: PathBuf,
}

impl RunConfig {
    /// Base URL of the versioned WAPI, without a trailing slash.
    #[must_use]
    pub fn wapi_base(&self) -> String {
        format!(
            "{}/wapi/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            self.wapi_version
        )
    }

    /// Fallback network as `address/prefix` with host bits cleared.
    #[must_use]
    pub fn fallback_cidr(&self) -> Option<String> {
        self.fallback_network
            .map(|net| format!("{}/{}", net.network(), net.prefix()))
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("wapi_version", &self.wapi_version)
            .field("verify_tls", &self.verify_tls)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("target_view", &self.target_view)
            .field("fallback_network", &self.fallback_network)
            .field("force", &self.force)
            .field("poll", &self.poll)
            .field("scan", &self.scan)
            .field("log_file", &self.log_file)
            .finish()
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates that the API endpoint has a scheme and a host.
///
/// # Errors
///
/// Returns a human-readable problem description.
pub fn validate_api_url(raw: &str) -> Result<Url, String> {
    match Url::parse(raw) {
        Ok(url) if url.has_host() && matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(format!("INFOBLOX_API_URL '{raw}' is not a valid URL.")),
    }
}

/// Validates a fallback network. Host bits may be set.
///
/// # Errors
///
/// Returns a human-readable problem description.
pub fn validate_cidr(raw: &str) -> Result<IpNetwork, String> {
    raw.trim().parse::<IpNetwork>().map_err(|_| {
        format!("SCHEDULED_DISCOVERY_DEFAULT_NETWORK '{raw}' is not a valid IP network.")
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn positive_secs(key: &str, secs: u64, problems: &mut Vec<String>) -> Duration {
    if secs == 0 {
        problems.push(format!("{key} must be greater than zero."));
    }
    Duration::from_secs(secs)
}

// ── Unit tests ───────────────────────────────────────────────────────────────
