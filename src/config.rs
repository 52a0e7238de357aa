//! Configuration for the pairing core
//!
//! Environment variables take precedence over the TOML file, which takes
//! precedence over the defaults:
//!
//! - `AURA_BACKEND_URL`: device backend base URL
//! - `AURA_BACKEND_TIMEOUT_SECS`: per-request HTTP timeout
//! - `AURA_STEP_DWELL_MS`: minimum pairing step dwell
//! - `AURA_AUTO_CLOSE_MS`: success screen auto-close delay

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::Result;
use crate::store::SUCCESS_AUTO_CLOSE;

/// Default device backend base URL
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Default per-request HTTP timeout
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default minimum dwell per pairing step on the success path
const DEFAULT_STEP_DWELL: Duration = Duration::from_millis(400);

/// Pairing core configuration
#[derive(Debug, Clone, Default)]
pub struct PairingConfig {
    pub backend: BackendConfig,
    pub timing: TimingConfig,
}

/// Device backend connection settings
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the discovery/pairing backend
    pub base_url: String,

    /// Per-request HTTP timeout (the scan time budget is per device
    /// class and enforced separately)
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// UX timing knobs
///
/// These are presentation concerns only; session lifecycle validity is
/// governed by generation counters, never by timing.
#[derive(Debug, Clone)]
pub struct TimingConfig {
    /// Minimum dwell per pairing step on the success path
    pub step_dwell: Duration,

    /// How long the success screen lingers before auto-closing
    pub success_auto_close: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            step_dwell: DEFAULT_STEP_DWELL,
            success_auto_close: SUCCESS_AUTO_CLOSE,
        }
    }
}

/// TOML file shape; every field optional, layered over the defaults
#[derive(Debug, Deserialize)]
struct RawConfig {
    backend_url: Option<String>,
    request_timeout_secs: Option<u64>,
    step_dwell_ms: Option<u64>,
    auto_close_ms: Option<u64>,
}

impl PairingConfig {
    /// Load configuration from environment variables over the defaults
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("AURA_BACKEND_URL") {
            config.backend.base_url = url;
        }
        if let Some(secs) = env_u64("AURA_BACKEND_TIMEOUT_SECS") {
            config.backend.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = env_u64("AURA_STEP_DWELL_MS") {
            config.timing.step_dwell = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("AURA_AUTO_CLOSE_MS") {
            config.timing.success_auto_close = Duration::from_millis(ms);
        }

        config
    }

    /// Load configuration from a TOML file over the defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string over the defaults
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is invalid.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(contents)?;
        let mut config = Self::default();

        if let Some(url) = raw.backend_url {
            config.backend.base_url = url;
        }
        if let Some(secs) = raw.request_timeout_secs {
            config.backend.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = raw.step_dwell_ms {
            config.timing.step_dwell = Duration::from_millis(ms);
        }
        if let Some(ms) = raw.auto_close_ms {
            config.timing.success_auto_close = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}
