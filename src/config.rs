//! Dashboard configuration.
//!
//! Values come from the process environment first and fall back to the OS
//! credential store (see [`crate::storage`]). A single connection string may
//! stand in for the URL/key pair.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use tracing::debug;
use zeroize::Zeroizing;

use crate::api::{
    extract_key_from_connection_string, extract_url_from_connection_string, mask_key,
    normalize_supabase_url,
};
use crate::error::ConfigError;
use crate::storage;

pub const ENV_SUPABASE_URL: &str = "FUEL_DASHBOARD_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "FUEL_DASHBOARD_SUPABASE_ANON_KEY";
pub const ENV_CONNECTION: &str = "FUEL_DASHBOARD_CONNECTION";
pub const ENV_TIMEOUT_SECS: &str = "FUEL_DASHBOARD_TIMEOUT_SECS";
pub const ENV_LOG_DIR: &str = "FUEL_DASHBOARD_LOG_DIR";

/// Default timeout for REST requests (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct DashboardConfig {
    pub supabase_url: String,
    anon_key: Zeroizing<String>,
    pub request_timeout: Duration,
    pub log_dir: Option<PathBuf>,
}

impl fmt::Debug for DashboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("supabase_url", &self.supabase_url)
            .field("anon_key", &mask_key(&self.anon_key))
            .field("request_timeout", &self.request_timeout)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl DashboardConfig {
    /// Build a config from a backend URL and anon key. The URL is normalised
    /// and must parse with a host.
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let normalized = normalize_supabase_url(url);
        if normalized.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let parsed = Url::parse(&normalized).map_err(|e| ConfigError::InvalidUrl {
            url: normalized.clone(),
            reason: e.to_string(),
        })?;
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl {
                url: normalized,
                reason: "missing host".into(),
            });
        }

        let anon_key = anon_key.trim();
        if anon_key.is_empty() {
            return Err(ConfigError::MissingKey);
        }

        Ok(Self {
            supabase_url: normalized,
            anon_key: Zeroizing::new(anon_key.to_string()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_dir: None,
        })
    }

    /// Build a config from a connection string: raw JSON or URL-safe base64
    /// JSON of the shape `{"url": "...", "key": "..."}`.
    pub fn from_connection_string(raw: &str) -> Result<Self, ConfigError> {
        let url = extract_url_from_connection_string(raw).ok_or(ConfigError::MissingUrl)?;
        let key = extract_key_from_connection_string(raw).ok_or(ConfigError::MissingKey)?;
        Self::new(&url, &key)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Resolve a config from a name lookup. Names are the `ENV_*` constants.
    ///
    /// A connection string wins over the separate URL/key pair.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = match get(ENV_CONNECTION) {
            Some(raw) => Self::from_connection_string(&raw)?,
            None => {
                let url = get(ENV_SUPABASE_URL).ok_or(ConfigError::MissingUrl)?;
                let key = get(ENV_SUPABASE_ANON_KEY).ok_or(ConfigError::MissingKey)?;
                Self::new(&url, &key)?
            }
        };

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir.trim()));
        }

        debug!(?config, "dashboard config resolved");
        Ok(config)
    }

    /// Resolve from the process environment, falling back to the OS
    /// credential store for the URL and anon key.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| {
            std::env::var(name).ok().or_else(|| match name {
                ENV_SUPABASE_URL => storage::get_credential(storage::KEY_SUPABASE_URL),
                ENV_SUPABASE_ANON_KEY => storage::get_credential(storage::KEY_SUPABASE_ANON_KEY),
                _ => None,
            })
        })
    }
}
