//! Backend REST API client.
//!
//! Provides authenticated HTTP communication with the hosted backend's
//! PostgREST endpoint (`/rest/v1/{table}`), used by every collection for
//! list, insert, update and delete calls, plus a lightweight connectivity
//! test for the settings screen.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::error::{ConfigError, RemoteError};

/// Timeout used specifically for the lightweight connectivity test.
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(10);

const REST_PREFIX: &str = "/rest/v1";

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the backend URL:
/// - ensure a scheme is present (https, or http for localhost)
/// - strip trailing slashes
/// - strip a trailing `/rest/v1` segment
pub fn normalize_supabase_url(url: &str) -> String {
    let mut url = url.trim().to_string();
    if url.is_empty() {
        return url;
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }
    if url.ends_with(REST_PREFIX) {
        url.truncate(url.len() - REST_PREFIX.len());
    }
    while url.ends_with('/') {
        url.pop();
    }

    url
}

/// Mask a key for logs: keep the first four characters only.
pub fn mask_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.chars().count() <= 4 {
        return "****".to_string();
    }
    let prefix: String = trimmed.chars().take(4).collect();
    format!("{prefix}****")
}

// ---------------------------------------------------------------------------
// Connection strings
// ---------------------------------------------------------------------------

fn decode_connection_string_payload(raw: &str) -> Option<Value> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.starts_with('{') {
        return serde_json::from_str::<Value>(&compact).ok();
    }
    if compact.len() < 16 {
        return None;
    }

    let base64 = compact.replace('-', "+").replace('_', "/");
    let padded = format!(
        "{}{}",
        base64,
        "=".repeat((4usize.wrapping_sub(base64.len() % 4)) % 4)
    );
    let decoded = BASE64_STANDARD.decode(padded).ok()?;
    serde_json::from_slice::<Value>(&decoded).ok()
}

fn connection_string_field(raw: &str, keys: &[&str]) -> Option<String> {
    let payload = decode_connection_string_payload(raw)?;
    keys.iter()
        .find_map(|k| payload.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn extract_url_from_connection_string(raw: &str) -> Option<String> {
    connection_string_field(raw, &["url", "supabaseUrl", "supabase_url"])
        .map(|u| normalize_supabase_url(&u))
}

pub fn extract_key_from_connection_string(raw: &str) -> Option<String> {
    connection_string_field(raw, &["key", "anonKey", "supabase_anon_key"])
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly remote error.
fn friendly_error(url: &str, err: &reqwest::Error) -> RemoteError {
    let message = if err.is_connect() {
        format!("Cannot reach backend at {url}")
    } else if err.is_timeout() {
        format!("Connection to {url} timed out")
    } else if err.is_builder() {
        format!("Invalid backend URL: {url}")
    } else {
        format!("Network error communicating with {url}: {err}")
    };
    RemoteError::connectivity(message)
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "API key is invalid or expired".to_string(),
        403 => "Not authorized for this table".to_string(),
        404 => "Record or table not found".to_string(),
        409 => "Conflicts with an existing record".to_string(),
        s if s >= 500 => format!("Backend server error (HTTP {s})"),
        s => format!("Unexpected response from backend (HTTP {s})"),
    }
}

/// Map a non-success response body into a [`RemoteError`].
///
/// PostgREST error bodies look like
/// `{"code":"23505","message":"...","details":"...","hint":null}`.
pub(crate) fn error_from_response(status: StatusCode, body_text: &str) -> RemoteError {
    let trimmed = body_text.trim();
    let Ok(json) = serde_json::from_str::<Value>(trimmed) else {
        let err = RemoteError::new(Some(status.as_u16()), status_error(status));
        return if trimmed.is_empty() {
            err
        } else {
            err.with_details(trimmed)
        };
    };

    let message = json
        .get("message")
        .or_else(|| json.get("error_description"))
        .or_else(|| json.get("error"))
        .or_else(|| json.get("msg"))
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .unwrap_or_else(|| status_error(status));
    let mut err = RemoteError::new(Some(status.as_u16()), message);
    if let Some(code) = json.get("code").and_then(|c| match c {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }) {
        err = err.with_code(code);
    }
    let details = json
        .get("details")
        .or_else(|| json.get("hint"))
        .and_then(Value::as_str)
        .filter(|d| !d.trim().is_empty());
    if let Some(details) = details {
        err = err.with_details(details);
    }
    err
}

// ---------------------------------------------------------------------------
// Connectivity test
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
pub struct ConnectivityResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Shared HTTP transport for every collection. Cheap to clone: the inner
/// `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    config: DashboardConfig,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.supabase_url.clone(),
            config: config.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/rest/v1/{table}` with the given query pairs appended in order.
    pub fn table_url(&self, table: &str, params: &[(String, String)]) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&format!("{}{REST_PREFIX}/{table}", self.base_url))
            .map_err(|e| RemoteError::connectivity(format!("Invalid backend URL: {e}")))?;
        if !params.is_empty() {
            let mut qp = url.query_pairs_mut();
            for (k, v) in params {
                qp.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Perform one authenticated request against a table.
    ///
    /// Mutations ask for `return=representation` so the affected rows come
    /// back in the body. An empty body is an error for reads and
    /// `Value::Null` for writes. A body that cannot be read in full is an
    /// error, never an empty result.
    pub async fn request(
        &self,
        method: Method,
        table: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, RemoteError> {
        let url = self.table_url(table, params)?;
        let key = self.config.anon_key();

        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .header("Content-Type", "application/json");
        if method != Method::GET {
            req = req.header("Prefer", "return=representation");
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        debug!(%method, table, query = url.query().unwrap_or(""), "backend request");
        let resp = req
            .send()
            .await
            .map_err(|e| friendly_error(&self.base_url, &e))?;
        let status = resp.status();
        let body_text = resp.text().await;

        if !status.is_success() {
            let err = error_from_response(status, body_text.as_deref().unwrap_or_default());
            warn!(%method, table, status = status.as_u16(), error = %err, "backend request failed");
            return Err(err);
        }

        let body_text = body_text.map_err(|e| {
            warn!(%method, table, error = %e, "failed to read response body");
            friendly_error(&self.base_url, &e)
        })?;
        if body_text.trim().is_empty() {
            // Reads always carry a JSON array; only writes may answer 204.
            if method == Method::GET {
                return Err(RemoteError::new(
                    Some(status.as_u16()),
                    format!("Empty response for {table}"),
                ));
            }
            return Ok(Value::Null);
        }
        serde_json::from_str(&body_text).map_err(|e| RemoteError::decode(table, &e))
    }

    /// Test connectivity with a lightweight request against the REST root.
    pub async fn test_connectivity(&self) -> ConnectivityResult {
        let url = format!("{}{REST_PREFIX}/", self.base_url);
        let key = self.config.anon_key();

        let client = match Client::builder().timeout(CONNECTIVITY_TIMEOUT).build() {
            Ok(c) => c,
            Err(e) => {
                return ConnectivityResult {
                    success: false,
                    latency_ms: None,
                    error: Some(format!("Failed to create HTTP client: {e}")),
                };
            }
        };

        let start = Instant::now();
        let resp = match client
            .get(&url)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return ConnectivityResult {
                    success: false,
                    latency_ms: None,
                    error: Some(friendly_error(&self.base_url, &e).message),
                };
            }
        };

        let latency = start.elapsed().as_millis() as u64;
        let status = resp.status();
        if status.is_success() {
            info!(latency_ms = latency, "connectivity test passed");
            ConnectivityResult {
                success: true,
                latency_ms: Some(latency),
                error: None,
            }
        } else {
            warn!(status = status.as_u16(), "connectivity test failed");
            ConnectivityResult {
                success: false,
                latency_ms: Some(latency),
                error: Some(status_error(status)),
            }
        }
    }
}
