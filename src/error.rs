//! Error taxonomy for the dashboard.
//!
//! Two kinds of failure reach the screens: [`RemoteError`] when the backend
//! rejects an operation or cannot be reached, and [`ValidationError`] when a
//! draft is incomplete before it is ever sent. Configuration problems are
//! reported separately through [`ConfigError`].

use thiserror::Error;

/// A failed call to the backend REST API.
///
/// `status` is the HTTP status when one was received; connectivity failures
/// carry `None`. `code` is the machine-readable error code from the response
/// body (e.g. Postgres `23505` for a unique violation).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.describe())]
pub struct RemoteError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
    pub details: Option<String>,
}

impl RemoteError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
            details: None,
        }
    }

    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn not_found(table: &str, key: &str) -> Self {
        Self {
            status: Some(404),
            code: Some("not_found".into()),
            message: format!("No row in {table} with id {key}"),
            details: None,
        }
    }

    pub fn decode(table: &str, err: &serde_json::Error) -> Self {
        Self::new(None, format!("Invalid response for {table}: {err}"))
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Server-provided message when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.message.trim();
        if message.is_empty() {
            fallback.to_string()
        } else {
            message.to_string()
        }
    }

    fn describe(&self) -> String {
        let mut out = self.message.clone();
        if let Some(status) = self.status {
            out.push_str(&format!(" (HTTP {status})"));
        }
        if let Some(details) = self.details.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(": ");
            out.push_str(details);
        }
        out
    }
}

/// A draft that cannot be submitted. Never reaches the remote client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Backend not configured: missing URL")]
    MissingUrl,

    #[error("Backend not configured: missing anon key")]
    MissingKey,

    #[error("Invalid backend URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Credential store error: {0}")]
    Credential(String),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// Umbrella error for callers that drive several layers at once.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
