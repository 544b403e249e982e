//! Fuel Station Dashboard backend
//!
//! Headless core of the station back-office: employees, fuel types and
//! fuel transactions stored in a Supabase (PostgREST) backend. Each screen
//! is a [`view_model::ListViewModel`] paired with a [`form::FormController`]
//! over one [`remote::RemoteCollection`]; outcomes are reported through a
//! [`notify::NotificationSink`].

use std::path::Path;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod config;
pub mod dashboard;
pub mod diagnostics;
pub mod error;
pub mod form;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod query;
pub mod remote;
pub mod reports;
pub mod storage;
pub mod view_model;

#[cfg(test)]
mod testing;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, Screen};
pub use error::{ConfigError, DashboardError, RemoteError, ValidationError};
pub use notify::{Notification, NotificationKind, NotificationSink, RecordingSink, TracingSink};
pub use remote::{Entity, RemoteCollection, RestCollection};

const DEFAULT_LOG_FILTER: &str = "info,fuel_station_dashboard=debug";

/// Initialise structured logging: console plus a daily rolling file.
///
/// Old log files are pruned first. The returned guard flushes the file
/// writer on drop, so the caller keeps it alive until exit. Returns `None`
/// when a global subscriber is already installed.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let log_dir = log_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(diagnostics::default_log_dir);
    std::fs::create_dir_all(&log_dir).ok();
    let pruned = diagnostics::prune_old_logs(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, diagnostics::LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let console_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok()?;

    info!(
        log_dir = %log_dir.display(),
        pruned,
        "Starting Fuel Station Dashboard v{}",
        env!("CARGO_PKG_VERSION")
    );
    Some(guard)
}
