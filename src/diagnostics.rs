//! Diagnostics for the Settings screen and log housekeeping.
//!
//! Provides:
//! - **About info**: version, build timestamp, git SHA, platform
//! - **Log location**: per-user data directory, overridable from config
//! - **Log rotation helpers**: used by [`crate::init_logging`] to keep the
//!   rolling log directory bounded.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Maximum number of log files to retain.
pub const MAX_LOG_FILES: usize = 10;

/// File name prefix of the daily rolling log files.
pub const LOG_FILE_PREFIX: &str = "dashboard";

const APP_DIR: &str = "fuel-station-dashboard";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub git_sha: &'static str,
    pub platform: &'static str,
    pub arch: &'static str,
}

pub fn about_info() -> AboutInfo {
    AboutInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        git_sha: env!("BUILD_GIT_SHA"),
        platform: std::env::consts::OS,
        arch: std::env::consts::ARCH,
    }
}

/// Default log directory under the per-user data directory.
pub fn default_log_dir() -> PathBuf {
    let base = std::env::var("LOCALAPPDATA")
        .or_else(|_| std::env::var("XDG_DATA_HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(target_os = "windows")]
            {
                PathBuf::from(std::env::var("USERPROFILE").unwrap_or_else(|_| ".".into()))
                    .join("AppData")
                    .join("Local")
            }
            #[cfg(not(target_os = "windows"))]
            {
                PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
                    .join(".local")
                    .join("share")
            }
        });
    base.join(APP_DIR).join("logs")
}

fn is_log_file(name: &str) -> bool {
    name == LOG_FILE_PREFIX || name.starts_with(&format!("{LOG_FILE_PREFIX}."))
}

/// Delete old log files in `dir`, keeping the newest `MAX_LOG_FILES`.
/// Returns how many files were removed.
pub fn prune_old_logs(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = entries
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter(|entry| entry.file_name().to_str().is_some_and(is_log_file))
        .map(|entry| {
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::UNIX_EPOCH);
            (entry.path(), modified)
        })
        .collect();

    // Newest first; ties fall back to name so daily files stay in date order.
    log_files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let mut removed = 0;
    for (path, _) in log_files.iter().skip(MAX_LOG_FILES) {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to prune log file {}: {e}", path.display()),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn about_info_has_version_and_platform() {
        let info = about_info();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(!info.platform.is_empty());
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("buildTimestamp").is_some());
        assert!(json.get("gitSha").is_some());
    }

    #[test]
    fn default_log_dir_is_stable() {
        let d1 = default_log_dir();
        assert_eq!(d1, default_log_dir());
        assert!(d1.ends_with("fuel-station-dashboard/logs"));
    }

    #[test]
    fn prune_keeps_newest_and_ignores_other_files() {
        let dir = std::env::temp_dir().join(format!("dashboard_logs_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        for day in 1..=13 {
            fs::write(dir.join(format!("dashboard.2024-06-{day:02}")), b"log").unwrap();
        }
        fs::write(dir.join("notes.txt"), b"keep me").unwrap();

        let removed = prune_old_logs(&dir);

        let remaining: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .flatten()
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        assert_eq!(removed, 3);
        assert_eq!(remaining.len(), MAX_LOG_FILES + 1);
        assert!(remaining.iter().any(|n| n == "notes.txt"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn prune_on_missing_dir_is_a_no_op() {
        let dir = std::env::temp_dir().join(format!("dashboard_missing_{}", uuid::Uuid::new_v4()));
        assert_eq!(prune_old_logs(&dir), 0);
    }
}
