//! Backend credentials in the OS credential store.
//!
//! On Windows this uses the Credential Manager (via the `keyring` crate), on
//! macOS Keychain, and on Linux the Secret Service API. Only the backend URL
//! and the anon key live here; everything else is fetched from the backend.

use keyring::Entry;
use tracing::{info, warn};

use crate::error::ConfigError;

const SERVICE_NAME: &str = "fuel-station-dashboard";

pub const KEY_SUPABASE_URL: &str = "supabase_url";
pub const KEY_SUPABASE_ANON_KEY: &str = "supabase_anon_key";

const ALL_KEYS: &[&str] = &[KEY_SUPABASE_URL, KEY_SUPABASE_ANON_KEY];

/// Retrieve a single credential. Returns `None` when the entry does not exist
/// or the platform store is unavailable.
pub fn get_credential(key: &str) -> Option<String> {
    let entry = match Entry::new(SERVICE_NAME, key) {
        Ok(e) => e,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to create entry");
            return None;
        }
    };
    match entry.get_password() {
        Ok(pw) => Some(pw).filter(|v| !v.trim().is_empty()),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to read credential");
            None
        }
    }
}

pub fn set_credential(key: &str, value: &str) -> Result<(), ConfigError> {
    let entry =
        Entry::new(SERVICE_NAME, key).map_err(|e| ConfigError::Credential(e.to_string()))?;
    entry
        .set_password(value)
        .map_err(|e| ConfigError::Credential(e.to_string()))
}

/// Delete a credential. Silently succeeds if the entry does not exist.
pub fn delete_credential(key: &str) -> Result<(), ConfigError> {
    let entry =
        Entry::new(SERVICE_NAME, key).map_err(|e| ConfigError::Credential(e.to_string()))?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(ConfigError::Credential(e.to_string())),
    }
}

/// Persist the backend URL and anon key so later runs need no environment.
pub fn save_backend_credentials(url: &str, anon_key: &str) -> Result<(), ConfigError> {
    set_credential(KEY_SUPABASE_URL, url.trim())?;
    set_credential(KEY_SUPABASE_ANON_KEY, anon_key.trim())?;
    info!(url = %url.trim(), "backend credentials stored");
    Ok(())
}

/// Remove every stored credential.
pub fn factory_reset() -> Result<(), ConfigError> {
    info!("deleting all stored backend credentials");
    for key in ALL_KEYS {
        delete_credential(key)?;
    }
    Ok(())
}
