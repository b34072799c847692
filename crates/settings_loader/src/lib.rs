//! # Settings Loader
//!
//! Centralized loading of the backend connection settings for the Hello Keys
//! tools. A settings file is a JSON object with the fields of
//! [`ClientConfig`]:
//!
//! ```json
//! {
//!   "url": "https://project.supabase.co",
//!   "anon_key": "public-anon-key",
//!   "timeout_secs": 20
//! }
//! ```
//!
//! ## Features
//!
//! - Load settings from specified file paths
//! - Load settings from default location (`settings.json`)
//! - Fall back to environment variables when no file is found
//! - Validate the project URL before any client is built
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! // Load settings from a specific path
//! let config = settings_loader::load_settings("config/hello_keys.json")?;
//!
//! // Explicit path, then settings.json, then SUPABASE_URL / SUPABASE_ANON_KEY
//! let path = Some(PathBuf::from("staging.json"));
//! let config = settings_loader::resolve_config(path.as_ref())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use remote_client::ClientConfig;
use tracing::{debug, warn};

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Loads settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let config: ClientConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    config
        .base_url()
        .with_context(|| format!("Invalid project url in {}", path.display()))?;
    Ok(config)
}

/// Loads settings from the default location (settings.json in the current directory)
pub fn load_default_settings() -> Result<ClientConfig> {
    load_settings(DEFAULT_SETTINGS_FILE)
}

/// Tries the provided path, then the default location. Returns None only if
/// no usable settings file is found anywhere.
pub fn load_settings_with_fallback(path: Option<&PathBuf>) -> Result<Option<ClientConfig>> {
    load_settings_from(path, Path::new(DEFAULT_SETTINGS_FILE))
}

fn load_settings_from(path: Option<&PathBuf>, default: &Path) -> Result<Option<ClientConfig>> {
    if let Some(settings_path) = path {
        match load_settings(settings_path) {
            Ok(config) => return Ok(Some(config)),
            Err(err) => warn!("Ignoring settings file: {:#}", err),
        }
    }

    if !settings_file_exists(default) {
        return Ok(None);
    }
    load_settings(default).map(Some)
}

/// Settings file if one is found, otherwise the environment.
pub fn resolve_config(path: Option<&PathBuf>) -> Result<ClientConfig> {
    if let Some(config) = load_settings_with_fallback(path)? {
        debug!("Loaded settings for {}", config.url);
        return Ok(config);
    }

    let config = ClientConfig::from_env().context("No settings file found and environment is incomplete")?;
    config.base_url().context("Invalid SUPABASE_URL")?;
    Ok(config)
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}
