//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variables are missing, falls back to a config file
//! 3. Supports JSON and TOML formats (detected by extension)
//!
//! ## Environment Variables
//! - `CALBRIDGE_CALLBACK_URL`: public webhook callback URL (required)
//! - `CALBRIDGE_HOST`: bind host (default `127.0.0.1`)
//! - `CALBRIDGE_PORT`: bind port (default `8080`)
//! - `CALBRIDGE_WATCH_TTL_MINUTES`: requested watch lifetime
//! - `CALBRIDGE_GOOGLE_API_BASE`: Calendar API base URL
//! - `CALBRIDGE_GOOGLE_ACCESS_TOKEN`: static bearer token

use std::path::{Path, PathBuf};

use calbridge_domain::{CalbridgeError, Config, Result};

use crate::errors::InfraError;

const CONFIG_FILE_CANDIDATES: &[&str] =
    &["calbridge.json", "calbridge.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `CalbridgeError::Config` if configuration cannot be loaded from
/// either source or a file is malformed.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only the callback URL is required; everything else falls back to
/// defaults.
///
/// # Errors
/// Returns `CalbridgeError::Config` when `CALBRIDGE_CALLBACK_URL` is missing
/// or a present variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.watch.callback_url = std::env::var("CALBRIDGE_CALLBACK_URL")
        .map_err(|_| CalbridgeError::Config("CALBRIDGE_CALLBACK_URL not set".to_string()))?;

    if let Ok(host) = std::env::var("CALBRIDGE_HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("CALBRIDGE_PORT") {
        config.server.port = port
            .parse()
            .map_err(|e| CalbridgeError::Config(format!("invalid CALBRIDGE_PORT: {e}")))?;
    }
    if let Ok(ttl) = std::env::var("CALBRIDGE_WATCH_TTL_MINUTES") {
        config.watch.expiration_minutes = ttl.parse().map_err(|e| {
            CalbridgeError::Config(format!("invalid CALBRIDGE_WATCH_TTL_MINUTES: {e}"))
        })?;
    }
    if let Ok(base) = std::env::var("CALBRIDGE_GOOGLE_API_BASE") {
        config.google.api_base = base;
    }
    if let Ok(token) = std::env::var("CALBRIDGE_GOOGLE_ACCESS_TOKEN") {
        config.google.access_token = Some(token);
    }

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes `calbridge.{json,toml}` and
/// `config.{json,toml}` in the current working directory.
///
/// # Errors
/// Returns `CalbridgeError::Config` when no file is found or parsing fails.
pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => probe_config_paths().ok_or_else(|| {
            CalbridgeError::Config("no configuration file found".to_string())
        })?,
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        CalbridgeError::Config(format!("failed to read {}: {e}", path.display()))
    })?;

    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .map_err(|e| CalbridgeError::Config(format!("invalid JSON config: {e}")))?,
        Some("toml") => toml::from_str(&contents)
            .map_err(|e| CalbridgeError::Config(format!("invalid TOML config: {e}")))?,
        other => {
            return Err(CalbridgeError::Config(format!(
                "unsupported config extension: {other:?}"
            )))
        }
    };

    validate(&config)?;
    tracing::info!(path = %path.display(), "configuration loaded from file");
    Ok(config)
}

// The provider rejects unparseable callback addresses at watch time; failing
// here surfaces the mistake at startup instead.
fn validate(config: &Config) -> Result<()> {
    url::Url::parse(&config.watch.callback_url).map_err(InfraError::from)?;
    url::Url::parse(&config.google.api_base).map_err(InfraError::from)?;
    Ok(())
}

fn probe_config_paths() -> Option<PathBuf> {
    CONFIG_FILE_CANDIDATES.iter().map(PathBuf::from).find(|candidate| candidate.exists())
}
