//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the environment names no backend, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. With neither source present, the built-in defaults apply
//!
//! ## Environment Variables
//! - `CROSSPOST_API_URL`: Base URL of the backend API
//! - `CROSSPOST_HTTP_TIMEOUT_SECS`: Per-request timeout (optional)
//! - `CROSSPOST_<PROVIDER>_AUTHORIZE_URL`: Authorize-link endpoint override
//!   (optional; `<PROVIDER>` is `LINKEDIN`, `REDDIT`, or `MASTODON`)
//! - `CROSSPOST_<PROVIDER>_EXCHANGE_URL`: Code-exchange endpoint override
//!   (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./crosspost.json` or `./crosspost.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use crosspost_domain::{
    AppConfig, CrosspostError, Provider, ProviderEndpoints, ProvidersConfig, Result,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If `CROSSPOST_API_URL`
/// is not set, falls back to a config file; with no file either, the
/// built-in development defaults apply.
///
/// # Errors
/// Returns `CrosspostError::Config` if a source is present but malformed.
pub fn load() -> Result<AppConfig> {
    if std::env::var_os("CROSSPOST_API_URL").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration source found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `CROSSPOST_API_URL` is required; everything else falls back to values
/// derived from it.
///
/// # Errors
/// Returns `CrosspostError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<AppConfig> {
    let api_url = env_var("CROSSPOST_API_URL")?;

    let request_timeout_secs = match std::env::var("CROSSPOST_HTTP_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| CrosspostError::Config(format!("Invalid timeout: {e}")))?,
        Err(_) => AppConfig::default().request_timeout_secs,
    };

    let providers = ProvidersConfig {
        linkedin: provider_from_env(&api_url, Provider::Linkedin),
        reddit: provider_from_env(&api_url, Provider::Reddit),
        mastodon: provider_from_env(&api_url, Provider::Mastodon),
    };

    Ok(AppConfig { api_url, request_timeout_secs, providers })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CrosspostError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CrosspostError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CrosspostError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CrosspostError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CrosspostError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CrosspostError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CrosspostError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, and the executable's
/// directory for `config.{json,toml}` and `crosspost.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("crosspost.json"),
            cwd.join("crosspost.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("crosspost.json"),
                exe_dir.join("crosspost.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Provider endpoints from the environment, defaulting to the conventional
/// paths under `api_url`.
fn provider_from_env(api_url: &str, provider: Provider) -> ProviderEndpoints {
    let prefix = provider.as_str().to_ascii_uppercase();
    let defaults = ProviderEndpoints::for_provider(api_url, provider);

    ProviderEndpoints {
        authorize_url: std::env::var(format!("CROSSPOST_{prefix}_AUTHORIZE_URL"))
            .unwrap_or(defaults.authorize_url),
        exchange_url: std::env::var(format!("CROSSPOST_{prefix}_EXCHANGE_URL"))
            .unwrap_or(defaults.exchange_url),
    }
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CrosspostError::Config(format!("Missing required environment variable: {key}"))
    })
}
