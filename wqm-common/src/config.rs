//! Bootstrap configuration loading and endpoint resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Compiled-in reading service endpoint
pub const DEFAULT_ENDPOINT: &str =
    "https://epim79rryi.execute-api.us-east-1.amazonaws.com/v1/readings";

/// Environment variable overriding the service endpoint
pub const ENDPOINT_ENV_VAR: &str = "WQM_ENDPOINT";

/// Bootstrap configuration loaded from TOML file
///
/// Every key is optional; a missing file yields [`TomlConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Reading service base URL (`GET` lists, `PUT <endpoint>/<id>` updates)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Per-request timeout for service calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Initial map view and base layer
    #[serde(default)]
    pub map: MapConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            request_timeout_secs: default_request_timeout_secs(),
            map: MapConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Initial viewport and tile layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            zoom: default_zoom(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

// Bengaluru region
fn default_center_lat() -> f64 {
    12.9716
}

fn default_center_lon() -> f64 {
    77.5946
}

fn default_zoom() -> u8 {
    7
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "© OpenStreetMap contributors".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform config file location: `<config_dir>/wqm/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wqm").join("config.toml"))
}

/// Load bootstrap configuration
///
/// An explicitly requested file must exist. When no path is given the
/// platform default is tried, and a missing file there falls back to
/// built-in defaults with a warning. A file that exists but does not parse
/// is always an error.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!("Config file not found: {}", path.display())));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            Some(path) => {
                warn!("No config file at {}, using built-in defaults", path.display());
                return Ok(TomlConfig::default());
            }
            None => {
                warn!("Could not determine config directory, using built-in defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the service endpoint
///
/// Priority order:
/// 1. Command-line argument (highest priority)
/// 2. `WQM_ENDPOINT` environment variable
/// 3. TOML config file
/// 4. Compiled default
///
/// Blank values are skipped and a trailing `/` is stripped.
pub fn resolve_endpoint(cli_arg: Option<&str>, config: &TomlConfig) -> String {
    if let Some(endpoint) = cli_arg.and_then(normalize_endpoint) {
        info!("Endpoint from command line: {}", endpoint);
        return endpoint;
    }

    if let Some(endpoint) = std::env::var(ENDPOINT_ENV_VAR).ok().as_deref().and_then(normalize_endpoint) {
        info!("Endpoint from {}: {}", ENDPOINT_ENV_VAR, endpoint);
        return endpoint;
    }

    if let Some(endpoint) = config.endpoint.as_deref().and_then(normalize_endpoint) {
        info!("Endpoint from config file: {}", endpoint);
        return endpoint;
    }

    DEFAULT_ENDPOINT.to_string()
}

fn normalize_endpoint(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
