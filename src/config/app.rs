//! Application configuration loading from config.toml
//!
//! The configuration file carries the HTTP bind address, the artificial latency
//! applied by the data access facade, the template directory, and the seed
//! fixtures. Every section is optional and falls back to defaults.

use crate::config::seed::SeedData;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_VAR: &str = "SCHOOL_DESK_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data access facade settings
    #[serde(default)]
    pub facade: FacadeConfig,
    /// Where printable templates live
    #[serde(default)]
    pub templates: TemplatesConfig,
    /// Records inserted into an empty store at startup
    #[serde(default)]
    pub seed: SeedData,
}

/// HTTP listener settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:3000`
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Data access facade settings
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct FacadeConfig {
    /// Delay before every facade call resolves, in milliseconds
    pub latency_ms: u64,
}

impl FacadeConfig {
    /// Latency as a `Duration`
    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self { latency_ms: 250 }
    }
}

/// Template directory settings
#[derive(Debug, Deserialize, Clone)]
pub struct TemplatesConfig {
    /// Directory holding `invoice.html`, `certificate.html` and `marksheet.html`
    pub dir: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("templates"),
        }
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A seed record has missing or mistyped fields
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {}: {e}", path_ref.display()),
    })
}

/// Loads configuration from `$SCHOOL_DESK_CONFIG`, or ./config.toml when unset
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&path)?;
    info!(
        path = %path,
        users = config.seed.users.len(),
        students = config.seed.students.len(),
        "Loaded application configuration"
    );
    Ok(config)
}
