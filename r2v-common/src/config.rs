//! Bootstrap configuration loading
//!
//! Settings resolve in this priority order:
//! 1. Command-line argument (applied by the binary)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing or unreadable TOML file is not fatal: a warning is logged and
//! the compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "R2V_CONFIG";

/// Default HTTP port for r2v-web
pub const DEFAULT_PORT: u16 = 5730;

/// Default upload size limit (100 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Interface the HTTP server binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// YouTube Data API key (search and trending disabled when absent)
    #[serde(default)]
    pub youtube_api_key: Option<String>,

    /// YouTube Data API base URL
    #[serde(default = "default_youtube_api_base")]
    pub youtube_api_base: String,

    /// Repository whose README is rendered (`owner/repo` or a GitHub URL)
    #[serde(default)]
    pub github_repo: Option<String>,

    /// GitHub REST API base URL
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,

    /// Base URL of the processing backend used by the shared API client
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,

    /// Directory receiving uploaded files
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,

    /// Maximum accepted upload body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Interval between mock task status ticks (milliseconds)
    #[serde(default = "default_task_tick_ms")]
    pub task_tick_ms: u64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            youtube_api_key: None,
            youtube_api_base: default_youtube_api_base(),
            github_repo: None,
            github_api_base: default_github_api_base(),
            backend_base_url: default_backend_base_url(),
            upload_dir: None,
            max_upload_bytes: default_max_upload_bytes(),
            task_tick_ms: default_task_tick_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_youtube_api_base() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_backend_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_task_tick_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Upload directory, falling back to the OS data directory
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir.clone().unwrap_or_else(default_upload_dir)
    }

    /// Overlay `R2V_*` environment variables onto this configuration
    ///
    /// Unparsable numeric values are skipped; the returned messages describe
    /// them so the caller can log once tracing is up.
    pub fn apply_env_overrides(&mut self) -> Vec<String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup (environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut ignored = Vec::new();

        if let Some(host) = lookup("R2V_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("R2V_PORT") {
            match port.parse() {
                Ok(p) => self.port = p,
                Err(_) => ignored.push(format!("Ignoring invalid R2V_PORT value '{}'", port)),
            }
        }
        if let Some(key) = lookup("R2V_YOUTUBE_API_KEY") {
            if !key.trim().is_empty() {
                self.youtube_api_key = Some(key);
            }
        }
        if let Some(repo) = lookup("R2V_GITHUB_REPO") {
            if !repo.trim().is_empty() {
                self.github_repo = Some(repo);
            }
        }
        if let Some(dir) = lookup("R2V_UPLOAD_DIR") {
            self.upload_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = lookup("R2V_LOG_LEVEL") {
            self.logging.level = level;
        }
        ignored
    }
}

/// Locate the TOML config file
///
/// Explicit path (command line) wins, then `R2V_CONFIG`, then
/// `<config_dir>/reels2vec/config.toml` when it exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join("reels2vec").join("config.toml"))
        .filter(|p| p.exists())
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Parsed from this TOML file
    File(PathBuf),
    /// No file was found
    Defaults,
    /// A file was found but could not be used; defaults apply
    Fallback { path: PathBuf, reason: String },
}

/// Load the TOML config if one is available, otherwise defaults
///
/// Never fails: read or parse errors degrade to defaults. The source is
/// returned so the caller can log it once tracing is initialized.
pub fn load_or_default(path: Option<&Path>) -> (TomlConfig, ConfigSource) {
    match path {
        Some(path) => match load_toml_config(path) {
            Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
            Err(e) => (
                TomlConfig::default(),
                ConfigSource::Fallback {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                },
            ),
        },
        None => (TomlConfig::default(), ConfigSource::Defaults),
    }
}

impl ConfigSource {
    /// Log the configuration source
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Defaults => info!("No configuration file found, using defaults"),
            ConfigSource::Fallback { path, reason } => warn!(
                "Configuration file {} unusable ({}), using defaults",
                path.display(),
                reason
            ),
        }
    }
}

/// OS-dependent default upload directory
fn default_upload_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("reels2vec").join("uploads"))
        .unwrap_or_else(|| PathBuf::from("./reels2vec_data/uploads"))
}
