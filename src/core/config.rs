//! Configuration management for the file API.
//!
//! Configuration is read once at startup from a YAML file, then adjusted
//! from `FILE_API_*` environment variables. The resulting [`Config`] is
//! passed by value into the server; nothing reads it through a global.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::error::{Error, Result};
use super::security::TraversalPolicy;
use super::transport::HttpConfig;

/// Environment variable naming the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "FILE_API_CONFIG";

/// Configuration file used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_FILE: &str = "api_conf.yaml";

/// Where a loaded [`Config`] came from.
///
/// Returned by [`Config::from_env`] so the caller can report it once logging
/// is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this YAML file.
    File(PathBuf),

    /// No file was found; built-in defaults were used.
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => write!(
                f,
                "built-in defaults ({} not set, {} absent)",
                CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE
            ),
        }
    }
}

/// Main configuration structure for the file API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// HTTP listener. Its `host` and `port` keys live at the top level.
    #[serde(flatten)]
    pub http: HttpConfig,

    /// Directory containing the `data/` tree.
    /// Defaults to the directory holding the service executable.
    pub root_dir: Option<PathBuf>,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Security and path validation configuration.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Configuration for security and path validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Whether `..` segments that pass the character whitelist are refused.
    pub traversal_policy: TraversalPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "data-file-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl Config {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Load configuration the way the binary does at startup.
    ///
    /// Reads the file named by `FILE_API_CONFIG` (an error if it is missing),
    /// or `api_conf.yaml` when present, then applies environment overrides:
    /// `FILE_API_HOST`, `FILE_API_PORT`, `FILE_API_ROOT_DIR`, `FILE_API_LOG_LEVEL`.
    pub fn from_env() -> Result<(Self, ConfigSource)> {
        dotenvy::dotenv().ok();

        let source = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => ConfigSource::File(PathBuf::from(path)),
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                ConfigSource::File(PathBuf::from(DEFAULT_CONFIG_FILE))
            }
            Err(_) => ConfigSource::Defaults,
        };

        let mut config = match &source {
            ConfigSource::File(path) => Self::load(path)?,
            ConfigSource::Defaults => Self::default(),
        };

        config.apply_env_overrides()?;
        Ok((config, source))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("FILE_API_HOST") {
            self.http.host = host;
        }

        if let Ok(port) = std::env::var("FILE_API_PORT") {
            self.http.port = port
                .parse()
                .map_err(|_| Error::config(format!("FILE_API_PORT is not a valid port: {port}")))?;
        }

        if let Ok(root) = std::env::var("FILE_API_ROOT_DIR") {
            self.root_dir = Some(PathBuf::from(root));
        }

        if let Ok(level) = std::env::var("FILE_API_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// The directory readable paths are resolved against.
    pub fn resolve_root_dir(&self) -> Result<PathBuf> {
        if let Some(ref root) = self.root_dir {
            return Ok(root.clone());
        }

        let exe = std::env::current_exe()?;
        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::config("cannot determine the executable's directory"))
    }
}
