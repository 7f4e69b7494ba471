//! TOML-based configuration for SchemaLens.
//!
//! Supports a config file (schemalens.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [defaults]
//! mysql_url = "${MYSQL_URL}"
//! mongo_uri = "mongodb://localhost:27017"
//!
//! [discovery]
//! sample_cap = 200
//!
//! [export]
//! dir = "./exports"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//! allow_origins = "http://localhost:5173,http://localhost:3000"
//!
//! [store]
//! path = "./schemalens_meta.db"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::DbKind;

/// Default number of documents sampled per collection.
pub const DEFAULT_SAMPLE_CAP: usize = 200;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Failed to determine home directory")]
    NoHomeDir,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Process-wide default connection strings.
    pub defaults: DefaultConnections,

    /// Discovery tuning.
    pub discovery: DiscoverySettings,

    /// Export collaborator configuration.
    pub export: ExportSettings,

    /// HTTP server configuration.
    pub server: ServerSettings,

    /// Connection profile store configuration.
    pub store: StoreSettings,
}

/// Fallback connection strings used when a request names neither a profile
/// nor an inline connection string.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultConnections {
    /// Relational default (supports ${ENV_VAR} expansion).
    pub mysql_url: Option<String>,

    /// Document default (supports ${ENV_VAR} expansion).
    pub mongo_uri: Option<String>,
}

impl DefaultConnections {
    /// Get the default connection string for a kind, with env vars expanded.
    pub fn for_kind(&self, kind: DbKind) -> Result<Option<String>, SettingsError> {
        let raw = match kind {
            DbKind::Relational => self.mysql_url.as_deref(),
            DbKind::Document => self.mongo_uri.as_deref(),
        };
        raw.filter(|s| !s.trim().is_empty())
            .map(expand_env_vars)
            .transpose()
    }
}

/// Discovery tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Documents sampled per collection when the request gives no cap.
    pub sample_cap: usize,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            sample_cap: DEFAULT_SAMPLE_CAP,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory exported graphs are written to and served from.
    pub dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("exports"),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Comma-separated CORS origins, or "*".
    pub allow_origins: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allow_origins: "*".to_string(),
        }
    }
}

impl ServerSettings {
    /// Split `allow_origins` into trimmed, non-empty entries.
    pub fn allow_origins_list(&self) -> Vec<String> {
        self.allow_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Profile store configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite file for connection profiles. Defaults to `~/.schemalens/profiles.db`.
    pub path: Option<PathBuf>,
}

impl StoreSettings {
    /// Resolve the profile database path.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let base = dirs::home_dir().ok_or(SettingsError::NoHomeDir)?;
        Ok(base.join(".schemalens").join("profiles.db"))
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations, then apply
    /// environment overrides.
    ///
    /// Searches in order:
    /// 1. Environment variable `SCHEMALENS_CONFIG`
    /// 2. `./schemalens.toml`
    /// 3. `~/.config/schemalens/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = Self::load_file()?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    fn load_file() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SCHEMALENS_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("schemalens.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("schemalens").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Apply `MYSQL_URL`, `MONGO_URI`, `EXPORT_DIR`, `ALLOW_ORIGINS` and
    /// `SCHEMALENS_PROFILE_DB` on top of file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("MYSQL_URL") {
            self.defaults.mysql_url = Some(v);
        }
        if let Some(v) = lookup("MONGO_URI") {
            self.defaults.mongo_uri = Some(v);
        }
        if let Some(v) = lookup("EXPORT_DIR") {
            self.export.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("ALLOW_ORIGINS") {
            self.server.allow_origins = v;
        }
        if let Some(v) = lookup("SCHEMALENS_PROFILE_DB") {
            self.store.path = Some(PathBuf::from(v));
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    var_name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
