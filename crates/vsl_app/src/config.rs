//! Application configuration.
//!
//! Sources, later ones winning: built-in defaults, `vsl.ron` (or the file
//! given with `--config`), the `VSL_API_BASE` / `VSL_DOWNLOAD_DIR`
//! environment variables, then command-line flags.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vsl_engine::ApiSettings;
use vsl_logging::{vsl_debug, vsl_info};

pub const DEFAULT_CONFIG_FILE: &str = "vsl.ron";
pub const ENV_API_BASE: &str = "VSL_API_BASE";
pub const ENV_DOWNLOAD_DIR: &str = "VSL_DOWNLOAD_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: String,
    pub search_path: String,
    pub bulk_path: String,
    pub ingest_path: String,
    pub download_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_download_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            api_base: api.base_url,
            search_path: api.search_path,
            bulk_path: api.bulk_path,
            ingest_path: api.ingest_path,
            download_dir: PathBuf::from("downloads"),
            connect_timeout_secs: api.connect_timeout.as_secs(),
            request_timeout_secs: api.request_timeout.as_secs(),
            max_download_bytes: api.max_download_bytes,
        }
    }
}

impl AppConfig {
    /// Loads `path` when given (it must exist), otherwise `vsl.ron` in the
    /// working directory when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if !required && err.kind() == io::ErrorKind::NotFound => {
                vsl_debug!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        vsl_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            self.api_base = v;
        }
        if let Some(v) = lookup(ENV_DOWNLOAD_DIR).filter(|v| !v.trim().is_empty()) {
            self.download_dir = PathBuf::from(v);
        }
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base.clone(),
            search_path: self.search_path.clone(),
            bulk_path: self.bulk_path.clone(),
            ingest_path: self.ingest_path.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_download_bytes: self.max_download_bytes,
            ..ApiSettings::default()
        }
    }
}
