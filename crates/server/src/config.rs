use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "DOCSIFT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "docsift.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// Bunyan-style JSON lines.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract `tessdata` directory; the library default when unset.
    pub data_path: Option<String>,
    pub lang: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self { data_path: None, lang: "eng".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub extraction_timeout_secs: u64,
    pub log_format: LogFormat,
    pub ocr: OcrConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            uploads_dir: PathBuf::from("uploads"),
            max_upload_bytes: 32 * 1024 * 1024,
            extraction_timeout_secs: 120,
            log_format: LogFormat::Pretty,
            ocr: OcrConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `$DOCSIFT_CONFIG`, else `./docsift.toml` if it exists, else defaults;
    /// then `DOCSIFT_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV).map(PathBuf::from).or_else(|| {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            default.exists().then(|| default.to_path_buf())
        });
        let contents = match &path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|source| {
                ConfigError::Read { path: path.clone(), source }
            })?),
            None => None,
        };
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config: Self = match file {
            Some(contents) => toml::from_str(contents)?,
            None => Self::default(),
        };

        if let Some(value) = env("DOCSIFT_BIND") {
            config.bind = value
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "DOCSIFT_BIND", value })?;
        }
        if let Some(value) = env("DOCSIFT_UPLOADS_DIR") {
            config.uploads_dir = PathBuf::from(value);
        }
        if let Some(value) = env("DOCSIFT_LOG_FORMAT") {
            config.log_format = match value.to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::InvalidEnv { key: "DOCSIFT_LOG_FORMAT", value }),
            };
        }

        if config.extraction_timeout_secs == 0 {
            return Err(ConfigError::Zero { key: "extraction_timeout_secs" });
        }
        if config.max_upload_bytes == 0 {
            return Err(ConfigError::Zero { key: "max_upload_bytes" });
        }
        Ok(config)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }
}
