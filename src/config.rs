//! Runtime configuration document.
//!
//! A small JSON file naming the upload endpoint, loaded once before anything
//! else starts. There is no default endpoint: a missing or malformed document
//! aborts startup.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Where the config document lives when none is given
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadConfig {
    /// Endpoint fragments are POSTed to
    #[serde(rename = "lambdaApiUrl")]
    pub lambda_api_url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not fetch {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("could not fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config field lambdaApiUrl is empty")]
    EmptyEndpoint,
}

/// Location of the config document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Path(PathBuf),
    Url(String),
}

impl ConfigSource {
    /// `http://` and `https://` locations are fetched, anything else is a file path
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ConfigSource::Url(location.to_string())
        } else {
            ConfigSource::Path(PathBuf::from(location))
        }
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        ConfigSource::Path(PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Path(path) => write!(f, "{}", path.display()),
            ConfigSource::Url(url) => f.write_str(url),
        }
    }
}

impl UploadConfig {
    /// Parse and check a config document
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: UploadConfig = serde_json::from_str(text)?;
        if config.lambda_api_url.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        Ok(config)
    }
}

/// Load the config document once, with no retry
pub async fn load(source: &ConfigSource) -> Result<UploadConfig, ConfigError> {
    let text = match source {
        ConfigSource::Path(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?
        }
        ConfigSource::Url(url) => fetch(url).await?,
    };
    let config = UploadConfig::from_json(&text)?;
    log::info!("Loaded config from {}", source);
    Ok(config)
}

async fn fetch(url: &str) -> Result<String, ConfigError> {
    let fetch_error = |source| ConfigError::Fetch {
        url: url.to_string(),
        source,
    };
    let response = reqwest::get(url).await.map_err(fetch_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ConfigError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(fetch_error)
}
