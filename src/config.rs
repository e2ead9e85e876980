use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Where to obtain a TMDb API key
pub const TMDB_API_KEY_LINK: &str = "https://www.themoviedb.org/settings/api";

/// Application settings loaded from `SUGGEST_*` environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// JSON file holding the provider API key
    #[serde(default = "default_config_path")]
    pub config_path: PathBuf,

    /// Ratings export (CSV)
    #[serde(default = "default_ratings_path")]
    pub ratings_path: PathBuf,

    /// Directory holding the persisted suggestion lists
    #[serde(default = "default_suggestions_dir")]
    pub suggestions_dir: PathBuf,

    /// TMDb API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Language requested from the provider
    #[serde(default = "default_language")]
    pub language: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries for transient provider failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Number of entries shown per preview
    #[serde(default = "default_item_count")]
    pub item_count: usize,
}

fn default_config_path() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_ratings_path() -> PathBuf {
    PathBuf::from("ratings.csv")
}

fn default_suggestions_dir() -> PathBuf {
    PathBuf::from("suggestions")
}

fn default_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_item_count() -> usize {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            ratings_path: default_ratings_path(),
            suggestions_dir: default_suggestions_dir(),
            api_url: default_api_url(),
            language: default_language(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            item_count: default_item_count(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables (and `.env` if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed("SUGGEST_")
            .from_env::<Settings>()
            .map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Contents of the API key file: `{ "api_key": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKeyConfig {
    pub api_key: String,
}

impl ApiKeyConfig {
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AppError::Config("API key cannot be empty".to_string()));
        }
        Ok(Self { api_key })
    }

    /// Reads the key file; `Ok(None)` when it does not exist yet
    pub async fn load(path: &Path) -> AppResult<Option<Self>> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let config: ApiKeyConfig = serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        Ok(Some(Self::new(config.api_key)?))
    }

    pub async fn save(&self, path: &Path) -> AppResult<()> {
        let json = serde_json::to_string(self)
            .map_err(|e| AppError::Config(format!("Config serialization error: {}", e)))?;
        tokio::fs::write(path, json).await?;

        tracing::info!(path = %path.display(), "Saved API key config");
        Ok(())
    }
}
