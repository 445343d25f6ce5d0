//! Configuration management for stampy
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Web crawling configuration
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Chat service configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Web crawling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// User agent string
    #[serde(default = "default_crawl_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_crawl_timeout")]
    pub timeout_secs: u64,

    /// Maximum pages fetched per sitemap
    #[serde(default = "default_crawl_max_pages")]
    pub max_pages: u32,
}

/// Chat service configuration (OpenAI-compatible endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the chat completion service
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Environment variable name for the API key (overrides stored credentials)
    #[serde(default = "default_chat_api_key_env")]
    pub api_key_env: String,

    /// Connect timeout in seconds
    #[serde(default = "default_chat_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Overall request timeout in seconds
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of top-ranked passages retrieved per search
    #[serde(default = "default_search_top_k")]
    pub top_k: usize,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for stampy data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Root of the site content store (documents and indexes)
    pub data_dir: PathBuf,

    /// Path to the key-value store file
    pub kv_file: PathBuf,

    /// Path to the credentials file
    pub credentials_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawl: CrawlConfig::default(),
            chat: ChatConfig::default(),
            search: SearchConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            user_agent: default_crawl_user_agent(),
            timeout_secs: default_crawl_timeout(),
            max_pages: default_crawl_max_pages(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_base_url(),
            model: default_chat_model(),
            api_key_env: default_chat_api_key_env(),
            connect_timeout_secs: default_chat_connect_timeout(),
            timeout_secs: default_chat_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_search_top_k(),
        }
    }
}

impl PathsConfig {
    fn for_base_dir(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.toml"),
            data_dir: base.join("data"),
            kv_file: base.join("kv.json"),
            credentials_file: base.join("credentials.toml"),
            base_dir: base,
        }
    }
}

impl Config {
    /// Get the default base directory for stampy (~/.stampy)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stampy")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Set up paths based on config file location
        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig::for_base_dir(base);
        config.paths.config_file = config_path.to_path_buf();

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        let paths = PathsConfig::for_base_dir(base);

        let mut config = if paths.config_file.exists() {
            debug!("Loading config from {:?}", paths.config_file);
            let content = std::fs::read_to_string(&paths.config_file)?;
            toml::from_str::<Config>(&content)?
        } else {
            debug!("No config file found, using defaults");
            Config::default()
        };

        config.paths = paths;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.crawl.timeout_secs == 0 {
            return Err(Error::Config(
                "crawl.timeout_secs must be positive".to_string(),
            ));
        }

        if self.crawl.max_pages == 0 {
            return Err(Error::Config("crawl.max_pages must be positive".to_string()));
        }

        if self.chat.base_url.is_empty() {
            return Err(Error::Config("chat.base_url must not be empty".to_string()));
        }

        if self.search.top_k == 0 {
            return Err(Error::Config("search.top_k must be positive".to_string()));
        }

        Ok(())
    }
}
