//! Custom error types for stampy

use thiserror::Error;

/// Main error type for stampy operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No URLs found in sitemap")]
    EmptySitemap,

    #[error("No content could be extracted from any page")]
    NoContentExtracted,

    #[error("Failed to persist search index: {0}")]
    IndexPersist(String),

    #[error("Failed to persist site registry: {0}")]
    RegistryPersist(String),

    #[error("Search index not available: {0}")]
    RetrievalUnavailable(String),

    #[error("Invalid tool arguments: {0}")]
    Argument(String),

    #[error("Chat request failed: {0}")]
    ChatTurn(String),

    #[error("Not signed in: run 'stampy login' first")]
    NotSignedIn,

    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// Result type alias for stampy
pub type Result<T> = std::result::Result<T, Error>;
