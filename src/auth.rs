//! Credentials handling
//!
//! Sign-in state is a credentials file under the base directory holding the
//! username and the chat API key. Site management works without
//! credentials; the chat service requires them.

use crate::config::Config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Stored credentials for the chat service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
}

impl Credentials {
    /// Load credentials if the user has signed in.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(toml::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist credentials (sign in).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Signed in as {}", self.username);
        Ok(())
    }
}

/// Whether a user is signed in.
pub fn is_signed_in(config: &Config) -> bool {
    config.paths.credentials_file.exists()
}

/// Load credentials, resolving the API key from the configured environment
/// variable first and the credentials file second.
pub fn require_signed_in(config: &Config) -> Result<Credentials> {
    let stored = Credentials::load(&config.paths.credentials_file)?;

    if let Ok(key) = std::env::var(&config.chat.api_key_env) {
        if !key.is_empty() {
            let username = stored
                .map(|c| c.username)
                .unwrap_or_else(|| "anonymous".to_string());
            return Ok(Credentials {
                username,
                api_key: key,
            });
        }
    }

    stored.ok_or(Error::NotSignedIn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_credentials_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("credentials.toml");

        assert!(Credentials::load(&path).unwrap().is_none());

        let creds = Credentials {
            username: "alice".to_string(),
            api_key: "sk-test".to_string(),
        };
        creds.save(&path).unwrap();

        let loaded = Credentials::load(&path).unwrap().unwrap();
        assert_eq!(loaded.username, "alice");
        assert_eq!(loaded.api_key, "sk-test");
    }

    #[test]
    fn test_is_signed_in_tracks_credentials_file() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.credentials_file = tmp.path().join("credentials.toml");

        assert!(!is_signed_in(&config));

        Credentials {
            username: "alice".to_string(),
            api_key: "sk-test".to_string(),
        }
        .save(&config.paths.credentials_file)
        .unwrap();

        assert!(is_signed_in(&config));
    }
}
