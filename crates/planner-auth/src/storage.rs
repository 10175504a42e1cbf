use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Token set for OAuth2 authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Optional refresh token for token renewal
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,

    /// Scopes granted to this token
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Check if the token needs refresh (within 5 minutes of expiry)
    pub fn needs_refresh(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - 300 // 5 minute buffer
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at
    }
}

/// File-based storage for OAuth tokens, one JSON file per service.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    dir: PathBuf,
}

impl TokenStorage {
    /// Storage under `<config dir>/planner/tokens`.
    pub fn new() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("planner")
            .join("tokens");
        Ok(Self { dir })
    }

    /// Storage rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn token_path(&self, service: &str) -> PathBuf {
        self.dir.join(format!("{}.json", service))
    }

    /// Store a token set
    ///
    /// # Arguments
    /// * `service` - Service identifier (e.g., "google")
    /// * `token_set` - The token set to store
    pub fn store_token(&self, service: &str, token_set: &TokenSet) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create tokens directory")?;
        let path = self.token_path(service);

        let json = serde_json::to_string_pretty(token_set)
            .context("Failed to serialize token set")?;

        fs::write(&path, &json)
            .context("Failed to write token file")?;

        tracing::info!("Stored token for service: {} at {:?}", service, path);
        Ok(())
    }

    /// Retrieve a stored token set
    pub fn retrieve_token(&self, service: &str) -> Result<TokenSet> {
        let path = self.token_path(service);

        let json = fs::read_to_string(&path)
            .context("Failed to read token file")?;

        let token_set: TokenSet = serde_json::from_str(&json)
            .context("Failed to deserialize token set")?;

        tracing::debug!("Retrieved token for service: {}", service);
        Ok(token_set)
    }

    /// Delete a stored token set. Missing tokens are not an error.
    pub fn delete_token(&self, service: &str) -> Result<()> {
        let path = self.token_path(service);

        if path.exists() {
            fs::remove_file(&path)
                .context("Failed to delete token file")?;
            tracing::info!("Deleted token for service: {}", service);
        }

        Ok(())
    }

    /// Check if a token exists for a service
    pub fn has_token(&self, service: &str) -> bool {
        self.retrieve_token(service).is_ok()
    }
}
