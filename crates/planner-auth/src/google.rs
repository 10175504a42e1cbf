//! Google OAuth2 provider for read-only Calendar access.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::storage::{TokenSet, TokenStorage};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Storage key for Google tokens.
pub const GOOGLE_SERVICE: &str = "google";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

impl GoogleTokenResponse {
    /// Convert to a storable token set.
    ///
    /// Refresh responses omit the refresh token, so the previous one is kept.
    pub fn into_token_set(self, previous_refresh: Option<String>) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: chrono::Utc::now().timestamp() + self.expires_in as i64,
            scopes: self.scope.split_whitespace().map(str::to_string).collect(),
        }
    }
}

pub struct GoogleOAuth2Provider {
    pub client_id: String,
    pub client_secret: String,
    token_url: String,
    revoke_url: String,
}

impl GoogleOAuth2Provider {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            revoke_url: GOOGLE_REVOKE_URL.to_string(),
        }
    }

    /// Point token and revoke requests somewhere else (tests, proxies).
    pub fn with_endpoints(mut self, token_url: &str, revoke_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self.revoke_url = revoke_url.to_string();
        self
    }

    fn redirect_uri(port: u16) -> String {
        format!("http://localhost:{}/callback", port)
    }

    /// Generate authorization URL for OAuth flow.
    /// Returns (url, state) where state should be verified on callback.
    pub fn authorization_url(&self, port: u16) -> (String, String) {
        let state = uuid::Uuid::new_v4().to_string();

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&Self::redirect_uri(port)),
            urlencoding::encode(CALENDAR_READONLY_SCOPE),
            urlencoding::encode(&state),
        );

        (url, state)
    }

    /// Exchange authorization code for tokens.
    #[tracing::instrument(skip(self, code), level = "info")]
    pub async fn exchange_code(&self, code: &str, port: u16) -> Result<GoogleTokenResponse> {
        let redirect_uri = Self::redirect_uri(port);
        let client = reqwest::Client::new();

        let response = client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", &redirect_uri),
            ])
            .send()
            .await
            .context("Failed to send token request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Token exchange failed: {}", error_text);
        }

        response.json::<GoogleTokenResponse>().await.context("Failed to parse token response")
    }

    /// Refresh an expired access token.
    #[tracing::instrument(skip(self, refresh_token), level = "info")]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<GoogleTokenResponse> {
        let client = reqwest::Client::new();

        let response = client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to send refresh request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Token refresh failed: {}", error_text);
        }

        response.json::<GoogleTokenResponse>().await.context("Failed to parse refresh response")
    }

    /// Revoke an access or refresh token.
    #[tracing::instrument(skip(self, token), level = "info")]
    pub async fn revoke_token(&self, token: &str) -> Result<()> {
        let client = reqwest::Client::new();

        let response = client
            .post(&self.revoke_url)
            .form(&[("token", token)])
            .send()
            .await
            .context("Failed to send revoke request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Token revocation failed: {}", error_text);
        }

        Ok(())
    }

    /// A usable access token from `storage`, refreshing and re-storing it
    /// when it is about to expire.
    pub async fn access_token(&self, storage: &TokenStorage) -> Result<String> {
        let current = storage
            .retrieve_token(GOOGLE_SERVICE)
            .context("Not signed in to Google")?;

        if !current.needs_refresh() {
            return Ok(current.access_token);
        }

        let Some(refresh) = current.refresh_token.clone() else {
            if current.is_expired() {
                anyhow::bail!("Google token expired and no refresh token is stored");
            }
            return Ok(current.access_token);
        };

        tracing::info!("Refreshing Google access token");
        let refreshed = self.refresh_token(&refresh).await?.into_token_set(Some(refresh));
        storage.store_token(GOOGLE_SERVICE, &refreshed)?;
        Ok(refreshed.access_token)
    }
}
