//! Browser sign-in with a local callback server.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{oneshot, Mutex};
use warp::Filter;

use crate::google::{GoogleOAuth2Provider, GOOGLE_SERVICE};
use crate::storage::{TokenSet, TokenStorage};

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<HashMap<String, String>>>>>;

const SUCCESS_PAGE: &str = "<html><body><h1>Signed in</h1><p>You can close this window and return to the planner.</p></body></html>";

impl GoogleOAuth2Provider {
    /// Run the full sign-in: open the consent page, wait for the redirect on
    /// `localhost:{port}/callback`, exchange the code and store the tokens.
    #[tracing::instrument(skip(self, storage), level = "info")]
    pub async fn sign_in(&self, storage: &TokenStorage, port: u16) -> Result<TokenSet> {
        let (auth_url, expected_state) = self.authorization_url(port);

        let (tx, rx) = oneshot::channel();
        let tx: CallbackSender = Arc::new(Mutex::new(Some(tx)));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let routes = warp::get()
            .and(warp::path("callback"))
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::any().map(move || tx.clone()))
            .and_then(|params: HashMap<String, String>, tx: CallbackSender| async move {
                if let Some(sender) = tx.lock().await.take() {
                    let _ = sender.send(params);
                }
                Ok::<_, warp::Rejection>(warp::reply::html(SUCCESS_PAGE))
            });

        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(([127, 0, 0, 1], port), async {
                shutdown_rx.await.ok();
            })
            .with_context(|| format!("Failed to listen on port {}", port))?;
        tokio::spawn(server);
        tracing::debug!("OAuth callback listening on {}", addr);

        eprintln!("Opening browser for Google sign-in. If nothing happens, visit:\n\n  {}\n", auth_url);
        if let Err(e) = webbrowser::open(&auth_url) {
            tracing::warn!("Could not open browser: {}", e);
        }

        let params = rx.await.context("Failed to receive OAuth callback")?;
        let _ = shutdown_tx.send(());

        let code = callback_code(&params, &expected_state)?;
        let token_set = self.exchange_code(&code, port).await?.into_token_set(None);
        storage.store_token(GOOGLE_SERVICE, &token_set)?;

        tracing::info!("Google sign-in completed");
        Ok(token_set)
    }

    /// Revoke the stored grant (best effort) and forget it locally.
    #[tracing::instrument(skip(self, storage), level = "info")]
    pub async fn sign_out(&self, storage: &TokenStorage) -> Result<()> {
        if let Ok(tokens) = storage.retrieve_token(GOOGLE_SERVICE) {
            let token = tokens.refresh_token.as_deref().unwrap_or(&tokens.access_token);
            if let Err(e) = self.revoke_token(token).await {
                tracing::warn!("Revocation failed, removing local tokens anyway: {}", e);
            }
        }
        storage.delete_token(GOOGLE_SERVICE)
    }
}

/// Pull the authorization code out of the redirect query, checking the state.
fn callback_code(params: &HashMap<String, String>, expected_state: &str) -> Result<String> {
    if let Some(error) = params.get("error") {
        anyhow::bail!("Authorization denied: {}", error);
    }

    let state = params.get("state").map(String::as_str).unwrap_or_default();
    if state != expected_state {
        anyhow::bail!("CSRF token mismatch");
    }

    match params.get("code") {
        Some(code) if !code.is_empty() => Ok(code.clone()),
        _ => anyhow::bail!("Callback did not include an authorization code"),
    }
}
