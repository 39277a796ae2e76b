//! `reqwest`-backed implementation of the provider interfaces.
//!
//! All feed and profile endpoints are JSON POSTs authenticated with the
//! account's bearer token; the OAuth token endpoint is a form POST
//! authenticated with the application key and secret.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::traits::{AccountProfile, Authorizer, ChangeFeed};
use crate::types::{FeedPage, TokenGrant};

/// HTTP request timeout for a single provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for one provider application.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider API (e.g. `https://api.provider.test`).
    pub api_base: String,
    /// User-facing authorization page URL.
    pub authorize_url: String,
    /// Application key (OAuth client id).
    pub app_key: String,
    /// Application secret (OAuth client secret).
    pub app_secret: String,
    /// Redirect URL registered for the OAuth callback.
    pub redirect_url: String,
}

// ---------------------------------------------------------------------------
// HttpProviderClient
// ---------------------------------------------------------------------------

/// Client for the provider's HTTP surfaces.
///
/// Implements [`ChangeFeed`], [`AccountProfile`], and [`Authorizer`]
/// over a single pre-configured `reqwest` client.
pub struct HttpProviderClient {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl HttpProviderClient {
    /// Create a new client with a pre-configured HTTP transport.
    pub fn new(config: ProviderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }

    /// Execute an authenticated JSON POST and decode the response body.
    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{path}", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::warn!(url = %url, status, "Provider call failed");
            return Err(ProviderError::HttpStatus(status));
        }
        Ok(response.json().await?)
    }
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LatestCursorResponse {
    cursor: String,
}

#[derive(Deserialize)]
struct NameInfo {
    display_name: String,
}

#[derive(Deserialize)]
struct AccountResponse {
    name: NameInfo,
}

// ---------------------------------------------------------------------------
// Trait implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl ChangeFeed for HttpProviderClient {
    async fn get_latest_cursor(&self, token: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "path": "",
            "recursive": true,
            "include_deleted": true,
        });
        let response: LatestCursorResponse = self
            .post_json("/2/files/list_folder/get_latest_cursor", token, &body)
            .await?;
        Ok(response.cursor)
    }

    async fn list_changes(&self, token: &str, cursor: &str) -> Result<FeedPage, ProviderError> {
        let body = serde_json::json!({ "cursor": cursor });
        self.post_json("/2/files/list_folder/continue", token, &body)
            .await
    }
}

#[async_trait]
impl AccountProfile for HttpProviderClient {
    async fn display_name(&self, token: &str) -> Result<String, ProviderError> {
        let response: AccountResponse = self
            .post_json("/2/users/get_current_account", token, &serde_json::json!(null))
            .await?;
        Ok(response.name.display_name)
    }
}

#[async_trait]
impl Authorizer for HttpProviderClient {
    fn authorize_url(&self, state: &str) -> String {
        let url = reqwest::Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.app_key.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("state", state),
            ],
        )
        .expect("Invalid authorize URL in provider configuration");
        url.into()
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, ProviderError> {
        let url = format!("{}/oauth2/token", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("code", code),
                ("grant_type", "authorization_code"),
                ("client_id", self.config.app_key.as_str()),
                ("client_secret", self.config.app_secret.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
