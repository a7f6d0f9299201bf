// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the August REST API.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::error::{ParseError, ProtocolError};
use crate::protocol::LockApi;
use crate::protocol::pubnub::{PubNubSubscription, spawn_subscriber};
use crate::response::{LockDetails, LockEvent, LockStatus, LockSummary};
use crate::types::LockId;

const ACCESS_TOKEN_HEADER: &str = "x-august-access-token";

// ============================================================================
// ApiConfig - Connection parameters for the August cloud
// ============================================================================

/// Configuration for the August cloud API.
///
/// # Examples
///
/// ```
/// use august_bridge::protocol::ApiConfig;
/// use std::time::Duration;
///
/// let config = ApiConfig::new()
///     .with_access_token("token")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "https://api-production.august.com");
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    timeout: Duration,
    pubnub_origin: String,
    pubnub_subscribe_key: String,
}

impl ApiConfig {
    /// Production REST endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api-production.august.com";
    /// API key of the August mobile app.
    pub const DEFAULT_API_KEY: &'static str = "79fd0eb6-381d-4adf-95a0-47721289d1d9";
    /// PubNub origin serving the push channels.
    pub const DEFAULT_PUBNUB_ORIGIN: &'static str = "https://ps.pndsn.com";
    /// PubNub subscribe key of the August app.
    pub const DEFAULT_PUBNUB_SUBSCRIBE_KEY: &'static str =
        "sub-c-1030e062-0ebe-11e5-a5c2-0619f8945a4f";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration pointing at the production API.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: Self::DEFAULT_API_KEY.to_string(),
            access_token: None,
            timeout: Self::DEFAULT_TIMEOUT,
            pubnub_origin: Self::DEFAULT_PUBNUB_ORIGIN.to_string(),
            pubnub_subscribe_key: Self::DEFAULT_PUBNUB_SUBSCRIBE_KEY.to_string(),
        }
    }

    /// Sets a custom REST endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets an access token obtained from a previous session.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets a custom PubNub origin.
    #[must_use]
    pub fn with_pubnub_origin(mut self, origin: impl Into<String>) -> Self {
        self.pubnub_origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the PubNub subscribe key.
    #[must_use]
    pub fn with_pubnub_subscribe_key(mut self, key: impl Into<String>) -> Self {
        self.pubnub_subscribe_key = key.into();
        self
    }

    /// Returns the REST endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the access token, if set.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        HttpClient::new(self)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HttpClient - REST implementation of LockApi
// ============================================================================

/// HTTP client for the August cloud.
///
/// Cloning is cheap; clones share the connection pool and access token.
///
/// # Examples
///
/// ```no_run
/// use august_bridge::protocol::{ApiConfig, LockApi};
/// use august_bridge::types::LockId;
///
/// # async fn example() -> august_bridge::Result<()> {
/// let client = ApiConfig::new().with_access_token("token").into_client()?;
/// let details = client.details(&LockId::new("7EDFD6A4")).await?;
/// println!("{} battery: {:?}", details.lock_name, details.battery_level());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: ApiConfig,
    access_token: Arc<RwLock<Option<String>>>,
    pubnub: PubNubSubscription,
}

impl HttpClient {
    /// Creates a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: ApiConfig) -> Result<Self, ProtocolError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        let pubnub = PubNubSubscription::new(
            config.pubnub_origin.clone(),
            config.pubnub_subscribe_key.clone(),
        )?;

        Ok(Self {
            client,
            access_token: Arc::new(RwLock::new(config.access_token.clone())),
            config,
            pubnub,
        })
    }

    /// Returns the REST endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns the current access token.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().clone()
    }

    /// Opens a session with the account credentials and stores the returned
    /// access token for subsequent requests.
    ///
    /// The identifier is sent as `email:<id>` when it contains an `@`,
    /// otherwise as `phone:<id>`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::AuthenticationFailed` if the credentials are
    /// rejected, or another `ProtocolError` if the request fails.
    pub async fn start_session(
        &self,
        install_id: &str,
        august_id: &str,
        password: &str,
    ) -> Result<String, ProtocolError> {
        let identifier = if august_id.contains('@') {
            format!("email:{august_id}")
        } else {
            format!("phone:{august_id}")
        };
        let body = serde_json::json!({
            "installId": install_id,
            "identifier": identifier,
            "password": password,
        });

        let response = self
            .request(Method::POST, "/session")
            .json(&body)
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        let response = check_status(response)?;

        let token = response
            .headers()
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ProtocolError::InvalidResponse(ParseError::MissingField(
                    ACCESS_TOKEN_HEADER.to_string(),
                ))
            })?;

        tracing::debug!("Opened August session");
        *self.access_token.write() = Some(token.clone());
        Ok(token)
    }

    /// Builds a request with the vendor headers.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.config.base_url);
        let mut builder = self
            .client
            .request(method, url)
            .header("x-august-api-key", &self.config.api_key)
            .header("x-kease-api-key", &self.config.api_key)
            .header("accept-version", "0.0.1")
            .header("user-agent", concat!("august_bridge/", env!("CARGO_PKG_VERSION")));

        if let Some(token) = self.access_token.read().as_deref() {
            builder = builder.header(ACCESS_TOKEN_HEADER, token);
        }
        builder
    }

    /// Sends a request and decodes the JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<T, ProtocolError> {
        tracing::debug!(%method, path = %path, "Sending August API request");

        let response = self
            .request(method, path)
            .send()
            .await
            .map_err(ProtocolError::Http)?;
        let response = check_status(response)?;

        // A refreshed token is returned on every authenticated call.
        if let Some(token) = response
            .headers()
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            *self.access_token.write() = Some(token.to_string());
        }

        let body = response.text().await.map_err(ProtocolError::Http)?;
        tracing::trace!(body = %body, "Received August API response");

        serde_json::from_str(&body).map_err(|e| ProtocolError::InvalidResponse(e.into()))
    }
}

fn check_status(response: Response) -> Result<Response, ProtocolError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ProtocolError::AuthenticationFailed);
    }
    if !status.is_success() {
        return Err(ProtocolError::ConnectionFailed(format!(
            "HTTP {} - {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )));
    }
    Ok(response)
}

fn lock_path(prefix: &str, lock_id: &LockId, suffix: &str) -> String {
    format!("{prefix}/{}{suffix}", urlencoding::encode(lock_id.as_str()))
}

impl LockApi for HttpClient {
    async fn locks(&self) -> Result<Vec<LockSummary>, ProtocolError> {
        let listing: BTreeMap<String, LockSummary> =
            self.send_json(Method::GET, "/users/locks/mine").await?;

        Ok(listing
            .into_iter()
            .map(|(id, mut summary)| {
                summary.lock_id = LockId::new(id);
                summary
            })
            .collect())
    }

    async fn details(&self, lock_id: &LockId) -> Result<LockDetails, ProtocolError> {
        self.send_json(Method::GET, &lock_path("/locks", lock_id, ""))
            .await
    }

    async fn status(&self, lock_id: &LockId) -> Result<LockStatus, ProtocolError> {
        self.send_json(Method::GET, &lock_path("/locks", lock_id, "/status"))
            .await
    }

    async fn lock(&self, lock_id: &LockId) -> Result<LockStatus, ProtocolError> {
        self.send_json(Method::PUT, &lock_path("/remoteoperate", lock_id, "/lock"))
            .await
    }

    async fn unlock(&self, lock_id: &LockId) -> Result<LockStatus, ProtocolError> {
        self.send_json(Method::PUT, &lock_path("/remoteoperate", lock_id, "/unlock"))
            .await
    }

    async fn subscribe(
        &self,
        lock_id: &LockId,
        channel: &str,
    ) -> Result<mpsc::Receiver<LockEvent>, ProtocolError> {
        if channel.is_empty() {
            return Err(ProtocolError::InvalidAddress(format!(
                "lock {lock_id} has no push channel"
            )));
        }
        Ok(spawn_subscriber(
            self.pubnub.clone(),
            lock_id.clone(),
            channel.to_string(),
        ))
    }
}
