//! HTTP implementation of the connections backend port
//!
//! Thin reqwest adapter over the four backend operations. Deliberately no
//! retry or circuit-breaking on this path: authorization codes are
//! single-use and connect/disconnect are not idempotent from the client's
//! point of view, so every failure surfaces immediately and the user decides
//! whether to start over.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crosspost_core::{ConnectionsApi, ProviderRegistry};
use crosspost_domain::{
    AppConfig, AuthorizeLinkResponse, CrosspostError, ExchangeRequest, PlatformStatusResponse,
    PlatformStatusRow, Provider, Result,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::{debug, info, instrument};

use super::auth::AccessTokenProvider;

/// Backend client for the connection lifecycle endpoints.
pub struct HttpConnectionsApi {
    client: Client,
    base_url: String,
    registry: Arc<ProviderRegistry>,
    auth: Arc<dyn AccessTokenProvider>,
}

impl HttpConnectionsApi {
    /// Create a new backend client.
    ///
    /// # Errors
    /// Returns [`CrosspostError::Config`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(
        config: &AppConfig,
        registry: Arc<ProviderRegistry>,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CrosspostError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            registry,
            auth,
        })
    }

    /// Build a request with the standard headers, attaching the bearer token
    /// when a session exists.
    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let mut request = self
            .client
            .request(method, url)
            .header("Content-Type", "application/json");
        if let Some(token) = self.auth.access_token().await? {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        Ok(request)
    }

    fn map_transport_error(err: reqwest::Error, url: &str) -> CrosspostError {
        if err.is_timeout() {
            CrosspostError::Network(format!("{url} timed out"))
        } else {
            CrosspostError::Network(format!("{url} failed: {err}"))
        }
    }

    fn map_status_error(status: StatusCode, url: &str, body: String) -> CrosspostError {
        let message = if body.is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {body}")
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            CrosspostError::Auth(message)
        } else {
            CrosspostError::Network(message)
        }
    }

    async fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::map_status_error(status, url, body))
    }
}

#[async_trait]
impl ConnectionsApi for HttpConnectionsApi {
    #[instrument(skip(self), fields(provider = %provider))]
    async fn authorize_link(&self, provider: Provider) -> Result<Option<String>> {
        let url = self.registry.resolve(provider)?.authorize_url.to_string();
        debug!(url = %url, "requesting authorization link");

        let response = self
            .request(Method::GET, &url)
            .await?
            .send()
            .await
            .map_err(|e| Self::map_transport_error(e, &url))?;
        let response = Self::check_status(response, &url).await?;

        let payload: AuthorizeLinkResponse = response
            .json()
            .await
            .map_err(|e| CrosspostError::Network(format!("malformed authorize response: {e}")))?;

        debug!(provider = %provider, has_link = payload.link.is_some(), "authorization link received");
        Ok(payload.link)
    }

    #[instrument(skip(self, code, user_id), fields(provider = %provider))]
    async fn exchange_code(&self, provider: Provider, code: &str, user_id: &str) -> Result<()> {
        let url = self.registry.resolve(provider)?.exchange_url.to_string();
        debug!(url = %url, "posting authorization code");

        let body = ExchangeRequest { code: code.to_string(), user_id: user_id.to_string() };
        let response = self
            .request(Method::POST, &url)
            .await?
            .json(&body)
            .send()
            .await
            .map_err(|e| CrosspostError::Exchange(format!("{url} failed: {e}")))?;

        // 200/201 is the whole contract; the body is not interpreted. Any
        // rejection is terminal for this code, so it gets the exchange
        // classification rather than a generic transport error.
        Self::check_status(response, &url).await.map_err(|err| match err {
            err @ CrosspostError::Auth(_) => err,
            other => CrosspostError::Exchange(other.to_string()),
        })?;
        info!(provider = %provider, "authorization code exchanged");
        Ok(())
    }

    #[instrument(skip(self, user_id))]
    async fn platform_status(&self, user_id: &str) -> Result<Vec<PlatformStatusRow>> {
        let url = format!("{}/connections/user/{user_id}/platform-status", self.base_url);
        debug!(url = %url, "fetching platform status");

        let response = self
            .request(Method::GET, &url)
            .await?
            .send()
            .await
            .map_err(|e| Self::map_transport_error(e, &url))?;
        let response = Self::check_status(response, &url).await?;

        let payload: PlatformStatusResponse = response.json().await.map_err(|e| {
            CrosspostError::Reconciliation(format!("malformed platform status response: {e}"))
        })?;

        debug!(rows = payload.data.len(), "platform status fetched");
        Ok(payload.data)
    }

    #[instrument(skip(self))]
    async fn disconnect(&self, connection_id: i64) -> Result<()> {
        let url = format!("{}/connections/{connection_id}", self.base_url);
        debug!(url = %url, "disconnecting");

        let response = self
            .request(Method::DELETE, &url)
            .await?
            .send()
            .await
            .map_err(|e| Self::map_transport_error(e, &url))?;

        Self::check_status(response, &url).await?;
        info!(connection_id, "connection removed");
        Ok(())
    }
}
