//! Application configuration structures
//!
//! Plain serde structs; loading (environment probing, file fallback) lives in
//! the infra crate. Defaults point at the development backend.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::types::Provider;

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the backend API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout for backend calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Per-provider endpoint overrides.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    /// Configuration with every endpoint derived from `api_url`.
    ///
    /// Explicit provider entries in a config source still win; this is the
    /// convenient starting point when only the base URL is known.
    #[must_use]
    pub fn for_api_url(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();
        let providers = ProvidersConfig {
            linkedin: ProviderEndpoints::for_provider(&api_url, Provider::Linkedin),
            reddit: ProviderEndpoints::for_provider(&api_url, Provider::Reddit),
            mastodon: ProviderEndpoints::for_provider(&api_url, Provider::Mastodon),
        };
        Self { api_url, request_timeout_secs: default_request_timeout_secs(), providers }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_api_url(default_api_url())
    }
}

/// Endpoint configuration for every supported provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "ProviderEndpoints::default_linkedin")]
    pub linkedin: ProviderEndpoints,
    #[serde(default = "ProviderEndpoints::default_reddit")]
    pub reddit: ProviderEndpoints,
    #[serde(default = "ProviderEndpoints::default_mastodon")]
    pub mastodon: ProviderEndpoints,
}

impl ProvidersConfig {
    /// Endpoints for a given provider.
    #[must_use]
    pub fn endpoints(&self, provider: Provider) -> &ProviderEndpoints {
        match provider {
            Provider::Linkedin => &self.linkedin,
            Provider::Reddit => &self.reddit,
            Provider::Mastodon => &self.mastodon,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            linkedin: ProviderEndpoints::default_linkedin(),
            reddit: ProviderEndpoints::default_reddit(),
            mastodon: ProviderEndpoints::default_mastodon(),
        }
    }
}

/// The two backend references a provider needs: where to request an
/// authorization link, and where to post the returned code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    pub authorize_url: String,
    pub exchange_url: String,
}

impl ProviderEndpoints {
    /// Conventional endpoints for `provider` under `api_url`.
    #[must_use]
    pub fn for_provider(api_url: &str, provider: Provider) -> Self {
        let base = api_url.trim_end_matches('/');
        Self {
            authorize_url: format!("{base}/connections/{provider}/authorize"),
            exchange_url: format!("{base}/connections/{provider}/access-token"),
        }
    }

    fn default_linkedin() -> Self {
        Self::for_provider(DEFAULT_API_URL, Provider::Linkedin)
    }

    fn default_reddit() -> Self {
        Self::for_provider(DEFAULT_API_URL, Provider::Reddit)
    }

    fn default_mastodon() -> Self {
        Self::for_provider(DEFAULT_API_URL, Provider::Mastodon)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
