//! Provider registry
//!
//! Maps each compiled-in provider to its display name and backend endpoint
//! references. Pure lookup, no state machine.

use std::collections::HashMap;

use crosspost_domain::{CrosspostError, Provider, ProviderEndpoints, ProvidersConfig, Result};

/// Resolved view of one provider's registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedProvider<'a> {
    /// Human-readable platform name.
    pub name: &'static str,
    /// Backend endpoint that issues one-time authorization links.
    pub authorize_url: &'a str,
    /// Backend endpoint that exchanges an authorization code.
    pub exchange_url: &'a str,
}

/// Static registry of supported providers and their endpoint references.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    endpoints: HashMap<Provider, ProviderEndpoints>,
}

impl ProviderRegistry {
    /// Build the registry from configuration, covering every provider.
    #[must_use]
    pub fn from_config(providers: &ProvidersConfig) -> Self {
        let endpoints = Provider::ALL
            .into_iter()
            .map(|provider| (provider, providers.endpoints(provider).clone()))
            .collect();
        Self { endpoints }
    }

    /// A registry with no providers. Resolution always fails; test use only.
    #[must_use]
    pub fn empty() -> Self {
        Self { endpoints: HashMap::new() }
    }

    /// Resolve a provider to its display name and endpoint references.
    ///
    /// # Errors
    /// Returns [`CrosspostError::UnknownProvider`] when the provider has no
    /// registry entry.
    pub fn resolve(&self, provider: Provider) -> Result<ResolvedProvider<'_>> {
        self.endpoints
            .get(&provider)
            .map(|endpoints| ResolvedProvider {
                name: provider.display_name(),
                authorize_url: &endpoints.authorize_url,
                exchange_url: &endpoints.exchange_url,
            })
            .ok_or_else(|| CrosspostError::UnknownProvider(provider.to_string()))
    }
}
