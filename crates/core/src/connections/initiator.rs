//! Authorization initiator
//!
//! Turns a "connect" intent into a full-page navigation to the provider's
//! consent page. The redirect ends the current execution context: nothing in
//! the client runs again until the provider sends the user back.

use std::sync::Arc;

use crosspost_domain::{CrosspostError, Provider, Result};
use tracing::{info, instrument};

use super::ports::{ConnectionsApi, Navigator};
use super::registry::ProviderRegistry;

/// Starts the authorization-code flow for a provider.
pub struct AuthorizationInitiator {
    registry: Arc<ProviderRegistry>,
    api: Arc<dyn ConnectionsApi>,
    nav: Arc<dyn Navigator>,
}

impl AuthorizationInitiator {
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        api: Arc<dyn ConnectionsApi>,
        nav: Arc<dyn Navigator>,
    ) -> Self {
        Self { registry, api, nav }
    }

    /// Obtain a one-time authorization link and navigate to it.
    ///
    /// On failure nothing is navigated and no cached connection state is
    /// touched; the user simply retries.
    ///
    /// # Errors
    /// [`CrosspostError::UnknownProvider`] for an unregistered provider,
    /// [`CrosspostError::AuthorizationInitiation`] when the user id is
    /// missing, the authorize endpoint fails, or it returns no link.
    #[instrument(skip(self), fields(provider = %provider))]
    pub async fn begin_authorization(&self, provider: Provider, user_id: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(CrosspostError::AuthorizationInitiation(
                "a signed-in user is required to connect an account".to_string(),
            ));
        }
        self.registry.resolve(provider)?;

        let link = match self.api.authorize_link(provider).await {
            Ok(link) => link,
            Err(err @ CrosspostError::UnknownProvider(_)) => return Err(err),
            Err(err) => return Err(CrosspostError::AuthorizationInitiation(err.to_string())),
        };
        let link = link.filter(|link| !link.is_empty()).ok_or_else(|| {
            CrosspostError::AuthorizationInitiation(
                "authorize endpoint returned no link".to_string(),
            )
        })?;

        info!(provider = %provider, "redirecting to provider consent page");
        // Terminal transition: the shell leaves the app for the consent page.
        self.nav
            .redirect(&link)
            .map_err(|err| CrosspostError::AuthorizationInitiation(err.to_string()))
    }
}
