//! Connection toggle
//!
//! Single entry point for the connect/disconnect control on the connections
//! view. Dispatches to the authorization initiator when the provider is not
//! connected, or issues a disconnect by server id when it is. A per-provider
//! busy flag stops double-clicks; the server remains the final arbiter.

use std::collections::HashSet;
use std::sync::Arc;

use crosspost_domain::{CrosspostError, Provider, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::initiator::AuthorizationInitiator;
use super::ports::ConnectionsApi;
use super::reconciler::StatusReconciler;

/// What a toggle invocation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The provider was not connected; the shell is navigating to the
    /// provider's consent page.
    RedirectingToProvider { provider: Provider },
    /// The connection was destroyed on the server and dropped from the
    /// cached mapping.
    Disconnected { provider: Provider },
    /// Another toggle for the same provider is still in flight; nothing was
    /// done.
    AlreadyPending { provider: Provider },
}

/// Connect/disconnect dispatcher with per-provider in-flight tracking.
pub struct ConnectionToggle {
    api: Arc<dyn ConnectionsApi>,
    initiator: Arc<AuthorizationInitiator>,
    reconciler: Arc<StatusReconciler>,
    busy: Mutex<HashSet<Provider>>,
}

impl ConnectionToggle {
    #[must_use]
    pub fn new(
        api: Arc<dyn ConnectionsApi>,
        initiator: Arc<AuthorizationInitiator>,
        reconciler: Arc<StatusReconciler>,
    ) -> Self {
        Self { api, initiator, reconciler, busy: Mutex::new(HashSet::new()) }
    }

    /// Whether a toggle for `provider` is currently in flight.
    #[must_use]
    pub fn is_busy(&self, provider: Provider) -> bool {
        self.busy.lock().contains(&provider)
    }

    /// Flip the connection state for `provider`.
    ///
    /// # Errors
    /// [`CrosspostError::Disconnect`] when the cached connection has no
    /// server id or the disconnect request is rejected (the cached state is
    /// left as it was); initiator errors pass through unchanged for the
    /// connect direction.
    #[instrument(skip(self, user_id), fields(provider = %provider))]
    pub async fn toggle(&self, provider: Provider, user_id: &str) -> Result<ToggleOutcome> {
        if !self.busy.lock().insert(provider) {
            return Ok(ToggleOutcome::AlreadyPending { provider });
        }
        let result = self.toggle_inner(provider, user_id).await;
        self.busy.lock().remove(&provider);
        result
    }

    async fn toggle_inner(&self, provider: Provider, user_id: &str) -> Result<ToggleOutcome> {
        match self.reconciler.connection(provider) {
            Some(existing) => {
                let id = existing.id.ok_or_else(|| {
                    CrosspostError::Disconnect(format!(
                        "no server id recorded for {provider} connection"
                    ))
                })?;

                match self.api.disconnect(id).await {
                    Ok(()) => {}
                    Err(err @ CrosspostError::Disconnect(_)) => return Err(err),
                    Err(err) => return Err(CrosspostError::Disconnect(err.to_string())),
                }

                info!(provider = %provider, connection_id = id, "connection disconnected");
                self.reconciler.deactivate(provider);

                // Defense against stale local state: the optimistic update
                // holds only until the next reconciliation.
                if let Err(err) = self.reconciler.refresh(user_id).await {
                    warn!(error = %err, "post-disconnect refresh failed, keeping optimistic state");
                }
                Ok(ToggleOutcome::Disconnected { provider })
            }
            None => {
                self.initiator.begin_authorization(provider, user_id).await?;
                Ok(ToggleOutcome::RedirectingToProvider { provider })
            }
        }
    }
}
