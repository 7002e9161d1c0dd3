//! Callback processor
//!
//! Runs when control returns to the application after a provider redirect.
//! Each pass parses the current URL state, classifies the arrival, and for a
//! granted code performs exactly one token exchange behind the
//! [`CallbackGuard`]. Terminal branches rewrite the URL (dropping the
//! single-use `code`/`error` and setting `auth_success`/`auth_error`),
//! release the guard, and route to the connections view.
//!
//! Authorization codes are single-use by protocol: a failed exchange is
//! terminal for that code and is never retried. The user restarts through
//! the authorization initiator.

use std::sync::Arc;

use crosspost_domain::constants::{
    AUTH_ERROR_PARAM, AUTH_SUCCESS_PARAM, CODE_PARAM, CONNECTIONS_ROUTE, ERROR_PARAM,
};
use crosspost_domain::{Provider, Result, UrlState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::guard::CallbackGuard;
use super::ports::{ConnectionsApi, Navigator};
use super::reconciler::StatusReconciler;
use super::registry::ProviderRegistry;

/// What the current navigation carries, parsed at detection time.
///
/// Ephemeral: consumed at most once per distinct code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackArrival {
    /// No callback pending.
    None,
    /// The provider refused authorization (`error=` in the query).
    Declined { provider: Provider, reason: String },
    /// The provider granted a single-use authorization code.
    Granted { provider: Provider, code: String },
}

impl CallbackArrival {
    /// Classify the current URL state.
    ///
    /// A code or error only counts as a callback on a provider callback
    /// route (`/connections/<provider>`); the same parameter names on any
    /// other route belong to someone else. If both parameters are somehow
    /// present, the provider's refusal wins and the code is discarded.
    ///
    /// # Errors
    /// Returns [`crosspost_domain::CrosspostError::UnknownProvider`] when a
    /// callback landed on a route naming a provider outside the compiled-in
    /// set.
    pub fn detect(url: &UrlState) -> Result<Self> {
        let code = url.get(CODE_PARAM).filter(|code| !code.is_empty());
        let error = url.get(ERROR_PARAM).filter(|reason| !reason.is_empty());
        if code.is_none() && error.is_none() {
            return Ok(Self::None);
        }

        let segment = url
            .route()
            .strip_prefix(CONNECTIONS_ROUTE)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|segment| !segment.is_empty() && !segment.contains('/'));
        let Some(segment) = segment else {
            return Ok(Self::None);
        };
        let provider: Provider = segment.parse()?;

        Ok(match (code, error) {
            (_, Some(reason)) => Self::Declined { provider, reason: reason.to_string() },
            (Some(code), None) => Self::Granted { provider, code: code.to_string() },
            (None, None) => Self::None,
        })
    }
}

/// Outcome of one processing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CallbackOutcome {
    /// Nothing to do: no callback pending, or this arrival is already being
    /// (or has already been) handled.
    NoCallback,
    /// The provider refused authorization; no exchange was attempted.
    ProviderDeclined { provider: Provider, reason: String },
    /// The code was exchanged and the backend recorded the connection.
    Exchanged { provider: Provider },
    /// The exchange was rejected or unreachable; terminal for this code.
    ExchangeFailed { provider: Provider, reason: String },
    /// A completion flag from an earlier pass surfaced on the connections
    /// view; it has now been consumed from the URL.
    Completion { success: bool, message: String },
}

impl CallbackOutcome {
    /// Typed error corresponding to a failed outcome, if any.
    #[must_use]
    pub fn error(&self) -> Option<crosspost_domain::CrosspostError> {
        use crosspost_domain::CrosspostError;
        match self {
            Self::ProviderDeclined { reason, .. } => {
                Some(CrosspostError::ProviderDeclined(reason.clone()))
            }
            Self::ExchangeFailed { reason, .. } => Some(CrosspostError::Exchange(reason.clone())),
            _ => None,
        }
    }
}

/// Releases the guard when the exchange scope exits, whatever the path.
struct ReleaseOnDrop<'a>(&'a CallbackGuard);

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Processes provider callbacks exactly once per arrival.
pub struct CallbackProcessor {
    registry: Arc<ProviderRegistry>,
    api: Arc<dyn ConnectionsApi>,
    nav: Arc<dyn Navigator>,
    reconciler: Arc<StatusReconciler>,
    guard: CallbackGuard,
}

impl CallbackProcessor {
    #[must_use]
    pub fn new(
        registry: Arc<ProviderRegistry>,
        api: Arc<dyn ConnectionsApi>,
        nav: Arc<dyn Navigator>,
        reconciler: Arc<StatusReconciler>,
    ) -> Self {
        Self { registry, api, nav, reconciler, guard: CallbackGuard::new() }
    }

    /// The guard owned by this processor instance.
    #[must_use]
    pub fn guard(&self) -> &CallbackGuard {
        &self.guard
    }

    /// Run one detection pass against the current URL state.
    ///
    /// Safe to call on every relevant navigation event and from overlapping
    /// contexts: for any number of passes carrying the same code, exactly one
    /// exchange request is sent.
    ///
    /// # Errors
    /// Only detection itself can fail (unknown provider on a callback
    /// route). Exchange failures are not errors; they are encoded into the
    /// URL state and reported through the outcome so they survive routing.
    #[instrument(skip(self, user_id))]
    pub async fn process(&self, user_id: &str) -> Result<CallbackOutcome> {
        let url = self.nav.current();
        match CallbackArrival::detect(&url)? {
            CallbackArrival::None => Ok(self.surface_completion(&url)),
            CallbackArrival::Declined { provider, reason } => {
                Ok(self.handle_declined(&url, provider, reason))
            }
            CallbackArrival::Granted { provider, code } => {
                self.handle_granted(&url, provider, &code, user_id).await
            }
        }
    }

    /// The provider itself refused; no network call is needed and the guard
    /// is never touched.
    fn handle_declined(
        &self,
        url: &UrlState,
        provider: Provider,
        reason: String,
    ) -> CallbackOutcome {
        info!(provider = %provider, reason = %reason, "provider declined authorization");
        let rewritten =
            url.clone().without_param(ERROR_PARAM).with_param(AUTH_ERROR_PARAM, reason.clone());
        self.nav.rewrite(rewritten);
        self.nav.goto(CONNECTIONS_ROUTE);
        CallbackOutcome::ProviderDeclined { provider, reason }
    }

    async fn handle_granted(
        &self,
        url: &UrlState,
        provider: Provider,
        code: &str,
        user_id: &str,
    ) -> Result<CallbackOutcome> {
        self.registry.resolve(provider)?;

        if !self.guard.try_acquire() {
            debug!(provider = %provider, "callback arrival already in flight or processed");
            return Ok(CallbackOutcome::NoCallback);
        }
        let release = ReleaseOnDrop(&self.guard);

        let result = if user_id.trim().is_empty() {
            Err("no signed-in user for code exchange".to_string())
        } else {
            self.api
                .exchange_code(provider, code, user_id)
                .await
                .map_err(|err| err.to_string())
        };

        // Flush the rewrite while the guard is still held, then release
        // before any navigation.
        let stripped = url.clone().without_param(CODE_PARAM);
        let (outcome, rewritten) = match result {
            Ok(()) => {
                info!(provider = %provider, "code exchange succeeded");
                (
                    CallbackOutcome::Exchanged { provider },
                    stripped.with_param(AUTH_SUCCESS_PARAM, "true"),
                )
            }
            Err(reason) => {
                warn!(provider = %provider, reason = %reason, "code exchange failed");
                (
                    CallbackOutcome::ExchangeFailed { provider, reason: reason.clone() },
                    stripped.with_param(AUTH_ERROR_PARAM, reason),
                )
            }
        };
        self.nav.rewrite(rewritten);
        drop(release);
        self.nav.goto(CONNECTIONS_ROUTE);

        // The exchange is the only other event that can change server truth,
        // so force a reconciliation either way.
        if !user_id.trim().is_empty() {
            if let Err(err) = self.reconciler.refresh(user_id).await {
                warn!(error = %err, "post-exchange reconciliation failed, cache preserved");
            }
        }

        Ok(outcome)
    }

    /// Consume a completion flag the moment it is seen on the connections
    /// view, so it is visible exactly once. Also rearms the guard: the code
    /// has left the URL.
    fn surface_completion(&self, url: &UrlState) -> CallbackOutcome {
        self.guard.reset();
        if url.route() != CONNECTIONS_ROUTE {
            return CallbackOutcome::NoCallback;
        }
        if let Some(reason) = url.get(AUTH_ERROR_PARAM) {
            let message = reason.to_string();
            self.nav.rewrite(url.clone().without_param(AUTH_ERROR_PARAM));
            return CallbackOutcome::Completion { success: false, message };
        }
        if url.has(AUTH_SUCCESS_PARAM) {
            self.nav.rewrite(url.clone().without_param(AUTH_SUCCESS_PARAM));
            return CallbackOutcome::Completion {
                success: true,
                message: "Account connected".to_string(),
            };
        }
        CallbackOutcome::NoCallback
    }
}
