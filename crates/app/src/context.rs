//! Application context - dependency injection container

use std::sync::Arc;

use crosspost_core::{
    AuthorizationInitiator, CallbackProcessor, ConnectionToggle, ConnectionsApi, Navigator,
    ProviderRegistry, StatusReconciler,
};
use crosspost_domain::constants::DASHBOARD_ROUTE;
use crosspost_domain::{AppConfig, CrosspostError, Result};
use crosspost_infra::{HttpConnectionsApi, StaticTokenProvider};
use parking_lot::RwLock;
use tracing::info;

use crate::navigator::ShellNavigator;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    pub navigator: Arc<ShellNavigator>,
    pub reconciler: Arc<StatusReconciler>,
    pub processor: CallbackProcessor,
    pub toggle: ConnectionToggle,
    tokens: Arc<StaticTokenProvider>,
    session_user: RwLock<Option<String>>,
}

impl AppContext {
    /// Load configuration from the environment (including a `.env` file if
    /// present) and wire up the context.
    ///
    /// # Errors
    /// Returns an error when configuration is malformed or the HTTP client
    /// cannot be constructed.
    pub fn load() -> Result<Arc<Self>> {
        dotenvy::dotenv().ok();
        let config = crosspost_infra::config::load()?;
        Self::initialize(config)
    }

    /// Wire services from an explicit configuration.
    ///
    /// # Errors
    /// Returns [`CrosspostError::Config`] when the HTTP client cannot be
    /// constructed.
    pub fn initialize(config: AppConfig) -> Result<Arc<Self>> {
        let registry = Arc::new(ProviderRegistry::from_config(&config.providers));
        let tokens = Arc::new(StaticTokenProvider::anonymous());
        let navigator = Arc::new(ShellNavigator::new(DASHBOARD_ROUTE));
        let nav_port: Arc<dyn Navigator> = Arc::clone(&navigator) as Arc<dyn Navigator>;

        let api: Arc<dyn ConnectionsApi> = Arc::new(HttpConnectionsApi::new(
            &config,
            Arc::clone(&registry),
            Arc::clone(&tokens) as Arc<dyn crosspost_infra::AccessTokenProvider>,
        )?);

        let reconciler = Arc::new(StatusReconciler::new(Arc::clone(&api)));
        let initiator = Arc::new(AuthorizationInitiator::new(
            Arc::clone(&registry),
            Arc::clone(&api),
            Arc::clone(&nav_port),
        ));
        let processor = CallbackProcessor::new(
            Arc::clone(&registry),
            Arc::clone(&api),
            Arc::clone(&nav_port),
            Arc::clone(&reconciler),
        );
        let toggle = ConnectionToggle::new(api, initiator, Arc::clone(&reconciler));

        info!(api_url = %config.api_url, "application context initialized");

        Ok(Arc::new(Self {
            config,
            navigator,
            reconciler,
            processor,
            toggle,
            tokens,
            session_user: RwLock::new(None),
        }))
    }

    /// Record the signed-in user and session token handed over by the shell.
    ///
    /// Session and credential storage stay with the shell; this context only
    /// keeps what backend calls need.
    pub fn sign_in(&self, user_id: impl Into<String>, token: Option<String>) {
        *self.session_user.write() = Some(user_id.into());
        self.tokens.set_token(token);
    }

    /// Drop the session.
    pub fn sign_out(&self) {
        *self.session_user.write() = None;
        self.tokens.set_token(None);
    }

    /// Identifier of the signed-in user.
    ///
    /// # Errors
    /// Returns [`CrosspostError::Auth`] when nobody is signed in.
    pub fn user_id(&self) -> Result<String> {
        self.session_user
            .read()
            .clone()
            .ok_or_else(|| CrosspostError::Auth("no signed-in user".to_string()))
    }
}
