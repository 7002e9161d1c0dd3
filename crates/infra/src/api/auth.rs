//! Backend API authentication
//!
//! Bearer-token plumbing for backend calls. Session and credential storage
//! are owned by the embedding shell; this crate only attaches whatever token
//! the shell hands over. A missing token simply means the request goes out
//! unauthenticated and the backend answers 401.

use async_trait::async_trait;
use crosspost_domain::Result;
use parking_lot::RwLock;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Current bearer token, if a session exists.
    async fn access_token(&self) -> Result<Option<String>>;
}

/// Token provider backed by a value the shell sets at login and clears at
/// logout.
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    /// Provider holding the given token.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self { token: RwLock::new(token) }
    }

    /// Provider with no session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Replace the stored token (login, logout, rotation).
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.token.read().clone())
    }
}
