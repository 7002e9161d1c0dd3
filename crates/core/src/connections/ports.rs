//! Port interfaces for the connection lifecycle
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use crosspost_domain::{PlatformStatusRow, Provider, Result, UrlState};

/// Backend operations for managing provider connections.
///
/// Implementations perform a single request per call; nothing in this
/// subsystem retries automatically, because authorization codes are
/// single-use and repeated mutations risk duplicate server-side effects.
#[async_trait]
pub trait ConnectionsApi: Send + Sync {
    /// Request a one-time authorization link for `provider`.
    ///
    /// Returns `None` when the endpoint answered without a usable link.
    async fn authorize_link(&self, provider: Provider) -> Result<Option<String>>;

    /// Post `{code, user_id}` to the provider's exchange endpoint.
    ///
    /// Success is the 200/201 status alone; the body is not interpreted.
    async fn exchange_code(&self, provider: Provider, code: &str, user_id: &str) -> Result<()>;

    /// Fetch the authoritative per-platform status listing for a user.
    async fn platform_status(&self, user_id: &str) -> Result<Vec<PlatformStatusRow>>;

    /// Destroy the connection with the given server id.
    async fn disconnect(&self, connection_id: i64) -> Result<()>;
}

/// Navigation surface of the embedding shell.
///
/// The callback processor is the only caller of [`Navigator::rewrite`];
/// every other component reads the current state at most.
pub trait Navigator: Send + Sync {
    /// Current route and query.
    fn current(&self) -> UrlState;

    /// Replace the navigation state in place, without a reload and without
    /// re-dispatching detection.
    fn rewrite(&self, state: UrlState);

    /// In-app route change. The query string is preserved.
    fn goto(&self, route: &str);

    /// Terminal full navigation out of the app (the provider consent page).
    /// Nothing scheduled after a successful redirect is guaranteed to run.
    fn redirect(&self, url: &str) -> Result<()>;
}
