//! Status reconciler
//!
//! Fetches the authoritative connection list for the current user and keeps a
//! read-through cache keyed by provider. The cache is only ever replaced by a
//! successful fetch (or optimistically narrowed by the toggle); a failed
//! fetch never empties previously cached state.

use std::collections::HashMap;
use std::sync::Arc;

use crosspost_domain::{Connection, CrosspostError, Provider, Result};
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::ports::ConnectionsApi;

/// Reconciles locally cached connection state with server-recorded truth.
pub struct StatusReconciler {
    api: Arc<dyn ConnectionsApi>,
    cache: RwLock<HashMap<Provider, Connection>>,
}

impl StatusReconciler {
    #[must_use]
    pub fn new(api: Arc<dyn ConnectionsApi>) -> Self {
        Self { api, cache: RwLock::new(HashMap::new()) }
    }

    /// Refresh the cached mapping from the backend.
    ///
    /// Only rows with `status == true` become cached connections; the backend
    /// guarantees at most one active connection per (user, provider), so a
    /// duplicate row is logged and dropped. Rows for platforms this build
    /// does not support are skipped.
    ///
    /// # Errors
    /// Returns [`CrosspostError::Reconciliation`] when the fetch fails or the
    /// response is not a well-formed list. The previously cached mapping is
    /// left untouched in that case.
    pub async fn refresh(&self, user_id: &str) -> Result<HashMap<Provider, Connection>> {
        if user_id.trim().is_empty() {
            return Err(CrosspostError::Reconciliation("user id required".to_string()));
        }

        let rows = self.api.platform_status(user_id).await.map_err(|err| match err {
            err @ CrosspostError::Reconciliation(_) => err,
            other => CrosspostError::Reconciliation(other.to_string()),
        })?;

        let mut mapping: HashMap<Provider, Connection> = HashMap::new();
        for row in rows {
            if !row.status {
                continue;
            }
            let Ok(provider) = row.platform.parse::<Provider>() else {
                warn!(platform = %row.platform, "ignoring status row for unsupported platform");
                continue;
            };
            if mapping.contains_key(&provider) {
                warn!(provider = %provider, "duplicate active connection row, keeping the first");
                continue;
            }
            mapping.insert(provider, Connection::active(row.id, provider, user_id));
        }

        debug!(active = mapping.len(), "connection status reconciled");
        *self.cache.write() = mapping.clone();
        Ok(mapping)
    }

    /// Copy of the cached mapping.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<Provider, Connection> {
        self.cache.read().clone()
    }

    /// Cached connection for one provider, if active.
    #[must_use]
    pub fn connection(&self, provider: Provider) -> Option<Connection> {
        self.cache.read().get(&provider).cloned()
    }

    /// Whether the cache currently shows `provider` as connected.
    #[must_use]
    pub fn is_connected(&self, provider: Provider) -> bool {
        self.cache.read().contains_key(&provider)
    }

    /// Optimistically drop a provider from the cached mapping after a
    /// successful disconnect. The next refresh re-establishes server truth.
    pub(crate) fn deactivate(&self, provider: Provider) -> Option<Connection> {
        self.cache.write().remove(&provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::test_support::MockApi;
    use crosspost_domain::PlatformStatusRow;

    fn row(id: i64, platform: &str, status: bool) -> PlatformStatusRow {
        PlatformStatusRow { id: Some(id), platform: platform.to_string(), status, user_id: Some(1) }
    }

    #[tokio::test]
    async fn refresh_maps_active_rows_by_provider() {
        let api = Arc::new(MockApi::new());
        api.set_status_rows(vec![row(4, "linkedin", true), row(9, "reddit", false)]);
        let reconciler = StatusReconciler::new(api);

        let mapping = reconciler.refresh("1").await.expect("refresh should succeed");

        assert_eq!(mapping.len(), 1);
        let connection = &mapping[&Provider::Linkedin];
        assert_eq!(connection.id, Some(4));
        assert!(connection.active);
        assert!(reconciler.is_connected(Provider::Linkedin));
        assert!(!reconciler.is_connected(Provider::Reddit));
    }

    #[tokio::test]
    async fn failed_refresh_preserves_cached_mapping() {
        let api = Arc::new(MockApi::new());
        api.set_status_rows(vec![row(4, "mastodon", true)]);
        let reconciler = StatusReconciler::new(Arc::clone(&api) as Arc<dyn ConnectionsApi>);
        reconciler.refresh("1").await.expect("first refresh should succeed");

        api.fail_status(CrosspostError::Network("connection refused".to_string()));
        let err = reconciler.refresh("1").await.unwrap_err();

        assert!(matches!(err, CrosspostError::Reconciliation(_)));
        assert!(reconciler.is_connected(Provider::Mastodon), "cache must survive a failed fetch");
    }

    #[tokio::test]
    async fn duplicate_rows_keep_the_first_connection() {
        let api = Arc::new(MockApi::new());
        api.set_status_rows(vec![row(1, "reddit", true), row(2, "reddit", true)]);
        let reconciler = StatusReconciler::new(api);

        let mapping = reconciler.refresh("1").await.expect("refresh should succeed");
        assert_eq!(mapping[&Provider::Reddit].id, Some(1));
    }

    #[tokio::test]
    async fn unsupported_platforms_are_skipped() {
        let api = Arc::new(MockApi::new());
        api.set_status_rows(vec![row(1, "friendster", true), row(2, "linkedin", true)]);
        let reconciler = StatusReconciler::new(api);

        let mapping = reconciler.refresh("1").await.expect("refresh should succeed");
        assert_eq!(mapping.len(), 1);
        assert!(mapping.contains_key(&Provider::Linkedin));
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected_without_touching_cache() {
        let api = Arc::new(MockApi::new());
        let reconciler = StatusReconciler::new(api);
        let err = reconciler.refresh("  ").await.unwrap_err();
        assert!(matches!(err, CrosspostError::Reconciliation(_)));
    }
}
