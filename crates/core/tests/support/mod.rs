//! Test doubles shared by the lifecycle integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use crosspost_core::{ConnectionsApi, Navigator};
use crosspost_domain::{CrosspostError, PlatformStatusRow, Provider, Result, UrlState};
use parking_lot::Mutex;

/// In-memory backend: the server-side truth the client reconciles against.
///
/// An exchanged code creates a connection row; a disconnect removes it.
#[derive(Default)]
pub struct FakeBackend {
    next_id: Mutex<i64>,
    rows: Mutex<Vec<PlatformStatusRow>>,
    pub authorize_link: Mutex<Option<String>>,
    pub exchange_rejection: Mutex<Option<CrosspostError>>,
    pub exchange_calls: Mutex<Vec<(Provider, String)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self { next_id: Mutex::new(1), ..Self::default() }
    }

    pub fn with_link(link: &str) -> Self {
        let backend = Self::new();
        *backend.authorize_link.lock() = Some(link.to_string());
        backend
    }

    pub fn active_rows(&self) -> Vec<PlatformStatusRow> {
        self.rows.lock().clone()
    }
}

#[async_trait]
impl ConnectionsApi for FakeBackend {
    async fn authorize_link(&self, _provider: Provider) -> Result<Option<String>> {
        Ok(self.authorize_link.lock().clone())
    }

    async fn exchange_code(&self, provider: Provider, code: &str, user_id: &str) -> Result<()> {
        self.exchange_calls.lock().push((provider, code.to_string()));
        if let Some(err) = self.exchange_rejection.lock().clone() {
            return Err(err);
        }
        let mut next_id = self.next_id.lock();
        let id = *next_id;
        *next_id += 1;
        self.rows.lock().push(PlatformStatusRow {
            id: Some(id),
            platform: provider.to_string(),
            status: true,
            user_id: user_id.parse().ok(),
        });
        Ok(())
    }

    async fn platform_status(&self, _user_id: &str) -> Result<Vec<PlatformStatusRow>> {
        Ok(self.rows.lock().clone())
    }

    async fn disconnect(&self, connection_id: i64) -> Result<()> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|row| row.id != Some(connection_id));
        if rows.len() == before {
            return Err(CrosspostError::Disconnect(format!(
                "connection {connection_id} not found"
            )));
        }
        Ok(())
    }
}

/// Address-bar stand-in for the embedding shell.
pub struct ShellNavigator {
    state: Mutex<UrlState>,
    pub redirects: Mutex<Vec<String>>,
}

impl ShellNavigator {
    pub fn at(route: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(UrlState::new(route)),
            redirects: Mutex::new(Vec::new()),
        })
    }

    /// Simulate the provider redirecting back into the app.
    pub fn arrive(&self, state: UrlState) {
        *self.state.lock() = state;
    }
}

impl Navigator for ShellNavigator {
    fn current(&self) -> UrlState {
        self.state.lock().clone()
    }

    fn rewrite(&self, state: UrlState) {
        *self.state.lock() = state;
    }

    fn goto(&self, route: &str) {
        let mut state = self.state.lock();
        *state = state.clone().with_route(route);
    }

    fn redirect(&self, url: &str) -> Result<()> {
        self.redirects.lock().push(url.to_string());
        Ok(())
    }
}
