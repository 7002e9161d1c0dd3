//! Shared test doubles for the connection lifecycle unit tests.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use crosspost_domain::{CrosspostError, PlatformStatusRow, Provider, Result, UrlState};
use parking_lot::Mutex;

use super::ports::{ConnectionsApi, Navigator};

/// Scriptable [`ConnectionsApi`] double that records traffic.
#[derive(Default)]
pub(crate) struct MockApi {
    authorize_link: Mutex<Option<String>>,
    authorize_error: Mutex<Option<CrosspostError>>,
    authorize_calls: AtomicUsize,
    exchange_error: Mutex<Option<CrosspostError>>,
    exchange_calls: AtomicUsize,
    exchange_delay_ms: AtomicU64,
    status_rows: Mutex<Vec<PlatformStatusRow>>,
    status_error: Mutex<Option<CrosspostError>>,
    disconnect_error: Mutex<Option<CrosspostError>>,
    disconnect_delay_ms: AtomicU64,
    disconnect_calls: Mutex<Vec<i64>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_authorize_link(&self, link: &str) {
        *self.authorize_link.lock() = Some(link.to_string());
    }

    pub(crate) fn fail_authorize(&self, err: CrosspostError) {
        *self.authorize_error.lock() = Some(err);
    }

    pub(crate) fn authorize_calls(&self) -> usize {
        self.authorize_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_exchange(&self, err: CrosspostError) {
        *self.exchange_error.lock() = Some(err);
    }

    pub(crate) fn set_exchange_delay_ms(&self, ms: u64) {
        self.exchange_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub(crate) fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_status_rows(&self, rows: Vec<PlatformStatusRow>) {
        *self.status_rows.lock() = rows;
        *self.status_error.lock() = None;
    }

    pub(crate) fn fail_status(&self, err: CrosspostError) {
        *self.status_error.lock() = Some(err);
    }

    pub(crate) fn fail_disconnect(&self, err: CrosspostError) {
        *self.disconnect_error.lock() = Some(err);
    }

    pub(crate) fn set_disconnect_delay_ms(&self, ms: u64) {
        self.disconnect_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub(crate) fn disconnect_calls(&self) -> Vec<i64> {
        self.disconnect_calls.lock().clone()
    }
}

#[async_trait]
impl ConnectionsApi for MockApi {
    async fn authorize_link(&self, _provider: Provider) -> Result<Option<String>> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.authorize_error.lock().clone() {
            return Err(err);
        }
        Ok(self.authorize_link.lock().clone())
    }

    async fn exchange_code(&self, _provider: Provider, _code: &str, _user_id: &str) -> Result<()> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.exchange_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        match self.exchange_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn platform_status(&self, _user_id: &str) -> Result<Vec<PlatformStatusRow>> {
        if let Some(err) = self.status_error.lock().clone() {
            return Err(err);
        }
        Ok(self.status_rows.lock().clone())
    }

    async fn disconnect(&self, connection_id: i64) -> Result<()> {
        let delay = self.disconnect_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        self.disconnect_calls.lock().push(connection_id);
        match self.disconnect_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// In-memory [`Navigator`] double.
///
/// `frozen` simulates a shell whose URL update has not landed yet: rewrites
/// and route changes are swallowed while the recorded state stays stale.
pub(crate) struct TestNavigator {
    state: Mutex<UrlState>,
    frozen: AtomicBool,
    redirects: Mutex<Vec<String>>,
}

impl TestNavigator {
    pub(crate) fn at(route: &str) -> Self {
        Self::with_state(UrlState::new(route))
    }

    pub(crate) fn parse(route: &str, query: &str) -> Self {
        Self::with_state(UrlState::parse(route, query))
    }

    fn with_state(state: UrlState) -> Self {
        Self {
            state: Mutex::new(state),
            frozen: AtomicBool::new(false),
            redirects: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_frozen(&self, frozen: bool) {
        self.frozen.store(frozen, Ordering::SeqCst);
    }

    pub(crate) fn replace(&self, state: UrlState) {
        *self.state.lock() = state;
    }

    pub(crate) fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }
}

impl Navigator for TestNavigator {
    fn current(&self) -> UrlState {
        self.state.lock().clone()
    }

    fn rewrite(&self, state: UrlState) {
        if self.frozen.load(Ordering::SeqCst) {
            return;
        }
        *self.state.lock() = state;
    }

    fn goto(&self, route: &str) {
        if self.frozen.load(Ordering::SeqCst) {
            return;
        }
        let mut state = self.state.lock();
        *state = state.clone().with_route(route);
    }

    fn redirect(&self, url: &str) -> Result<()> {
        self.redirects.lock().push(url.to_string());
        Ok(())
    }
}
