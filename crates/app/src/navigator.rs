//! In-memory navigation state for the embedding shell
//!
//! The shell mirrors its address bar into this navigator: inbound
//! navigations (including provider redirects) are reported through
//! [`ShellNavigator::arrive`], in-place rewrites and route changes are
//! applied here and re-read by the shell, and a full external navigation is
//! handed back through [`ShellNavigator::take_redirect`]. A redirect is a
//! terminal transition; once the shell applies it, this execution context is
//! gone until the provider sends the user back.

use crosspost_core::Navigator;
use crosspost_domain::{Result, UrlState};
use parking_lot::RwLock;

/// Address-bar surrogate owned by the app context.
pub struct ShellNavigator {
    state: RwLock<UrlState>,
    pending_redirect: RwLock<Option<String>>,
}

impl ShellNavigator {
    /// Navigator starting at `route` with an empty query.
    #[must_use]
    pub fn new(route: &str) -> Self {
        Self { state: RwLock::new(UrlState::new(route)), pending_redirect: RwLock::new(None) }
    }

    /// Report an inbound navigation (route change, provider redirect).
    pub fn arrive(&self, state: UrlState) {
        *self.state.write() = state;
    }

    /// Full-navigation target requested by the lifecycle, if any.
    ///
    /// Taking it clears the pending value; the shell applies it exactly once.
    #[must_use]
    pub fn take_redirect(&self) -> Option<String> {
        self.pending_redirect.write().take()
    }
}

impl Navigator for ShellNavigator {
    fn current(&self) -> UrlState {
        self.state.read().clone()
    }

    fn rewrite(&self, state: UrlState) {
        *self.state.write() = state;
    }

    fn goto(&self, route: &str) {
        let mut state = self.state.write();
        *state = state.clone().with_route(route);
    }

    fn redirect(&self, url: &str) -> Result<()> {
        *self.pending_redirect.write() = Some(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goto_preserves_the_query_string() {
        let nav = ShellNavigator::new("/connections/reddit");
        nav.arrive(UrlState::parse("/connections/reddit", "auth_success=true"));
        nav.goto("/connections");
        let url = nav.current();
        assert_eq!(url.route(), "/connections");
        assert_eq!(url.get("auth_success"), Some("true"));
    }

    #[test]
    fn redirect_is_taken_exactly_once() {
        let nav = ShellNavigator::new("/");
        nav.redirect("https://provider.example/consent").expect("redirect should record");
        assert_eq!(nav.take_redirect().as_deref(), Some("https://provider.example/consent"));
        assert!(nav.take_redirect().is_none());
    }
}
