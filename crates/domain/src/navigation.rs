//! In-app navigation state.
//!
//! [`UrlState`] is the client's view of the navigable URL: a route plus its
//! query parameters. The callback processor is the only component that
//! rewrites it; everything else reads. Before a callback is processed the
//! query carries at most one of `code`/`error`; after processing it carries
//! at most one of `auth_success`/`auth_error`, and never a pending code
//! together with a completion flag.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Route plus query parameters, order-preserving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlState {
    route: String,
    query: Vec<(String, String)>,
}

impl UrlState {
    /// A state pointing at `route` with an empty query.
    #[must_use]
    pub fn new(route: impl Into<String>) -> Self {
        Self { route: route.into(), query: Vec::new() }
    }

    /// Parse a state from a route and a raw query string.
    ///
    /// A leading `?` is accepted and ignored; percent-encoding is decoded.
    #[must_use]
    pub fn parse(route: impl Into<String>, query_string: &str) -> Self {
        let raw = query_string.strip_prefix('?').unwrap_or(query_string);
        let query = form_urlencoded::parse(raw.as_bytes()).into_owned().collect();
        Self { route: route.into(), query }
    }

    /// Current route.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Same query, different route.
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    /// First value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Whether `key` appears in the query.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replace (or append) `key` with a single value.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.query.retain(|(k, _)| k != &key);
        self.query.push((key, value.into()));
        self
    }

    /// Remove every occurrence of `key`.
    #[must_use]
    pub fn without_param(mut self, key: &str) -> Self {
        self.query.retain(|(k, _)| k != key);
        self
    }

    /// Whether the query is empty.
    #[must_use]
    pub fn query_is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Percent-encoded query string, without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.query {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            f.write_str(&self.route)
        } else {
            write!(f, "{}?{}", self.route, self.query_string())
        }
    }
}
