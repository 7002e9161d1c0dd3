//! Connections backend client
//!
//! HTTP adapter for the backend that owns provider secrets and performs the
//! actual token exchanges. One request per call: nothing here retries, since
//! authorization codes are single-use and repeated mutations risk duplicate
//! server-side effects.

pub mod auth;
pub mod client;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::HttpConnectionsApi;
