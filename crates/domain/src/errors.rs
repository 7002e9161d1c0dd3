//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Crosspost
///
/// The connection-lifecycle variants (`UnknownProvider` through `Disconnect`)
/// map one-to-one onto the failure modes of the connection subsystem; the
/// remaining variants cover transport, configuration, and session concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CrosspostError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Could not start authorization: {0}")]
    AuthorizationInitiation(String),

    #[error("Provider declined authorization: {0}")]
    ProviderDeclined(String),

    #[error("Code exchange failed: {0}")]
    Exchange(String),

    #[error("Status reconciliation failed: {0}")]
    Reconciliation(String),

    #[error("Disconnect failed: {0}")]
    Disconnect(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Crosspost operations
pub type Result<T> = std::result::Result<T, CrosspostError>;
