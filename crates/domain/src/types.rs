//! Common data types used throughout the application

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::CONNECTIONS_ROUTE;
use crate::errors::CrosspostError;

/// A social platform supported for account linking.
///
/// The set is fixed at build time; anything else fails provider parsing with
/// [`CrosspostError::UnknownProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Linkedin,
    Reddit,
    Mastodon,
}

impl Provider {
    /// All supported providers, in display order.
    pub const ALL: [Self; 3] = [Self::Linkedin, Self::Reddit, Self::Mastodon];

    /// Wire identifier used in routes, query strings, and backend payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linkedin => "linkedin",
            Self::Reddit => "reddit",
            Self::Mastodon => "mastodon",
        }
    }

    /// Human-readable platform name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Linkedin => "LinkedIn",
            Self::Reddit => "Reddit",
            Self::Mastodon => "Mastodon",
        }
    }

    /// Short description shown on the connections view.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Linkedin => "Connect your professional profile",
            Self::Reddit => "Share with communities",
            Self::Mastodon => "Decentralized social network",
        }
    }

    /// In-app route the provider redirects back to after consent.
    #[must_use]
    pub fn callback_route(self) -> String {
        format!("{}/{}", CONNECTIONS_ROUTE, self.as_str())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = CrosspostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Self::Linkedin),
            "reddit" => Ok(Self::Reddit),
            "mastodon" => Ok(Self::Mastodon),
            other => Err(CrosspostError::UnknownProvider(other.to_string())),
        }
    }
}

/// A provider link for one user, as last reported by the backend.
///
/// Owned by the backend; the client only caches what the status reconciler
/// last fetched. The server id is present only while the link is active.
/// At most one active connection exists per (user, provider) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: Option<i64>,
    pub provider: Provider,
    pub active: bool,
    pub user_id: String,
}

impl Connection {
    /// Build an active connection from a backend status row.
    #[must_use]
    pub fn active(id: Option<i64>, provider: Provider, user_id: impl Into<String>) -> Self {
        Self { id, provider, active: true, user_id: user_id.into() }
    }
}

/// One row of the backend platform-status listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformStatusRow {
    pub id: Option<i64>,
    pub platform: String,
    pub status: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Envelope returned by `GET /connections/user/<id>/platform-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformStatusResponse {
    pub data: Vec<PlatformStatusRow>,
}

/// Response of `GET /connections/<provider>/authorize`.
///
/// A missing or empty link means authorization cannot be started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeLinkResponse {
    pub link: Option<String>,
}

/// Body posted to the provider's exchange endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub code: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_wire_name() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>(), Ok(provider));
        }
    }

    #[test]
    fn provider_parse_is_case_insensitive() {
        assert_eq!("LinkedIn".parse::<Provider>(), Ok(Provider::Linkedin));
        assert_eq!("REDDIT".parse::<Provider>(), Ok(Provider::Reddit));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = "facebook".parse::<Provider>().unwrap_err();
        assert_eq!(err, CrosspostError::UnknownProvider("facebook".to_string()));
    }

    #[test]
    fn callback_route_matches_connections_prefix() {
        assert_eq!(Provider::Reddit.callback_route(), "/connections/reddit");
    }

    #[test]
    fn platform_status_row_tolerates_missing_user_id() {
        let row: PlatformStatusRow =
            serde_json::from_str(r#"{"id": 7, "platform": "mastodon", "status": true}"#)
                .expect("row should deserialize");
        assert_eq!(row.id, Some(7));
        assert!(row.status);
        assert!(row.user_id.is_none());
    }
}
