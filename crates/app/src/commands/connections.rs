//! Connection commands for the connections view

use crosspost_core::{CallbackOutcome, ToggleOutcome};
use crosspost_domain::constants::NOTICE_DISMISS_MS;
use crosspost_domain::{Provider, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::utils::logging::error_label;
use crate::AppContext;

/// One card on the connections view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCard {
    pub provider: Provider,
    pub name: String,
    pub description: String,
    pub connected: bool,
    pub connecting: bool,
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient, dismissable notice for the shell to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub dismiss_after_ms: u64,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into(), dismiss_after_ms: NOTICE_DISMISS_MS }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into(), dismiss_after_ms: NOTICE_DISMISS_MS }
    }
}

/// Result of a toggle command: the current cards plus an optional notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub cards: Vec<ConnectionCard>,
    pub notice: Option<Notice>,
}

fn cards(ctx: &AppContext) -> Vec<ConnectionCard> {
    Provider::ALL
        .into_iter()
        .map(|provider| ConnectionCard {
            provider,
            name: provider.display_name().to_string(),
            description: provider.description().to_string(),
            connected: ctx.reconciler.is_connected(provider),
            connecting: ctx.toggle.is_busy(provider),
        })
        .collect()
}

/// Cards from the cached mapping, without touching the network.
#[must_use]
pub fn list_connections(ctx: &AppContext) -> Vec<ConnectionCard> {
    cards(ctx)
}

/// Force a reconciliation against server truth and return the cards.
///
/// # Errors
/// Reconciliation failures pass through; the cached mapping (and therefore
/// the previous cards) stays intact, so the shell may keep rendering it.
pub async fn refresh_connections(ctx: &AppContext) -> Result<Vec<ConnectionCard>> {
    let user_id = ctx.user_id()?;
    ctx.reconciler.refresh(&user_id).await?;
    Ok(cards(ctx))
}

/// Flip the connection for `provider`.
///
/// Lifecycle failures (initiation, disconnect) come back as error notices
/// rather than errors: the view renders them as dismissable alerts and the
/// control returns to its resting state.
///
/// # Errors
/// Only for shell-level mistakes: an unknown provider string, or no
/// signed-in user.
pub async fn toggle_connection(ctx: &AppContext, provider: &str) -> Result<ToggleResponse> {
    let provider: Provider = provider.parse()?;
    let user_id = ctx.user_id()?;

    let notice = match ctx.toggle.toggle(provider, &user_id).await {
        Ok(ToggleOutcome::Disconnected { provider }) => {
            Some(Notice::success(format!("{} disconnected", provider.display_name())))
        }
        Ok(ToggleOutcome::RedirectingToProvider { .. })
        | Ok(ToggleOutcome::AlreadyPending { .. }) => None,
        Err(err) => {
            warn!(provider = %provider, error = %err, kind = error_label(&err), "toggle failed");
            Some(Notice::error(err.to_string()))
        }
    };

    Ok(ToggleResponse { cards: cards(ctx), notice })
}

/// Run one callback-detection pass against the current navigation state.
///
/// Call on every inbound navigation. Exchange outcomes are encoded into the
/// URL and surface as a notice on the pass that lands on the connections
/// view, so they are shown exactly once even across a reload.
///
/// # Errors
/// Detection errors only (a callback naming an unknown provider).
pub async fn handle_oauth_callback(ctx: &AppContext) -> Result<Option<Notice>> {
    let user_id = ctx.user_id().unwrap_or_default();
    let outcome = ctx.processor.process(&user_id).await?;

    if let Some(err) = outcome.error() {
        warn!(kind = error_label(&err), error = %err, "callback ended in failure");
    }

    Ok(match outcome {
        CallbackOutcome::Completion { success: true, message } => {
            info!("connection completed");
            Some(Notice::success(message))
        }
        CallbackOutcome::Completion { success: false, message } => {
            Some(Notice::error(format!("Connection failed: {message}")))
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosspost_domain::{AppConfig, UrlState};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn signed_in_context(server: &MockServer) -> Arc<AppContext> {
        let ctx = AppContext::initialize(AppConfig::for_api_url(server.uri()))
            .expect("context should build");
        ctx.sign_in("1", Some("session-token".to_string()));
        ctx
    }

    async fn mount_status(server: &MockServer, rows: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/connections/user/1/platform-status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": rows })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn list_shows_all_providers_disconnected_before_refresh() {
        let server = MockServer::start().await;
        let ctx = signed_in_context(&server).await;

        let cards = list_connections(&ctx);
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|card| !card.connected && !card.connecting));
        assert_eq!(cards[0].name, "LinkedIn");
    }

    #[tokio::test]
    async fn refresh_marks_active_providers_connected() {
        let server = MockServer::start().await;
        mount_status(&server, json!([{ "id": 4, "platform": "reddit", "status": true, "user_id": 1 }]))
            .await;
        let ctx = signed_in_context(&server).await;

        let cards = refresh_connections(&ctx).await.expect("refresh should succeed");
        let reddit = cards.iter().find(|card| card.provider == Provider::Reddit);
        assert!(reddit.is_some_and(|card| card.connected));
    }

    #[tokio::test]
    async fn connect_records_a_pending_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/connections/linkedin/authorize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "link": "https://provider.example/consent"
            })))
            .mount(&server)
            .await;
        let ctx = signed_in_context(&server).await;

        let response = toggle_connection(&ctx, "linkedin").await.expect("toggle should succeed");

        assert!(response.notice.is_none());
        assert_eq!(
            ctx.navigator.take_redirect().as_deref(),
            Some("https://provider.example/consent")
        );
    }

    #[tokio::test]
    async fn failed_initiation_becomes_an_error_notice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/connections/mastodon/authorize"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let ctx = signed_in_context(&server).await;

        let response = toggle_connection(&ctx, "mastodon").await.expect("command should succeed");

        let notice = response.notice.expect("an error notice is expected");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(ctx.navigator.take_redirect().is_none());
    }

    #[tokio::test]
    async fn callback_notice_surfaces_on_the_connections_view_pass() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connections/reddit/access-token"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        mount_status(&server, json!([{ "id": 9, "platform": "reddit", "status": true, "user_id": 1 }]))
            .await;
        let ctx = signed_in_context(&server).await;

        // Provider redirect arrives; the processing pass itself stays quiet.
        ctx.navigator.arrive(UrlState::parse("/connections/reddit", "code=abc123"));
        let first = handle_oauth_callback(&ctx).await.expect("processing pass");
        assert!(first.is_none());

        // The connections view pass consumes the flag exactly once.
        let second = handle_oauth_callback(&ctx).await.expect("completion pass");
        let notice = second.expect("a success notice is expected");
        assert_eq!(notice.level, NoticeLevel::Success);
        let third = handle_oauth_callback(&ctx).await.expect("idle pass");
        assert!(third.is_none());

        assert!(list_connections(&ctx)
            .iter()
            .any(|card| card.provider == Provider::Reddit && card.connected));
    }

    #[tokio::test]
    async fn unknown_provider_string_is_a_command_error() {
        let server = MockServer::start().await;
        let ctx = signed_in_context(&server).await;

        let err = toggle_connection(&ctx, "myspace").await.unwrap_err();
        assert!(matches!(err, crosspost_domain::CrosspostError::UnknownProvider(_)));
    }
}
