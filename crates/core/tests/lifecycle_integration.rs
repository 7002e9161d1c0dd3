//! End-to-end exercises of the connection lifecycle against an in-memory
//! backend: connect intent, provider redirect, callback processing, status
//! reconciliation, and disconnect.

mod support;

use std::sync::Arc;

use crosspost_core::{
    AuthorizationInitiator, CallbackOutcome, CallbackProcessor, ConnectionToggle, ConnectionsApi,
    Navigator, ProviderRegistry, StatusReconciler, ToggleOutcome,
};
use crosspost_domain::constants::{AUTH_SUCCESS_PARAM, CODE_PARAM};
use crosspost_domain::{Provider, ProvidersConfig, UrlState};
use support::{FakeBackend, ShellNavigator};

const USER: &str = "1";

struct Harness {
    backend: Arc<FakeBackend>,
    nav: Arc<ShellNavigator>,
    processor: CallbackProcessor,
    toggle: ConnectionToggle,
    reconciler: Arc<StatusReconciler>,
}

fn harness(backend: FakeBackend) -> Harness {
    let backend = Arc::new(backend);
    let nav = ShellNavigator::at("/connections");
    let registry = Arc::new(ProviderRegistry::from_config(&ProvidersConfig::default()));
    let api: Arc<dyn ConnectionsApi> = Arc::clone(&backend) as Arc<dyn ConnectionsApi>;
    let nav_port: Arc<dyn Navigator> = Arc::clone(&nav) as Arc<dyn Navigator>;
    let reconciler = Arc::new(StatusReconciler::new(Arc::clone(&api)));
    let initiator = Arc::new(AuthorizationInitiator::new(
        Arc::clone(&registry),
        Arc::clone(&api),
        Arc::clone(&nav_port),
    ));
    let processor = CallbackProcessor::new(
        Arc::clone(&registry),
        Arc::clone(&api),
        Arc::clone(&nav_port),
        Arc::clone(&reconciler),
    );
    let toggle = ConnectionToggle::new(api, initiator, Arc::clone(&reconciler));
    Harness { backend, nav, processor, toggle, reconciler }
}

#[tokio::test]
async fn full_connect_and_disconnect_journey() {
    let h = harness(FakeBackend::with_link("https://reddit.example/authorize?state=x"));

    // Nothing connected at mount.
    let mapping = h.reconciler.refresh(USER).await.expect("initial refresh");
    assert!(mapping.is_empty());

    // Connect intent: toggle hands off to the provider consent page.
    let outcome = h.toggle.toggle(Provider::Reddit, USER).await.expect("toggle connect");
    assert_eq!(outcome, ToggleOutcome::RedirectingToProvider { provider: Provider::Reddit });
    assert_eq!(
        *h.nav.redirects.lock(),
        vec!["https://reddit.example/authorize?state=x".to_string()]
    );

    // Provider sends the user back with a single-use code.
    h.nav.arrive(UrlState::parse("/connections/reddit", "code=abc123"));
    let outcome = h.processor.process(USER).await.expect("callback pass");
    assert_eq!(outcome, CallbackOutcome::Exchanged { provider: Provider::Reddit });

    // URL rewritten, routed to the connections view, status reconciled.
    let url = h.nav.current();
    assert_eq!(url.route(), "/connections");
    assert!(!url.has(CODE_PARAM));
    assert_eq!(url.get(AUTH_SUCCESS_PARAM), Some("true"));
    assert!(h.reconciler.is_connected(Provider::Reddit));

    // The success flag surfaces exactly once.
    let completion = h.processor.process(USER).await.expect("completion pass");
    assert!(matches!(completion, CallbackOutcome::Completion { success: true, .. }));
    assert!(h.nav.current().query_is_empty());
    assert_eq!(
        h.processor.process(USER).await.expect("idle pass"),
        CallbackOutcome::NoCallback
    );

    // Disconnect destroys the server row and the cached entry.
    let outcome = h.toggle.toggle(Provider::Reddit, USER).await.expect("toggle disconnect");
    assert_eq!(outcome, ToggleOutcome::Disconnected { provider: Provider::Reddit });
    assert!(h.backend.active_rows().is_empty());
    assert!(!h.reconciler.is_connected(Provider::Reddit));
}

#[tokio::test]
async fn declined_consent_never_reaches_the_backend() {
    let h = harness(FakeBackend::new());

    h.nav.arrive(UrlState::parse("/connections/linkedin", "error=access_denied"));
    let outcome = h.processor.process(USER).await.expect("callback pass");

    assert_eq!(
        outcome,
        CallbackOutcome::ProviderDeclined {
            provider: Provider::Linkedin,
            reason: "access_denied".to_string(),
        }
    );
    assert!(h.backend.exchange_calls.lock().is_empty());
    assert_eq!(h.nav.current().get("auth_error"), Some("access_denied"));
}

#[tokio::test]
async fn rejected_exchange_surfaces_an_error_and_stays_disconnected() {
    let backend = FakeBackend::new();
    *backend.exchange_rejection.lock() =
        Some(crosspost_domain::CrosspostError::Network("500 from exchange".to_string()));
    let h = harness(backend);

    h.nav.arrive(UrlState::parse("/connections/mastodon", "code=xyz"));
    let outcome = h.processor.process(USER).await.expect("callback pass");

    assert!(matches!(outcome, CallbackOutcome::ExchangeFailed { .. }));
    assert!(!h.reconciler.is_connected(Provider::Mastodon));

    // Terminal for that code: the retry budget for a single-use code is one.
    assert_eq!(h.backend.exchange_calls.lock().len(), 1);
    let second = h.processor.process(USER).await.expect("second pass");
    assert!(matches!(second, CallbackOutcome::Completion { success: false, .. }));
    assert_eq!(h.backend.exchange_calls.lock().len(), 1);
}
