//! Logging initialization and helpers

use crosspost_domain::CrosspostError;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set and defaults to `info`
/// otherwise. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Convert a `CrosspostError` into a stable label suitable for logging.
#[inline]
#[must_use]
pub fn error_label(error: &CrosspostError) -> &'static str {
    match error {
        CrosspostError::UnknownProvider(_) => "unknown_provider",
        CrosspostError::AuthorizationInitiation(_) => "authorization_initiation",
        CrosspostError::ProviderDeclined(_) => "provider_declined",
        CrosspostError::Exchange(_) => "exchange",
        CrosspostError::Reconciliation(_) => "reconciliation",
        CrosspostError::Disconnect(_) => "disconnect",
        CrosspostError::Config(_) => "config",
        CrosspostError::Network(_) => "network",
        CrosspostError::Auth(_) => "auth",
        CrosspostError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(error_label(&CrosspostError::Exchange("x".to_string())), "exchange");
        assert_eq!(error_label(&CrosspostError::Auth("x".to_string())), "auth");
    }
}
