//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Client routes
pub const DASHBOARD_ROUTE: &str = "/";
pub const CONNECTIONS_ROUTE: &str = "/connections";

// Query parameters on the inbound provider redirect
pub const CODE_PARAM: &str = "code";
pub const ERROR_PARAM: &str = "error";

// Query parameters written after callback processing
pub const AUTH_SUCCESS_PARAM: &str = "auth_success";
pub const AUTH_ERROR_PARAM: &str = "auth_error";

// Transient notice auto-dismiss delay
pub const NOTICE_DISMISS_MS: u64 = 3000;

// Backend defaults (development backend)
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
