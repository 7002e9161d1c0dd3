//! # Crosspost App
//!
//! Embedder-facing facade of the Crosspost client.
//!
//! This crate contains:
//! - [`AppContext`]: dependency wiring from configuration to services
//! - Serializable commands for the shell's connections view
//! - The in-memory navigator the shell mirrors its address bar into
//! - Logging initialization
//!
//! The visual shell (webview, desktop chrome) lives outside this workspace;
//! it embeds this crate and renders whatever the commands return.

pub mod commands;
pub mod context;
pub mod navigator;
pub mod utils;

pub use context::AppContext;
pub use navigator::ShellNavigator;
