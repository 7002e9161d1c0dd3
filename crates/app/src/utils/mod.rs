//! Shared helpers for the app facade.

pub mod logging;
