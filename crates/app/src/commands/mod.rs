//! Serializable commands exposed to the embedding shell.

pub mod connections;

pub use connections::{
    handle_oauth_callback, list_connections, refresh_connections, toggle_connection,
    ConnectionCard, Notice, NoticeLevel, ToggleResponse,
};
