//! chatdock-engine: Headless core of the chatdock chat widget
//!
//! This crate provides everything below the presentation layer:
//! - Message model and backend wire types
//! - HTTP client for the chat backend
//! - Conversation store (optimistic send, history load, clear)
//! - Widget configuration
//! - Transcript export

pub mod client;
pub mod config;
pub mod export;
pub mod message;
pub mod store;

// Re-export commonly used types
pub use client::{ChatClient, ClientError};
pub use config::{ConfigError, WidgetConfig, WidgetText, GUEST_USER_ID};
pub use export::{export_transcript, render_transcript, ExportError};
pub use message::{translate_history, HistoryEntry, Message, Role};
pub use store::{Conversation, ConversationStore};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
