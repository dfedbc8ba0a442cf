//! Configuration types for the chatdock widget.
//!
//! The hosting application supplies the backend base URL and, optionally, the
//! user identifier. Everything else has a default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Identity used when the host does not supply a user id.
pub const GUEST_USER_ID: &str = "guest";

/// Main configuration for the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Backend base URL every endpoint path is resolved against.
    #[serde(default)]
    pub api_base_url: String,

    /// User identifier. `None` means anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Path prefix in front of `/chat`, `/history` and `/reset`.
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    /// User-facing strings.
    #[serde(default)]
    pub text: WidgetText,
}

fn default_path_prefix() -> String {
    "/ai".into()
}

/// Strings rendered by the widget and written into the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetText {
    /// Panel header title.
    pub title: String,
    /// Status line under the title.
    pub status: String,
    /// Shown when the conversation is empty.
    pub greeting: String,
    /// Input placeholder.
    pub placeholder: String,
    /// Bot-role entry appended when a send fails.
    pub connection_lost: String,
}

impl Default for WidgetText {
    fn default() -> Self {
        Self {
            title: "Travel assistant".into(),
            status: "Online".into(),
            greeting: "👋 Hi! How can I help with your next trip?".into(),
            placeholder: "Type a message...".into(),
            connection_lost: "⚠️ Lost connection to the server!".into(),
        }
    }
}

impl WidgetConfig {
    /// Create a configuration for the given backend with defaults elsewhere.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Check that the base URL is present and parseable.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        Url::parse(self.api_base_url.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            source,
        })
    }

    /// The configured user id, if present and non-blank.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// The user id to send with messages, falling back to the guest identity.
    pub fn resolved_user_id(&self) -> &str {
        self.user_id().unwrap_or(GUEST_USER_ID)
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            user_id: None,
            path_prefix: default_path_prefix(),
            text: WidgetText::default(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// No backend base URL was configured.
    #[error("api_base_url is required")]
    MissingBaseUrl,

    /// The backend base URL cannot have endpoint paths appended.
    #[error("unsupported api_base_url {0:?}")]
    UnsupportedBaseUrl(String),

    /// The backend base URL does not parse.
    #[error("invalid api_base_url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
