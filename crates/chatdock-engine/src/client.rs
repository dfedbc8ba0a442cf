//! HTTP client for the chat backend.
//!
//! Three endpoints are consumed, all resolved against the configured base URL
//! and path prefix:
//! - `GET  {prefix}/history/{user_id}`
//! - `POST {prefix}/chat`
//! - `DELETE {prefix}/reset/{user_id}`
//!
//! Response bodies are decoded into typed structs; a body that does not match
//! is reported as [`ClientError::Decode`] instead of being trusted.

use crate::config::{ConfigError, WidgetConfig};
use crate::message::{translate_history, ChatReply, ChatRequest, HistoryResponse, Message};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Client for the chat backend.
#[derive(Debug, Clone)]
pub struct ChatClient {
    base: Url,
    prefix: Vec<String>,
    http: reqwest::Client,
}

impl ChatClient {
    /// Build a client from the widget configuration.
    pub fn new(config: &WidgetConfig) -> Result<Self, ConfigError> {
        let base = config.validate()?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedBaseUrl(config.api_base_url.clone()));
        }

        let prefix = config
            .path_prefix
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            base,
            prefix,
            http: reqwest::Client::new(),
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve an endpoint path below the prefix.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(&self.prefix);
            path.extend(segments);
        }
        url
    }

    /// Fetch the stored history for a user.
    pub async fn fetch_history(&self, user_id: &str) -> Result<Vec<Message>, ClientError> {
        let url = self.endpoint(&["history", user_id]);
        debug!(%url, "fetching history");

        let response = self.http.get(url).send().await?;
        let body: HistoryResponse = read_json(response).await?;
        Ok(translate_history(body.history))
    }

    /// Post a message and return the backend's reply text.
    pub async fn send_message(&self, message: &str, user_id: &str) -> Result<String, ClientError> {
        let url = self.endpoint(&["chat"]);
        debug!(%url, chars = message.chars().count(), "sending message");

        let request = ChatRequest {
            message: message.to_string(),
            user_id: Some(user_id.to_string()),
        };
        let response = self.http.post(url).json(&request).send().await?;
        let body: ChatReply = read_json(response).await?;
        Ok(body.reply)
    }

    /// Ask the backend to delete a user's history. The response body is ignored.
    pub async fn reset_history(&self, user_id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["reset", user_id]);
        debug!(%url, "resetting history");

        let response = self.http.delete(url).send().await?;
        check_status(&response)?;
        Ok(())
    }
}

fn check_status(response: &Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::Status(status))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    check_status(&response)?;
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(ClientError::Decode)
}

/// Errors that can occur talking to the chat backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("could not reach the chat service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("the chat service responded with HTTP {0}")]
    Status(StatusCode),

    /// The body did not have the expected shape.
    #[error("unexpected response from the chat service: {0}")]
    Decode(#[source] serde_json::Error),
}
