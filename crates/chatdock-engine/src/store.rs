//! Conversation store.
//!
//! [`Conversation`] is the pure state machine: every transition is a plain
//! method call, which makes the ordering guarantees easy to test.
//! [`ConversationStore`] drives it against a [`ChatClient`]. Requests run as
//! spawned tasks that report back over a channel; results are applied on the
//! caller's task by [`ConversationStore::poll`] or
//! [`ConversationStore::settle`], so state is only ever mutated from one place.
//!
//! ```text
//! Idle ──send──▶ Sending (user message appended)
//!                  ├─ reply ──▶ bot message appended ──▶ Idle
//!                  └─ error ──▶ error set + notice appended ──▶ Idle
//! ```

use crate::client::{ChatClient, ClientError};
use crate::config::{ConfigError, WidgetConfig};
use crate::message::Message;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Renderable conversation state.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    loading: bool,
    error: Option<String>,
    revision: u64,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in chronological order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether a history fetch or send is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Description of the last failed send, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Counter bumped on every change to the message list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Start a send cycle.
    ///
    /// Returns the trimmed text to post, or `None` when the input is blank or
    /// another request is outstanding (in which case nothing changes).
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || self.loading {
            return None;
        }

        self.error = None;
        self.messages.push(Message::user(text));
        self.touch();
        self.loading = true;
        Some(text.to_string())
    }

    /// Finish a send cycle with the backend outcome.
    ///
    /// On failure `notice` is appended as a bot message so the problem is
    /// visible in the transcript.
    pub fn finish_send(&mut self, outcome: Result<String, ClientError>, notice: &str) {
        match outcome {
            Ok(reply) => self.messages.push(Message::bot(reply)),
            Err(e) => {
                self.error = Some(e.to_string());
                self.messages.push(Message::bot(notice));
            }
        }
        self.touch();
        self.loading = false;
    }

    /// Start a history fetch.
    ///
    /// Returns the revision the fetch starts from, or `None` if another request
    /// is outstanding.
    pub fn begin_history(&mut self) -> Option<u64> {
        if self.loading {
            return None;
        }
        self.loading = true;
        Some(self.revision)
    }

    /// Finish a history fetch started at `started`.
    ///
    /// Failures keep the current messages. A result for a list that has been
    /// cleared since the fetch started is dropped.
    pub fn finish_history(&mut self, started: u64, outcome: Result<Vec<Message>, ClientError>) {
        match outcome {
            Ok(_) if started != self.revision => debug!("dropping history fetched before clear"),
            Ok(history) => {
                debug!(count = history.len(), "history loaded");
                self.messages = history;
                self.touch();
            }
            Err(e) => warn!(error = %e, "Failed to load chat history"),
        }
        self.loading = false;
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.touch();
    }

    /// Forget an outstanding request whose result will never arrive.
    pub fn cancel(&mut self) {
        self.loading = false;
    }
}

/// Result of a background request, delivered back to the store.
#[derive(Debug)]
enum StoreEvent {
    History(u64, Result<Vec<Message>, ClientError>),
    Reply(Result<String, ClientError>),
    Reset(Result<(), ClientError>),
}

/// Handle to a spawned request. Dropping it aborts the request.
#[derive(Debug)]
struct RequestHandle {
    task: JoinHandle<()>,
}

impl RequestHandle {
    fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            task: tokio::spawn(future),
        }
    }

    /// Whether the request has run to completion (or was aborted).
    fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Abort the request.
    fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for RequestHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Key a history load was performed for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryKey {
    user_id: String,
    base_url: String,
}

/// Conversation state bound to a chat backend.
///
/// All methods that start requests must be called from within a tokio runtime.
/// Dropping the store aborts whatever it still has in flight.
#[derive(Debug)]
pub struct ConversationStore {
    client: ChatClient,
    config: WidgetConfig,
    conversation: Conversation,
    history_key: Option<HistoryKey>,
    requests: Vec<RequestHandle>,
    outstanding: usize,
    /// Bumped by `abort_all`; events tagged with an older session are stale.
    session: u64,
    events_tx: mpsc::UnboundedSender<(u64, StoreEvent)>,
    events_rx: mpsc::UnboundedReceiver<(u64, StoreEvent)>,
}

impl ConversationStore {
    /// Create a store for the given configuration.
    pub fn new(config: WidgetConfig) -> Result<Self, ConfigError> {
        let client = ChatClient::new(&config)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            client,
            config,
            conversation: Conversation::new(),
            history_key: None,
            requests: Vec::new(),
            outstanding: 0,
            session: 0,
            events_tx,
            events_rx,
        })
    }

    /// Swap in a new configuration. History is reloaded if the user or backend
    /// changed; the transcript is otherwise kept.
    pub fn reconfigure(&mut self, config: WidgetConfig) -> Result<(), ConfigError> {
        self.client = ChatClient::new(&config)?;
        self.config = config;
        self.load_history();
        Ok(())
    }

    /// Messages in chronological order.
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Whether a request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading()
    }

    /// Counter bumped on every change to the message list.
    pub fn revision(&self) -> u64 {
        self.conversation.revision()
    }

    /// Description of the last failed send.
    pub fn error(&self) -> Option<&str> {
        self.conversation.error()
    }

    /// Active configuration.
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Fetch history for the configured user.
    ///
    /// Skipped when no user id is configured, and when history was already
    /// loaded for the same user and backend. If another request is outstanding
    /// the load is deferred until the store is idle again.
    /// Returns `true` if a request was started.
    pub fn load_history(&mut self) -> bool {
        let Some(user_id) = self.config.user_id().map(String::from) else {
            return false;
        };
        let key = HistoryKey {
            user_id: user_id.clone(),
            base_url: self.client.base_url().to_string(),
        };
        if self.history_key.as_ref() == Some(&key) {
            return false;
        }
        let Some(started) = self.conversation.begin_history() else {
            return false;
        };
        self.history_key = Some(key);

        info!(user_id = %user_id, "loading chat history");
        let client = self.client.clone();
        self.spawn(async move {
            StoreEvent::History(started, client.fetch_history(&user_id).await)
        });
        true
    }

    /// Send a message.
    ///
    /// The user message is appended before this returns; the reply (or failure
    /// notice) is appended once the request resolves. Blank input and sends
    /// while another request is outstanding are ignored.
    /// Returns `true` if a request was started.
    pub fn send_message(&mut self, text: &str) -> bool {
        let Some(text) = self.conversation.begin_send(text) else {
            return false;
        };

        let user_id = self.config.resolved_user_id().to_string();
        let client = self.client.clone();
        self.spawn(async move { StoreEvent::Reply(client.send_message(&text, &user_id).await) });
        true
    }

    /// Clear the transcript and ask the backend to forget it.
    ///
    /// The local clear is immediate and final: a history fetch still in flight
    /// is dropped when it lands, and the backend outcome is only logged.
    pub fn clear(&mut self) {
        self.conversation.clear();

        let user_id = self.config.resolved_user_id().to_string();
        let client = self.client.clone();
        self.spawn(async move { StoreEvent::Reset(client.reset_history(&user_id).await) });
    }

    /// Apply any results that have arrived. Returns `true` if state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok((session, event)) = self.events_rx.try_recv() {
            changed |= self.apply(session, event);
        }
        self.requests.retain(|request| !request.is_finished());
        if changed && !self.is_loading() {
            changed |= self.load_history();
        }
        changed
    }

    /// Wait until every outstanding request has resolved and been applied,
    /// including any history load that was deferred behind them.
    pub async fn settle(&mut self) {
        loop {
            while self.outstanding > 0 {
                let Some((session, event)) = self.events_rx.recv().await else {
                    break;
                };
                self.apply(session, event);
            }
            self.requests.retain(|request| !request.is_finished());
            if !self.load_history() {
                break;
            }
        }
    }

    /// Abort every outstanding request without applying its result.
    ///
    /// The store is idle afterwards and accepts new sends.
    pub fn abort_all(&mut self) {
        for request in self.requests.drain(..) {
            request.abort();
        }
        while self.events_rx.try_recv().is_ok() {}
        self.session = self.session.wrapping_add(1);
        self.outstanding = 0;
        self.conversation.cancel();
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: std::future::Future<Output = StoreEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        let session = self.session;
        self.outstanding += 1;
        self.requests.push(RequestHandle::spawn(async move {
            let _ = tx.send((session, request.await));
        }));
    }

    fn apply(&mut self, session: u64, event: StoreEvent) -> bool {
        if session != self.session {
            debug!("ignoring result of an aborted request");
            return false;
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        match event {
            StoreEvent::History(started, outcome) => {
                self.conversation.finish_history(started, outcome);
                true
            }
            StoreEvent::Reply(outcome) => {
                if let Err(e) = &outcome {
                    warn!(error = %e, "Chat request failed");
                }
                let notice = self.config.text.connection_lost.clone();
                self.conversation.finish_send(outcome, &notice);
                true
            }
            StoreEvent::Reset(outcome) => {
                match outcome {
                    Ok(()) => debug!("backend history reset"),
                    Err(e) => warn!(error = %e, "Failed to reset chat history"),
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use reqwest::StatusCode;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NOTICE: &str = "connection lost";

    fn status_error() -> ClientError {
        ClientError::Status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn config_for(server: &MockServer, user_id: Option<&str>) -> WidgetConfig {
        let mut config = WidgetConfig::new(server.uri());
        config.user_id = user_id.map(String::from);
        config
    }

    // ========================================================================
    // State machine
    // ========================================================================

    #[test]
    fn test_begin_send_is_optimistic() {
        let mut conversation = Conversation::new();

        let text = conversation.begin_send("  Book a flight \n");
        assert_eq!(text.as_deref(), Some("Book a flight"));
        assert_eq!(conversation.messages(), &[Message::user("Book a flight")]);
        assert!(conversation.is_loading());
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut conversation = Conversation::new();
        for input in ["", "   ", "\n\t"] {
            assert!(conversation.begin_send(input).is_none());
        }
        assert!(conversation.messages().is_empty());
        assert!(!conversation.is_loading());
    }

    #[test]
    fn test_send_while_loading_is_noop() {
        let mut conversation = Conversation::new();
        conversation.begin_send("first").unwrap();

        assert!(conversation.begin_send("second").is_none());
        assert_eq!(conversation.messages().len(), 1);
        assert!(conversation.begin_history().is_none());
    }

    #[test]
    fn test_finish_send_success() {
        let mut conversation = Conversation::new();
        conversation.begin_send("Book a flight").unwrap();
        conversation.finish_send(Ok("Sure, where to?".into()), NOTICE);

        assert_eq!(
            conversation.messages(),
            &[Message::user("Book a flight"), Message::bot("Sure, where to?")]
        );
        assert!(!conversation.is_loading());
        assert!(conversation.error().is_none());
    }

    #[test]
    fn test_failure_then_success_clears_error() {
        let mut conversation = Conversation::new();
        conversation.begin_send("hello").unwrap();
        conversation.finish_send(Err(status_error()), NOTICE);

        assert!(!conversation.is_loading());
        assert!(conversation.error().is_some_and(|e| !e.is_empty()));
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.messages()[1], Message::bot(NOTICE));

        conversation.begin_send("again").unwrap();
        assert!(conversation.error().is_none());
        assert_eq!(conversation.messages()[2], Message::user("again"));
    }

    #[test]
    fn test_history_failure_keeps_messages() {
        let mut conversation = Conversation::new();
        conversation.begin_send("hi").unwrap();
        conversation.finish_send(Ok("hello".into()), NOTICE);

        let started = conversation.begin_history().unwrap();
        conversation.finish_history(started, Err(status_error()));

        assert_eq!(conversation.messages().len(), 2);
        assert!(conversation.error().is_none());
        assert!(!conversation.is_loading());
    }

    #[test]
    fn test_history_replaces_messages() {
        let mut conversation = Conversation::new();
        let started = conversation.begin_history().unwrap();
        assert!(conversation.is_loading());

        conversation.finish_history(started, Ok(vec![Message::bot("Hi"), Message::user("Hello")]));
        assert_eq!(
            conversation.messages(),
            &[Message::bot("Hi"), Message::user("Hello")]
        );
        assert!(!conversation.is_loading());
        assert_ne!(conversation.revision(), started);
    }

    #[test]
    fn test_history_after_clear_is_dropped() {
        let mut conversation = Conversation::new();
        let started = conversation.begin_history().unwrap();

        conversation.clear();
        conversation.finish_history(started, Ok(vec![Message::bot("old")]));

        assert!(conversation.messages().is_empty());
        assert!(!conversation.is_loading());
    }

    #[test]
    fn test_revision_tracks_message_changes() {
        let mut conversation = Conversation::new();
        let mut last = conversation.revision();

        conversation.begin_send("hi").unwrap();
        assert_ne!(conversation.revision(), last);
        last = conversation.revision();

        conversation.finish_send(Ok("hello".into()), NOTICE);
        assert_ne!(conversation.revision(), last);
        last = conversation.revision();

        // Same length, different content
        let started = conversation.begin_history().unwrap();
        conversation.finish_history(started, Ok(vec![Message::user("a"), Message::bot("b")]));
        assert_eq!(conversation.messages().len(), 2);
        assert_ne!(conversation.revision(), last);
        last = conversation.revision();

        let started = conversation.begin_history().unwrap();
        conversation.finish_history(started, Err(status_error()));
        assert_eq!(conversation.revision(), last);
    }

    #[test]
    fn test_clear_is_immediate() {
        let mut conversation = Conversation::new();
        conversation.begin_send("hi").unwrap();
        conversation.finish_send(Ok("hello".into()), NOTICE);

        conversation.clear();
        assert!(conversation.messages().is_empty());
    }

    // ========================================================================
    // Store against a mock backend
    // ========================================================================

    #[tokio::test]
    async fn test_store_loads_history_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ai/history/user-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "history": [
                    {"role": "ai", "content": "Hi"},
                    {"role": "user", "content": "Hello"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, Some("user-1"))).unwrap();
        assert!(store.load_history());
        assert!(store.is_loading());

        store.settle().await;
        assert!(!store.is_loading());
        assert_eq!(store.messages(), &[Message::bot("Hi"), Message::user("Hello")]);

        // Same user and backend: no second request.
        assert!(!store.load_history());
    }

    #[tokio::test]
    async fn test_store_skips_history_without_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, None)).unwrap();
        assert!(!store.load_history());
        assert!(!store.is_loading());

        let mut store = ConversationStore::new(config_for(&server, Some(""))).unwrap();
        assert!(!store.load_history());
    }

    #[tokio::test]
    async fn test_store_reloads_history_for_new_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ai/history/alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "history": [{"role": "user", "content": "from alice"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ai/history/bob"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "history": [{"role": "user", "content": "from bob"}]
            })))
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, Some("alice"))).unwrap();
        store.load_history();
        store.settle().await;
        assert_eq!(store.messages()[0].content, "from alice");

        store.reconfigure(config_for(&server, Some("bob"))).unwrap();
        store.settle().await;
        assert_eq!(store.messages(), &[Message::user("from bob")]);
    }

    #[tokio::test]
    async fn test_store_history_failure_is_silent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, Some("user-1"))).unwrap();
        store.load_history();
        store.settle().await;

        assert!(store.messages().is_empty());
        assert!(store.error().is_none());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_store_send_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai/chat"))
            .and(body_json(serde_json::json!({
                "message": "Book a flight",
                "user_id": "guest"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"reply": "Sure, where to?"}))
                    .set_delay(Duration::from_millis(50)),
            )
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, None)).unwrap();
        assert!(store.send_message("Book a flight"));

        // Optimistic entry is in place before the reply arrives.
        assert_eq!(store.messages(), &[Message::user("Book a flight")]);
        assert!(store.is_loading());
        assert!(!store.send_message("while pending"));

        store.settle().await;
        assert_eq!(
            store.messages(),
            &[Message::user("Book a flight"), Message::bot("Sure, where to?")]
        );
        assert!(!store.is_loading());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_store_send_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, None)).unwrap();
        store.send_message("Book a flight");
        store.settle().await;

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user("Book a flight"));
        assert_eq!(messages[1].role, Role::Bot);
        assert_eq!(messages[1].content, store.config().text.connection_lost);
        assert!(store.error().is_some_and(|e| !e.is_empty()));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_store_send_malformed_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, None)).unwrap();
        store.send_message("hi");
        store.settle().await;

        assert_eq!(store.messages().len(), 2);
        assert!(store
            .error()
            .is_some_and(|e| e.contains("unexpected response")));
    }

    #[tokio::test]
    async fn test_store_clear_survives_failed_reset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "ok"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/ai/reset/guest"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, None)).unwrap();
        store.send_message("hi");
        store.settle().await;
        assert_eq!(store.messages().len(), 2);

        store.clear();
        assert!(store.messages().is_empty());

        store.settle().await;
        assert!(store.messages().is_empty());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_store_clear_wins_over_pending_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ai/history/user-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "history": [{"role": "ai", "content": "old"}]
                    }))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/ai/reset/user-1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, Some("user-1"))).unwrap();
        assert!(store.load_history());
        store.clear();

        store.settle().await;
        assert!(store.messages().is_empty());
        assert!(!store.is_loading());

        // Still counts as loaded: no refetch of the cleared history.
        assert!(!store.load_history());
    }

    #[tokio::test]
    async fn test_poll_applies_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "pong"})),
            )
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, None)).unwrap();
        store.send_message("ping");

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while store.is_loading() && tokio::time::Instant::now() < deadline {
            store.poll();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(!store.is_loading());
        assert_eq!(store.messages()[1], Message::bot("pong"));
    }

    #[tokio::test]
    async fn test_abort_all_drops_in_flight_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"reply": "late"}))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let mut store = ConversationStore::new(config_for(&server, None)).unwrap();
        store.send_message("hello");
        assert_eq!(store.requests.len(), 1);

        store.abort_all();
        assert!(store.requests.is_empty());
        assert!(!store.is_loading());

        // Nothing left to wait for.
        tokio::time::timeout(Duration::from_secs(1), store.settle())
            .await
            .unwrap();
        assert_eq!(store.messages(), &[Message::user("hello")]);

        // Idle again: a new send goes out.
        assert!(store.send_message("again"));
        assert!(store.is_loading());
        store.abort_all();
    }
}
