//! Chat session management: conversation list, active history, and the
//! send lifecycle (optimistic append -> round trip -> reconciliation).
//!
//! Session state lives behind a mutex so the UI can hold the service in an
//! `Arc`; the lock is never held across a network await. The `pending`
//! flag is the only mutual exclusion in the system: at most one send is in
//! flight, later calls are dropped rather than queued.

use crate::domain::{ChatMessage, ChatSessionState, Conversation, DomainError, SummaryEvent};
use crate::ports::ChatGateway;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Fixed assistant reply appended when a send fails. The message list is
/// never left with a dangling user turn: every accepted send terminates in
/// exactly one assistant entry, real or fallback.
pub const FALLBACK_REPLY: &str = "Connection error. Please check that the backend is running.";

/// Service owning one chat session.
pub struct ChatService {
    gateway: Arc<dyn ChatGateway>,
    state: Mutex<ChatSessionState>,
}

impl ChatService {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(ChatSessionState::default()),
        }
    }

    /// Snapshot of the current session state for rendering.
    pub async fn state(&self) -> ChatSessionState {
        self.state.lock().await.clone()
    }

    /// Fetch the conversation list. A load failure degrades to an empty
    /// list. When nothing is selected and the list is non-empty, the first
    /// (most recent) conversation is auto-selected and its history loaded.
    pub async fn load_conversations(&self) {
        let conversations = match self.gateway.list_conversations().await {
            Ok(conversations) => conversations,
            Err(e) => {
                warn!(error = %e, "conversation list load failed; degrading to empty");
                Vec::new()
            }
        };

        let auto_select = {
            let mut state = self.state.lock().await;
            apply_conversations(&mut state, conversations);
            if state.active_id.is_none() {
                state.conversations.first().map(|c| c.id)
            } else {
                None
            }
        };

        if let Some(id) = auto_select {
            self.select_conversation(id).await;
        }
    }

    /// Make `id` active and replace the message log with server history.
    /// On failure the log is cleared rather than left stale.
    pub async fn select_conversation(&self, id: i64) {
        self.state.lock().await.active_id = Some(id);

        let messages = match self.gateway.history(id).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(conversation_id = id, error = %e, "history load failed; clearing messages");
                Vec::new()
            }
        };
        self.state.lock().await.messages = messages;
    }

    /// Allocate a new conversation, prepend it locally (most-recent-first
    /// is client-maintained), make it active with an empty log.
    pub async fn create_conversation(&self) -> Result<(), DomainError> {
        let conversation = self.gateway.create_conversation().await?;
        info!(conversation_id = conversation.id, "conversation created");

        let mut state = self.state.lock().await;
        state.active_id = Some(conversation.id);
        state.conversations.insert(0, conversation);
        state.messages.clear();
        Ok(())
    }

    /// Delete a conversation. Deleting the active one returns the session
    /// to the empty state — no replacement is auto-selected.
    pub async fn delete_conversation(&self, id: i64) -> Result<(), DomainError> {
        self.gateway.delete_conversation(id).await?;

        let mut state = self.state.lock().await;
        state.conversations.retain(|c| c.id != id);
        if state.active_id == Some(id) {
            state.active_id = None;
            state.messages.clear();
        }
        Ok(())
    }

    /// One send lifecycle. Empty-after-trim input and sends issued while
    /// another is pending are silent no-ops. The user turn is appended
    /// optimistically before the round trip; a conversation is created
    /// lazily when none is active. Failures are absorbed into the fallback
    /// assistant reply instead of propagating.
    pub async fn send_message(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        {
            let mut state = self.state.lock().await;
            if state.pending {
                debug!("send dropped: another send is in flight");
                return;
            }
            state.pending = true;
            state.messages.push(ChatMessage::user(trimmed));
        }

        match self.round_trip(trimmed).await {
            Ok(reply) => {
                self.state
                    .lock()
                    .await
                    .messages
                    .push(ChatMessage::assistant(reply));
                // The server may have auto-titled the conversation as a
                // side effect of the turn.
                self.refresh_conversations().await;
            }
            Err(e) => {
                warn!(error = %e, "send failed; appending fallback reply");
                self.state
                    .lock()
                    .await
                    .messages
                    .push(ChatMessage::assistant(FALLBACK_REPLY));
            }
        }

        self.state.lock().await.pending = false;
    }

    /// Resolve the target conversation (creating one when none is active)
    /// and run the message round trip.
    async fn round_trip(&self, text: &str) -> Result<String, DomainError> {
        let active = self.state.lock().await.active_id;
        let conversation_id = match active {
            Some(id) => id,
            None => {
                let conversation = self.gateway.create_conversation().await?;
                let id = conversation.id;
                let mut state = self.state.lock().await;
                state.active_id = Some(id);
                state.conversations.insert(0, conversation);
                id
            }
        };
        self.gateway.send_message(conversation_id, text).await
    }

    async fn refresh_conversations(&self) {
        match self.gateway.list_conversations().await {
            Ok(conversations) => {
                apply_conversations(&mut *self.state.lock().await, conversations);
            }
            Err(e) => warn!(error = %e, "conversation refresh failed; keeping local list"),
        }
    }

    /// Consume the summary stream, forwarding each text chunk to
    /// `on_chunk` and returning the accumulated text on completion. An
    /// explicit error event or a transport drop before `Done` is an error.
    pub async fn stream_summary<F>(&self, mut on_chunk: F) -> Result<String, DomainError>
    where
        F: FnMut(&str),
    {
        let mut stream = self.gateway.open_summary_stream().await?;
        let mut accumulated = String::new();

        while let Some(event) = stream.next_event().await {
            match event {
                SummaryEvent::Text(chunk) => {
                    accumulated.push_str(&chunk);
                    on_chunk(&chunk);
                }
                SummaryEvent::Done => {
                    info!(chars = accumulated.len(), "summary stream complete");
                    return Ok(accumulated);
                }
                SummaryEvent::Error(message) => return Err(DomainError::Stream(message)),
            }
        }
        Err(DomainError::Stream(
            "connection lost before completion".to_string(),
        ))
    }

    /// Full quality report generated server-side.
    pub async fn fetch_report(&self) -> Result<String, DomainError> {
        self.gateway.report().await
    }
}

/// Replace the conversation list, dropping a selection the new list no
/// longer contains. Keeps `active_id` a member of `conversations` or None.
fn apply_conversations(state: &mut ChatSessionState, conversations: Vec<Conversation>) {
    state.conversations = conversations;
    if let Some(id) = state.active_id {
        if !state.conversations.iter().any(|c| c.id == id) {
            state.active_id = None;
            state.messages.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockBackend;
    use crate::domain::ChatRole;
    use std::time::Duration;

    fn service(backend: Arc<MockBackend>) -> ChatService {
        ChatService::new(backend)
    }

    #[tokio::test]
    async fn empty_and_whitespace_sends_are_no_ops() {
        let backend = Arc::new(MockBackend::new());
        let svc = service(Arc::clone(&backend));

        svc.send_message("").await;
        svc.send_message("   ").await;

        let state = svc.state().await;
        assert!(state.messages.is_empty());
        assert!(!state.pending);
        assert_eq!(backend.send_calls(), 0);
    }

    #[tokio::test]
    async fn overlapping_send_is_dropped_not_queued() {
        let backend = Arc::new(MockBackend::new().with_delay(Duration::from_millis(50)));
        let svc = service(Arc::clone(&backend));

        tokio::join!(svc.send_message("a"), svc.send_message("b"));

        assert_eq!(backend.send_calls(), 1);
        let state = svc.state().await;
        // Exactly one user turn ("a") and one assistant reply survived.
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].role, ChatRole::User);
        assert_eq!(state.messages[0].content, "a");
        assert_eq!(state.messages[1].role, ChatRole::Assistant);
        assert!(!state.pending);
    }

    #[tokio::test]
    async fn failed_send_appends_fallback_reply() {
        let backend = Arc::new(MockBackend::failing(&["send_message"]));
        let svc = service(Arc::clone(&backend));

        svc.send_message("x").await;

        let state = svc.state().await;
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].content, "x");
        assert_eq!(state.messages[1].role, ChatRole::Assistant);
        assert_eq!(state.messages[1].content, FALLBACK_REPLY);
        assert!(!state.pending);
    }

    #[tokio::test]
    async fn first_send_creates_a_conversation_lazily() {
        let backend = Arc::new(MockBackend::new());
        let svc = service(Arc::clone(&backend));

        svc.send_message("hello").await;

        let state = svc.state().await;
        assert!(state.active_id.is_some());
        assert_eq!(state.messages.len(), 2);
        assert!(
            state
                .conversations
                .iter()
                .any(|c| Some(c.id) == state.active_id)
        );
    }

    #[tokio::test]
    async fn load_auto_selects_most_recent_conversation() {
        let backend = Arc::new(MockBackend::with_conversations(&["Yield drop Q3", "CAPA-1042"]));
        let svc = service(Arc::clone(&backend));

        svc.load_conversations().await;

        let state = svc.state().await;
        assert_eq!(state.conversations.len(), 2);
        assert_eq!(state.active_id, Some(state.conversations[0].id));
    }

    #[tokio::test]
    async fn list_failure_degrades_to_empty() {
        let backend = Arc::new(MockBackend::failing(&["list_conversations"]));
        let svc = service(Arc::clone(&backend));

        svc.load_conversations().await;

        let state = svc.state().await;
        assert!(state.conversations.is_empty());
        assert!(state.active_id.is_none());
    }

    #[tokio::test]
    async fn reload_failure_clears_stale_selection() {
        let backend = Arc::new(MockBackend::with_conversations(&["Only one"]));
        let svc = service(Arc::clone(&backend));
        svc.load_conversations().await;
        svc.send_message("seed the log").await;
        assert!(svc.state().await.active_id.is_some());

        backend.fail_endpoint("list_conversations");
        svc.load_conversations().await;

        // The degraded-to-empty list cannot contain the old selection;
        // keeping it would leave active_id pointing at nothing.
        let state = svc.state().await;
        assert!(state.conversations.is_empty());
        assert_eq!(state.active_id, None);
        assert!(state.messages.is_empty());
    }

    #[tokio::test]
    async fn reload_drops_selection_removed_on_the_server() {
        let backend = Arc::new(MockBackend::with_conversations(&["First", "Second"]));
        let svc = service(Arc::clone(&backend));
        svc.load_conversations().await;
        let active = svc.state().await.active_id.expect("auto-selected");

        // Removed out-of-band, e.g. by another client.
        backend.delete_conversation(active).await.expect("server delete");
        svc.load_conversations().await;

        let state = svc.state().await;
        assert!(state.conversations.iter().all(|c| c.id != active));
        // The stale id is gone and a surviving conversation takes over.
        assert_eq!(state.active_id, Some(state.conversations[0].id));
    }

    #[tokio::test]
    async fn history_failure_clears_messages() {
        let backend = Arc::new(MockBackend::with_conversations(&["Only one"]));
        let svc = service(Arc::clone(&backend));
        svc.load_conversations().await;
        svc.send_message("seed the log").await;
        assert!(!svc.state().await.messages.is_empty());

        backend.fail_endpoint("history");
        let id = svc.state().await.active_id.expect("active conversation");
        svc.select_conversation(id).await;

        assert!(svc.state().await.messages.is_empty());
    }

    #[tokio::test]
    async fn deleting_active_conversation_returns_to_empty_state() {
        let backend = Arc::new(MockBackend::with_conversations(&["First", "Second"]));
        let svc = service(Arc::clone(&backend));
        svc.load_conversations().await;

        let active = svc.state().await.active_id.expect("auto-selected");
        svc.delete_conversation(active).await.expect("delete");

        let state = svc.state().await;
        // One conversation remains but nothing is selected on its behalf.
        assert_eq!(state.conversations.len(), 1);
        assert_eq!(state.active_id, None);
        assert!(state.messages.is_empty());
    }

    #[tokio::test]
    async fn summary_stream_accumulates_until_done() {
        let backend = Arc::new(MockBackend::new().with_summary_events(vec![
            SummaryEvent::Text("a".into()),
            SummaryEvent::Text("b".into()),
            SummaryEvent::Done,
        ]));
        let svc = service(Arc::clone(&backend));

        let mut chunks = Vec::new();
        let summary = svc
            .stream_summary(|chunk| chunks.push(chunk.to_string()))
            .await
            .expect("stream completes");

        assert_eq!(summary, "ab");
        assert_eq!(chunks, ["a", "b"]);
    }

    #[tokio::test]
    async fn summary_stream_error_event_terminates() {
        let backend = Arc::new(MockBackend::new().with_summary_events(vec![
            SummaryEvent::Text("a".into()),
            SummaryEvent::Error("x".into()),
        ]));
        let svc = service(Arc::clone(&backend));

        let mut seen = String::new();
        let err = svc
            .stream_summary(|chunk| seen.push_str(chunk))
            .await
            .expect_err("error event fails the stream");

        assert_eq!(seen, "a");
        match err {
            DomainError::Stream(message) => assert_eq!(message, "x"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn summary_stream_hangup_is_a_connection_error() {
        // No terminal event: the producer just stops.
        let backend = Arc::new(
            MockBackend::new().with_summary_events(vec![SummaryEvent::Text("partial".into())]),
        );
        let svc = service(Arc::clone(&backend));

        let err = svc.stream_summary(|_| {}).await.expect_err("hangup");
        assert!(matches!(err, DomainError::Stream(_)));
    }
}
