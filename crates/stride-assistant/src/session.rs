use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use futures::StreamExt;
use serde::Serialize;
use stride_core::directive::parse_response;
use stride_core::tracker::AppliedDirective;
use stride_core::Tracker;

use crate::client::AssistantClient;
use crate::error::AssistantError;
use crate::stream::{AbortHandle, DeltaStream};
use crate::types::{ChatMessage, ChatRequest};
use crate::Result;

pub const GREETING: &str = "Hi! I'm your study planning assistant. I can add or remove \
tasks in the current week and help you balance your schedule. What would you like to change?";

// ─── ChatSession ──────────────────────────────────────────────────────────

/// Result of one completed turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub week: u32,
    /// The assistant message as finally shown.
    pub reply: String,
    pub applied: Vec<AppliedDirective>,
}

/// A conversation bound to one tracker.
///
/// Only one turn runs at a time; a second `send` while a reply is streaming
/// fails with [`AssistantError::Busy`].
pub struct ChatSession {
    client: AssistantClient,
    tracker: Tracker,
    messages: Mutex<Vec<ChatMessage>>,
    busy: AtomicBool,
    current_abort: Mutex<Option<AbortHandle>>,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatSession {
    pub fn new(client: AssistantClient, tracker: Tracker) -> Self {
        Self {
            client,
            tracker,
            messages: Mutex::new(vec![ChatMessage::assistant(GREETING)]),
            busy: AtomicBool::new(false),
            current_abort: Mutex::new(None),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock_messages().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Cancel the reply currently streaming, if any.
    pub fn abort(&self) {
        if let Some(handle) = self.lock_abort().as_ref() {
            handle.abort();
        }
    }

    fn lock_messages(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.messages.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_abort(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.current_abort.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Send `text` and stream the reply. `on_fragment` sees every fragment
    /// as it arrives. Task directives in the finished reply are applied to
    /// the current week and stripped from the stored message.
    pub async fn send<F>(&self, text: &str, on_fragment: F) -> Result<TurnOutcome>
    where
        F: FnMut(&str),
    {
        let client = &self.client;
        self.send_with(text, on_fragment, move |request| async move {
            client.stream(&request).await
        })
        .await
    }

    /// [`send`](Self::send) with the reply stream opened by `open`.
    async fn send_with<F, O, Fut>(
        &self,
        text: &str,
        mut on_fragment: F,
        open: O,
    ) -> Result<TurnOutcome>
    where
        F: FnMut(&str),
        O: FnOnce(ChatRequest) -> Fut,
        Fut: Future<Output = Result<DeltaStream>>,
    {
        if text.trim().is_empty() {
            return Err(AssistantError::EmptyMessage);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AssistantError::Busy);
        }
        let _busy = BusyGuard(&self.busy);

        let tracker = self.tracker.clone();
        let (week, week_data) = tokio::task::spawn_blocking(move || {
            let week = tracker.current_week()?;
            Ok::<_, stride_core::StrideError>((week, tracker.resolved_week(week)?))
        })
        .await??;

        let request = {
            let mut messages = self.lock_messages();
            messages.push(ChatMessage::user(text));
            ChatRequest {
                messages: messages.clone(),
                current_week_data: Some(week_data),
            }
        };

        let mut stream = open(request).await?;
        *self.lock_abort() = Some(stream.abort_handle());

        let placeholder = {
            let mut messages = self.lock_messages();
            messages.push(ChatMessage::assistant(""));
            messages.len() - 1
        };

        let mut reply = String::new();
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(fragment) => {
                    reply.push_str(&fragment);
                    if let Some(msg) = self.lock_messages().get_mut(placeholder) {
                        msg.content.clone_from(&reply);
                    }
                    on_fragment(&fragment);
                }
                Err(e) => {
                    self.lock_abort().take();
                    self.rollback(placeholder);
                    tracing::warn!(error = %e, "assistant stream failed");
                    return Err(e);
                }
            }
        }
        self.lock_abort().take();

        if reply.is_empty() {
            self.rollback(placeholder);
            tracing::warn!("assistant stream ended without text");
            return Err(AssistantError::MissingBody);
        }

        let parsed = parse_response(&reply);
        let applied = if parsed.directives.is_empty() {
            Vec::new()
        } else {
            let tracker = self.tracker.clone();
            let directives = parsed.directives;
            let applied =
                tokio::task::spawn_blocking(move || tracker.apply_directives(week, &directives))
                    .await??;
            if let Some(msg) = self.lock_messages().get_mut(placeholder) {
                msg.content.clone_from(&parsed.prose);
            }
            reply = parsed.prose;
            applied
        };

        Ok(TurnOutcome {
            week,
            reply,
            applied,
        })
    }

    fn rollback(&self, placeholder: usize) {
        let mut messages = self.lock_messages();
        if placeholder < messages.len() {
            messages.remove(placeholder);
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use stride_core::clock::FixedClock;
    use stride_core::curriculum::BuiltinCurriculum;
    use stride_core::store::MemoryStore;

    fn tracker() -> Tracker {
        Tracker::new(
            Arc::new(MemoryStore::new()),
            Arc::new(BuiltinCurriculum::default()),
            Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())),
        )
        .unwrap()
    }

    fn sse(parts: &[&str]) -> String {
        let mut body = String::new();
        for p in parts {
            let chunk = serde_json::json!({"choices": [{"delta": {"content": p}}]});
            body.push_str(&format!("data: {chunk}\n\n"));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    #[tokio::test]
    async fn plain_reply_streams_into_history() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(sse(&["Hel", "lo"]))
            .create_async()
            .await;

        let tracker = tracker();
        let before = tracker.resolved_week(1).unwrap();
        let session = ChatSession::new(AssistantClient::new(server.url(), None), tracker.clone());

        let mut seen = Vec::new();
        let outcome = session
            .send("hi", |f| seen.push(f.to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.reply, "Hello");
        assert!(outcome.applied.is_empty());
        assert_eq!(seen.concat(), "Hello");
        let history = session.messages();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, GREETING);
        assert_eq!(history[2].role, Role::Assistant);
        assert_eq!(history[2].content, "Hello");
        assert_eq!(tracker.resolved_week(1).unwrap(), before);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn directives_are_applied_and_stripped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(sse(&[
                "ADD_TASK|japanese|Kanji ",
                "drill|Daily|high\nREMOVE_TASK|duolingo\n",
                "Updated your week!",
            ]))
            .create_async()
            .await;

        let tracker = tracker();
        let session = ChatSession::new(AssistantClient::new(server.url(), None), tracker.clone());
        let outcome = session.send("add kanji, drop duolingo", |_| {}).await.unwrap();

        assert_eq!(outcome.reply, "Updated your week!");
        assert_eq!(outcome.applied.len(), 2);
        assert_eq!(session.messages().last().unwrap().content, "Updated your week!");

        let week = tracker.resolved_week(1).unwrap();
        let kanji = week.japanese.iter().find(|t| t.text == "Kanji drill").unwrap();
        assert_eq!(kanji.schedule.as_deref(), Some("Daily"));
        assert!(!week.japanese.iter().any(|t| t.text.contains("Duolingo")));
    }

    #[tokio::test]
    async fn rate_limit_leaves_no_placeholder() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(429)
            .create_async()
            .await;
        let session = ChatSession::new(AssistantClient::new(server.url(), None), tracker());
        let err = session.send("hi", |_| {}).await.unwrap_err();
        assert!(matches!(err, AssistantError::RateLimited));

        let history = session.messages();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, Role::User);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let session = ChatSession::new(AssistantClient::new("http://127.0.0.1:9", None), tracker());
        assert!(matches!(
            session.send("   ", |_| {}).await,
            Err(AssistantError::EmptyMessage)
        ));
        assert_eq!(session.messages().len(), 1);
    }

    fn assert_only_user_message_kept(session: &ChatSession) {
        let history = session.messages();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, GREETING);
        assert_eq!(history[1].role, Role::User);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn server_error_leaves_no_placeholder() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(500)
            .with_body("upstream down")
            .create_async()
            .await;
        let session = ChatSession::new(AssistantClient::new(server.url(), None), tracker());
        let err = session.send("hi", |_| {}).await.unwrap_err();
        assert!(matches!(err, AssistantError::Status { status: 500, .. }));
        assert_only_user_message_kept(&session);
    }

    #[tokio::test]
    async fn empty_reply_leaves_no_placeholder() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;
        let session = ChatSession::new(AssistantClient::new(server.url(), None), tracker());
        let err = session.send("hi", |_| {}).await.unwrap_err();
        assert!(matches!(err, AssistantError::MissingBody));
        assert_only_user_message_kept(&session);
    }

    #[tokio::test]
    async fn failure_mid_stream_drops_partial_reply() {
        let tracker = tracker();
        let before = tracker.resolved_week(1).unwrap();
        let session = ChatSession::new(
            AssistantClient::new("http://127.0.0.1:9", None),
            tracker.clone(),
        );

        let mut seen = Vec::new();
        let err = session
            .send_with(
                "hi",
                |f| seen.push(f.to_string()),
                |_request| async {
                    let chunks: Vec<Result<String>> = vec![
                        Ok(sse(&["REMOVE_TASK|anki\nPart"]).replace("data: [DONE]\n\n", "")),
                        Err(AssistantError::Status {
                            status: 502,
                            body: "reset".into(),
                        }),
                    ];
                    Ok(DeltaStream::spawn(futures::stream::iter(chunks)))
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::Status { status: 502, .. }));
        assert_eq!(seen.concat(), "REMOVE_TASK|anki\nPart");
        assert_only_user_message_kept(&session);
        assert_eq!(tracker.resolved_week(1).unwrap(), before);
    }

    #[test]
    fn rollback_removes_only_the_placeholder() {
        let session = ChatSession::new(AssistantClient::new("http://127.0.0.1:9", None), tracker());
        {
            let mut m = session.lock_messages();
            m.push(ChatMessage::user("hi"));
            m.push(ChatMessage::assistant("partial"));
        }
        session.rollback(2);
        let history = session.messages();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "hi");
    }

    #[test]
    fn busy_guard_resets_flag() {
        let flag = AtomicBool::new(true);
        drop(BusyGuard(&flag));
        assert!(!flag.load(Ordering::SeqCst));
    }
}
