//! Chat session with the backend assistant.
//!
//! The session never surfaces a chat failure as an error: an unreachable or
//! failing assistant degrades to fixed messages in the transcript.

use crate::api::AssistantBackend;
use crate::error::AppError;
use crate::model::{PrioritySuggestion, TaskDraft};
use serde::Serialize;
use time::OffsetDateTime;

pub const GREETING: &str =
    "Hi! 👋 I'm your Smart Note Assistant. I'm ready to help you organize your thoughts.";
pub const PROMPT: &str = "What's on your mind today?";
pub const BASIC_MODE: &str = "I'm in basic mode right now, but feel free to chat!";
pub const CONNECTION_ERROR: &str = "Connection error. Ensure the server is running.";
pub const DRAFT_FAILED: &str = "Could not parse note. Please enter manually.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: i128,
    pub text: String,
    pub sender: Sender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Default)]
pub struct AssistantSession {
    state: SessionState,
    transcript: Vec<Message>,
    typing: bool,
    last_id: i128,
}

impl AssistantSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Empty while closed.
    pub fn transcript(&self) -> &[Message] {
        match self.state {
            SessionState::Open => &self.transcript,
            SessionState::Closed => &[],
        }
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Opens the session. An empty transcript is seeded with the greeting and a
    /// summary of the user's notes, or the basic-mode line when the summary fails.
    pub async fn open<B>(&mut self, api: &B)
    where
        B: AssistantBackend + ?Sized,
    {
        self.state = SessionState::Open;
        if !self.transcript.is_empty() {
            return;
        }

        self.push(Sender::Assistant, GREETING.to_string());
        self.typing = true;
        match api.task_summary().await {
            Ok(summary) => {
                self.push(Sender::Assistant, summary);
                self.push(Sender::Assistant, PROMPT.to_string());
            }
            Err(err) => {
                tracing::warn!(code = err.code(), "assistant summary unavailable");
                self.push(Sender::Assistant, BASIC_MODE.to_string());
            }
        }
        self.typing = false;
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
        self.typing = false;
    }

    /// Clears the transcript without closing the session.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.typing = false;
        tracing::info!("assistant transcript reset");
    }

    /// Appends the user's message and then the reply. Returns the reply, or
    /// `None` when the input was blank. A closed session is opened (and seeded) first.
    pub async fn send<B>(&mut self, api: &B, text: &str) -> Option<&Message>
    where
        B: AssistantBackend + ?Sized,
    {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if !self.is_open() {
            self.open(api).await;
        }
        self.push(Sender::User, text.to_string());
        self.typing = true;
        let reply = match api.chat(text).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(code = err.code(), "assistant chat failed");
                CONNECTION_ERROR.to_string()
            }
        };
        self.typing = false;
        self.push(Sender::Assistant, reply);
        self.transcript.last()
    }

    fn push(&mut self, sender: Sender, text: String) {
        let id = next_message_id(self.last_id);
        self.last_id = id;
        self.transcript.push(Message { id, text, sender });
    }
}

/// Unix nanoseconds, bumped past `previous` when the clock has not advanced.
fn next_message_id(previous: i128) -> i128 {
    let now = OffsetDateTime::now_utc().unix_timestamp_nanos();
    now.max(previous + 1)
}

/// Asks the assistant to turn free text into a draft task.
pub async fn draft_task<B>(api: &B, text: &str) -> Result<TaskDraft, AppError>
where
    B: AssistantBackend + ?Sized,
{
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::invalid_input(DRAFT_FAILED));
    }

    match api.task_draft(text).await {
        Ok(draft) if !draft.title.trim().is_empty() => Ok(draft),
        Ok(_) => Err(AppError::invalid_input(DRAFT_FAILED)),
        Err(err) => {
            tracing::warn!(code = err.code(), "task draft failed");
            Err(AppError::invalid_input(DRAFT_FAILED))
        }
    }
}

pub async fn summary<B>(api: &B) -> Result<String, AppError>
where
    B: AssistantBackend + ?Sized,
{
    api.task_summary().await
}

pub async fn priorities<B>(api: &B) -> Result<PrioritySuggestion, AppError>
where
    B: AssistantBackend + ?Sized,
{
    api.priorities().await
}

pub async fn daily_plan<B>(api: &B) -> Result<String, AppError>
where
    B: AssistantBackend + ?Sized,
{
    api.daily_plan().await
}

#[cfg(test)]
mod tests {
    use super::{
        AssistantSession, BASIC_MODE, CONNECTION_ERROR, DRAFT_FAILED, GREETING, PROMPT, Sender,
        draft_task, next_message_id,
    };
    use crate::testing::FakeBackend;

    #[tokio::test]
    async fn open_seeds_greeting_and_summary() {
        let api = FakeBackend::new();
        let mut session = AssistantSession::new();
        assert!(session.transcript().is_empty());

        session.open(&api).await;

        let texts: Vec<&str> = session.transcript().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING, "You have 0 notes.", PROMPT]);
        assert!(!session.is_typing());
    }

    #[tokio::test]
    async fn open_falls_back_to_basic_mode() {
        let api = FakeBackend::new();
        api.set_assistant_down(true);
        let mut session = AssistantSession::new();

        session.open(&api).await;

        let texts: Vec<&str> = session.transcript().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING, BASIC_MODE]);
    }

    #[tokio::test]
    async fn reopening_keeps_transcript_without_refetch() {
        let api = FakeBackend::new();
        let mut session = AssistantSession::new();

        session.open(&api).await;
        session.close();
        assert!(session.transcript().is_empty());
        session.open(&api).await;

        assert_eq!(session.transcript().len(), 3);
        assert_eq!(api.call_count("summary"), 1);
    }

    #[tokio::test]
    async fn send_appends_user_then_reply() {
        let api = FakeBackend::new();
        let mut session = AssistantSession::new();
        session.open(&api).await;

        let reply = session.send(&api, " plan my week ").await.unwrap().clone();

        assert_eq!(reply.text, "echo: plan my week");
        let tail = &session.transcript()[session.transcript().len() - 2..];
        assert_eq!(tail[0].sender, Sender::User);
        assert_eq!(tail[0].text, "plan my week");
        assert_eq!(tail[1].sender, Sender::Assistant);
    }

    #[tokio::test]
    async fn send_on_unopened_session_seeds_greeting_first() {
        let api = FakeBackend::new();
        let mut session = AssistantSession::new();

        session.send(&api, "hello").await;

        assert!(session.is_open());
        let texts: Vec<&str> = session.transcript().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING, "You have 0 notes.", PROMPT, "hello", "echo: hello"]);
        assert_eq!(api.call_count("summary"), 1);
    }

    #[tokio::test]
    async fn send_failure_appends_connection_error() {
        let api = FakeBackend::new();
        let mut session = AssistantSession::new();
        session.open(&api).await;
        api.set_assistant_down(true);

        let reply = session.send(&api, "hello").await.unwrap();

        assert_eq!(reply.text, CONNECTION_ERROR);
    }

    #[tokio::test]
    async fn blank_message_is_ignored() {
        let api = FakeBackend::new();
        let mut session = AssistantSession::new();
        session.open(&api).await;
        let before = session.transcript().len();

        assert!(session.send(&api, "   ").await.is_none());

        assert_eq!(session.transcript().len(), before);
        assert_eq!(api.call_count("chat"), 0);
    }

    #[tokio::test]
    async fn reset_clears_in_place() {
        let api = FakeBackend::new();
        let mut session = AssistantSession::new();
        session.open(&api).await;

        session.reset();

        assert!(session.is_open());
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn message_ids_increase() {
        let api = FakeBackend::new();
        let mut session = AssistantSession::new();
        session.open(&api).await;
        session.send(&api, "one").await;
        session.send(&api, "two").await;

        let ids: Vec<i128> = session.transcript().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(next_message_id(i128::MAX - 1), i128::MAX);
    }

    #[tokio::test]
    async fn draft_failure_has_fixed_message() {
        let api = FakeBackend::new();
        assert_eq!(draft_task(&api, "buy milk").await.unwrap().title, "buy milk");

        api.set_assistant_down(true);
        let err = draft_task(&api, "buy milk").await.unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.message(), DRAFT_FAILED);
    }
}
