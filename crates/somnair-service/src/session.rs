//! Conversation session context.
//!
//! One user talks to the coach at a time. The session holds the credential
//! the front-end supplied for the language model, the conversation so far
//! and its creation time.
//!
//! Lifecycle:
//!
//! - created on the first interaction
//! - reused while the credential stays the same
//! - replaced wholesale when the credential changes (history is dropped)
//! - discarded on reset
//!
//! The credential is compared in constant time and never serialized.
//! History keeps at most [`MAX_HISTORY`] messages; older ones are dropped
//! first.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use time::OffsetDateTime;

/// Messages kept per session.
pub const MAX_HISTORY: usize = 200;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// State of one conversation.
#[derive(Clone, Serialize)]
pub struct SessionContext {
    #[serde(skip)]
    api_key: String,
    history: Vec<ChatMessage>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("api_key", &"<redacted>")
            .field("history", &self.history.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl SessionContext {
    fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            history: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Whether this session was opened with `api_key`.
    pub fn matches_key(&self, api_key: &str) -> bool {
        self.api_key.as_bytes().ct_eq(api_key.as_bytes()).into()
    }

    /// Messages so far, oldest first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// When the session was created.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Append a message, evicting the oldest past [`MAX_HISTORY`].
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> &ChatMessage {
        if self.history.len() >= MAX_HISTORY {
            let excess = self.history.len() + 1 - MAX_HISTORY;
            self.history.drain(..excess);
        }
        self.history.push(ChatMessage {
            role,
            content: content.into(),
            at: OffsetDateTime::now_utc(),
        });
        &self.history[self.history.len() - 1]
    }
}

/// What [`SessionSlot::ensure`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionChange {
    /// No session existed; a new one was created.
    Created,
    /// The existing session matched the credential.
    Reused,
    /// The credential changed; the old session was discarded.
    Replaced,
}

/// Holder of the single active session.
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: Option<SessionContext>,
}

impl SessionSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session, if any.
    pub fn current(&self) -> Option<&SessionContext> {
        self.current.as_ref()
    }

    /// Return the session for `api_key`, creating or replacing it as needed.
    pub fn ensure(&mut self, api_key: &str) -> (&mut SessionContext, SessionChange) {
        let change = match &self.current {
            None => SessionChange::Created,
            Some(session) if session.matches_key(api_key) => SessionChange::Reused,
            Some(_) => SessionChange::Replaced,
        };
        if change != SessionChange::Reused {
            self.current = Some(SessionContext::new(api_key));
        }
        let session = self.current.get_or_insert_with(|| SessionContext::new(api_key));
        (session, change)
    }

    /// Discard the active session. Returns whether one existed.
    pub fn reset(&mut self) -> bool {
        self.current.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_on_first_interaction() {
        let mut slot = SessionSlot::new();
        assert!(slot.current().is_none());

        let (session, change) = slot.ensure("key-a");
        assert_eq!(change, SessionChange::Created);
        assert!(session.history().is_empty());
        assert!(slot.current().is_some());
    }

    #[test]
    fn test_reused_with_same_key() {
        let mut slot = SessionSlot::new();
        slot.ensure("key-a").0.push(Role::User, "PM2.5 di kamar 28");

        let (session, change) = slot.ensure("key-a");
        assert_eq!(change, SessionChange::Reused);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_replaced_when_key_changes() {
        let mut slot = SessionSlot::new();
        slot.ensure("key-a").0.push(Role::User, "halo");

        let (session, change) = slot.ensure("key-b");
        assert_eq!(change, SessionChange::Replaced);
        assert!(session.history().is_empty());
        assert!(session.matches_key("key-b"));
        assert!(!session.matches_key("key-a"));
    }

    #[test]
    fn test_reset_discards() {
        let mut slot = SessionSlot::new();
        assert!(!slot.reset());

        slot.ensure("key-a");
        assert!(slot.reset());
        assert!(slot.current().is_none());

        let (_, change) = slot.ensure("key-a");
        assert_eq!(change, SessionChange::Created);
    }

    #[test]
    fn test_history_is_capped_oldest_first() {
        let mut slot = SessionSlot::new();
        let (session, _) = slot.ensure("key-a");
        for i in 0..MAX_HISTORY + 5 {
            session.push(Role::User, format!("message {i}"));
        }

        assert_eq!(session.history().len(), MAX_HISTORY);
        assert_eq!(session.history()[0].content, "message 5");
        assert_eq!(
            session.history()[MAX_HISTORY - 1].content,
            format!("message {}", MAX_HISTORY + 4)
        );
    }

    #[test]
    fn test_key_never_serialized_or_logged() {
        let mut slot = SessionSlot::new();
        let (session, _) = slot.ensure("super-secret-key");
        session.push(Role::Assistant, "Zona sedang");

        let json = serde_json::to_string(&*session).unwrap();
        assert!(!json.contains("super-secret-key"));
        assert!(json.contains("\"role\":\"assistant\""));

        let debug = format!("{:?}", session);
        assert!(!debug.contains("super-secret-key"));
    }
}
