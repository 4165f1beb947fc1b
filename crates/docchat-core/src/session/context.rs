use crate::config::Credentials;
use crate::remote::{Assistant, RemoteClients, Thread, VectorStore};

use super::message::Message;
use super::saved::{SavedSessions, derive_session_name};

/// Everything one chat session knows about.
///
/// Passed explicitly to every handler. The remote handles are created lazily
/// and, once set, are reused for the rest of the session.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub credentials: Option<Credentials>,
    pub clients: Option<RemoteClients>,
    pub vector_store: Option<VectorStore>,
    pub assistant: Option<Assistant>,
    pub thread: Option<Thread>,
    conversation: Vec<Message>,
    saved: SavedSessions,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when clients, assistant and thread are all available.
    pub fn is_ready(&self) -> bool {
        self.clients.is_some() && self.assistant.is_some() && self.thread.is_some()
    }

    pub fn messages(&self) -> &[Message] {
        &self.conversation
    }

    pub fn push(&mut self, message: Message) {
        self.conversation.push(message);
    }

    pub fn saved(&self) -> &SavedSessions {
        &self.saved
    }

    /// Snapshots the live conversation under its derived name and clears it.
    ///
    /// Returns `None` (and changes nothing) when the conversation is empty.
    pub fn save(&mut self) -> Option<String> {
        if self.conversation.is_empty() {
            return None;
        }

        let name = derive_session_name(&self.conversation);
        let messages = std::mem::take(&mut self.conversation);
        self.saved.insert(name.clone(), messages);
        Some(name)
    }

    /// Replaces the live conversation with a copy of the named snapshot.
    ///
    /// Returns `false` when no snapshot has that name.
    pub fn load(&mut self, name: &str) -> bool {
        match self.saved.get(name) {
            Some(snapshot) => {
                self.conversation = snapshot.messages.clone();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_empty_is_noop() {
        let mut ctx = SessionContext::new();
        assert_eq!(ctx.save(), None);
        assert!(ctx.saved().is_empty());
    }

    #[test]
    fn test_save_then_load_restores_conversation() {
        let mut ctx = SessionContext::new();
        ctx.push(Message::user("hello"));
        ctx.push(Message::assistant("hi there"));
        ctx.push(Message::user("summarize the report"));
        let before = ctx.messages().to_vec();

        let name = ctx.save().expect("non-empty conversation should be saved");
        assert_eq!(name, "hello summarize the report");
        assert!(ctx.messages().is_empty());

        assert!(ctx.load(&name));
        assert_eq!(ctx.messages(), before.as_slice());
    }

    #[test]
    fn test_load_replaces_instead_of_merging() {
        let mut ctx = SessionContext::new();
        ctx.push(Message::user("old"));
        let name = ctx.save().unwrap();

        ctx.push(Message::user("new"));
        assert!(ctx.load(&name));
        assert_eq!(ctx.messages(), &[Message::user("old")]);
    }

    #[test]
    fn test_load_unknown_name_keeps_conversation() {
        let mut ctx = SessionContext::new();
        ctx.push(Message::user("keep me"));
        assert!(!ctx.load("missing"));
        assert_eq!(ctx.messages().len(), 1);
    }

    #[test]
    fn test_clear_empties_conversation() {
        let mut ctx = SessionContext::new();
        ctx.push(Message::user("a"));
        ctx.push(Message::assistant("b"));
        ctx.clear();
        assert!(ctx.messages().is_empty());

        ctx.clear();
        assert!(ctx.messages().is_empty());
    }

    #[test]
    fn test_not_ready_without_handles() {
        let ctx = SessionContext::new();
        assert!(!ctx.is_ready());
    }
}
