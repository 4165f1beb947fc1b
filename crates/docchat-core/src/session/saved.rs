use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::{Message, Role};

/// Number of characters kept when deriving a session name.
pub const SESSION_NAME_CHARS: usize = 50;

/// Derives the name of a saved session: the first 50 characters of all
/// user message texts joined with a single space.
pub fn derive_session_name(messages: &[Message]) -> String {
    let summary = messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    summary.chars().take(SESSION_NAME_CHARS).collect()
}

/// Snapshot of a conversation taken at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub name: String,
    pub messages: Vec<Message>,
    pub saved_at: DateTime<Utc>,
}

/// Named snapshots, kept in the order their names were first saved.
///
/// Saving under an existing name replaces that snapshot in place.
#[derive(Debug, Clone, Default)]
pub struct SavedSessions {
    entries: Vec<SavedSession>,
}

impl SavedSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, messages: Vec<Message>) {
        let snapshot = SavedSession {
            name,
            messages,
            saved_at: Utc::now(),
        };

        match self.entries.iter_mut().find(|s| s.name == snapshot.name) {
            Some(existing) => {
                tracing::debug!("Overwriting saved session '{}'", snapshot.name);
                *existing = snapshot;
            }
            None => self.entries.push(snapshot),
        }
    }

    /// Looks a snapshot up by name.
    ///
    /// Derived names may end in whitespace; a name given without its
    /// surrounding whitespace still matches.
    pub fn get(&self, name: &str) -> Option<&SavedSession> {
        self.entries.iter().find(|s| s.name == name).or_else(|| {
            let wanted = name.trim();
            self.entries.iter().find(|s| s.name.trim() == wanted)
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
