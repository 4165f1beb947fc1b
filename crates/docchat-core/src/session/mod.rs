//! In-memory session state.
//!
//! A session holds one live conversation, the named snapshots saved from
//! earlier conversations, and the remote handles created along the way.

mod context;
mod message;
mod saved;

pub use context::SessionContext;
pub use message::{Message, Role};
pub use saved::{SESSION_NAME_CHARS, SavedSession, SavedSessions, derive_session_name};
