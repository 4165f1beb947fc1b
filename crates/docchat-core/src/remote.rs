//! Remote service boundaries.
//!
//! The hosted assistants API, the document search API and the web search
//! endpoint are treated as opaque request/response services. This module
//! defines the domain types exchanged with them and the traits the
//! application layer is written against.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::Credentials;
use crate::error::Result;
use crate::session::Role;

/// Server-side document collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorStore {
    pub id: String,
    pub name: String,
}

/// Per-status counters of a file batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCounts {
    pub in_progress: u32,
    pub completed: u32,
    pub failed: u32,
    pub cancelled: u32,
    pub total: u32,
}

/// Result of indexing a batch of files into a vector store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBatch {
    pub id: String,
    pub vector_store_id: String,
    pub status: String,
    pub file_counts: FileCounts,
}

/// A file read fully into memory, ready to be uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads the whole file at `path` into memory.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for RawFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Fixed configuration used when creating an assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantSpec {
    pub name: String,
    pub instructions: String,
    /// Tool types to enable, e.g. `file_search`.
    pub tools: Vec<String>,
    pub model: String,
}

/// Conversational agent configured on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    pub name: Option<String>,
    pub model: String,
    /// Vector stores bound to the `file_search` tool.
    pub vector_store_ids: Vec<String>,
}

/// Server-side conversation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// Lifecycle status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// Any status string this client does not know about.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether the run can no longer make progress.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Failed | Self::Incomplete | Self::Expired
        )
    }
}

/// One processing invocation of an assistant against a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub assistant_id: String,
    pub status: RunStatus,
}

/// A message stored on a remote thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: Role,
    /// Text fragments in content order. Non-text parts are dropped.
    pub content: Vec<String>,
}

/// A single document search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

/// Operations of the hosted assistants API.
#[async_trait::async_trait]
pub trait AssistantsApi: Send + Sync {
    async fn create_vector_store(&self, name: &str) -> Result<VectorStore>;

    /// Uploads all files, adds them to the vector store as one batch and
    /// returns once the batch has left the `in_progress` state.
    ///
    /// Files are consumed so their bytes are sent without another copy.
    /// Cancelling `cancel` abandons the wait with `Cancelled`.
    async fn upload_and_poll(
        &self,
        vector_store_id: &str,
        files: Vec<RawFile>,
        cancel: &CancellationToken,
    ) -> Result<FileBatch>;

    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant>;

    /// Replaces the vector stores bound to the assistant's `file_search` tool.
    async fn update_assistant_vector_stores(
        &self,
        assistant_id: &str,
        vector_store_ids: &[String],
    ) -> Result<Assistant>;

    async fn create_thread(&self) -> Result<Thread>;

    async fn create_message(&self, thread_id: &str, role: Role, content: &str)
    -> Result<ThreadMessage>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Lists thread messages, most recent first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>>;
}

/// Document search used as the first answer source of a search turn.
#[async_trait::async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Returns matching documents. An empty list means "no results".
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Web search used when document search yields nothing.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    /// Returns the `results` payload of the search endpoint as-is.
    async fn search(&self, query: &str) -> Result<serde_json::Value>;
}

/// The set of remote clients available to one session.
#[derive(Clone)]
pub struct RemoteClients {
    pub assistants: Arc<dyn AssistantsApi>,
    pub documents: Arc<dyn DocumentSearch>,
    pub web: Arc<dyn WebSearch>,
}

impl std::fmt::Debug for RemoteClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClients").finish_non_exhaustive()
    }
}

/// Builds [`RemoteClients`] from caller-supplied credentials.
pub trait ClientFactory: Send + Sync {
    fn build(&self, credentials: &Credentials) -> Result<RemoteClients>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_parses_wire_strings() {
        let status: RunStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, RunStatus::InProgress);

        let status: RunStatus = serde_json::from_str("\"requires_action\"").unwrap();
        assert_eq!(status, RunStatus::RequiresAction);

        let status: RunStatus = serde_json::from_str("\"something_new\"").unwrap();
        assert_eq!(status, RunStatus::Unknown);
    }

    #[test]
    fn test_run_status_terminal() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Expired.is_terminal());
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(!RunStatus::RequiresAction.is_terminal());
        assert!(!RunStatus::Unknown.is_terminal());
        assert_eq!(RunStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_raw_file_debug_hides_bytes() {
        let file = RawFile::new("report.pdf", vec![0u8; 2048]);
        let dbg = format!("{:?}", file);
        assert!(dbg.contains("report.pdf"));
        assert!(dbg.contains("2048"));
        assert_eq!(file.len(), 2048);
    }

    #[tokio::test]
    async fn test_raw_file_read_missing_path() {
        let err = RawFile::read("/definitely/not/here.pdf").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
