//! OpenAiAssistantsApi - Direct REST implementation of the OpenAI Assistants v2 API.
//!
//! Covers vector stores, file batches, assistants, threads, messages and runs.

use std::time::Duration;

use async_trait::async_trait;
use docchat_core::config::DEFAULT_OPENAI_BASE_URL;
use docchat_core::remote::{
    Assistant, AssistantSpec, AssistantsApi, FileBatch, FileCounts, RawFile, Run, RunStatus,
    Thread, ThreadMessage, VectorStore,
};
use docchat_core::session::Role;
use docchat_core::{DocchatError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::http::send_json;

const SERVICE: &str = "OpenAI";
const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VALUE: &str = "assistants=v2";
const DEFAULT_BATCH_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Client for the hosted assistants API.
#[derive(Clone)]
pub struct OpenAiAssistantsApi {
    client: Client,
    api_key: String,
    base_url: String,
    batch_poll_interval: Duration,
}

impl OpenAiAssistantsApi {
    /// Creates a new client with the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Creates a client sharing an existing connection pool.
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            batch_poll_interval: DEFAULT_BATCH_POLL_INTERVAL,
        }
    }

    /// Overrides the API base URL, e.g. for a proxy or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets how often a file batch is re-checked while it is being indexed.
    pub fn with_batch_poll_interval(mut self, interval: Duration) -> Self {
        self.batch_poll_interval = interval;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER, BETA_VALUE)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.get(self.url(path)))
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
        self.authorized(self.client.post(self.url(path)).json(body))
    }

    async fn upload_file(&self, file: RawFile) -> Result<String> {
        let RawFile { name, bytes } = file;
        let part = Part::bytes(bytes).file_name(name.clone());
        let form = Form::new().text("purpose", "assistants").part("file", part);

        let request = self.authorized(self.client.post(self.url("files")).multipart(form));
        let uploaded: FileObject = send_json(SERVICE, request).await?;

        tracing::debug!("Uploaded '{}' as {}", name, uploaded.id);
        Ok(uploaded.id)
    }

    async fn next_batch_state(&self, vector_store_id: &str, batch_id: &str) -> Result<FileBatch> {
        tokio::time::sleep(self.batch_poll_interval).await;
        self.retrieve_file_batch(vector_store_id, batch_id).await
    }

    async fn retrieve_file_batch(&self, vector_store_id: &str, batch_id: &str) -> Result<FileBatch> {
        let request = self.get(&format!(
            "vector_stores/{vector_store_id}/file_batches/{batch_id}"
        ));
        let batch: FileBatchObject = send_json(SERVICE, request).await?;
        Ok(batch.into())
    }
}

#[async_trait]
impl AssistantsApi for OpenAiAssistantsApi {
    async fn create_vector_store(&self, name: &str) -> Result<VectorStore> {
        let request = self.post("vector_stores", &serde_json::json!({ "name": name }));
        let store: VectorStoreObject = send_json(SERVICE, request).await?;
        Ok(VectorStore {
            id: store.id,
            name: store.name.unwrap_or_else(|| name.to_string()),
        })
    }

    async fn upload_and_poll(
        &self,
        vector_store_id: &str,
        files: Vec<RawFile>,
        cancel: &CancellationToken,
    ) -> Result<FileBatch> {
        if files.is_empty() {
            return Err(DocchatError::remote(SERVICE, None, "No files to upload"));
        }

        let mut file_ids = Vec::with_capacity(files.len());
        for file in files {
            let id = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DocchatError::Cancelled),
                id = self.upload_file(file) => id?,
            };
            file_ids.push(id);
        }

        let request = self.post(
            &format!("vector_stores/{vector_store_id}/file_batches"),
            &serde_json::json!({ "file_ids": file_ids }),
        );
        let created: FileBatchObject = send_json(SERVICE, request).await?;
        let mut batch: FileBatch = created.into();

        while batch.status == "in_progress" {
            batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DocchatError::Cancelled),
                batch = self.next_batch_state(vector_store_id, &batch.id) => batch?,
            };
            tracing::debug!(
                "File batch {} status={} completed={}/{}",
                batch.id,
                batch.status,
                batch.file_counts.completed,
                batch.file_counts.total
            );
        }

        Ok(batch)
    }

    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant> {
        let body = CreateAssistantRequest {
            name: &spec.name,
            instructions: &spec.instructions,
            tools: spec.tools.iter().map(|t| ToolSpec { r#type: t }).collect(),
            model: &spec.model,
        };
        let assistant: AssistantObject = send_json(SERVICE, self.post("assistants", &body)).await?;
        Ok(assistant.into())
    }

    async fn update_assistant_vector_stores(
        &self,
        assistant_id: &str,
        vector_store_ids: &[String],
    ) -> Result<Assistant> {
        let body = serde_json::json!({
            "tool_resources": {
                "file_search": { "vector_store_ids": vector_store_ids }
            }
        });
        let request = self.post(&format!("assistants/{assistant_id}"), &body);
        let assistant: AssistantObject = send_json(SERVICE, request).await?;
        Ok(assistant.into())
    }

    async fn create_thread(&self) -> Result<Thread> {
        let thread: IdObject = send_json(SERVICE, self.post("threads", &serde_json::json!({}))).await?;
        Ok(Thread { id: thread.id })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage> {
        let body = serde_json::json!({ "role": role, "content": content });
        let request = self.post(&format!("threads/{thread_id}/messages"), &body);
        let message: MessageObject = send_json(SERVICE, request).await?;
        Ok(message.into())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let body = serde_json::json!({ "assistant_id": assistant_id });
        let request = self.post(&format!("threads/{thread_id}/runs"), &body);
        let run: RunObject = send_json(SERVICE, request).await?;
        Ok(run.into())
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let request = self.get(&format!("threads/{thread_id}/runs/{run_id}"));
        let run: RunObject = send_json(SERVICE, request).await?;
        Ok(run.into())
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        let request = self
            .get(&format!("threads/{thread_id}/messages"))
            .query(&[("order", "desc")]);
        let list: ListResponse<MessageObject> = send_json(SERVICE, request).await?;
        Ok(list.data.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct CreateAssistantRequest<'a> {
    name: &'a str,
    instructions: &'a str,
    tools: Vec<ToolSpec<'a>>,
    model: &'a str,
}

#[derive(Serialize)]
struct ToolSpec<'a> {
    r#type: &'a str,
}

#[derive(Deserialize)]
struct IdObject {
    id: String,
}

#[derive(Deserialize)]
struct FileObject {
    id: String,
}

#[derive(Deserialize)]
struct VectorStoreObject {
    id: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct FileBatchObject {
    id: String,
    vector_store_id: String,
    status: String,
    #[serde(default)]
    file_counts: FileCounts,
}

impl From<FileBatchObject> for FileBatch {
    fn from(batch: FileBatchObject) -> Self {
        Self {
            id: batch.id,
            vector_store_id: batch.vector_store_id,
            status: batch.status,
            file_counts: batch.file_counts,
        }
    }
}

#[derive(Deserialize)]
struct AssistantObject {
    id: String,
    name: Option<String>,
    model: String,
    #[serde(default)]
    tool_resources: Option<ToolResources>,
}

#[derive(Deserialize)]
struct ToolResources {
    file_search: Option<FileSearchResources>,
}

#[derive(Deserialize)]
struct FileSearchResources {
    #[serde(default)]
    vector_store_ids: Vec<String>,
}

impl From<AssistantObject> for Assistant {
    fn from(assistant: AssistantObject) -> Self {
        let vector_store_ids = assistant
            .tool_resources
            .and_then(|r| r.file_search)
            .map(|fs| fs.vector_store_ids)
            .unwrap_or_default();

        Self {
            id: assistant.id,
            name: assistant.name,
            model: assistant.model,
            vector_store_ids,
        }
    }
}

#[derive(Deserialize)]
struct RunObject {
    id: String,
    thread_id: String,
    assistant_id: String,
    status: RunStatus,
}

impl From<RunObject> for Run {
    fn from(run: RunObject) -> Self {
        Self {
            id: run.id,
            thread_id: run.thread_id,
            assistant_id: run.assistant_id,
            status: run.status,
        }
    }
}

#[derive(Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct MessageObject {
    id: String,
    role: Role,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct TextContent {
    value: String,
}

impl From<MessageObject> for ThreadMessage {
    fn from(message: MessageObject) -> Self {
        let content = message
            .content
            .into_iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.value),
                ContentPart::Other => None,
            })
            .collect();

        Self {
            id: message.id,
            role: message.role,
            content,
        }
    }
}
