#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use docchat_core::config::Credentials;
use docchat_core::remote::{
    Assistant, AssistantSpec, AssistantsApi, ClientFactory, DocumentSearch, FileBatch,
    FileCounts, RawFile, RemoteClients, Run, RunStatus, SearchHit, Thread, ThreadMessage,
    VectorStore, WebSearch,
};
use docchat_core::session::Role;
use docchat_core::{DocchatError, Result};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

// Mock assistants API recording every call
#[derive(Default)]
pub struct MockAssistantsApi {
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    stalled: Mutex<HashSet<&'static str>>,
    run_statuses: Mutex<VecDeque<RunStatus>>,
    reply: Mutex<Vec<String>>,
    bound: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl MockAssistantsApi {
    pub fn new() -> Self {
        let api = Self::default();
        *api.reply.lock().unwrap() = vec!["answer".to_string()];
        api
    }

    /// Statuses returned by successive `retrieve_run` calls; `completed` afterwards.
    pub fn with_run_statuses(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        *self.run_statuses.lock().unwrap() = statuses.into_iter().collect();
        self
    }

    pub fn with_reply(self, fragments: &[&str]) -> Self {
        *self.reply.lock().unwrap() = fragments.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    /// Makes `operation` hang forever once called.
    pub fn stall(&self, operation: &'static str) {
        self.stalled.lock().unwrap().insert(operation);
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bound_vector_stores(&self) -> Vec<String> {
        self.bound.lock().unwrap().clone()
    }

    async fn record(&self, operation: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(operation);
        if self.failing.lock().unwrap().contains(operation) {
            return Err(DocchatError::remote("Mock", Some(500), format!("{operation} failed")));
        }
        let stalled = self.stalled.lock().unwrap().contains(operation);
        if stalled {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait::async_trait]
impl AssistantsApi for MockAssistantsApi {
    async fn create_vector_store(&self, name: &str) -> Result<VectorStore> {
        self.record("create_vector_store").await?;
        Ok(VectorStore {
            id: self.next_id("vs"),
            name: name.to_string(),
        })
    }

    async fn upload_and_poll(
        &self,
        vector_store_id: &str,
        files: Vec<RawFile>,
        _cancel: &CancellationToken,
    ) -> Result<FileBatch> {
        self.record("upload_and_poll").await?;
        let total = files.len() as u32;
        Ok(FileBatch {
            id: self.next_id("vsfb"),
            vector_store_id: vector_store_id.to_string(),
            status: "completed".to_string(),
            file_counts: FileCounts {
                completed: total,
                total,
                ..FileCounts::default()
            },
        })
    }

    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant> {
        self.record("create_assistant").await?;
        Ok(Assistant {
            id: self.next_id("asst"),
            name: Some(spec.name.clone()),
            model: spec.model.clone(),
            vector_store_ids: Vec::new(),
        })
    }

    async fn update_assistant_vector_stores(
        &self,
        assistant_id: &str,
        vector_store_ids: &[String],
    ) -> Result<Assistant> {
        self.record("update_assistant").await?;
        *self.bound.lock().unwrap() = vector_store_ids.to_vec();
        Ok(Assistant {
            id: assistant_id.to_string(),
            name: None,
            model: "gpt-4o".to_string(),
            vector_store_ids: vector_store_ids.to_vec(),
        })
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.record("create_thread").await?;
        Ok(Thread {
            id: self.next_id("thread"),
        })
    }

    async fn create_message(
        &self,
        _thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage> {
        self.record("create_message").await?;
        Ok(ThreadMessage {
            id: self.next_id("msg"),
            role,
            content: vec![content.to_string()],
        })
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        self.record("create_run").await?;
        Ok(Run {
            id: "run_1".to_string(),
            thread_id: thread_id.to_string(),
            assistant_id: assistant_id.to_string(),
            status: RunStatus::Queued,
        })
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.record("retrieve_run").await?;
        let status = self
            .run_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RunStatus::Completed);
        Ok(Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            assistant_id: "asst".to_string(),
            status,
        })
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>> {
        self.record("list_messages").await?;
        Ok(vec![ThreadMessage {
            id: "msg_reply".to_string(),
            role: Role::Assistant,
            content: self.reply.lock().unwrap().clone(),
        }])
    }
}

// Mock document search with a fixed answer
#[derive(Default)]
pub struct MockDocumentSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    stall: bool,
    calls: AtomicUsize,
}

impl MockDocumentSearch {
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Never answers.
    pub fn stalling() -> Self {
        Self {
            stall: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DocumentSearch for MockDocumentSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stall {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(DocchatError::remote("Tavily", Some(401), "bad key"));
        }
        Ok(self.hits.clone())
    }
}

// Mock web search with a fixed answer
pub struct MockWebSearch {
    result: Result<Value>,
    calls: AtomicUsize,
}

impl MockWebSearch {
    pub fn returning(value: Value) -> Self {
        Self {
            result: Ok(value),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(DocchatError::remote("WebSearch", Some(503), "unavailable")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WebSearch for MockWebSearch {
    async fn search(&self, _query: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct MockFactory {
    clients: RemoteClients,
}

impl MockFactory {
    pub fn new(
        assistants: Arc<MockAssistantsApi>,
        documents: Arc<MockDocumentSearch>,
        web: Arc<MockWebSearch>,
    ) -> Self {
        Self {
            clients: RemoteClients {
                assistants,
                documents,
                web,
            },
        }
    }
}

impl ClientFactory for MockFactory {
    fn build(&self, _credentials: &Credentials) -> Result<RemoteClients> {
        Ok(self.clients.clone())
    }
}

pub fn hit(title: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: format!("https://docs.example/{title}"),
        content: format!("content of {title}"),
        score: 0.8,
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("sk-test", "tvly-test").unwrap()
}
