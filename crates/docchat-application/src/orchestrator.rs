//! Chat orchestrator: central coordinator between user events and session state.
//!
//! Every handler takes the [`SessionContext`] explicitly. Remote failures never
//! escape a chat turn; they are logged and shown as fixed notices in the
//! transcript.

use std::future::Future;
use std::sync::Arc;

use docchat_core::config::{ChatSettings, Credentials};
use docchat_core::remote::{ClientFactory, FileBatch, RawFile, RemoteClients};
use docchat_core::session::{Message, SessionContext};
use docchat_core::{DocchatError, Result};
use futures::StreamExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::assistant::AssistantManagementClient;
use crate::conversation::{ConversationClient, WaitPolicy};
use crate::indexing::DocumentIndexingClient;
use crate::search::{SearchAnswer, SearchFallbackClient};

/// Shown in place of an answer when a conversation turn fails.
pub const REQUEST_ERROR_TEXT: &str = "요청 처리 중 오류가 발생했습니다.";
/// Shown in place of an answer when web search fails.
pub const WEB_SEARCH_ERROR_TEXT: &str = "인터넷 검색 중 오류가 발생했습니다.";

/// What a chat turn did to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty input; nothing was recorded.
    Ignored,
    /// The user message was recorded but the session has no assistant yet.
    NotReady,
    /// The user message and this assistant reply were recorded.
    Answered(String),
}

/// Result of one upload cycle.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub vector_store_id: String,
    /// `None` when indexing failed for this cycle.
    pub batch: Option<FileBatch>,
    /// Failures of the steps after vector store creation.
    pub errors: Vec<DocchatError>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.batch.is_some() && self.errors.is_empty()
    }
}

pub struct ChatOrchestrator {
    factory: Arc<dyn ClientFactory>,
    settings: ChatSettings,
}

impl ChatOrchestrator {
    pub fn new(factory: Arc<dyn ClientFactory>, settings: ChatSettings) -> Self {
        Self { factory, settings }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Builds the remote clients for the session from its two API keys.
    ///
    /// Keys are fixed for the lifetime of a session: configuring again with
    /// the same keys is a no-op, with different keys an error.
    pub fn configure(&self, ctx: &mut SessionContext, credentials: Credentials) -> Result<()> {
        if let Some(existing) = &ctx.credentials {
            if *existing == credentials {
                return Ok(());
            }
            return Err(DocchatError::config(
                "API keys are already set for this session",
            ));
        }

        let clients = self.factory.build(&credentials)?;
        ctx.credentials = Some(credentials);
        ctx.clients = Some(clients);
        tracing::info!("Remote clients initialized");
        Ok(())
    }

    /// Indexes uploaded files and makes sure an assistant and thread exist.
    ///
    /// Vector store, assistant and thread are created only when missing. The
    /// assistant is re-bound to the vector store on every call. Cancelling
    /// `cancel` abandons whichever remote call is in flight.
    pub async fn on_file_upload(
        &self,
        ctx: &mut SessionContext,
        files: Vec<RawFile>,
        cancel: &CancellationToken,
    ) -> Result<UploadReport> {
        let clients = require_clients(ctx)?;
        let indexing = DocumentIndexingClient::new(clients.assistants.clone());
        let assistants =
            AssistantManagementClient::with_model(clients.assistants.clone(), &self.settings.model);

        let vector_store = match &ctx.vector_store {
            Some(store) => store.clone(),
            None => {
                let store = cancellable(cancel, indexing.create_collection()).await?;
                ctx.vector_store = Some(store.clone());
                store
            }
        };

        let mut report = UploadReport {
            vector_store_id: vector_store.id.clone(),
            ..UploadReport::default()
        };

        let index = indexing.index_files(files, &vector_store.id, cancel);
        match cancellable(cancel, index).await {
            Ok(batch) => report.batch = Some(batch),
            Err(err) => report.errors.push(err),
        }
        if cancel.is_cancelled() {
            return Err(DocchatError::Cancelled);
        }

        if ctx.assistant.is_none() {
            match cancellable(cancel, assistants.create_assistant()).await {
                Ok(assistant) => ctx.assistant = Some(assistant),
                Err(err) => report.errors.push(err),
            }
        }

        if let Some(assistant_id) = ctx.assistant.as_ref().map(|a| a.id.clone()) {
            let bind = assistants.bind_collection(&assistant_id, &vector_store.id);
            match cancellable(cancel, bind).await {
                Ok(assistant) => ctx.assistant = Some(assistant),
                Err(err) => report.errors.push(err),
            }
        }

        if ctx.thread.is_none() {
            match cancellable(cancel, assistants.create_thread()).await {
                Ok(thread) => ctx.thread = Some(thread),
                Err(err) => report.errors.push(err),
            }
        }

        Ok(report)
    }

    /// Search turn: document search with web search fallback.
    pub async fn on_user_turn(
        &self,
        ctx: &mut SessionContext,
        text: &str,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        if text.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        ctx.push(Message::user(text));
        if !ctx.is_ready() {
            return TurnOutcome::NotReady;
        }
        let Some(clients) = ctx.clients.clone() else {
            return TurnOutcome::NotReady;
        };

        let search = SearchFallbackClient::new(clients.documents, clients.web);
        let answer = tokio::select! {
            biased;
            _ = cancel.cancelled() => SearchAnswer::Failed(DocchatError::Cancelled),
            answer = search.answer(text) => answer,
        };
        let reply = match answer {
            SearchAnswer::Documents(hits) => render_json(&hits),
            SearchAnswer::Web(results) => render_value(results),
            SearchAnswer::Failed(_) => WEB_SEARCH_ERROR_TEXT.to_string(),
        };

        ctx.push(Message::assistant(reply.clone()));
        TurnOutcome::Answered(reply)
    }

    /// Assistant turn: ask the assistant on the session thread.
    ///
    /// Each reply fragment is handed to `on_fragment` as it is produced; the
    /// joined reply is recorded in the transcript.
    pub async fn on_chat_input<F>(
        &self,
        ctx: &mut SessionContext,
        text: &str,
        cancel: &CancellationToken,
        mut on_fragment: F,
    ) -> TurnOutcome
    where
        F: FnMut(&str),
    {
        if text.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        ctx.push(Message::user(text));
        let (Some(clients), Some(assistant), Some(thread)) =
            (&ctx.clients, &ctx.assistant, &ctx.thread)
        else {
            return TurnOutcome::NotReady;
        };

        let conversation = ConversationClient::new(
            clients.assistants.clone(),
            WaitPolicy::from_settings(&self.settings),
        );

        let reply = match conversation
            .ask_streaming(&thread.id, &assistant.id, text, cancel)
            .await
        {
            Ok(mut fragments) => {
                let mut full = String::new();
                while let Some(fragment) = fragments.next().await {
                    on_fragment(&fragment);
                    full.push_str(&fragment);
                }
                full
            }
            Err(_) => {
                on_fragment(REQUEST_ERROR_TEXT);
                REQUEST_ERROR_TEXT.to_string()
            }
        };

        ctx.push(Message::assistant(reply.clone()));
        TurnOutcome::Answered(reply)
    }

    /// Saves the live conversation and clears it. Returns the saved name.
    pub fn save_session(&self, ctx: &mut SessionContext) -> Option<String> {
        let name = ctx.save()?;
        tracing::info!("Saved session '{}'", name);
        Some(name)
    }

    pub fn load_session(&self, ctx: &mut SessionContext, name: &str) -> bool {
        let loaded = ctx.load(name);
        if loaded {
            tracing::info!("Restored session '{}'", name);
        }
        loaded
    }

    pub fn clear_session(&self, ctx: &mut SessionContext) {
        ctx.clear();
    }
}

fn require_clients(ctx: &SessionContext) -> Result<RemoteClients> {
    ctx.clients
        .clone()
        .ok_or_else(|| DocchatError::not_configured("API keys have not been provided"))
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DocchatError::Cancelled),
        result = operation => result,
    }
}

fn render_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| {
        tracing::error!("Failed to render search results: {}", err);
        WEB_SEARCH_ERROR_TEXT.to_string()
    })
}

fn render_value(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => render_json(&other),
    }
}
