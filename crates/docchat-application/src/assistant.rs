//! Assistant management: create the assistant, bind its vector store, open a thread.

use std::sync::Arc;

use docchat_core::Result;
use docchat_core::config::DEFAULT_MODEL;
use docchat_core::remote::{Assistant, AssistantSpec, AssistantsApi, Thread};

pub const ASSISTANT_NAME: &str = "PDF 파일 검색 어시스턴트";
pub const ASSISTANT_INSTRUCTIONS: &str =
    "업로드된 PDF 파일을 검색하고 관련 정보를 제공하는 어시스턴트입니다.";
pub const FILE_SEARCH_TOOL: &str = "file_search";

/// The fixed assistant configuration, with the model as the only variable.
pub fn assistant_spec(model: &str) -> AssistantSpec {
    AssistantSpec {
        name: ASSISTANT_NAME.to_string(),
        instructions: ASSISTANT_INSTRUCTIONS.to_string(),
        tools: vec![FILE_SEARCH_TOOL.to_string()],
        model: model.to_string(),
    }
}

pub struct AssistantManagementClient {
    api: Arc<dyn AssistantsApi>,
    spec: AssistantSpec,
}

impl AssistantManagementClient {
    pub fn new(api: Arc<dyn AssistantsApi>) -> Self {
        Self::with_model(api, DEFAULT_MODEL)
    }

    pub fn with_model(api: Arc<dyn AssistantsApi>, model: &str) -> Self {
        Self {
            api,
            spec: assistant_spec(model),
        }
    }

    pub async fn create_assistant(&self) -> Result<Assistant> {
        let assistant = self
            .api
            .create_assistant(&self.spec)
            .await
            .inspect_err(|err| tracing::error!("Assistant creation error: {}", err))?;

        tracing::info!("Created assistant {} ({})", assistant.id, assistant.model);
        Ok(assistant)
    }

    /// Points the assistant's `file_search` tool at `collection_id`.
    ///
    /// Binding the same collection again leaves the assistant unchanged.
    pub async fn bind_collection(&self, assistant_id: &str, collection_id: &str) -> Result<Assistant> {
        self.api
            .update_assistant_vector_stores(assistant_id, &[collection_id.to_string()])
            .await
            .inspect_err(|err| tracing::error!("Assistant update error: {}", err))
    }

    pub async fn create_thread(&self) -> Result<Thread> {
        let thread = self
            .api
            .create_thread()
            .await
            .inspect_err(|err| tracing::error!("Thread creation error: {}", err))?;

        tracing::info!("Created thread {}", thread.id);
        Ok(thread)
    }
}
