//! Document indexing: create the vector store and index uploaded files into it.

use std::sync::Arc;

use docchat_core::Result;
use docchat_core::remote::{AssistantsApi, FileBatch, RawFile, VectorStore};
use tokio_util::sync::CancellationToken;

/// Name given to the session's vector store.
pub const VECTOR_STORE_NAME: &str = "PDF 문서";

pub struct DocumentIndexingClient {
    api: Arc<dyn AssistantsApi>,
}

impl DocumentIndexingClient {
    pub fn new(api: Arc<dyn AssistantsApi>) -> Self {
        Self { api }
    }

    pub async fn create_collection(&self) -> Result<VectorStore> {
        let store = self
            .api
            .create_vector_store(VECTOR_STORE_NAME)
            .await
            .inspect_err(|err| tracing::error!("Vector store creation error: {}", err))?;

        tracing::info!("Created vector store {}", store.id);
        Ok(store)
    }

    /// Uploads `files` and waits until the service has indexed them.
    ///
    /// One attempt per call; a failure means nothing was indexed.
    pub async fn index_files(
        &self,
        files: Vec<RawFile>,
        collection_id: &str,
        cancel: &CancellationToken,
    ) -> Result<FileBatch> {
        let batch = self
            .api
            .upload_and_poll(collection_id, files, cancel)
            .await
            .inspect_err(|err| tracing::error!("File upload and processing error: {}", err))?;

        tracing::info!(
            "Indexed {} of {} files into {} (status {})",
            batch.file_counts.completed,
            batch.file_counts.total,
            collection_id,
            batch.status
        );
        Ok(batch)
    }
}
