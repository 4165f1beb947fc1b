//! Search turn: document search first, web search when that finds nothing.

use std::sync::Arc;

use docchat_core::remote::{DocumentSearch, SearchHit, WebSearch};
use docchat_core::{DocchatError, Result};
use serde_json::Value;

/// Where the answer to a search turn came from.
#[derive(Debug, Clone)]
pub enum SearchAnswer {
    Documents(Vec<SearchHit>),
    Web(Value),
    /// The web search fallback failed as well.
    Failed(DocchatError),
}

pub struct SearchFallbackClient {
    documents: Arc<dyn DocumentSearch>,
    web: Arc<dyn WebSearch>,
}

impl SearchFallbackClient {
    pub fn new(documents: Arc<dyn DocumentSearch>, web: Arc<dyn WebSearch>) -> Self {
        Self { documents, web }
    }

    pub async fn web_search(&self, query: &str) -> Result<Value> {
        self.web
            .search(query)
            .await
            .inspect_err(|err| tracing::error!("Internet search error: {}", err))
    }

    /// Asks document search; falls back to exactly one web search when it
    /// returns nothing or fails.
    pub async fn answer(&self, query: &str) -> SearchAnswer {
        match self.documents.search(query).await {
            Ok(hits) if !hits.is_empty() => return SearchAnswer::Documents(hits),
            Ok(_) => tracing::debug!("Document search found nothing for '{}'", query),
            Err(err) => tracing::error!("Document search error: {}", err),
        }

        match self.web_search(query).await {
            Ok(results) => SearchAnswer::Web(results),
            Err(err) => SearchAnswer::Failed(err),
        }
    }
}
