//! Tavily search client used as the document search source.

use async_trait::async_trait;
use docchat_core::Result;
use docchat_core::config::DEFAULT_TAVILY_ENDPOINT;
use docchat_core::remote::{DocumentSearch, SearchHit};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::send_json;

const SERVICE: &str = "Tavily";
const DEFAULT_MAX_RESULTS: u32 = 5;

#[derive(Clone)]
pub struct TavilySearchClient {
    client: Client,
    api_key: String,
    endpoint: String,
    max_results: u32,
}

impl TavilySearchClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: DEFAULT_TAVILY_ENDPOINT.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

#[async_trait]
impl DocumentSearch for TavilySearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let body = SearchRequest {
            query,
            search_depth: "basic",
            max_results: self.max_results,
        };

        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        let response: SearchResponse = send_json(SERVICE, request).await?;

        tracing::debug!(
            "Tavily returned {} results for '{}'",
            response.results.len(),
            query
        );
        Ok(response.results)
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}
