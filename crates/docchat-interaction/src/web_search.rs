//! Plain HTTP GET web search used as the fallback answer source.
//!
//! The query is substituted into the endpoint template as-is. It is not
//! percent-escaped, so characters such as `&` or `#` change the request URL.
//! Only `200 OK` counts as an answer.

use async_trait::async_trait;
use docchat_core::config::DEFAULT_WEB_SEARCH_ENDPOINT;
use docchat_core::remote::WebSearch;
use docchat_core::{DocchatError, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::http::{decode_json, map_http_error, send};

const SERVICE: &str = "WebSearch";
const QUERY_PLACEHOLDER: &str = "{query}";

#[derive(Clone)]
pub struct HttpWebSearch {
    client: Client,
    endpoint_template: String,
}

impl HttpWebSearch {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            endpoint_template: DEFAULT_WEB_SEARCH_ENDPOINT.to_string(),
        }
    }

    /// `template` must contain a `{query}` placeholder.
    pub fn with_endpoint_template(mut self, template: impl Into<String>) -> Self {
        self.endpoint_template = template.into();
        self
    }

    pub fn request_url(&self, query: &str) -> String {
        self.endpoint_template.replace(QUERY_PLACEHOLDER, query)
    }
}

impl Default for HttpWebSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearch for HttpWebSearch {
    async fn search(&self, query: &str) -> Result<Value> {
        let url = self.request_url(query);
        let response = send(SERVICE, self.client.get(url)).await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(SERVICE, status, body));
        }

        let mut body: Value = decode_json(SERVICE, response).await?;

        body.get_mut("results")
            .map(Value::take)
            .ok_or_else(|| DocchatError::EmptyResponse("web search response has no results".into()))
    }
}
