use std::sync::Arc;

use docchat_core::{DocchatError, Result};
use docchat_core::config::{ChatSettings, Credentials};
use docchat_core::remote::{ClientFactory, RemoteClients};
use reqwest::Client;

use crate::{HttpWebSearch, OpenAiAssistantsApi, TavilySearchClient};

/// Builds the HTTP clients for a session. All clients share one connection pool.
#[derive(Clone)]
pub struct HttpClientFactory {
    client: Client,
    settings: ChatSettings,
}

impl HttpClientFactory {
    /// Every request made by the built clients is bounded by
    /// `settings.request_timeout_secs`.
    pub fn new(settings: ChatSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|err| DocchatError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { client, settings })
    }
}

impl ClientFactory for HttpClientFactory {
    fn build(&self, credentials: &Credentials) -> Result<RemoteClients> {
        let assistants = OpenAiAssistantsApi::with_client(
            self.client.clone(),
            credentials.openai_api_key(),
        )
        .with_base_url(&self.settings.openai_base_url);

        let documents =
            TavilySearchClient::with_client(self.client.clone(), credentials.tavily_api_key())
                .with_endpoint(&self.settings.tavily_endpoint);

        let web = HttpWebSearch::with_client(self.client.clone())
            .with_endpoint_template(&self.settings.web_search_endpoint);

        Ok(RemoteClients {
            assistants: Arc::new(assistants),
            documents: Arc::new(documents),
            web: Arc::new(web),
        })
    }
}
