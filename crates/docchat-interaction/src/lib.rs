//! HTTP clients for the remote services used by docchat.

mod http;

pub mod factory;
pub mod openai_assistants_api;
pub mod tavily_search;
pub mod web_search;

pub use factory::HttpClientFactory;
pub use openai_assistants_api::OpenAiAssistantsApi;
pub use tavily_search::TavilySearchClient;
pub use web_search::HttpWebSearch;
