//! Web search through the Tavily API, exposed to the model as `medical_web_search`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::agent::Tool;
use crate::error::AgentResult;
use crate::message::ToolSpec;

pub const SEARCH_TOOL_NAME: &str = "medical_web_search";

/// Returned to the model when the search call fails.
pub const SEARCH_FAILED: &str =
    "Error: Could not fetch search results. Please advise the user to consult a doctor.";

pub const NO_RESULTS: &str = "No results found.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TavilyConfig {
    pub api_key: String,
    pub endpoint: String,
    pub max_results: u32,
    pub timeout_secs: u64,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://api.tavily.com/search".to_string(),
            max_results: 5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    include_answer: bool,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

pub struct TavilySearch {
    config: TavilyConfig,
    client: Client,
}

impl TavilySearch {
    pub fn new(config: TavilyConfig) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, reqwest::Error> {
        let request = SearchRequest {
            api_key: &self.config.api_key,
            query,
            search_depth: "basic",
            include_answer: true,
            max_results: self.config.max_results,
        };
        self.client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// Render results as `Title/URL/Content` blocks separated by a blank line.
fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }
    results
        .iter()
        .map(|r| format!("Title: {}\nURL: {}\nContent: {}", r.title, r.url, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Tool for TavilySearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: SEARCH_TOOL_NAME.to_string(),
            description: "Search the web for medical information, doctors, and medicines.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query string."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, arguments: serde_json::Value) -> String {
        let args: SearchArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => return format!("Error: {} expects a 'query' string: {}", SEARCH_TOOL_NAME, e),
        };

        tracing::info!("Searching Tavily for: {}", args.query);
        match self.search(&args.query).await {
            Ok(response) => format_results(&response.results),
            Err(e) => {
                tracing::error!("Tavily Search API Error: {}", e);
                SEARCH_FAILED.to_string()
            }
        }
    }
}
