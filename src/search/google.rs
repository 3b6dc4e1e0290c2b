//! Google Custom Search JSON API backend

use super::client::{SearchHit, WebSearch};
use super::error::SearchError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API refuses `num` above this value
const MAX_RESULTS_PER_REQUEST: usize = 10;

pub struct GoogleCustomSearch {
    api_key: String,
    engine_id: String,
    endpoint: String,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleCustomSearch {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SearchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| SearchError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            http_client,
        })
    }

    /// Points the client at a different endpoint, used by tests
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl WebSearch for GoogleCustomSearch {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        if num_results == 0 {
            return Ok(Vec::new());
        }
        let num = num_results.min(MAX_RESULTS_PER_REQUEST).to_string();

        debug!(query, num = %num, "Sending search request");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Search request error: {}", e);
                SearchError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        let hits: Vec<SearchHit> = parsed
            .items
            .into_iter()
            .take(num_results)
            .map(|item| SearchHit {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect();

        info!(query, results = hits.len(), "Search completed");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "google"
    }
}

impl std::fmt::Debug for GoogleCustomSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCustomSearch")
            .field("engine_id", &self.engine_id)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
