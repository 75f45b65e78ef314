// Twitter/X search API: client and response types.
//
// One call is made per run: a full-archive search with place expansion.
// The TweetSearch trait sits in front of the client so the pipeline can be
// driven by any source of search responses.

pub mod client;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::SearchQuery;
use types::SearchResponse;

/// Parameters for a single search call.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: SearchQuery,
    pub max_results: u32,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl SearchRequest {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            query: config.query.clone(),
            max_results: config.max_results,
            start_time: config.start_time,
            end_time: config.end_time,
        }
    }
}

/// A source of search results.
#[async_trait]
pub trait TweetSearch: Send + Sync {
    /// Run one search and return the decoded response.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}
