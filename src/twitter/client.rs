// Twitter/X v2 search client: bearer-token (app-only) context over HTTP.
//
// A thin reqwest wrapper: one full-archive search call with place
// expansion. No pagination, no retries. Any failure is returned to the
// caller as fatal.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use super::types::SearchResponse;
use super::{SearchRequest, TweetSearch};
use crate::error::ApiError;

/// Default base URL for the Twitter/X API.
pub const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com";

const SEARCH_ALL_PATH: &str = "2/tweets/search/all";
const TWEET_FIELDS: &str = "author_id,created_at,geo,lang";
const PLACE_FIELDS: &str = "country,country_code,full_name,name,place_type";
const EXPANSIONS: &str = "geo.place_id";

/// Authenticated search client.
pub struct TwitterClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl TwitterClient {
    /// Create a client for the given base URL.
    ///
    /// Every request carries `timeout`; a timed-out call is a transport error.
    pub fn new(base_url: &str, bearer_token: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("geotox/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token,
        })
    }

    /// Query-string parameters for a search call.
    pub fn search_params(request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", request.query.render()),
            ("max_results", request.max_results.to_string()),
            ("expansions", EXPANSIONS.to_string()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
            ("place.fields", PLACE_FIELDS.to_string()),
        ];
        if let Some(start) = request.start_time {
            params.push((
                "start_time",
                start.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(end) = request.end_time {
            params.push(("end_time", end.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        params
    }
}

#[async_trait]
impl TweetSearch for TwitterClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let url = format!("{}/{}", self.base_url, SEARCH_ALL_PATH);
        let params = Self::search_params(request);

        debug!(query = %request.query.render(), max_results = request.max_results, "Search request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&params)
            .send()
            .await
            .context("Search request failed")?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Unauthorized {
                service: "Twitter search API",
                status: status.as_u16(),
                body,
            }
            .into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Twitter search returned {status}: {body}");
        }

        let result: SearchResponse = response
            .json()
            .await
            .context("Failed to parse search response")?;

        for problem in result.errors.iter().flatten() {
            warn!(
                title = problem.title.as_deref().unwrap_or("unknown"),
                resource_id = problem.resource_id.as_deref().unwrap_or(""),
                "Search response reported a partial error: {}",
                problem.detail.as_deref().unwrap_or("")
            );
        }

        info!(
            posts = result.tweets().len(),
            places = result.places().len(),
            "Search complete"
        );

        Ok(result)
    }
}
