// Google Perspective API implementation.
//
// Perspective scores text for toxicity and related attributes. geotox only
// asks for TOXICITY. Calls are made one at a time with no rate limiting or
// retries; each is independent.
//
// API docs: https://developers.perspectiveapi.com/s/about-the-api-methods

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ToxicityResult, ToxicityScorer};
use crate::error::ApiError;
use crate::output::truncate_chars;

/// Default Perspective (comment analyzer) endpoint.
pub const DEFAULT_PERSPECTIVE_API_URL: &str = "https://commentanalyzer.googleapis.com";

const ANALYZE_PATH: &str = "v1alpha1/comments:analyze";
const TOXICITY: &str = "TOXICITY";

/// Perspective API toxicity scorer.
pub struct PerspectiveScorer {
    client: Client,
    base_url: String,
    api_key: String,
    languages: Vec<String>,
}

impl PerspectiveScorer {
    /// Create a scorer. `languages` may be empty to let Perspective detect it.
    pub fn new(
        base_url: &str,
        api_key: String,
        languages: Vec<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            languages,
        })
    }
}

/// Build the analyze request body for one text.
pub fn build_request(text: &str, languages: &[String]) -> AnalyzeRequest {
    AnalyzeRequest {
        comment: Comment {
            text: text.to_string(),
        },
        requested_attributes: RequestedAttributes {
            toxicity: AttributeConfig {},
        },
        languages: languages.to_vec(),
    }
}

/// Decode an analyze response into a `ToxicityResult`, keeping the raw document.
pub fn parse_response(raw: serde_json::Value) -> Result<ToxicityResult> {
    let parsed: AnalyzeResponse = serde_json::from_value(raw.clone())
        .context("Perspective response has an unexpected shape")?;

    let toxicity = parsed
        .attribute_scores
        .get(TOXICITY)
        .map(|score| score.summary_score.value)
        .ok_or_else(|| anyhow::anyhow!("Perspective response has no {TOXICITY} score"))?;

    let languages = if parsed.languages.is_empty() {
        parsed.detected_languages
    } else {
        parsed.languages
    };

    Ok(ToxicityResult {
        toxicity,
        languages,
        raw,
    })
}

#[async_trait]
impl ToxicityScorer for PerspectiveScorer {
    async fn score_text(&self, text: &str) -> Result<ToxicityResult> {
        let url = format!("{}/{}", self.base_url, ANALYZE_PATH);
        let request = build_request(text, &self.languages);

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .context("Failed to call Perspective API")?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Unauthorized {
                service: "Perspective API",
                status: status.as_u16(),
                body,
            }
            .into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Perspective API returned {}: {}", status, body);
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Perspective API response")?;

        let result = parse_response(raw)?;

        debug!(
            toxicity = result.toxicity,
            languages = ?result.languages,
            text_preview = %truncate_chars(text, 50),
            "Scored text"
        );

        Ok(result)
    }
}

// --- Perspective API request/response types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub comment: Comment,
    pub requested_attributes: RequestedAttributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Comment {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RequestedAttributes {
    pub toxicity: AttributeConfig,
}

#[derive(Debug, Serialize)]
pub struct AttributeConfig {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    attribute_scores: HashMap<String, AttributeScore>,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    detected_languages: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Deserialize)]
struct SummaryScore {
    value: f64,
}
