// Toxicity scorer trait.
//
// The pipeline only sees this interface. The Perspective API is the one
// shipped implementation; tests drive the pipeline with fakes.

use anyhow::Result;
use async_trait::async_trait;

/// The result of scoring a single piece of text for toxicity.
#[derive(Debug, Clone)]
pub struct ToxicityResult {
    /// TOXICITY summary score from 0.0 (benign) to 1.0 (very toxic)
    pub toxicity: f64,
    /// Languages the provider scored the text in (if it reports them)
    pub languages: Vec<String>,
    /// The decoded response document, kept for display
    pub raw: serde_json::Value,
}

/// Trait for scoring text toxicity. Async because providers are HTTP APIs.
#[async_trait]
pub trait ToxicityScorer: Send + Sync {
    /// Score a single text for toxicity.
    async fn score_text(&self, text: &str) -> Result<ToxicityResult>;
}
