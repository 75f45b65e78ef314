// Search -> place join -> toxicity scoring.
//
// One search call, one place index built from its `includes`, then a
// sequential loop that scores each qualifying post's own text. Nothing runs
// concurrently and nothing is retried.
//
// Failure policy per post: a lookup miss is skipped, an ordinary scoring
// failure is recorded and the loop moves on, and an auth rejection stops
// the run since every remaining call would be rejected too.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::is_unauthorized;
use crate::places::{PlaceIndex, Qualification};
use crate::toxicity::traits::ToxicityScorer;
use crate::twitter::types::{Place, Tweet};
use crate::twitter::{SearchRequest, TweetSearch};

/// A qualifying post together with its place and its score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPost {
    pub tweet_id: String,
    pub text: String,
    pub author_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub place: Place,
    pub toxicity: f64,
    pub languages: Vec<String>,
    /// The decoded scoring response.
    pub response: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NoGeoTag,
    UnknownPlace { place_id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedPost {
    pub tweet_id: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedPost {
    pub tweet_id: String,
    pub error: String,
}

/// Everything one run produced, in search-result order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub query: String,
    pub posts_found: usize,
    pub places_found: usize,
    pub scored: Vec<ScoredPost>,
    pub skipped: Vec<SkippedPost>,
    pub failed: Vec<FailedPost>,
}

/// Run the whole pipeline: one search, then score every qualifying post.
pub async fn run(
    search: &dyn TweetSearch,
    scorer: &dyn ToxicityScorer,
    request: &SearchRequest,
) -> Result<RunReport> {
    let query = request.query.render();
    info!(query = %query, max_results = request.max_results, "Searching");

    let response = search.search(request).await?;
    let index = PlaceIndex::build(response.places());

    let mut report = score_posts(scorer, &index, response.tweets()).await?;
    report.query = query;
    report.places_found = index.len();
    Ok(report)
}

/// Join each post against `index` and score the qualifying ones, in order.
pub async fn score_posts(
    scorer: &dyn ToxicityScorer,
    index: &PlaceIndex,
    tweets: &[Tweet],
) -> Result<RunReport> {
    let mut report = RunReport {
        posts_found: tweets.len(),
        places_found: index.len(),
        ..Default::default()
    };

    if index.is_empty() && !tweets.is_empty() {
        warn!(
            posts = tweets.len(),
            "Search returned no place records; every post will be skipped"
        );
    }

    for tweet in tweets {
        let place = match index.classify(tweet) {
            Qualification::Qualifying(place) => place,
            Qualification::NoGeoTag => {
                debug!(tweet_id = %tweet.id, "Skipping post without a geo tag");
                report.skipped.push(SkippedPost {
                    tweet_id: tweet.id.clone(),
                    reason: SkipReason::NoGeoTag,
                });
                continue;
            }
            Qualification::UnknownPlace(place_id) => {
                debug!(tweet_id = %tweet.id, place_id = %place_id, "Skipping post with unknown place");
                report.skipped.push(SkippedPost {
                    tweet_id: tweet.id.clone(),
                    reason: SkipReason::UnknownPlace { place_id },
                });
                continue;
            }
        };

        match scorer.score_text(&tweet.text).await {
            Ok(result) => report.scored.push(ScoredPost {
                tweet_id: tweet.id.clone(),
                text: tweet.text.clone(),
                author_id: tweet.author_id.clone(),
                created_at: tweet.created_at,
                place: place.clone(),
                toxicity: result.toxicity,
                languages: result.languages,
                response: result.raw,
            }),
            Err(e) if is_unauthorized(&e) => {
                return Err(e.context(format!("Scoring aborted at post {}", tweet.id)));
            }
            Err(e) => {
                warn!(tweet_id = %tweet.id, error = %format!("{e:#}"), "Failed to score post");
                report.failed.push(FailedPost {
                    tweet_id: tweet.id.clone(),
                    error: format!("{e:#}"),
                });
            }
        }
    }

    info!(
        scored = report.scored.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "Scoring complete"
    );

    Ok(report)
}
