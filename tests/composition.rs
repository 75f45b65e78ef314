// Composition tests: search -> place join -> scoring, end to end.
//
// The search source and the scorer are in-memory fakes, so these run
// without network access. The fakes record every call they receive.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use geotox::config::{Config, Overrides, SearchQuery};
use geotox::context::AppContext;
use geotox::error::ApiError;
use geotox::pipeline::{self, SkipReason};
use geotox::secrets::{SecretStore, TWITTER_ACCOUNTS};
use geotox::toxicity::traits::{ToxicityResult, ToxicityScorer};
use geotox::twitter::types::SearchResponse;
use geotox::twitter::{SearchRequest, TweetSearch};
use serde_json::json;

// ============================================================
// Fakes
// ============================================================

struct FakeSearch {
    response: SearchResponse,
    calls: Mutex<usize>,
}

impl FakeSearch {
    fn new(json: serde_json::Value) -> Self {
        Self {
            response: serde_json::from_value(json).unwrap(),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl TweetSearch for FakeSearch {
    async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.response.clone())
    }
}

/// A search source whose bearer token is always rejected.
struct RejectingSearch;

#[async_trait]
impl TweetSearch for RejectingSearch {
    async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse> {
        Err(ApiError::Unauthorized {
            service: "Twitter search API",
            status: 401,
            body: "Unauthorized".to_string(),
        }
        .into())
    }
}

/// Scores every text 0.5, except texts listed in `fail_on` (transport-style
/// error) and `reject_on` (auth rejection).
#[derive(Default)]
struct RecordingScorer {
    texts: Mutex<Vec<String>>,
    fail_on: Vec<String>,
    reject_on: Vec<String>,
}

impl RecordingScorer {
    fn calls(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToxicityScorer for RecordingScorer {
    async fn score_text(&self, text: &str) -> Result<ToxicityResult> {
        self.texts.lock().unwrap().push(text.to_string());
        if self.reject_on.iter().any(|t| t == text) {
            return Err(ApiError::Unauthorized {
                service: "Perspective API",
                status: 403,
                body: "API key not valid".to_string(),
            }
            .into());
        }
        if self.fail_on.iter().any(|t| t == text) {
            anyhow::bail!("connection reset by peer");
        }
        Ok(ToxicityResult {
            toxicity: 0.5,
            languages: vec!["pt".to_string()],
            raw: json!({"attributeScores": {"TOXICITY": {"summaryScore": {"value": 0.5}}}}),
        })
    }
}

fn request() -> SearchRequest {
    SearchRequest {
        query: SearchQuery::new("#politica #eleicoes", "BR"),
        max_results: 100,
        start_time: None,
        end_time: None,
    }
}

fn places() -> serde_json::Value {
    json!([
        {"id": "p1", "full_name": "Rio de Janeiro, Brasil"},
        {"id": "p2", "full_name": "Salvador, Brasil"}
    ])
}

// ============================================================
// Pipeline
// ============================================================

#[tokio::test]
async fn zero_posts_never_calls_the_scorer() {
    let search = FakeSearch::new(json!({"meta": {"result_count": 0}}));
    let scorer = RecordingScorer::default();

    let report = pipeline::run(&search, &scorer, &request()).await.unwrap();

    assert_eq!(*search.calls.lock().unwrap(), 1);
    assert!(scorer.calls().is_empty());
    assert_eq!(report.posts_found, 0);
    assert!(report.scored.is_empty());
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn two_qualifying_posts_are_scored_with_their_own_text() {
    let search = FakeSearch::new(json!({
        "data": [
            {"id": "1", "text": "primeiro post #eleicoes", "geo": {"place_id": "p1"}},
            {"id": "2", "text": "segundo post #politica", "geo": {"place_id": "p2"}}
        ],
        "includes": {"places": places()}
    }));
    let scorer = RecordingScorer::default();

    let report = pipeline::run(&search, &scorer, &request()).await.unwrap();

    assert_eq!(
        scorer.calls(),
        vec!["primeiro post #eleicoes", "segundo post #politica"]
    );
    assert_eq!(report.scored.len(), 2);
    assert_eq!(report.scored[0].tweet_id, "1");
    assert_eq!(report.scored[0].place.id, "p1");
    assert_eq!(report.scored[1].place.label(), "Salvador, Brasil");
    assert_eq!(
        report.query,
        "#politica #eleicoes place_country:BR -is:retweet has:geo"
    );
    assert_eq!(report.places_found, 2);
}

#[tokio::test]
async fn non_qualifying_posts_are_skipped() {
    let search = FakeSearch::new(json!({
        "data": [
            {"id": "1", "text": "com lugar", "geo": {"place_id": "p1"}},
            {"id": "2", "text": "lugar desconhecido", "geo": {"place_id": "p3"}},
            {"id": "3", "text": "sem geo"}
        ],
        "includes": {"places": places()}
    }));
    let scorer = RecordingScorer::default();

    let report = pipeline::run(&search, &scorer, &request()).await.unwrap();

    assert_eq!(scorer.calls(), vec!["com lugar"]);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::UnknownPlace {
            place_id: "p3".to_string()
        }
    );
    assert_eq!(report.skipped[1].reason, SkipReason::NoGeoTag);
}

#[tokio::test]
async fn scoring_failure_does_not_stop_the_batch() {
    let search = FakeSearch::new(json!({
        "data": [
            {"id": "1", "text": "falha", "geo": {"place_id": "p1"}},
            {"id": "2", "text": "funciona", "geo": {"place_id": "p2"}}
        ],
        "includes": {"places": places()}
    }));
    let scorer = RecordingScorer {
        fail_on: vec!["falha".to_string()],
        ..Default::default()
    };

    let report = pipeline::run(&search, &scorer, &request()).await.unwrap();

    assert_eq!(scorer.calls().len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].tweet_id, "1");
    assert!(report.failed[0].error.contains("connection reset"));
    assert_eq!(report.scored.len(), 1);
    assert_eq!(report.scored[0].tweet_id, "2");
}

#[tokio::test]
async fn auth_rejection_stops_the_run() {
    let search = FakeSearch::new(json!({
        "data": [
            {"id": "1", "text": "rejeitado", "geo": {"place_id": "p1"}},
            {"id": "2", "text": "nunca enviado", "geo": {"place_id": "p2"}}
        ],
        "includes": {"places": places()}
    }));
    let scorer = RecordingScorer {
        reject_on: vec!["rejeitado".to_string()],
        ..Default::default()
    };

    let err = pipeline::run(&search, &scorer, &request()).await.unwrap_err();

    assert!(geotox::error::is_unauthorized(&err));
    assert_eq!(scorer.calls(), vec!["rejeitado"]);
}

#[tokio::test]
async fn search_rejection_aborts_before_scoring() {
    let scorer = RecordingScorer::default();

    let err = pipeline::run(&RejectingSearch, &scorer, &request())
        .await
        .unwrap_err();

    assert!(geotox::error::is_unauthorized(&err));
    assert!(scorer.calls().is_empty());
}

#[tokio::test]
async fn report_serializes_to_json() {
    let search = FakeSearch::new(json!({
        "data": [
            {"id": "1", "text": "ok", "geo": {"place_id": "p1"}},
            {"id": "2", "text": "sem geo"}
        ],
        "includes": {"places": places()}
    }));
    let scorer = RecordingScorer::default();

    let report = pipeline::run(&search, &scorer, &request()).await.unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&geotox::output::report_json(&report).unwrap()).unwrap();

    assert_eq!(value["scored"][0]["tweet_id"], "1");
    assert_eq!(value["scored"][0]["toxicity"], 0.5);
    assert_eq!(value["skipped"][0]["reason"], "no_geo_tag");
}

// ============================================================
// Startup: credentials are checked before any client exists
// ============================================================

struct MapStore(HashMap<String, String>);

impl SecretStore for MapStore {
    fn get_secret(&self, _service: &str, account: &str) -> Result<Option<String>> {
        Ok(self.0.get(account).cloned())
    }
}

fn config_with_key() -> Config {
    Config::from_lookup(
        |key| (key == "PERSPECTIVE_API_KEY").then(|| "dev-key".to_string()),
        &Overrides::default(),
    )
    .unwrap()
}

#[test]
fn missing_secret_fails_before_clients_are_built() {
    let store = MapStore(
        TWITTER_ACCOUNTS
            .iter()
            .filter(|a| **a != "token_secret")
            .map(|a| (a.to_string(), "x".to_string()))
            .collect(),
    );
    let err = AppContext::new(config_with_key(), &store)
        .err()
        .expect("missing secret should fail");
    assert!(err.to_string().contains("token_secret"));
}

#[test]
fn missing_developer_key_fails_before_clients_are_built() {
    let store = MapStore(
        TWITTER_ACCOUNTS
            .iter()
            .map(|a| (a.to_string(), "x".to_string()))
            .collect(),
    );
    let config = Config::from_lookup(|_| None, &Overrides::default()).unwrap();
    let err = AppContext::new(config, &store)
        .err()
        .expect("missing developer key should fail");
    assert!(err.to_string().contains("PERSPECTIVE_API_KEY"));
}

#[test]
fn complete_credentials_build_a_context() {
    let store = MapStore(
        TWITTER_ACCOUNTS
            .iter()
            .map(|a| (a.to_string(), "x".to_string()))
            .collect(),
    );
    let ctx = AppContext::new(config_with_key(), &store).unwrap();
    assert_eq!(ctx.search_request().max_results, 100);
}
