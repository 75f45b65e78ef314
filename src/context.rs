// Explicit run context: configuration plus the two API clients.
//
// Built once at startup and passed to the pipeline by reference. All
// credential checks happen in `AppContext::new`, so a missing secret stops
// the process before any client exists or any request is sent.

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::secrets::{SecretStore, TwitterCredentials};
use crate::toxicity::perspective::PerspectiveScorer;
use crate::twitter::client::TwitterClient;
use crate::twitter::SearchRequest;

pub struct AppContext {
    pub config: Config,
    pub search: TwitterClient,
    pub scorer: PerspectiveScorer,
}

impl AppContext {
    /// Validate configuration, load credentials, and build both clients.
    pub fn new(config: Config, store: &dyn SecretStore) -> Result<Self> {
        config.validate()?;
        config.require_perspective()?;
        let credentials = TwitterCredentials::load(store)?;

        let search = TwitterClient::new(
            &config.twitter_api_url,
            credentials.bearer_token,
            config.timeout,
        )?;
        let scorer = create_scorer(&config)?;

        Ok(Self {
            config,
            search,
            scorer,
        })
    }

    pub fn search_request(&self) -> SearchRequest {
        SearchRequest::from_config(&self.config)
    }
}

/// Build the Perspective scorer from configuration.
pub fn create_scorer(config: &Config) -> Result<PerspectiveScorer> {
    info!("Using Perspective API toxicity scorer");
    PerspectiveScorer::new(
        &config.perspective_api_url,
        config.perspective_api_key.clone(),
        config.perspective_languages.clone(),
        config.timeout,
    )
}
