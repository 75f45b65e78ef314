use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Default search terms: Brazilian politics and election hashtags.
pub const DEFAULT_QUERY_TERMS: &str = "#politica #eleicoes";

/// Default country filter (ISO 3166-1 alpha-2).
pub const DEFAULT_COUNTRY: &str = "BR";

/// Default page size for the single search call.
pub const DEFAULT_MAX_RESULTS: u32 = 100;

/// Default per-request timeout for both APIs.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The full-archive search endpoint accepts between 10 and 500 results per call.
const MAX_RESULTS_RANGE: std::ops::RangeInclusive<u32> = 10..=500;

/// The search filter, before it is rendered into Twitter query syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Free-form terms (hashtags, keywords) passed through as-is.
    pub terms: String,
    /// ISO country code for the `place_country:` operator.
    pub country: String,
    pub exclude_retweets: bool,
    pub require_geo: bool,
}

impl SearchQuery {
    pub fn new(terms: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            terms: terms.into(),
            country: country.into(),
            exclude_retweets: true,
            require_geo: true,
        }
    }

    /// Render into the search API's query language, e.g.
    /// `#politica #eleicoes place_country:BR -is:retweet has:geo`.
    pub fn render(&self) -> String {
        let mut parts = vec![self.terms.trim().to_string()];
        if !self.country.is_empty() {
            parts.push(format!("place_country:{}", self.country));
        }
        if self.exclude_retweets {
            parts.push("-is:retweet".to_string());
        }
        if self.require_geo {
            parts.push("has:geo".to_string());
        }
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }
}

/// Where the Twitter secrets are read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SecretBackend {
    /// The OS secret store (default)
    Keyring,
    /// `TWITTER_*` environment variables, e.g. from .env
    Env,
}

impl SecretBackend {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "env" => Ok(Self::Env),
            other => anyhow::bail!("Unknown secret store {other:?} (expected \"keyring\" or \"env\")"),
        }
    }
}

/// Values given on the command line. Each one replaces its env var.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub query: Option<String>,
    pub country: Option<String>,
    pub max_results: Option<u32>,
    pub secret_store: Option<SecretBackend>,
}

/// Central configuration loaded from environment variables.
///
/// Secrets for the search API live in the secret store (see `secrets`),
/// not here. The Perspective developer key is the one credential read
/// directly from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub query: SearchQuery,
    pub max_results: u32,
    /// Optional full-archive search window.
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub timeout: Duration,
    pub twitter_api_url: String,
    pub perspective_api_url: String,
    pub perspective_api_key: String,
    /// Language hints for Perspective. Empty means auto-detect.
    pub perspective_languages: Vec<String>,
    pub secret_store: SecretBackend,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok(), overrides)
    }

    /// Build configuration from any key lookup. Overrides win over the
    /// lookup, and unset keys fall back to defaults.
    ///
    /// Values are parsed but not range-checked; call `validate` once the
    /// configuration is final.
    pub fn from_lookup<F>(lookup: F, overrides: &Overrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_results = match (overrides.max_results, get("GEOTOX_MAX_RESULTS")) {
            (Some(n), _) => n,
            (None, Some(raw)) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("GEOTOX_MAX_RESULTS is not a number: {raw}"))?,
            (None, None) => DEFAULT_MAX_RESULTS,
        };

        let secret_store = match (overrides.secret_store, get("GEOTOX_SECRET_STORE")) {
            (Some(backend), _) => backend,
            (None, Some(raw)) => SecretBackend::parse(&raw)?,
            (None, None) => SecretBackend::Keyring,
        };

        let timeout_secs = match get("GEOTOX_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("GEOTOX_TIMEOUT_SECS is not a number: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            query: SearchQuery::new(
                overrides
                    .query
                    .clone()
                    .or_else(|| get("GEOTOX_QUERY"))
                    .unwrap_or_else(|| DEFAULT_QUERY_TERMS.to_string()),
                overrides
                    .country
                    .clone()
                    .or_else(|| get("GEOTOX_COUNTRY"))
                    .map(|c| c.trim().to_uppercase())
                    .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            ),
            max_results,
            start_time: get("GEOTOX_START_TIME")
                .map(|raw| parse_timestamp("GEOTOX_START_TIME", &raw))
                .transpose()?,
            end_time: get("GEOTOX_END_TIME")
                .map(|raw| parse_timestamp("GEOTOX_END_TIME", &raw))
                .transpose()?,
            timeout: Duration::from_secs(timeout_secs),
            twitter_api_url: get("TWITTER_API_URL")
                .unwrap_or_else(|| crate::twitter::client::DEFAULT_TWITTER_API_URL.to_string()),
            perspective_api_url: get("PERSPECTIVE_API_URL").unwrap_or_else(|| {
                crate::toxicity::perspective::DEFAULT_PERSPECTIVE_API_URL.to_string()
            }),
            perspective_api_key: get("PERSPECTIVE_API_KEY").unwrap_or_default(),
            perspective_languages: get("PERSPECTIVE_LANGUAGES")
                .map(|raw| {
                    raw.split(',')
                        .map(|l| l.trim().to_lowercase())
                        .filter(|l| !l.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            secret_store,
        })
    }

    /// Check the values that the search API would otherwise reject.
    pub fn validate(&self) -> Result<()> {
        if self.query.terms.trim().is_empty() {
            anyhow::bail!("Search query is empty. Set GEOTOX_QUERY or pass --query.");
        }
        if self.query.country.len() != 2 || !self.query.country.chars().all(|c| c.is_ascii_alphabetic()) {
            anyhow::bail!(
                "Country must be a two-letter ISO code (got {:?}).",
                self.query.country
            );
        }
        if !MAX_RESULTS_RANGE.contains(&self.max_results) {
            anyhow::bail!(
                "max_results must be between {} and {} (got {}).",
                MAX_RESULTS_RANGE.start(),
                MAX_RESULTS_RANGE.end(),
                self.max_results
            );
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start >= end {
                anyhow::bail!("GEOTOX_START_TIME must be before GEOTOX_END_TIME.");
            }
        }
        if self.timeout.is_zero() {
            anyhow::bail!("GEOTOX_TIMEOUT_SECS must be greater than zero.");
        }
        Ok(())
    }

    /// Check that the Perspective API key is configured.
    /// Call this before any operation that needs toxicity scoring.
    pub fn require_perspective(&self) -> Result<()> {
        if self.perspective_api_key.is_empty() {
            anyhow::bail!(
                "PERSPECTIVE_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}

fn parse_timestamp(key: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("{key} is not an RFC 3339 timestamp: {raw}"))
}
