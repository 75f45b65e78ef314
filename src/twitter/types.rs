// Serde types for the v2 search response.
//
// Only the fields geotox reads are modeled. Everything optional in the API
// is optional here, since the search endpoint drops keys rather than
// sending nulls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response from `GET /2/tweets/search/all`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Absent when the query matched nothing.
    #[serde(default)]
    pub data: Option<Vec<Tweet>>,
    #[serde(default)]
    pub includes: Option<Includes>,
    #[serde(default)]
    pub meta: Option<Meta>,
    /// Partial errors, e.g. a referenced place that could not be hydrated.
    #[serde(default)]
    pub errors: Option<Vec<ApiProblem>>,
}

impl SearchResponse {
    /// The matched posts, empty when there were none.
    pub fn tweets(&self) -> &[Tweet] {
        self.data.as_deref().unwrap_or_default()
    }

    /// The expanded place records, empty when none were returned.
    pub fn places(&self) -> &[Place] {
        self.includes
            .as_ref()
            .and_then(|i| i.places.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub places: Option<Vec<Place>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub result_count: Option<u32>,
    #[serde(default)]
    pub newest_id: Option<String>,
    #[serde(default)]
    pub oldest_id: Option<String>,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiProblem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub geo: Option<Geo>,
}

impl Tweet {
    /// The place this post is tagged with, if any.
    pub fn place_id(&self) -> Option<&str> {
        self.geo.as_ref().and_then(|g| g.place_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub coordinates: Option<serde_json::Value>,
}

/// A place record from `includes.places`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub place_type: Option<String>,
}

impl Place {
    /// Best human-readable label: full name, then name, then the raw id.
    pub fn label(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}
