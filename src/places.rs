// Place join: place id -> place record, built from one search response.
//
// A post qualifies for scoring only when its geo tag points at a place that
// the search expanded into `includes.places`. Lookups are explicit presence
// checks; a miss is a classification, never an error.

use std::collections::HashMap;

use crate::twitter::types::{Place, Tweet};

/// Read-only index of the places returned alongside a search.
#[derive(Debug, Clone, Default)]
pub struct PlaceIndex {
    places: HashMap<String, Place>,
}

/// Outcome of joining one post against the place index.
#[derive(Debug, Clone, PartialEq)]
pub enum Qualification<'a> {
    /// The post's place is in the index.
    Qualifying(&'a Place),
    /// The post carries no place id at all.
    NoGeoTag,
    /// The post names a place that the response did not include.
    UnknownPlace(String),
}

impl PlaceIndex {
    /// Build the index in one pass. Later duplicates replace earlier ones.
    pub fn build(places: &[Place]) -> Self {
        let places = places
            .iter()
            .map(|place| (place.id.clone(), place.clone()))
            .collect();
        Self { places }
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn get(&self, place_id: &str) -> Option<&Place> {
        self.places.get(place_id)
    }

    /// Classify a post by its geo tag.
    pub fn classify(&self, tweet: &Tweet) -> Qualification<'_> {
        match tweet.place_id() {
            None => Qualification::NoGeoTag,
            Some(id) => match self.get(id) {
                Some(place) => Qualification::Qualifying(place),
                None => Qualification::UnknownPlace(id.to_string()),
            },
        }
    }
}
