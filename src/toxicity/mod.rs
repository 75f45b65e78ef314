// Toxicity scoring: trait-based abstraction over the scoring provider.
//
// The ToxicityScorer trait defines the interface. PerspectiveScorer
// implements it using Google's Perspective API.

pub mod perspective;
pub mod traits;
