// geotox: toxicity scoring for geotagged Twitter/X search results.
//
// This is the library root. Each module is one stage or concern of the
// search -> place join -> scoring pipeline.

pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod places;
pub mod secrets;
pub mod toxicity;
pub mod twitter;
