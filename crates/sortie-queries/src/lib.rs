//! # sortie-queries
//!
//! Candidate search queries for the sortie engine.
//!
//! - [`http::HttpClient`]: transport seam, with [`http::ReqwestHttpClient`]
//! - [`suggestions::BingSuggestions`]: autosuggest expansion of a term
//! - [`trends::GoogleTrends`]: trending topics for a country
//! - [`market::Market`]: country → market code mapping
//! - [`supplier::QuerySupplier`]: composes the sources into the shuffled,
//!   de-duplicated primary candidate list plus the fallback batch
//!
//! Upstream failures never propagate: a failed lookup yields an empty batch
//! and an `error` log line.

#![deny(unsafe_code)]

pub mod errors;
pub mod http;
pub mod market;
pub mod suggestions;
pub mod supplier;
pub mod trends;

pub use errors::SourceError;
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use market::Market;
pub use suggestions::{BingSuggestions, SuggestionSource};
pub use supplier::{Provenance, QueryCandidate, QuerySupplier};
pub use trends::{GoogleTrends, TrendingTopic, TrendsSource};
