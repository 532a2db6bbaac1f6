//! Autosuggest lookups.
//!
//! The endpoint answers `GET /osjson.aspx?query=<q>&mkt=<market>` with an
//! OpenSearch suggestion array: `["<query>", ["suggestion", ...]]`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sortie_core::logging::SUGGESTIONS;

use crate::errors::SourceError;
use crate::http::HttpClient;
use crate::market::Market;

/// Source of related search terms.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Suggestions for `query` in `market`, in upstream order.
    ///
    /// Never fails: lookup errors are logged and yield an empty list.
    async fn suggest(&self, query: &str, market: &Market) -> Vec<String>;
}

/// Suggestion source backed by the Bing autosuggest endpoint.
pub struct BingSuggestions {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl BingSuggestions {
    /// Create a source rooted at `base_url` (e.g. `https://api.bing.com`).
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn url(&self, query: &str, market: &Market) -> String {
        format!(
            "{}/osjson.aspx?query={}&mkt={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(market.code())
        )
    }

    async fn fetch(&self, query: &str, market: &Market) -> Result<Vec<String>, SourceError> {
        let response = self
            .http
            .get(&self.url(query, market))
            .await?
            .ensure_success()?;
        parse_suggestions(&response.body)
    }
}

#[async_trait]
impl SuggestionSource for BingSuggestions {
    async fn suggest(&self, query: &str, market: &Market) -> Vec<String> {
        match self.fetch(query, market).await {
            Ok(suggestions) => {
                tracing::debug!(target: SUGGESTIONS, query, market = %market, count = suggestions.len(), "suggestions fetched");
                suggestions
            }
            Err(e) => {
                tracing::error!(target: SUGGESTIONS, query, market = %market, error = %e, "suggestion lookup failed");
                Vec::new()
            }
        }
    }
}

/// Extract the suggestion list (element `[1]`) from an OpenSearch response.
pub fn parse_suggestions(body: &str) -> Result<Vec<String>, SourceError> {
    let value: Value = serde_json::from_str(body)?;
    let list = value
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Parse {
            message: "missing suggestion array at index 1".into(),
        })?;
    Ok(list
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect())
}
