//! Trending-topic lookups over the trends batch endpoint.
//!
//! The endpoint answers with an anti-XSSI prefix followed by a
//! line-oriented envelope. The first line starting with `[` holds the RPC
//! frame; its `[0][2]` element is a JSON document encoded as a string, whose
//! `[1]` element is the topic list. Each topic carries its title at `[0]` and
//! related queries at `[9][1..]`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sortie_core::logging::TRENDS;

use crate::errors::SourceError;
use crate::http::HttpClient;
use crate::market::Market;

/// Below this many topics a non-US geo is considered too thin and the
/// lookup retries with `US`.
pub const MIN_TOPICS: usize = 90;

const FALLBACK_GEO: &str = "US";
const RPC_ID: &str = "i0OFE";

/// A trending topic and its related search terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrendingTopic {
    /// Topic title.
    pub topic: String,
    /// Related queries, upstream order.
    pub related: Vec<String>,
}

/// Source of trending topics for a market.
#[async_trait]
pub trait TrendsSource: Send + Sync {
    /// Current trending topics for the market's country.
    ///
    /// Never fails: errors are logged and yield an empty list.
    async fn trending_topics(&self, market: &Market) -> Vec<TrendingTopic>;
}

/// Trends source backed by the Google Trends batch RPC.
pub struct GoogleTrends {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl GoogleTrends {
    /// Create a source rooted at `base_url` (e.g. `https://trends.google.com`).
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, geo: &str) -> Result<Vec<TrendingTopic>, SourceError> {
        let url = format!("{}/_/TrendsUi/data/batchexecute", self.base_url);
        let request = batch_request(geo);
        let response = self
            .http
            .post_form(&url, &[("f.req", request.as_str())])
            .await?
            .ensure_success()?;
        parse_batch_response(&response.body)
    }

    async fn fetch_logged(&self, geo: &str) -> Vec<TrendingTopic> {
        match self.fetch(geo).await {
            Ok(topics) => {
                tracing::debug!(target: TRENDS, geo, count = topics.len(), "trending topics fetched");
                topics
            }
            Err(e) => {
                tracing::error!(target: TRENDS, geo, error = %e, "trending topics lookup failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl TrendsSource for GoogleTrends {
    async fn trending_topics(&self, market: &Market) -> Vec<TrendingTopic> {
        let geo = market.country();
        let topics = self.fetch_logged(geo).await;
        if topics.len() < MIN_TOPICS && geo != FALLBACK_GEO {
            tracing::warn!(
                target: TRENDS,
                geo,
                count = topics.len(),
                "too few trending topics, falling back to {FALLBACK_GEO}"
            );
            return self.fetch_logged(FALLBACK_GEO).await;
        }
        topics
    }
}

/// Build the `f.req` form value for `geo`.
pub fn batch_request(geo: &str) -> String {
    let inner = format!("[null, null, \"{geo}\", 0, null, 48]");
    let payload = Value::Array(vec![Value::Array(vec![Value::Array(vec![
        Value::String(RPC_ID.to_string()),
        Value::String(inner),
    ])])]);
    payload.to_string()
}

/// Parse a batch RPC response into topics.
pub fn parse_batch_response(body: &str) -> Result<Vec<TrendingTopic>, SourceError> {
    let frame_line = body
        .lines()
        .map(str::trim_start)
        .find(|line| line.starts_with('['))
        .ok_or_else(|| SourceError::Parse {
            message: "no JSON frame in trends response".into(),
        })?;
    let frame: Value = serde_json::from_str(frame_line)?;
    let encoded = frame
        .get(0)
        .and_then(|f| f.get(2))
        .and_then(Value::as_str)
        .ok_or_else(|| SourceError::Parse {
            message: "missing payload at [0][2]".into(),
        })?;
    let payload: Value = serde_json::from_str(encoded)?;
    let topics = payload
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Parse {
            message: "missing topic list at [1]".into(),
        })?;
    Ok(topics.iter().filter_map(parse_topic).collect())
}

fn parse_topic(raw: &Value) -> Option<TrendingTopic> {
    let topic = raw.get(0)?.as_str()?.to_string();
    let related = raw
        .get(9)
        .and_then(Value::as_array)
        .map(|terms| {
            terms
                .iter()
                .skip(1)
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();
    Some(TrendingTopic { topic, related })
}
