//! Candidate query source settings.

use serde::{Deserialize, Serialize};

/// Settings for the query supplier and its upstream sources.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuerySettings {
    /// Base URL of the autosuggest endpoint (`/osjson.aspx`).
    pub suggestions_url: String,
    /// Base URL of the trends batch endpoint.
    pub trends_url: String,
    /// Seed the trend path with trending topics before suggestion expansion.
    pub use_trends: bool,
    /// Upper bound on seed-word suggestion rounds per candidate list.
    pub max_seed_rounds: u32,
    /// Seed term of the fallback ("gains") batch.
    pub gains_seed: String,
    /// Maximum size of the fallback batch.
    pub gains_limit: usize,
    /// Country used when the account has none, or geo queries are off.
    pub fallback_country: String,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            suggestions_url: "https://api.bing.com".to_string(),
            trends_url: "https://trends.google.com".to_string(),
            use_trends: false,
            max_seed_rounds: 50,
            gains_seed: "news".to_string(),
            gains_limit: 10,
            fallback_country: "US".to_string(),
        }
    }
}

impl QuerySettings {
    pub(crate) fn validate(&mut self) {
        if self.max_seed_rounds == 0 {
            tracing::warn!("max_seed_rounds must be at least 1, correcting");
            self.max_seed_rounds = 1;
        }
        if self.gains_seed.trim().is_empty() {
            tracing::warn!("gains_seed is empty, using default");
            self.gains_seed = Self::default().gains_seed;
        }
        self.suggestions_url = self.suggestions_url.trim_end_matches('/').to_string();
        self.trends_url = self.trends_url.trim_end_matches('/').to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let q = QuerySettings::default();
        assert_eq!(q.gains_seed, "news");
        assert_eq!(q.gains_limit, 10);
        assert!(!q.use_trends);
        assert_eq!(q.fallback_country, "US");
    }

    #[test]
    fn validate_strips_trailing_slash_and_fixes_zero_rounds() {
        let mut q = QuerySettings {
            suggestions_url: "http://127.0.0.1:9000/".into(),
            max_seed_rounds: 0,
            ..QuerySettings::default()
        };
        q.validate();
        assert_eq!(q.suggestions_url, "http://127.0.0.1:9000");
        assert_eq!(q.max_seed_rounds, 1);
    }
}
