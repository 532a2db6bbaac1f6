//! Candidate query generation.
//!
//! The primary candidate list is built from two paths:
//!
//! 1. the trend path: trending topics (when a [`TrendsSource`] is attached)
//!    followed by suggestion expansion of random seed words, until the
//!    requested count is reached;
//! 2. the gains path: one suggestion lookup for a fixed seed term, capped,
//!    appended as a reserve batch.
//!
//! The trend batch is shuffled then de-duplicated. The gains batch is
//! appended afterwards and skips de-duplication, so small markets still get
//! a usable reserve.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sortie_core::logging::SUGGESTIONS;
use sortie_settings::QuerySettings;

use crate::http::HttpClient;
use crate::market::Market;
use crate::suggestions::{BingSuggestions, SuggestionSource};
use crate::trends::{GoogleTrends, TrendsSource};

/// Seed vocabulary for the trend path.
pub const SEED_WORDS: &[&str] = &[
    "news",
    "trends",
    "updates",
    "latest",
    "world",
    "technology",
    "sports",
    "science",
    "culture",
];

/// Seed rounds in a row without a new candidate before the trend path
/// gives up.
const MAX_IDLE_ROUNDS: u32 = 3;

/// Where a candidate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Trend path: trending topics and seed-word suggestions.
    TrendSeed,
    /// Related-term expansion of an exhausted query.
    SuggestionExpansion,
    /// Fixed reserve batch.
    GainsFallback,
}

/// A non-empty, lower-cased search string and its source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryCandidate {
    text: String,
    provenance: Provenance,
}

impl QueryCandidate {
    /// Lower-case `text` into a candidate; `None` when it is blank.
    pub fn new(text: &str, provenance: Provenance) -> Option<Self> {
        let text = text.trim();
        (!text.is_empty()).then(|| Self {
            text: text.to_lowercase(),
            provenance,
        })
    }

    /// Query text, lower-cased.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Source path.
    pub fn provenance(&self) -> Provenance {
        self.provenance
    }
}

/// Produces candidate queries for a completion attempt.
pub struct QuerySupplier {
    suggestions: Arc<dyn SuggestionSource>,
    trends: Option<Arc<dyn TrendsSource>>,
    settings: QuerySettings,
    rng: Mutex<StdRng>,
}

impl QuerySupplier {
    /// Create a supplier over a suggestion source, without trending topics.
    pub fn new(suggestions: Arc<dyn SuggestionSource>, settings: QuerySettings) -> Self {
        Self {
            suggestions,
            trends: None,
            settings,
            rng: Mutex::new(StdRng::seed_from_u64(rand::random())),
        }
    }

    /// Wire the HTTP-backed sources from settings. The trends source is
    /// attached only when `use_trends` is set.
    pub fn from_settings(http: Arc<dyn HttpClient>, settings: QuerySettings) -> Self {
        let suggestions = Arc::new(BingSuggestions::new(
            Arc::clone(&http),
            settings.suggestions_url.clone(),
        ));
        let trends = settings
            .use_trends
            .then(|| Arc::new(GoogleTrends::new(http, settings.trends_url.clone())) as Arc<dyn TrendsSource>);
        let supplier = Self::new(suggestions, settings);
        match trends {
            Some(trends) => supplier.with_trends(trends),
            None => supplier,
        }
    }

    /// Attach a trending-topics source to the trend path.
    #[must_use]
    pub fn with_trends(mut self, trends: Arc<dyn TrendsSource>) -> Self {
        self.trends = Some(trends);
        self
    }

    /// Use a fixed RNG seed (reproducible shuffles and seed-word picks).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Build the primary candidate list: the shuffled, de-duplicated trend
    /// batch of up to `count` entries, followed by the gains batch.
    pub async fn primary_candidates(&self, count: usize, market: &Market) -> Vec<QueryCandidate> {
        let mut trend = self.trend_candidates(count, market).await;
        trend.shuffle(&mut *self.rng.lock());

        let mut seen = HashSet::new();
        let mut candidates: Vec<QueryCandidate> = trend
            .into_iter()
            .filter(|c| seen.insert(c.text.clone()))
            .collect();
        let unique = candidates.len();

        candidates.extend(self.gains_candidates(market).await);
        tracing::info!(
            target: SUGGESTIONS,
            market = %market,
            requested = count,
            unique,
            total = candidates.len(),
            "candidate list ready"
        );
        candidates
    }

    /// Trend path, before shuffling and de-duplication. Stops as soon as
    /// `count` candidates are collected.
    pub async fn trend_candidates(&self, count: usize, market: &Market) -> Vec<QueryCandidate> {
        let mut out = Vec::new();

        if let Some(trends) = &self.trends {
            let topics = trends.trending_topics(market).await;
            let terms = topics
                .iter()
                .flat_map(|t| std::iter::once(&t.topic).chain(&t.related))
                .filter_map(|text| QueryCandidate::new(text, Provenance::TrendSeed));
            out.extend(terms.take(count));
        }

        let mut seen: HashSet<String> = out.iter().map(|c| c.text.clone()).collect();
        let mut rounds = 0;
        let mut idle = 0;
        while out.len() < count && rounds < self.settings.max_seed_rounds && idle < MAX_IDLE_ROUNDS {
            rounds += 1;
            let seed = {
                let mut rng = self.rng.lock();
                SEED_WORDS[rng.random_range(0..SEED_WORDS.len())]
            };
            let mut fresh = false;
            for text in self.suggestions.suggest(seed, market).await {
                let Some(candidate) = QueryCandidate::new(&text, Provenance::TrendSeed) else {
                    continue;
                };
                fresh |= seen.insert(candidate.text.clone());
                out.push(candidate);
                if out.len() >= count {
                    break;
                }
            }
            idle = if fresh { 0 } else { idle + 1 };
        }

        if out.len() < count {
            tracing::warn!(
                target: SUGGESTIONS,
                market = %market,
                requested = count,
                produced = out.len(),
                rounds,
                "trend path ran dry"
            );
        }
        out
    }

    /// Gains path: the first non-empty suggestions for the gains seed,
    /// capped at `gains_limit`.
    pub async fn gains_candidates(&self, market: &Market) -> Vec<QueryCandidate> {
        self.suggestions
            .suggest(&self.settings.gains_seed, market)
            .await
            .iter()
            .filter_map(|s| QueryCandidate::new(s, Provenance::GainsFallback))
            .take(self.settings.gains_limit)
            .collect()
    }

    /// Related terms for `query` at their upstream positions. Blank
    /// suggestions keep their slot as `None`.
    pub async fn expand_related(&self, query: &str, market: &Market) -> Vec<Option<QueryCandidate>> {
        self.suggestions
            .suggest(query, market)
            .await
            .iter()
            .map(|s| QueryCandidate::new(s, Provenance::SuggestionExpansion))
            .collect()
    }
}
