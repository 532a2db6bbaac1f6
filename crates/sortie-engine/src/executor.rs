//! One search action against the browser, with bounded retry.
//!
//! An attempt brings the latest surface forward, resets its scroll, types
//! the query into the search box and submits it. After the page settles the
//! result location is recorded, optional engagement runs (random scroll,
//! random result click), the randomized inter-search delay elapses and the
//! counters are read back.
//!
//! A failed attempt recovers the surface set and waits before the next one.
//! When every attempt fails the executor still answers with a snapshot, so
//! the session sees "no progress" instead of an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sortie_core::CountersSnapshot;
use sortie_core::logging::SEARCH;
use sortie_settings::SearchSettings;
use tracing::{debug, error, warn};

use crate::actuator::{Actuator, Sensor, SurfaceId};
use crate::errors::AttemptError;
use crate::resources::{ResourceManager, sleep_ms};
use crate::retry::{self, Attempt, RetryPolicy};

/// Search box on the results page.
pub const SEARCH_INPUT: &str = "#sb_form_q";
/// Organic result titles.
pub const RESULT_LINK: &str = "#b_results .b_algo h2";
/// Close button of the "continue" interstitial shown after a click.
pub const CONTINUE_POPUP: &str = "#sacs_close";

/// Result of [`SearchExecutor::execute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Execution {
    /// Counters after the action (or the best available fallback).
    pub counters: CountersSnapshot,
    /// Last known result location after the action.
    pub location: Option<String>,
    /// Attempts made.
    pub attempts: u32,
    /// Whether an attempt completed.
    pub succeeded: bool,
}

/// Performs search actions through an [`Actuator`].
pub struct SearchExecutor {
    actuator: Arc<dyn Actuator>,
    sensor: Arc<dyn Sensor>,
    resources: ResourceManager,
    settings: SearchSettings,
    policy: RetryPolicy,
    rng: Mutex<StdRng>,
}

impl SearchExecutor {
    /// Create an executor. Retry pacing comes from
    /// `settings.timing.recovery_delay_ms`.
    pub fn new(actuator: Arc<dyn Actuator>, sensor: Arc<dyn Sensor>, settings: SearchSettings) -> Self {
        let resources = ResourceManager::new(
            Arc::clone(&actuator),
            settings.home_location.clone(),
            settings.timing.clone(),
        );
        let policy = RetryPolicy::new(Duration::from_millis(settings.timing.recovery_delay_ms));
        Self {
            actuator,
            sensor,
            resources,
            settings,
            policy,
            rng: Mutex::new(StdRng::seed_from_u64(rand::random())),
        }
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a fixed RNG seed (reproducible delays, scrolls and clicks).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Surface manager shared with the session.
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Run `query`, retrying per policy.
    ///
    /// `location` is the last known result location; the returned
    /// [`Execution`] carries its update. If every attempt fails, the
    /// counters are read once more; if that read fails too, `fallback` is
    /// returned.
    pub async fn execute(
        &self,
        query: &str,
        location: Option<String>,
        fallback: &CountersSnapshot,
    ) -> Execution {
        let mut action = SearchAttempt {
            executor: self,
            query,
            location,
        };
        let outcome = retry::attempt(&self.policy, &mut action).await;
        let location = action.location;

        if let Some(counters) = outcome.value {
            return Execution {
                counters,
                location,
                attempts: outcome.attempts,
                succeeded: true,
            };
        }

        error!(
            target: SEARCH,
            query,
            attempts = outcome.attempts,
            error = ?outcome.error.map(|e| e.to_string()),
            "search failed on every attempt"
        );
        let counters = match self.sensor.counters().await {
            Ok(counters) => counters,
            Err(e) => {
                warn!(target: SEARCH, error = %e, "counters unavailable, keeping previous snapshot");
                fallback.clone()
            }
        };
        Execution {
            counters,
            location,
            attempts: outcome.attempts,
            succeeded: false,
        }
    }

    async fn search_once(
        &self,
        query: &str,
        location: &mut Option<String>,
    ) -> Result<CountersSnapshot, AttemptError> {
        let timing = &self.settings.timing;

        let surface = self.actuator.focus_latest_surface().await?;
        self.actuator.scroll_to(&surface, 0).await?;
        sleep_ms(timing.focus_settle_ms).await;

        self.actuator
            .locate_and_type(
                &surface,
                SEARCH_INPUT,
                query,
                Duration::from_millis(timing.input_timeout_ms),
            )
            .await?;
        self.actuator.submit(&surface).await?;
        sleep_ms(timing.submit_settle_ms).await;

        let results = self.actuator.focus_latest_surface().await?;
        *location = Some(self.actuator.current_location(&results).await?);

        if self.settings.scroll_random_results {
            sleep_ms(timing.engagement_settle_ms).await;
            self.random_scroll(&results).await;
        }
        if self.settings.click_random_results {
            sleep_ms(timing.engagement_settle_ms).await;
            self.random_click(&results, location).await;
        }

        sleep_ms(self.next_delay_ms()).await;
        Ok(self.sensor.counters().await?)
    }

    async fn random_scroll(&self, surface: &SurfaceId) {
        let scrolled = async {
            let extent = self.actuator.scroll_extent(surface).await?;
            let offset = {
                let mut rng = self.rng.lock();
                rng.random_range(0..=extent.max_offset())
            };
            self.actuator.scroll_to(surface, offset).await
        };
        if let Err(e) = scrolled.await {
            warn!(target: SEARCH, error = %e, "random scroll failed");
        }
    }

    async fn random_click(&self, surface: &SurfaceId, location: &mut Option<String>) {
        let timing = &self.settings.timing;

        let links = match self.actuator.count(surface, RESULT_LINK).await {
            Ok(n) => n,
            Err(e) => {
                warn!(target: SEARCH, error = %e, "random click failed");
                return;
            }
        };
        if links == 0 {
            debug!(target: SEARCH, "no result links to click");
            return;
        }

        let nth = self.rng.lock().random_range(0..links);
        if let Err(e) = self
            .actuator
            .click(surface, RESULT_LINK, nth, Duration::from_millis(timing.click_timeout_ms))
            .await
        {
            debug!(target: SEARCH, error = %e, "result click ignored");
        }
        if let Err(e) = self
            .actuator
            .click(surface, CONTINUE_POPUP, 0, Duration::from_millis(timing.popup_timeout_ms))
            .await
        {
            debug!(target: SEARCH, error = %e, "no continue popup to close");
        }

        sleep_ms(timing.click_dwell_ms).await;

        if let Err(e) = self.resources.close_popups(location).await {
            warn!(target: SEARCH, error = %e, "popup cleanup failed");
        }
    }

    fn next_delay_ms(&self) -> u64 {
        let (min, max) = self.settings.search_delay.bounds_ms();
        if min >= max {
            return min;
        }
        self.rng.lock().random_range(min..=max)
    }
}

/// One query under the retry policy; carries the last known location
/// across attempts.
struct SearchAttempt<'a> {
    executor: &'a SearchExecutor,
    query: &'a str,
    location: Option<String>,
}

#[async_trait]
impl Attempt for SearchAttempt<'_> {
    type Output = CountersSnapshot;
    type Error = AttemptError;

    async fn run(&mut self, attempt: u32) -> Result<CountersSnapshot, AttemptError> {
        debug!(target: SEARCH, query = self.query, attempt, "search attempt");
        self.executor.search_once(self.query, &mut self.location).await
    }

    async fn recover(&mut self, attempt: u32, error: &AttemptError) {
        warn!(
            target: SEARCH,
            query = self.query,
            attempt,
            max_attempts = self.executor.policy.max_attempts,
            error = %error,
            "search failed, recovering surfaces"
        );
        let _ = self.executor.resources.recover(&mut self.location).await;
    }
}
