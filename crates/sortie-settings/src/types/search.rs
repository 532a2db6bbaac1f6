//! Search engine settings: engagement toggles, delays, stall thresholds and
//! actuator timings.

use serde::{Deserialize, Serialize};

use crate::delay::DelayValue;

const DEFAULT_DELAY_MIN_MS: u64 = 180_000;
const DEFAULT_DELAY_MAX_MS: u64 = 300_000;

/// Settings consumed by the search executor and session controller.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    /// Derive the suggestion market from the account country.
    pub use_geo_locale_queries: bool,
    /// Scroll to a random offset on each result page.
    pub scroll_random_results: bool,
    /// Click a random result link on each result page.
    pub click_random_results: bool,
    /// Randomized wait between searches.
    pub search_delay: SearchDelay,
    /// Extra mobile attempts when a mobile pass ends with points missing.
    pub retry_mobile_search_amount: u32,
    /// Where surfaces are sent when no result page is known yet.
    pub home_location: String,
    /// Primary-pass stall limit, any mode.
    pub stall_limit: u32,
    /// Primary-pass stall limit for mobile sessions.
    pub mobile_stall_limit: u32,
    /// Extra-phase stall limit, any mode. Breaching it ends the attempt.
    pub extra_stall_limit: u32,
    /// Fixed waits around actuator interactions.
    pub timing: SearchTiming,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            use_geo_locale_queries: true,
            scroll_random_results: true,
            click_random_results: true,
            search_delay: SearchDelay::default(),
            retry_mobile_search_amount: 2,
            home_location: "https://bing.com".to_string(),
            stall_limit: 10,
            mobile_stall_limit: 5,
            extra_stall_limit: 5,
            timing: SearchTiming::default(),
        }
    }
}

impl SearchSettings {
    pub(crate) fn validate(&mut self) {
        self.search_delay.validate();

        for (name, limit) in [
            ("stall_limit", &mut self.stall_limit),
            ("mobile_stall_limit", &mut self.mobile_stall_limit),
            ("extra_stall_limit", &mut self.extra_stall_limit),
        ] {
            if *limit == 0 {
                tracing::warn!("{name} must be at least 1, correcting");
                *limit = 1;
            }
        }

        if self.home_location.trim().is_empty() {
            tracing::warn!("home_location is empty, using default");
            self.home_location = Self::default().home_location;
        }
    }
}

/// Min/max bounds of the randomized inter-search delay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchDelay {
    /// Lower bound.
    pub min: DelayValue,
    /// Upper bound.
    pub max: DelayValue,
}

impl Default for SearchDelay {
    fn default() -> Self {
        Self {
            min: DelayValue::Text("3min".to_string()),
            max: DelayValue::Text("5min".to_string()),
        }
    }
}

impl SearchDelay {
    /// Create a delay range from millisecond bounds.
    pub fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: DelayValue::Millis(min),
            max: DelayValue::Millis(max),
        }
    }

    /// Resolved `(min, max)` in milliseconds, ordered.
    ///
    /// Unparseable bounds fall back to the defaults (3 and 5 minutes).
    pub fn bounds_ms(&self) -> (u64, u64) {
        let min = self.min.to_millis().unwrap_or(DEFAULT_DELAY_MIN_MS);
        let max = self.max.to_millis().unwrap_or(DEFAULT_DELAY_MAX_MS);
        (min.min(max), min.max(max))
    }

    fn validate(&mut self) {
        if let Err(e) = self.min.to_millis() {
            tracing::warn!(error = %e, "searchDelay.min invalid, using default");
            self.min = DelayValue::Millis(DEFAULT_DELAY_MIN_MS);
        }
        if let Err(e) = self.max.to_millis() {
            tracing::warn!(error = %e, "searchDelay.max invalid, using default");
            self.max = DelayValue::Millis(DEFAULT_DELAY_MAX_MS);
        }
        let (min, max) = self.bounds_ms();
        if self.min.to_millis().ok() != Some(min) {
            tracing::warn!(min = %self.min, max = %self.max, "searchDelay.min > max, swapping");
            *self = Self::from_millis(min, max);
        }
    }
}

/// Fixed waits around actuator interactions, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchTiming {
    /// After bringing a surface forward and resetting its scroll.
    pub focus_settle_ms: u64,
    /// After submitting a query.
    pub submit_settle_ms: u64,
    /// Before the optional scroll or click engagement.
    pub engagement_settle_ms: u64,
    /// Time spent on a clicked result before cleaning up.
    pub click_dwell_ms: u64,
    /// After recovering surfaces from a failed attempt.
    pub recovery_delay_ms: u64,
    /// After opening a fresh surface.
    pub reopen_settle_ms: u64,
    /// After navigating a fresh surface home.
    pub reopen_navigate_settle_ms: u64,
    /// After the initial navigation of a session.
    pub initial_navigate_settle_ms: u64,
    /// How long to wait for the query input to become visible.
    pub input_timeout_ms: u64,
    /// How long to wait for the "continue" popup after a click.
    pub popup_timeout_ms: u64,
    /// How long to wait for a result link to become clickable.
    pub click_timeout_ms: u64,
}

impl Default for SearchTiming {
    fn default() -> Self {
        Self {
            focus_settle_ms: 500,
            submit_settle_ms: 3000,
            engagement_settle_ms: 2000,
            click_dwell_ms: 10_000,
            recovery_delay_ms: 4000,
            reopen_settle_ms: 1000,
            reopen_navigate_settle_ms: 3000,
            initial_navigate_settle_ms: 2000,
            input_timeout_ms: 10_000,
            popup_timeout_ms: 1000,
            click_timeout_ms: 2000,
        }
    }
}
