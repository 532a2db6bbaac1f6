//! Surface-set recovery.
//!
//! A session works with two surfaces in steady state: the one it started
//! from and the result surface. [`ResourceManager::normalize`] brings the
//! set back to that shape after a failure or a click that spawned popups:
//!
//! | open surfaces | action |
//! |---|---|
//! | more than 2 | close the latest (popup or redirect) |
//! | 0 or 1 | open a fresh surface, send it home, record its location |
//! | exactly 2 | send the latest back to the last known result location |

use std::sync::Arc;
use std::time::Duration;

use sortie_core::logging::SURFACES;
use sortie_settings::SearchTiming;
use tracing::{debug, info, warn};

use crate::actuator::Actuator;
use crate::errors::ActuatorError;

/// Upper bound on normalization rounds in [`ResourceManager::close_popups`].
pub const CLEANUP_ITERATIONS: usize = 5;

/// Steady-state number of surfaces.
const STEADY_SURFACES: usize = 2;

/// What a normalization round did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Normalization {
    /// Closed the latest of too many surfaces.
    ClosedExtra {
        /// Location of the closed surface.
        closed: String,
    },
    /// Opened a fresh surface at home; its location is now the last known one.
    Reopened {
        /// Location of the new surface.
        location: String,
    },
    /// Sent the latest surface back.
    Returned {
        /// Where it was sent.
        location: String,
    },
}

/// Keeps the actuator's surface set bounded and on task.
pub struct ResourceManager {
    actuator: Arc<dyn Actuator>,
    home_location: String,
    timing: SearchTiming,
}

impl ResourceManager {
    /// Create a manager for `actuator`, using `home_location` when no result
    /// location is known.
    pub fn new(actuator: Arc<dyn Actuator>, home_location: impl Into<String>, timing: SearchTiming) -> Self {
        Self {
            actuator,
            home_location: home_location.into(),
            timing,
        }
    }

    /// Apply one round of the surface policy. A reopen updates `last_known`.
    pub async fn normalize(
        &self,
        last_known: &mut Option<String>,
    ) -> Result<Normalization, ActuatorError> {
        let open = self.actuator.surface_count().await?;

        if open > STEADY_SURFACES {
            let latest = self.actuator.focus_latest_surface().await?;
            let closed = self.actuator.current_location(&latest).await?;
            self.actuator.close(&latest).await?;
            info!(target: SURFACES, open, closed = %closed, "more than {STEADY_SURFACES} surfaces open, closed the latest");
            return Ok(Normalization::ClosedExtra { closed });
        }

        if open < STEADY_SURFACES {
            let fresh = self.actuator.open_new().await?;
            sleep_ms(self.timing.reopen_settle_ms).await;
            self.actuator.navigate(&fresh, &self.home_location).await?;
            sleep_ms(self.timing.reopen_navigate_settle_ms).await;
            let location = self.actuator.current_location(&fresh).await?;
            *last_known = Some(location.clone());
            info!(target: SURFACES, open, location = %location, "too few surfaces open, opened a new one");
            return Ok(Normalization::Reopened { location });
        }

        let latest = self.actuator.focus_latest_surface().await?;
        let location = last_known
            .clone()
            .unwrap_or_else(|| self.home_location.clone());
        self.actuator.navigate(&latest, &location).await?;
        debug!(target: SURFACES, location = %location, "returned latest surface");
        Ok(Normalization::Returned { location })
    }

    /// [`normalize`](Self::normalize), logging instead of failing.
    pub async fn recover(&self, last_known: &mut Option<String>) -> Option<Normalization> {
        match self.normalize(last_known).await {
            Ok(done) => Some(done),
            Err(e) => {
                warn!(target: SURFACES, error = %e, "surface recovery failed");
                None
            }
        }
    }

    /// Normalize until the foreground surface shows `last_known`, at most
    /// [`CLEANUP_ITERATIONS`] rounds. Returns the rounds applied.
    pub async fn close_popups(
        &self,
        last_known: &mut Option<String>,
    ) -> Result<usize, ActuatorError> {
        for round in 0..CLEANUP_ITERATIONS {
            let latest = self.actuator.focus_latest_surface().await?;
            let location = self.actuator.current_location(&latest).await?;
            if last_known.as_deref() == Some(location.as_str()) {
                return Ok(round);
            }
            let _ = self.normalize(last_known).await?;
        }
        debug!(target: SURFACES, "popup cleanup hit its round limit");
        Ok(CLEANUP_ITERATIONS)
    }

    /// Send the latest surface to `last_known` (or home) before the first
    /// search and let it settle.
    pub async fn prepare(&self, last_known: Option<&str>) -> Result<(), ActuatorError> {
        let surface = self.actuator.focus_latest_surface().await?;
        let location = last_known.unwrap_or(&self.home_location);
        self.actuator.navigate(&surface, location).await?;
        sleep_ms(self.timing.initial_navigate_settle_ms).await;
        Ok(())
    }
}

pub(crate) async fn sleep_ms(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeBrowser;
    use assert_matches::assert_matches;

    const HOME: &str = "https://bing.com";
    const RESULTS: &str = "https://www.bing.com/search?q=rust";

    fn manager(browser: &Arc<FakeBrowser>) -> ResourceManager {
        ResourceManager::new(
            Arc::clone(browser) as Arc<dyn Actuator>,
            HOME,
            SearchTiming::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn closes_latest_when_too_many() {
        let browser = Arc::new(
            FakeBrowser::desktop(10)
                .with_surfaces(&[HOME, RESULTS, "https://ads.example/landing"]),
        );
        let mut last = Some(RESULTS.to_string());

        let done = manager(&browser).normalize(&mut last).await.unwrap();
        assert_matches!(done, Normalization::ClosedExtra { closed } if closed == "https://ads.example/landing");
        assert_eq!(browser.locations(), vec![HOME, RESULTS]);
        assert_eq!(last.as_deref(), Some(RESULTS));
    }

    #[tokio::test(start_paused = true)]
    async fn reopens_when_single_surface() {
        let browser = Arc::new(FakeBrowser::desktop(10).with_surfaces(&[RESULTS]));
        let mut last = Some(RESULTS.to_string());

        let done = manager(&browser).normalize(&mut last).await.unwrap();
        assert_matches!(done, Normalization::Reopened { location } if location == HOME);
        assert_eq!(browser.locations(), vec![RESULTS, HOME]);
        assert_eq!(last.as_deref(), Some(HOME));
    }

    #[tokio::test(start_paused = true)]
    async fn reopens_when_no_surface() {
        let browser = Arc::new(FakeBrowser::desktop(10).with_surfaces(&[]));
        let mut last = None;

        let done = manager(&browser).normalize(&mut last).await.unwrap();
        assert_matches!(done, Normalization::Reopened { .. });
        assert_eq!(browser.locations(), vec![HOME]);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_latest_to_last_known() {
        let browser = Arc::new(
            FakeBrowser::desktop(10).with_surfaces(&[HOME, "https://redirect.example"]),
        );
        let mut last = Some(RESULTS.to_string());

        let done = manager(&browser).normalize(&mut last).await.unwrap();
        assert_eq!(
            done,
            Normalization::Returned {
                location: RESULTS.into()
            }
        );
        assert_eq!(browser.locations(), vec![HOME, RESULTS]);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_home_without_last_known() {
        let browser = Arc::new(
            FakeBrowser::desktop(10).with_surfaces(&[HOME, "https://redirect.example"]),
        );
        let mut last = None;

        let _ = manager(&browser).normalize(&mut last).await.unwrap();
        assert_eq!(browser.locations(), vec![HOME, HOME]);
        assert!(last.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn close_popups_stops_at_last_known() {
        let browser = Arc::new(FakeBrowser::desktop(10).with_surfaces(&[
            HOME,
            RESULTS,
            "https://popup.example/1",
            "https://popup.example/2",
        ]));
        let mut last = Some(RESULTS.to_string());

        let rounds = manager(&browser).close_popups(&mut last).await.unwrap();
        assert_eq!(rounds, 2);
        assert_eq!(browser.locations(), vec![HOME, RESULTS]);
    }

    #[tokio::test(start_paused = true)]
    async fn close_popups_is_bounded() {
        let browser = Arc::new(
            FakeBrowser::desktop(10)
                .with_surfaces(&[HOME, "https://elsewhere.example"]),
        );
        // the recorded location is never reachable, so every round runs
        let mut last = None;

        let rounds = manager(&browser).close_popups(&mut last).await.unwrap();
        assert_eq!(rounds, CLEANUP_ITERATIONS);
    }

    #[tokio::test(start_paused = true)]
    async fn recover_logs_and_swallows_errors() {
        let (logs, _guard) = sortie_core::logging::capture_logs();
        let browser = Arc::new(FakeBrowser::desktop(10).with_surfaces(&[HOME, RESULTS]));
        browser.fail_navigations(1);
        let mut last = Some(RESULTS.to_string());

        assert!(manager(&browser).recover(&mut last).await.is_none());
        assert!(logs.has_event(tracing::Level::WARN, "surface recovery failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn prepare_navigates_latest() {
        let browser = Arc::new(FakeBrowser::desktop(10).with_surfaces(&[HOME, "about:blank"]));
        manager(&browser).prepare(Some(RESULTS)).await.unwrap();
        assert_eq!(browser.locations(), vec![HOME, RESULTS]);
    }
}
