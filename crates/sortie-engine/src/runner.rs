//! Outer runner: one attempt per mode, plus the mobile retry budget.

use std::sync::Arc;

use sortie_core::logging::SEARCH;
use sortie_core::Channel;
use sortie_queries::Market;
use sortie_settings::SearchSettings;
use tracing::{info, warn};

use crate::actuator::Sensor;
use crate::session::{SearchSession, SessionOutcome, SessionReport};

/// Runs completion attempts for a session.
///
/// Desktop sessions run once. Mobile sessions are re-run with fresh state
/// while points remain, up to `retry_budget` extra attempts; mobile user
/// agents are flaky enough that a second pass often finishes the job.
pub struct SearchRunner {
    session: SearchSession,
    sensor: Arc<dyn Sensor>,
    retry_budget: u32,
}

impl SearchRunner {
    /// Create a runner. `retry_budget` only applies to mobile sessions.
    pub fn new(session: SearchSession, sensor: Arc<dyn Sensor>, retry_budget: u32) -> Self {
        Self {
            session,
            sensor,
            retry_budget,
        }
    }

    /// Create a runner whose mobile budget is `retryMobileSearchAmount`.
    pub fn from_settings(session: SearchSession, sensor: Arc<dyn Sensor>, settings: &SearchSettings) -> Self {
        Self::new(session, sensor, settings.retry_mobile_search_amount)
    }

    /// Run until complete or out of budget. Returns every attempt's report,
    /// oldest first; empty when the account has no mobile search counters.
    pub async fn run(&self, market: &Market) -> Vec<SessionReport> {
        let mode = self.session.mode();

        if mode.is_mobile() && !self.mobile_eligible().await {
            warn!(
                target: SEARCH,
                channel = Channel::Mobile.as_str(),
                "no mobile search counters, account not eligible"
            );
            return Vec::new();
        }

        let mut reports = vec![self.session.run(market).await];
        if !mode.is_mobile() {
            return reports;
        }

        let mut retries = 0;
        while let Some(last) = reports.last() {
            if last.is_complete() || last.outcome == SessionOutcome::SensorUnavailable {
                break;
            }
            if retries >= self.retry_budget {
                warn!(
                    target: SEARCH,
                    budget = self.retry_budget,
                    missing_points = last.missing_points,
                    "mobile retry limit reached"
                );
                break;
            }
            retries += 1;
            info!(
                target: SEARCH,
                attempt = retries,
                budget = self.retry_budget,
                missing_points = last.missing_points,
                "mobile searches incomplete, retrying"
            );
            reports.push(self.session.run(market).await);
        }
        reports
    }

    /// A failed read counts as eligible; the session reports the outage.
    async fn mobile_eligible(&self) -> bool {
        match self.sensor.counters().await {
            Ok(counters) => counters.channel(Channel::Mobile).is_some(),
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::Actuator;
    use crate::testutil::FakeBrowser;
    use async_trait::async_trait;
    use sortie_core::{CountersSnapshot, PointProgress, SearchMode};
    use sortie_queries::{QuerySupplier, SuggestionSource};
    use sortie_settings::{QuerySettings, SearchDelay, SearchSettings};

    struct Fixed(Vec<String>);

    #[async_trait]
    impl SuggestionSource for Fixed {
        async fn suggest(&self, _query: &str, _market: &Market) -> Vec<String> {
            self.0.clone()
        }
    }

    fn quiet() -> SearchSettings {
        SearchSettings {
            scroll_random_results: false,
            click_random_results: false,
            search_delay: SearchDelay::from_millis(500, 500),
            ..SearchSettings::default()
        }
    }

    fn session(mode: SearchMode, browser: &Arc<FakeBrowser>, settings: &SearchSettings) -> SearchSession {
        let queries = (0..3).map(|i| format!("q{i}")).collect();
        let supplier = Arc::new(QuerySupplier::new(
            Arc::new(Fixed(queries)),
            QuerySettings::default(),
        ));
        SearchSession::new(
            mode,
            Arc::clone(browser) as Arc<dyn Actuator>,
            Arc::clone(browser) as Arc<dyn Sensor>,
            supplier,
            settings,
        )
    }

    fn runner(mode: SearchMode, browser: &Arc<FakeBrowser>, budget: u32) -> SearchRunner {
        let sensor = Arc::clone(browser) as Arc<dyn Sensor>;
        SearchRunner::new(session(mode, browser, &quiet()), sensor, budget)
    }

    fn us() -> Market {
        Market::from_country("US")
    }

    #[tokio::test(start_paused = true)]
    async fn mobile_retries_until_budget() {
        let browser = Arc::new(FakeBrowser::mobile(30));
        let reports = runner(SearchMode::Mobile, &browser, 2).run(&us()).await;

        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| !r.is_complete() && r.missing_points == 30));
    }

    #[tokio::test(start_paused = true)]
    async fn mobile_stops_retrying_once_complete() {
        let browser = Arc::new(FakeBrowser::mobile(4).with_default_points(1));
        let reports = runner(SearchMode::Mobile, &browser, 5).run(&us()).await;

        assert!(reports.last().unwrap().is_complete());
        assert!(reports.len() < 6);
        assert_eq!(reports.iter().map(SessionReport::earned).sum::<u32>(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_comes_from_loaded_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"search": {"retryMobileSearchAmount": 1, "clickRandomResults": false, "scrollRandomResults": false, "searchDelay": {"min": 500, "max": 500}}}"#,
        )
        .unwrap();
        let settings = sortie_settings::load_settings_from_path(&path).unwrap();
        assert_eq!(settings.search.retry_mobile_search_amount, 1);

        let browser = Arc::new(FakeBrowser::mobile(30));
        let sensor = Arc::clone(&browser) as Arc<dyn Sensor>;
        let runner = SearchRunner::from_settings(
            session(SearchMode::Mobile, &browser, &settings.search),
            sensor,
            &settings.search,
        );

        let reports = runner.run(&us()).await;
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| !r.is_complete()));
    }

    #[tokio::test(start_paused = true)]
    async fn desktop_runs_once() {
        let browser = Arc::new(FakeBrowser::desktop(30));
        let reports = runner(SearchMode::Desktop, &browser, 5).run(&us()).await;
        assert_eq!(reports.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_mobile_channel_is_ineligible() {
        let (logs, _guard) = sortie_core::logging::capture_logs();
        let counters = CountersSnapshot::default()
            .with_channel(Channel::Desktop, PointProgress::new(0, 90));
        let browser = Arc::new(FakeBrowser::new(counters, Channel::Desktop));

        let reports = runner(SearchMode::Mobile, &browser, 2).run(&us()).await;

        assert!(reports.is_empty());
        assert!(browser.searches().is_empty());
        assert!(logs.has_event(tracing::Level::WARN, "not eligible"));
    }

    #[tokio::test(start_paused = true)]
    async fn sensor_outage_is_not_retried() {
        let browser = Arc::new(FakeBrowser::mobile(30));
        browser.set_sensor_down(true);

        let reports = runner(SearchMode::Mobile, &browser, 3).run(&us()).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, SessionOutcome::SensorUnavailable);
    }
}
