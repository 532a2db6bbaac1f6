//! Session controller: drives one completion attempt to a terminal state.
//!
//! ```text
//! Init ──► Primary ──► Converged | Stalled
//!             │
//!             ▼
//!         Exhausted ──(mobile)──► done
//!             │ (desktop)
//!             ▼
//!           Extra ──► Converged | Stalled | ExhaustedExtra
//! ```
//!
//! Every search is followed by a counters read and a stall check. Nothing
//! here returns an error: every path ends in a [`SessionReport`].

mod report;
mod state;


use std::sync::Arc;

use sortie_core::logging::{SEARCH, SEARCH_EXTRA};
use sortie_core::{CountersSnapshot, SearchMode, missing_points};
use sortie_queries::{Market, QueryCandidate, QuerySupplier};
use sortie_settings::SearchSettings;
use tracing::{debug, error, info, instrument, warn};

use crate::actuator::{Actuator, Sensor};
use crate::executor::SearchExecutor;

pub use report::{SessionOutcome, SessionReport};
pub use state::{Phase, SessionState, StallLimits, Verdict};

/// Expansions need more than this many related terms to be used.
const MIN_RELATED_TERMS: usize = 3;

/// Positions of an expansion that are searched. Position 0 is usually the
/// seed itself.
const EXTRA_TERMS: std::ops::Range<usize> = 1..3;

#[derive(Debug)]
enum Stage {
    Init,
    Primary,
    Exhausted,
    Extra,
    Done(SessionOutcome),
}

/// Working data of one attempt.
struct Run {
    state: SessionState,
    counters: CountersSnapshot,
    candidates: Vec<QueryCandidate>,
    initial_missing: u32,
    searches: u32,
    extra_searches: u32,
}

impl Run {
    fn finish(self, mode: SearchMode, outcome: SessionOutcome) -> SessionReport {
        SessionReport {
            mode,
            outcome,
            initial_missing: self.initial_missing,
            missing_points: self.state.missing_points,
            searches: self.searches,
            extra_searches: self.extra_searches,
            last_location: self.state.last_location,
        }
    }
}

/// Search-completion engine for one mode.
///
/// Mobile and desktop sessions for an account are separate instances with
/// their own executor and surfaces.
pub struct SearchSession {
    mode: SearchMode,
    executor: SearchExecutor,
    sensor: Arc<dyn Sensor>,
    supplier: Arc<QuerySupplier>,
    limits: StallLimits,
}

impl SearchSession {
    /// Create a session driving `actuator` and reading `sensor`.
    pub fn new(
        mode: SearchMode,
        actuator: Arc<dyn Actuator>,
        sensor: Arc<dyn Sensor>,
        supplier: Arc<QuerySupplier>,
        settings: &SearchSettings,
    ) -> Self {
        Self {
            mode,
            executor: SearchExecutor::new(actuator, Arc::clone(&sensor), settings.clone()),
            sensor,
            supplier,
            limits: StallLimits::from(settings),
        }
    }

    /// Replace the executor (custom retry policy or RNG seed).
    #[must_use]
    pub fn with_executor(mut self, executor: SearchExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Mode of this session.
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Run one completion attempt with fresh state.
    #[instrument(skip_all, fields(mode = %self.mode, market = %market))]
    pub async fn run(&self, market: &Market) -> SessionReport {
        let counters = match self.sensor.counters().await {
            Ok(counters) => counters,
            Err(e) => {
                error!(target: SEARCH, error = %e, "cannot read counters, skipping searches");
                return SessionReport::sensor_unavailable(self.mode);
            }
        };
        let missing = missing_points(&counters, self.mode);
        info!(target: SEARCH, missing_points = missing, "starting searches");

        let mut run = Run {
            state: SessionState::new(missing),
            counters,
            candidates: Vec::new(),
            initial_missing: missing,
            searches: 0,
            extra_searches: 0,
        };

        let mut stage = Stage::Init;
        let outcome = loop {
            debug!(target: SEARCH, stage = ?stage, "stage");
            stage = match stage {
                Stage::Init => self.init(&mut run, market).await,
                Stage::Primary => self.primary(&mut run).await,
                Stage::Exhausted => self.exhausted(&mut run),
                Stage::Extra => self.extra(&mut run, market).await,
                Stage::Done(outcome) => break outcome,
            };
        };

        let report = run.finish(self.mode, outcome);
        info!(
            target: SEARCH,
            outcome = ?report.outcome,
            missing_points = report.missing_points,
            searches = report.searches,
            extra_searches = report.extra_searches,
            "searches finished"
        );
        report
    }

    async fn init(&self, run: &mut Run, market: &Market) -> Stage {
        if run.state.missing_points == 0 {
            info!(target: SEARCH, "searches already completed");
            return Stage::Done(SessionOutcome::Converged);
        }

        run.candidates = self
            .supplier
            .primary_candidates(run.state.missing_points as usize, market)
            .await;

        if let Err(e) = self
            .executor
            .resources()
            .prepare(run.state.last_location.as_deref())
            .await
        {
            warn!(target: SEARCH, error = %e, "initial navigation failed");
        }
        Stage::Primary
    }

    async fn primary(&self, run: &mut Run) -> Stage {
        let queries: Vec<String> = run.candidates.iter().map(|c| c.text().to_string()).collect();

        for query in &queries {
            info!(target: SEARCH, missing_points = run.state.missing_points, query = %query, "searching");
            run.searches += 1;
            match self.search(run, query).await {
                Verdict::Continue => {}
                Verdict::Converged => return Stage::Done(SessionOutcome::Converged),
                Verdict::Stalled => {
                    let stall_count = run.state.stall_count;
                    if self.mode.is_mobile() {
                        warn!(target: SEARCH, stall_count, "no points gained on mobile, likely a bad user agent");
                    } else {
                        warn!(target: SEARCH, stall_count, "no points gained, aborting searches");
                    }
                    return Stage::Done(SessionOutcome::Stalled {
                        phase: Phase::Primary,
                        stall_count,
                    });
                }
            }
        }
        Stage::Exhausted
    }

    fn exhausted(&self, run: &mut Run) -> Stage {
        if self.mode.is_mobile() {
            info!(
                target: SEARCH,
                missing_points = run.state.missing_points,
                "mobile candidates exhausted, leaving the rest for a later run"
            );
            return Stage::Done(SessionOutcome::Exhausted);
        }
        info!(
            target: SEARCH_EXTRA,
            missing_points = run.state.missing_points,
            "candidates exhausted with points missing, generating extra searches"
        );
        run.state = run.state.clone().enter_extra();
        Stage::Extra
    }

    async fn extra(&self, run: &mut Run, market: &Market) -> Stage {
        let seeds: Vec<String> = run.candidates.iter().map(|c| c.text().to_string()).collect();

        for seed in &seeds {
            let related = self.supplier.expand_related(seed, market).await;
            if related.len() <= MIN_RELATED_TERMS {
                debug!(target: SEARCH_EXTRA, seed = %seed, related = related.len(), "expansion too small");
                continue;
            }

            for term in related[EXTRA_TERMS].iter().flatten() {
                info!(target: SEARCH_EXTRA, missing_points = run.state.missing_points, query = term.text(), "searching");
                run.extra_searches += 1;
                match self.search(run, term.text()).await {
                    Verdict::Continue => {}
                    Verdict::Converged => return Stage::Done(SessionOutcome::Converged),
                    Verdict::Stalled => {
                        let stall_count = run.state.stall_count;
                        warn!(target: SEARCH_EXTRA, stall_count, "no points gained, aborting searches");
                        return Stage::Done(SessionOutcome::Stalled {
                            phase: Phase::Extra,
                            stall_count,
                        });
                    }
                }
            }
        }

        info!(target: SEARCH_EXTRA, missing_points = run.state.missing_points, "extra searches exhausted");
        Stage::Done(SessionOutcome::ExhaustedExtra)
    }

    /// Execute `query`, fold the new deficit into the state and judge it.
    async fn search(&self, run: &mut Run, query: &str) -> Verdict {
        let execution = self
            .executor
            .execute(query, run.state.last_location.clone(), &run.counters)
            .await;
        let missing = missing_points(&execution.counters, self.mode);
        run.counters = execution.counters;
        run.state = run.state.observe(missing).at_location(execution.location);
        run.state.verdict(self.mode, &self.limits)
    }
}
