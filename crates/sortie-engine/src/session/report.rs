//! Terminal outcome of a completion attempt.

use serde::Serialize;
use sortie_core::SearchMode;

use super::state::Phase;

/// How a completion attempt ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SessionOutcome {
    /// Deficit reached zero.
    Converged,
    /// Too many searches without progress.
    Stalled {
        /// Phase that stalled.
        phase: Phase,
        /// Stall counter when the attempt stopped.
        #[serde(rename = "stallCount")]
        stall_count: u32,
    },
    /// Primary candidates ran out with points still missing.
    Exhausted,
    /// Extra-phase expansions ran out with points still missing.
    ExhaustedExtra,
    /// The counters could not be read at the start.
    SensorUnavailable,
}

/// Summary handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    /// Mode of the attempt.
    pub mode: SearchMode,
    /// Terminal outcome.
    pub outcome: SessionOutcome,
    /// Deficit when the attempt started.
    pub initial_missing: u32,
    /// Deficit when it ended.
    pub missing_points: u32,
    /// Primary-pass searches executed.
    pub searches: u32,
    /// Extra-phase searches executed.
    pub extra_searches: u32,
    /// Last known result location.
    pub last_location: Option<String>,
}

impl SessionReport {
    /// Whether the attempt earned every point. Anything else is
    /// "incomplete" and may be rescheduled.
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, SessionOutcome::Converged)
    }

    /// Points earned during the attempt.
    pub fn earned(&self) -> u32 {
        self.initial_missing.saturating_sub(self.missing_points)
    }

    pub(crate) fn sensor_unavailable(mode: SearchMode) -> Self {
        Self {
            mode,
            outcome: SessionOutcome::SensorUnavailable,
            initial_missing: 0,
            missing_points: 0,
            searches: 0,
            extra_searches: 0,
            last_location: None,
        }
    }
}
