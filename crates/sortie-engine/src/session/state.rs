//! Per-attempt session state and the stall rules applied to it.
//!
//! [`SessionState`] is a plain value: each observation returns a new state
//! rather than mutating a shared one, so independent sessions never share
//! bookkeeping.

use serde::Serialize;
use sortie_core::SearchMode;
use sortie_settings::SearchSettings;

/// Convergence phase of a completion attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Generated trend and gains candidates.
    Primary,
    /// Related-term expansions of exhausted primary candidates.
    Extra,
}

/// Stall thresholds. A phase stalls once its counter *exceeds* the limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StallLimits {
    /// Primary pass, any mode.
    pub primary: u32,
    /// Primary pass, mobile mode.
    pub mobile: u32,
    /// Extra phase, any mode.
    pub extra: u32,
}

impl Default for StallLimits {
    fn default() -> Self {
        Self {
            primary: 10,
            mobile: 5,
            extra: 5,
        }
    }
}

impl From<&SearchSettings> for StallLimits {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            primary: settings.stall_limit,
            mobile: settings.mobile_stall_limit,
            extra: settings.extra_stall_limit,
        }
    }
}

/// What the stall rules say after an observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Keep going.
    Continue,
    /// Deficit reached zero.
    Converged,
    /// Too many searches in a row without progress.
    Stalled,
}

/// State of one completion attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    /// Current deficit.
    pub missing_points: u32,
    /// Consecutive observations with an unchanged deficit.
    pub stall_count: u32,
    /// Current phase.
    pub phase: Phase,
    /// Where surfaces are sent back to after cleanup.
    pub last_location: Option<String>,
}

impl SessionState {
    /// Fresh primary-phase state.
    pub fn new(missing_points: u32) -> Self {
        Self {
            missing_points,
            stall_count: 0,
            phase: Phase::Primary,
            last_location: None,
        }
    }

    /// State after a search that left the deficit at `missing_points`.
    #[must_use]
    pub fn observe(&self, missing_points: u32) -> Self {
        let stall_count = if missing_points == self.missing_points {
            self.stall_count + 1
        } else {
            0
        };
        Self {
            missing_points,
            stall_count,
            phase: self.phase,
            last_location: self.last_location.clone(),
        }
    }

    /// Record the latest result location; `None` keeps the current one.
    #[must_use]
    pub fn at_location(self, location: Option<String>) -> Self {
        Self {
            last_location: location.or(self.last_location),
            ..self
        }
    }

    /// Enter the extra phase with a phase-scoped stall counter.
    #[must_use]
    pub fn enter_extra(self) -> Self {
        Self {
            phase: Phase::Extra,
            stall_count: 0,
            ..self
        }
    }

    /// Apply the stall rules for `mode`.
    ///
    /// Convergence wins over stalling. In the primary phase mobile sessions
    /// use the stricter mobile limit as well as the general one; the extra
    /// phase uses its own limit in every mode.
    pub fn verdict(&self, mode: SearchMode, limits: &StallLimits) -> Verdict {
        if self.missing_points == 0 {
            return Verdict::Converged;
        }
        let stalled = match self.phase {
            Phase::Primary => {
                (mode.is_mobile() && self.stall_count > limits.mobile)
                    || self.stall_count > limits.primary
            }
            Phase::Extra => self.stall_count > limits.extra,
        };
        if stalled {
            Verdict::Stalled
        } else {
            Verdict::Continue
        }
    }
}
