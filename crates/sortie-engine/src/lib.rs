//! # sortie-engine
//!
//! Adaptive search-completion engine. Given a points deficit and a stream of
//! candidate queries, it drives a browser through search actions until the
//! deficit is gone, progress stalls or the candidates run out.
//!
//! - [`actuator`]: the [`Actuator`] (browser surfaces) and [`Sensor`]
//!   (points counters) seams
//! - [`retry`]: bounded retry-with-recovery combinator
//! - [`resources`]: keeps the surface set bounded and recoverable
//! - [`executor`]: one search action with retries
//! - [`session`]: the two-phase state machine and its report
//! - [`runner`]: mobile retry budget around a session
//! - [`testutil`]: scripted in-memory browser
//!
//! ## Crate Position
//!
//! Top of the stack. Depends on sortie-core, sortie-settings and
//! sortie-queries.

#![deny(unsafe_code)]

pub mod actuator;
pub mod errors;
pub mod executor;
pub mod resources;
pub mod retry;
pub mod runner;
pub mod session;
pub mod testutil;

pub use actuator::{Actuator, ScrollExtent, Sensor, SurfaceId};
pub use errors::{ActuatorError, AttemptError, SensorError};
pub use executor::{Execution, SearchExecutor};
pub use resources::{Normalization, ResourceManager};
pub use retry::{Attempt, RetryOutcome, RetryPolicy};
pub use runner::SearchRunner;
pub use session::{Phase, SearchSession, SessionOutcome, SessionReport, SessionState, StallLimits};

use sortie_settings::LoggingSettings;

/// Install the global subscriber from the `logging` settings section.
/// `RUST_LOG` still wins over `logging.level`.
pub fn init_logging(settings: &LoggingSettings) {
    sortie_core::logging::init_subscriber(&settings.level, settings.json);
}

