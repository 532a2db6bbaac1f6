//! Errors raised by the engine's external collaborators.
//!
//! None of these escape the session controller: actuator faults are retried
//! by the executor and sensor faults end the attempt with a report.

use thiserror::Error;

/// Failure of a browser surface primitive.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ActuatorError {
    /// Page navigation failed or timed out.
    #[error("navigation failed: {message}")]
    Navigation {
        /// Description of the failure.
        message: String,
    },

    /// A selector matched nothing within its timeout.
    #[error("element not found: {selector}")]
    ElementNotFound {
        /// Selector that was waited for.
        selector: String,
    },

    /// An operation exceeded its timeout.
    #[error("timed out after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Operation that timed out.
        operation: String,
        /// Timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The surface was closed underneath the operation.
    #[error("surface closed: {surface}")]
    SurfaceClosed {
        /// Identifier of the closed surface.
        surface: String,
    },

    /// Any other driver failure (crash, protocol error).
    #[error("actuator error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

/// Failure reading the points counters.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SensorError {
    /// The counters endpoint could not be reached.
    #[error("counters unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The counters payload had an unexpected shape.
    #[error("malformed counters: {message}")]
    Malformed {
        /// Description of what was wrong.
        message: String,
    },
}

/// Failure of one search attempt: either a surface step or the closing
/// counters read.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AttemptError {
    /// A surface primitive failed.
    #[error(transparent)]
    Actuator(#[from] ActuatorError),

    /// The counters read after the search failed.
    #[error(transparent)]
    Sensor(#[from] SensorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ActuatorError::Timeout {
            operation: "wait for #sb_form_q".into(),
            timeout_ms: 10_000,
        };
        assert_eq!(err.to_string(), "timed out after 10000ms: wait for #sb_form_q");
        assert_eq!(
            SensorError::Unavailable {
                message: "502".into()
            }
            .to_string(),
            "counters unavailable: 502"
        );
    }

    #[test]
    fn attempt_error_is_transparent() {
        let err: AttemptError = ActuatorError::ElementNotFound {
            selector: "#sb_form_q".into(),
        }
        .into();
        assert_eq!(err.to_string(), "element not found: #sb_form_q");
        assert!(matches!(err, AttemptError::Actuator(_)));
    }
}
