//! Upstream source errors.

use thiserror::Error;

/// Errors from suggestion and trends lookups.
///
/// These stay inside the sources: the public lookup methods log them and
/// return an empty batch.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("request failed: {message}")]
    Request {
        /// Description of the failure.
        message: String,
    },

    /// Upstream answered with a non-success status.
    #[error("unexpected HTTP status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response body did not have the expected shape.
    #[error("malformed response: {message}")]
    Parse {
        /// Description of what was wrong.
        message: String,
    },
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            SourceError::Status { status: 503 }.to_string(),
            "unexpected HTTP status 503"
        );
        let err = SourceError::Request {
            message: "connection refused".into(),
        };
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err: SourceError = json_err.into();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
