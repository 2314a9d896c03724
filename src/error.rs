//! Error types for the monitoring engine.

use thiserror::Error;

/// Errors that can occur while starting, stopping, or polling a monitoring
/// session.
///
/// None of these are fatal to a running dashboard: validation errors are
/// reported before any request is made, transport and rejection errors leave
/// the last-known-good view in place, and stale responses are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// The target address was rejected before any network call.
    #[error("Invalid target: {0}")]
    Validation(String),

    /// The status or control source could not be reached, timed out, or
    /// returned a body that could not be parsed.
    #[error("Status source unreachable: {0}")]
    Transport(String),

    /// The source answered with a non-success status.
    #[error("Backend rejected request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// A response arrived for a session that has since been stopped or torn
    /// down.
    #[error("Response discarded: monitoring session changed")]
    StaleResponse,
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MonitorError::Transport("request timed out".to_string())
        } else if err.is_connect() {
            MonitorError::Transport(format!("connection failed: {}", err))
        } else if err.is_decode() {
            MonitorError::Transport(format!("invalid response body: {}", err))
        } else {
            MonitorError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_includes_status_and_detail() {
        let err = MonitorError::Rejected {
            status: 400,
            detail: "Already monitoring".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Backend rejected request (400): Already monitoring"
        );
    }

    #[test]
    fn test_validation_message() {
        let err = MonitorError::Validation("Please enter a URL".to_string());
        assert_eq!(err.to_string(), "Invalid target: Please enter a URL");
    }
}
