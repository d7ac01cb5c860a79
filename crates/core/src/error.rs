//! Error taxonomy for session operations.
//!
//! Errors distinguish caller misuse (wrong stage, out-of-range score, empty
//! input) from internal sequencing violations (a record touched out of order)
//! and from external dependency failures (the generation backend). The API
//! layer maps each group to a different HTTP status.

use crate::engine::Stage;
use crate::gateway::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not legal in the session's current stage.
    #[error("operation requires stage {expected}, but the session is in {actual}")]
    StageViolation {
        expected: &'static str,
        actual: Stage,
    },

    /// A submitted score was outside the CIWA range.
    #[error("score {0} is outside the CIWA range 0-7")]
    InvalidScore(i64),

    /// The question sequence has been fully consumed.
    #[error("no questions remain; the assessment sequence is exhausted")]
    CursorExhausted,

    /// A record was addressed before the question was ever asked.
    #[error("no record exists for question index {0}")]
    NoSuchRecord(usize),

    /// A record field that is written exactly once was written twice.
    #[error("question index {0} already has a value for this step")]
    DuplicateRecord(usize),

    /// A patient reply arrived before the question was scored.
    #[error("question index {0} has not been scored yet")]
    NotYetScored(usize),

    /// Free-text input was missing or blank.
    #[error("free-text input must not be empty")]
    EmptyInput,

    /// Export was requested before any question was asked.
    #[error("nothing to export: no questions have been asked yet")]
    EmptyExport,

    /// The generation backend failed or timed out.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Writing a durable snapshot failed.
    #[error("snapshot persistence failed: {0}")]
    Persistence(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stage_violation_names_both_stages() {
        let err = SessionError::StageViolation {
            expected: "Assessment",
            actual: Stage::Briefing,
        };
        let msg = err.to_string();
        assert!(msg.contains("Assessment"));
        assert!(msg.contains("briefing"));
    }

    #[test]
    fn gateway_errors_pass_through_transparently() {
        let err: SessionError = GatewayError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(
            err.to_string(),
            GatewayError::Timeout(Duration::from_secs(30)).to_string()
        );
    }

    #[test]
    fn invalid_score_reports_the_offending_value() {
        assert!(SessionError::InvalidScore(-1).to_string().contains("-1"));
        assert!(SessionError::InvalidScore(8).to_string().contains('8'));
    }
}
