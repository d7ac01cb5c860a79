//! The coarse interview stage machine.
//!
//! A session moves through exactly three stages: `Briefing` (introduction and
//! free chat), `Assessment` (the fixed question sequence), and `Feedback`
//! (closing summary). Transitions are monotonic; the only way back to
//! `Briefing` is a full session reset.

use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Briefing,
    Assessment,
    Feedback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Briefing => write!(f, "briefing"),
            Stage::Assessment => write!(f, "assessment"),
            Stage::Feedback => write!(f, "feedback"),
        }
    }
}

impl Stage {
    /// Validates that an operation is legal in the current stage.
    ///
    /// `expected` is the human-readable name of the stage(s) the operation
    /// requires; it is carried into the error so callers can tell misuse
    /// apart from dependency failures.
    pub fn guard(self, allowed: &[Stage], expected: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self) {
            Ok(())
        } else {
            Err(SessionError::StageViolation {
                expected,
                actual: self,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&Stage::Briefing).unwrap(), "\"briefing\"");
        assert_eq!(
            serde_json::to_string(&Stage::Assessment).unwrap(),
            "\"assessment\""
        );
        assert_eq!(serde_json::to_string(&Stage::Feedback).unwrap(), "\"feedback\"");
    }

    #[test]
    fn guard_accepts_listed_stages() {
        assert!(Stage::Assessment
            .guard(&[Stage::Assessment], "Assessment")
            .is_ok());
        assert!(Stage::Briefing
            .guard(&[Stage::Briefing, Stage::Assessment], "Briefing or Assessment")
            .is_ok());
    }

    #[test]
    fn guard_rejects_other_stages() {
        let err = Stage::Briefing
            .guard(&[Stage::Assessment], "Assessment")
            .unwrap_err();
        match err {
            SessionError::StageViolation { expected, actual } => {
                assert_eq!(expected, "Assessment");
                assert_eq!(actual, Stage::Briefing);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
