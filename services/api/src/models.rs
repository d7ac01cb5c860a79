//! API Models
//!
//! Request and response bodies for the interview endpoints, with `utoipa`
//! schemas for the generated OpenAPI documentation. Wire field names follow
//! the persisted snapshot so transcripts read the same everywhere.

use celine_core::engine::Stage;
use celine_core::transcript::QuestionRecord;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One conversational turn for the client to speak and display.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct TurnResponse {
    /// True once the interview has reached the feedback stage.
    pub completed: bool,
    #[schema(value_type = String, example = "assessment")]
    pub stage: Stage,
    /// The text the agent speaks.
    pub text: String,
    /// One-based question number during assessment, zero otherwise.
    pub question_number: usize,
    /// Total CIWA score, present once the interview is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u32>,
}

impl From<celine_core::orchestrator::TurnResponse> for TurnResponse {
    fn from(turn: celine_core::orchestrator::TurnResponse) -> Self {
        Self {
            completed: turn.completed,
            stage: turn.stage,
            text: turn.text,
            question_number: turn.question_number,
            total_score: turn.total_score,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ScorePayload {
    /// CIWA item rating, 0 (no symptoms) to 7 (very severe).
    #[schema(example = 3)]
    pub score: i64,
}

#[derive(Serialize, ToSchema)]
pub struct EmpathyResponse {
    pub empathy_response: String,
}

#[derive(Deserialize, ToSchema)]
pub struct FreeTextPayload {
    #[schema(example = "What do you mean by nauseated?")]
    pub text: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReplyResponse {
    pub response: String,
}

#[derive(Serialize, ToSchema)]
pub struct TranscriptResponse {
    pub total_score: u32,
    #[schema(value_type = Vec<Object>)]
    pub session_log: Vec<QuestionRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct SaveResponse {
    pub message: String,
    pub file_prefix: String,
}

#[derive(Serialize, ToSchema)]
pub struct AckResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

/// Response body for the speech-to-text proxy.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TranscriptionResponse {
    pub text: String,
}

/// Request body for the text-to-speech proxy.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SynthesisPayload {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_response_omits_the_total_until_completion() {
        let turn = TurnResponse {
            completed: false,
            stage: Stage::Assessment,
            text: "Question one.".to_string(),
            question_number: 1,
            total_score: None,
        };
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"stage\":\"assessment\""));
        assert!(json.contains("\"question_number\":1"));
        assert!(!json.contains("total_score"));
    }

    #[test]
    fn completed_turn_carries_the_total() {
        let turn = TurnResponse {
            completed: true,
            stage: Stage::Feedback,
            text: "Thank you for completing the assessment.".to_string(),
            question_number: 0,
            total_score: Some(17),
        };
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"completed\":true"));
        assert!(json.contains("\"stage\":\"feedback\""));
        assert!(json.contains("\"total_score\":17"));
    }

    #[test]
    fn score_payload_deserializes() {
        let payload: ScorePayload = serde_json::from_str(r#"{"score": 5}"#).unwrap();
        assert_eq!(payload.score, 5);
        // Out-of-range values still deserialize; validation is the core's job.
        let payload: ScorePayload = serde_json::from_str(r#"{"score": -1}"#).unwrap();
        assert_eq!(payload.score, -1);
    }

    #[test]
    fn score_payload_missing_field_fails() {
        let result: Result<ScorePayload, _> = serde_json::from_str(r#"{}"#);
        assert!(result.is_err());
    }

    #[test]
    fn free_text_payload_deserializes() {
        let payload: FreeTextPayload =
            serde_json::from_str(r#"{"text": "what does that mean?"}"#).unwrap();
        assert_eq!(payload.text, "what does that mean?");
    }

    #[test]
    fn error_response_serialization() {
        let error = ErrorResponse {
            message: "score 9 is outside the CIWA range 0-7".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(
            json,
            r#"{"message":"score 9 is outside the CIWA range 0-7"}"#
        );
    }

    #[test]
    fn core_turn_converts_without_loss() {
        let core = celine_core::orchestrator::TurnResponse {
            completed: true,
            stage: Stage::Feedback,
            text: "done".to_string(),
            question_number: 0,
            total_score: Some(9),
        };
        let api: TurnResponse = core.into();
        assert!(api.completed);
        assert_eq!(api.stage, Stage::Feedback);
        assert_eq!(api.text, "done");
        assert_eq!(api.total_score, Some(9));
    }
}
