//! Axum Handlers for the interview API
//!
//! This module contains the logic for handling HTTP requests and the mapping
//! from the core error taxonomy onto HTTP statuses: caller misuse maps to
//! 400, sequencing violations to 409, generation backend failures to 502/504.
//! It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use celine_core::error::SessionError;
use celine_core::gateway::GatewayError;
use std::sync::Arc;
use tracing::error;

use crate::{
    archive::render_csv,
    models::{
        AckResponse, EmpathyResponse, ErrorResponse, FreeTextPayload, ReplyResponse, SaveResponse,
        ScorePayload, SynthesisPayload, TranscriptResponse, TranscriptionResponse, TurnResponse,
    },
    speech::SpeechError,
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    BadGateway(String),
    GatewayTimeout(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err {
            SessionError::StageViolation { .. }
            | SessionError::InvalidScore(_)
            | SessionError::EmptyInput
            | SessionError::EmptyExport => ApiError::BadRequest(message),
            SessionError::CursorExhausted
            | SessionError::NoSuchRecord(_)
            | SessionError::DuplicateRecord(_)
            | SessionError::NotYetScored(_) => ApiError::Conflict(message),
            SessionError::Gateway(GatewayError::Unavailable(_)) => ApiError::BadGateway(message),
            SessionError::Gateway(GatewayError::Timeout(_)) => ApiError::GatewayTimeout(message),
            SessionError::Persistence(_) => ApiError::Internal(message),
        }
    }
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::NotConfigured => ApiError::ServiceUnavailable(err.to_string()),
            SpeechError::Upstream(_) => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::GatewayTimeout(message) => (StatusCode::GATEWAY_TIMEOUT, message),
            ApiError::ServiceUnavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
            ApiError::Internal(message) => {
                error!("Internal Server Error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Get the next conversational turn for the current stage.
#[utoipa::path(
    get,
    path = "/ciwa/next",
    responses(
        (status = 200, description = "The next agent turn", body = TurnResponse),
        (status = 502, description = "Generation backend unavailable", body = ErrorResponse),
        (status = 504, description = "Generation backend timed out", body = ErrorResponse)
    )
)]
pub async fn next_turn(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TurnResponse>, ApiError> {
    let turn = state.orchestrator.next_turn().await?;
    Ok(Json(turn.into()))
}

/// Mark the briefing as complete and move to the assessment stage.
#[utoipa::path(
    post,
    path = "/ciwa/continue",
    responses(
        (status = 200, description = "Briefing complete", body = AckResponse),
        (status = 400, description = "Interview already finished", body = ErrorResponse)
    )
)]
pub async fn advance_past_briefing(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AckResponse>, ApiError> {
    state.orchestrator.advance_past_briefing().await?;
    Ok(Json(AckResponse {
        message: "Briefing marked as complete. Moving to the assessment stage.".to_string(),
    }))
}

/// Submit the patient's 0-7 rating for the active question.
#[utoipa::path(
    post,
    path = "/ciwa/score",
    request_body = ScorePayload,
    responses(
        (status = 200, description = "Score recorded", body = EmpathyResponse),
        (status = 400, description = "Invalid score or wrong stage", body = ErrorResponse),
        (status = 409, description = "Question already scored or never asked", body = ErrorResponse)
    )
)]
pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ScorePayload>,
) -> Result<Json<EmpathyResponse>, ApiError> {
    let empathy_response = state.orchestrator.submit_score(payload.score).await?;
    Ok(Json(EmpathyResponse { empathy_response }))
}

/// Submit a free-text message from the patient.
///
/// During briefing this is open conversation; during assessment it is a
/// clarification until the active question is scored, and the closing
/// explanation afterwards.
#[utoipa::path(
    post,
    path = "/ciwa/reply",
    request_body = FreeTextPayload,
    responses(
        (status = 200, description = "The agent's reply", body = ReplyResponse),
        (status = 400, description = "Empty input or wrong stage", body = ErrorResponse)
    )
)]
pub async fn submit_free_text(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FreeTextPayload>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let response = state.orchestrator.submit_free_text(&payload.text).await?;
    Ok(Json(ReplyResponse { response }))
}

/// Get the running transcript and total score.
#[utoipa::path(
    get,
    path = "/ciwa/transcript",
    responses(
        (status = 200, description = "Transcript so far", body = TranscriptResponse)
    )
)]
pub async fn get_transcript(State(state): State<Arc<AppState>>) -> Json<TranscriptResponse> {
    let view = state.orchestrator.transcript().await;
    Json(TranscriptResponse {
        total_score: view.total_score,
        session_log: view.entries,
    })
}

/// Reset the session to its initial state.
#[utoipa::path(
    post,
    path = "/ciwa/reset",
    responses(
        (status = 200, description = "Session reset", body = AckResponse)
    )
)]
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<AckResponse> {
    state.orchestrator.reset().await;
    Json(AckResponse {
        message: "CIWA session reset.".to_string(),
    })
}

/// Export the transcript as CSV.
#[utoipa::path(
    get,
    path = "/ciwa/export.csv",
    responses(
        (status = 200, description = "CSV export of the session", content_type = "text/csv"),
        (status = 400, description = "No questions asked yet", body = ErrorResponse)
    )
)]
pub async fn export_csv(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    // One atomic snapshot: the emptiness check and the copy share a lock.
    let snapshot = state.orchestrator.export_snapshot().await?;
    let csv = render_csv(&snapshot);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"ciwa_session_export.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// Write a durable snapshot of the in-flight session.
#[utoipa::path(
    post,
    path = "/ciwa/save",
    responses(
        (status = 200, description = "Snapshot written", body = SaveResponse),
        (status = 500, description = "Snapshot could not be written", body = ErrorResponse)
    )
)]
pub async fn save_snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SaveResponse>, ApiError> {
    let file_prefix = state.orchestrator.save_partial().await?;
    Ok(Json(SaveResponse {
        message: "Partial session saved".to_string(),
        file_prefix,
    }))
}

/// Synthesize speech for a piece of agent text (opaque proxy).
#[utoipa::path(
    post,
    path = "/tts",
    request_body = SynthesisPayload,
    responses(
        (status = 200, description = "Synthesized audio", content_type = "audio/wav"),
        (status = 503, description = "No TTS upstream configured", body = ErrorResponse)
    )
)]
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SynthesisPayload>,
) -> Result<Response, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing text".to_string()));
    }
    let audio = state.speech.synthesize(&payload.text).await?;
    Ok(([(header::CONTENT_TYPE, "audio/wav")], audio).into_response())
}

/// Transcribe patient audio (opaque proxy).
#[utoipa::path(
    post,
    path = "/stt",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Transcribed text", body = TranscriptionResponse),
        (status = 503, description = "No STT upstream configured", body = ErrorResponse)
    )
)]
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No audio uploaded".to_string()));
    }
    let text = state.speech.transcribe(body).await?;
    Ok(Json(TranscriptionResponse { text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn caller_errors_map_to_bad_request() {
        assert_eq!(
            status_of(SessionError::InvalidScore(9).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(SessionError::EmptyInput.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(SessionError::EmptyExport.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn sequencing_errors_map_to_conflict() {
        assert_eq!(
            status_of(SessionError::DuplicateRecord(2).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(SessionError::NotYetScored(0).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(SessionError::CursorExhausted.into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn gateway_failures_map_to_upstream_statuses() {
        assert_eq!(
            status_of(SessionError::Gateway(GatewayError::Unavailable("down".into())).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(
                SessionError::Gateway(GatewayError::Timeout(Duration::from_secs(60))).into()
            ),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn persistence_failures_hide_details_behind_a_500() {
        let response =
            ApiError::from(SessionError::Persistence("disk full".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn speech_errors_map_to_service_statuses() {
        assert_eq!(
            status_of(SpeechError::NotConfigured.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(SpeechError::Upstream("refused".into()).into()),
            StatusCode::BAD_GATEWAY
        );
    }
}
