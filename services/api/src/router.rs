//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, the speech proxies, and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        AckResponse, EmpathyResponse, ErrorResponse, FreeTextPayload, ReplyResponse, SaveResponse,
        ScorePayload, SynthesisPayload, TranscriptResponse, TranscriptionResponse, TurnResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::next_turn,
        handlers::advance_past_briefing,
        handlers::submit_score,
        handlers::submit_free_text,
        handlers::get_transcript,
        handlers::reset,
        handlers::export_csv,
        handlers::save_snapshot,
        handlers::synthesize,
        handlers::transcribe,
    ),
    components(
        schemas(
            TurnResponse,
            ScorePayload,
            EmpathyResponse,
            FreeTextPayload,
            ReplyResponse,
            TranscriptResponse,
            SaveResponse,
            AckResponse,
            ErrorResponse,
            SynthesisPayload,
            TranscriptionResponse
        )
    ),
    tags(
        (name = "Celine API", description = "Conversational CIWA withdrawal assessment")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/ciwa/next", get(handlers::next_turn))
        .route("/ciwa/continue", post(handlers::advance_past_briefing))
        .route("/ciwa/score", post(handlers::submit_score))
        .route("/ciwa/reply", post(handlers::submit_free_text))
        .route("/ciwa/transcript", get(handlers::get_transcript))
        .route("/ciwa/reset", post(handlers::reset))
        .route("/ciwa/export.csv", get(handlers::export_csv))
        .route("/ciwa/save", post(handlers::save_snapshot))
        .route("/tts", post(handlers::synthesize))
        .route("/stt", post(handlers::transcribe))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Merge the stateful routes with the stateless Swagger UI.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
