//! The session orchestrator: the single entry point for every external
//! request.
//!
//! Each public operation follows the same pattern: validate against the
//! current stage, resolve a prompt, make at most one gateway call, persist,
//! respond. The session lives behind one `RwLock`; mutating operations hold
//! the write guard across their single gateway call so at most one in-flight
//! request mutates state, while transcript reads and saves share the read
//! guard. The gateway is always invoked before any state is mutated, so a
//! failed operation leaves the session exactly as it found it.

use crate::engine::Stage;
use crate::error::SessionError;
use crate::gateway::GenerationGateway;
use crate::prompts::PromptSet;
use crate::questions::QuestionCursor;
use crate::session::{BriefingTurn, Session};
use crate::snapshot::{SessionSnapshot, SnapshotKind, SnapshotSink};
use crate::transcript::{QuestionRecord, TableRow};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// One conversational turn handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResponse {
    /// True once the interview has reached the feedback stage.
    pub completed: bool,
    pub stage: Stage,
    /// The text the agent should speak.
    pub text: String,
    /// One-based question number during assessment, zero otherwise.
    pub question_number: usize,
    /// The accumulated total, reported once the interview is complete.
    pub total_score: Option<u32>,
}

/// Read-only view of the transcript.
#[derive(Debug, Clone)]
pub struct TranscriptView {
    pub total_score: u32,
    pub entries: Vec<QuestionRecord>,
}

pub struct SessionOrchestrator {
    session: RwLock<Session>,
    gateway: Arc<dyn GenerationGateway>,
    sink: Arc<dyn SnapshotSink>,
    prompts: PromptSet,
}

impl SessionOrchestrator {
    pub fn new(
        cursor: QuestionCursor,
        gateway: Arc<dyn GenerationGateway>,
        sink: Arc<dyn SnapshotSink>,
        prompts: PromptSet,
    ) -> Self {
        Self {
            session: RwLock::new(Session::new(cursor)),
            gateway,
            sink,
            prompts,
        }
    }

    /// Produces the next agent turn for the current stage.
    ///
    /// Repeated calls without intervening progress re-serve the cached turn
    /// (briefing), the stored ask-prompt (assessment), or the already
    /// generated closing feedback, without touching the gateway again.
    #[instrument(skip(self))]
    pub async fn next_turn(&self) -> Result<TurnResponse, SessionError> {
        let mut session = self.session.write().await;
        match session.stage() {
            Stage::Briefing => {
                if let Some(text) = session.cached_turn.clone() {
                    return Ok(briefing_turn(text));
                }
                let prompt = self.prompts.opening_prompt();
                let text = self.gateway.generate(&prompt).await?;
                session.briefing.push(BriefingTurn::agent(text.clone()));
                session.cached_turn = Some(text.clone());
                info!("briefing opened");
                Ok(briefing_turn(text))
            }
            Stage::Assessment => {
                if session.cursor.is_exhausted() {
                    return self.feedback_turn(&mut session).await;
                }
                let index = session.cursor.position();
                let number = session.cursor.number();
                if let Some(record) = session.transcript.get(index) {
                    // The question was already asked; repeat it verbatim.
                    return Ok(assessment_turn(record.agent_prompt.clone(), number));
                }
                let question = session.cursor.current()?.to_string();
                let prompt = self.prompts.ask_prompt(&question, number);
                let text = self.gateway.generate(&prompt).await?;
                session
                    .transcript
                    .record_question_asked(index, number, &question, &text)?;
                info!(question_number = number, "question asked");
                Ok(assessment_turn(text, number))
            }
            Stage::Feedback => {
                let total = session.total_score();
                let text = session
                    .final_feedback
                    .clone()
                    .unwrap_or_default();
                Ok(feedback_response(text, total))
            }
        }
    }

    /// Enters the feedback stage: generates the closing message once,
    /// persists the final snapshot, then commits the stage change.
    async fn feedback_turn(&self, session: &mut Session) -> Result<TurnResponse, SessionError> {
        let total = session.total_score();
        let prompt = self.prompts.summary_prompt(total);
        let text = self.gateway.generate(&prompt).await?;

        // Persist before committing so a failed write leaves the session
        // still in assessment and the request can be retried.
        let mut snapshot = session.snapshot();
        snapshot.final_feedback = Some(text.clone());
        let prefix = self
            .sink
            .persist(&snapshot, SnapshotKind::Final)
            .map_err(|e| SessionError::Persistence(e.to_string()))?;

        session.enter_feedback(text.clone());
        info!(total_score = total, file_prefix = %prefix, "interview complete, final snapshot written");
        Ok(feedback_response(text, total))
    }

    /// Marks the briefing as done. Idempotent while in assessment; illegal
    /// once the interview has reached feedback.
    pub async fn advance_past_briefing(&self) -> Result<(), SessionError> {
        let mut session = self.session.write().await;
        session.stage().guard(
            &[Stage::Briefing, Stage::Assessment],
            "Briefing or Assessment",
        )?;
        session.advance_past_briefing();
        info!("briefing marked complete");
        Ok(())
    }

    /// Records the patient's 0-7 rating for the active question and returns
    /// the generated empathy reply.
    #[instrument(skip(self))]
    pub async fn submit_score(&self, score: i64) -> Result<String, SessionError> {
        let mut session = self.session.write().await;
        session.stage().guard(&[Stage::Assessment], "Assessment")?;
        if score < 0 || score > i64::from(crate::transcript::MAX_SCORE) {
            return Err(SessionError::InvalidScore(score));
        }

        let index = session.cursor.position();
        let record = session
            .transcript
            .get(index)
            .ok_or(SessionError::NoSuchRecord(index))?;
        if record.score.is_some() {
            return Err(SessionError::DuplicateRecord(index));
        }
        let question = record.question_text.clone();

        let prompt = self.prompts.empathy_prompt(&question, score as u8);
        let reply = self.gateway.generate(&prompt).await?;
        session.transcript.record_score(index, score, &reply)?;
        info!(question_number = index + 1, score, "score recorded");
        Ok(reply)
    }

    /// Handles a free-text message from the patient.
    ///
    /// During briefing this is open conversation. During assessment it is a
    /// clarification of the active question until that question has been
    /// scored; after scoring it is the patient's explanation, which closes
    /// the question-answer cycle and advances the cursor. Illegal once the
    /// interview has reached feedback.
    #[instrument(skip_all)]
    pub async fn submit_free_text(&self, text: &str) -> Result<String, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let mut session = self.session.write().await;
        session.stage().guard(
            &[Stage::Briefing, Stage::Assessment],
            "Briefing or Assessment",
        )?;

        match session.stage() {
            Stage::Briefing => {
                let prompt = self.prompts.briefing_chat_prompt(&session.briefing, text);
                let reply = self.gateway.generate(&prompt).await?;
                session.briefing.push(BriefingTurn::patient(text));
                session.briefing.push(BriefingTurn::agent(reply.clone()));
                session.cached_turn = Some(reply.clone());
                Ok(reply)
            }
            Stage::Assessment => {
                let index = session.cursor.position();
                let scored = session.transcript.get(index).and_then(|r| r.score);
                match scored {
                    None => {
                        // Not scored yet: clarify the active question only.
                        let question = session.cursor.current()?.to_string();
                        let prompt = self.prompts.clarification_prompt(&question, text);
                        let reply = self.gateway.generate(&prompt).await?;
                        Ok(reply)
                    }
                    Some(score) => {
                        let question = session
                            .transcript
                            .get(index)
                            .map(|r| r.question_text.clone())
                            .ok_or(SessionError::NoSuchRecord(index))?;
                        let prompt = self.prompts.closing_prompt(&question, score, text);
                        let reply = self.gateway.generate(&prompt).await?;
                        session.transcript.record_patient_reply(index, text, &reply)?;
                        session.cursor.advance()?;
                        info!(question_number = index + 1, "question cycle closed");
                        Ok(reply)
                    }
                }
            }
            Stage::Feedback => unreachable!("guarded above"),
        }
    }

    pub async fn transcript(&self) -> TranscriptView {
        let session = self.session.read().await;
        TranscriptView {
            total_score: session.total_score(),
            entries: session.transcript.entries().to_vec(),
        }
    }

    pub async fn export_rows(&self) -> Result<Vec<TableRow>, SessionError> {
        let session = self.session.read().await;
        session
            .transcript
            .export_rows(session.final_feedback.as_deref())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.read().await.snapshot()
    }

    /// Like [`snapshot`](Self::snapshot), but fails with `EmptyExport` when
    /// no question has been asked. The check and the copy happen under one
    /// read guard, so the returned snapshot is never empty.
    pub async fn export_snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let session = self.session.read().await;
        if session.transcript.is_empty() {
            return Err(SessionError::EmptyExport);
        }
        Ok(session.snapshot())
    }

    /// Writes a durable snapshot of the in-flight session and returns the
    /// file prefix it was stored under.
    pub async fn save_partial(&self) -> Result<String, SessionError> {
        let session = self.session.read().await;
        let snapshot = session.snapshot();
        let prefix = self
            .sink
            .persist(&snapshot, SnapshotKind::Partial)
            .map_err(|e| SessionError::Persistence(e.to_string()))?;
        info!(file_prefix = %prefix, "partial snapshot written");
        Ok(prefix)
    }

    /// Reinitializes the whole session in one step.
    pub async fn reset(&self) {
        let mut session = self.session.write().await;
        session.reset();
        info!("session reset");
    }
}

fn briefing_turn(text: String) -> TurnResponse {
    TurnResponse {
        completed: false,
        stage: Stage::Briefing,
        text,
        question_number: 0,
        total_score: None,
    }
}

fn assessment_turn(text: String, question_number: usize) -> TurnResponse {
    TurnResponse {
        completed: false,
        stage: Stage::Assessment,
        text,
        question_number,
        total_score: None,
    }
}

fn feedback_response(text: String, total_score: u32) -> TurnResponse {
    TurnResponse {
        completed: true,
        stage: Stage::Feedback,
        text,
        question_number: 0,
        total_score: Some(total_score),
    }
}
