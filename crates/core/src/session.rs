//! The single owned session aggregate.
//!
//! Everything the original deployment kept in ambient per-process state lives
//! here as one explicitly owned value: the stage, the briefing conversation,
//! the question cursor, the transcript, and the once-only closing feedback.
//! The orchestrator is the only writer; resetting swaps in a whole fresh
//! session so no partially reset state is ever observable.

use crate::engine::Stage;
use crate::questions::QuestionCursor;
use crate::snapshot::SessionSnapshot;
use crate::transcript::TranscriptStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Agent,
    Patient,
}

impl Speaker {
    /// The label used when the conversation is rendered into a prompt or an
    /// export annotation. The agent speaks as the virtual nurse persona.
    pub fn label(self) -> &'static str {
        match self {
            Speaker::Agent => "Nurse Celine",
            Speaker::Patient => "Patient",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One utterance in the briefing conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefingTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl BriefingTurn {
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.into(),
        }
    }

    pub fn patient(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Patient,
            text: text.into(),
        }
    }
}

/// The single active interview session.
#[derive(Debug)]
pub struct Session {
    pub(crate) stage: Stage,
    pub(crate) briefing: Vec<BriefingTurn>,
    /// The last agent turn, re-served verbatim when the same turn is
    /// requested again so repeats never trigger new generation.
    pub(crate) cached_turn: Option<String>,
    pub(crate) cursor: QuestionCursor,
    pub(crate) transcript: TranscriptStore,
    pub(crate) final_feedback: Option<String>,
}

impl Session {
    pub fn new(cursor: QuestionCursor) -> Self {
        Self {
            stage: Stage::Briefing,
            briefing: Vec::new(),
            cached_turn: None,
            cursor: cursor.rewound(),
            transcript: TranscriptStore::new(),
            final_feedback: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn total_score(&self) -> u32 {
        self.transcript.total_score()
    }

    /// Moves from `Briefing` to `Assessment`. Idempotent: a second call in
    /// `Assessment` changes nothing and reports no error.
    pub(crate) fn advance_past_briefing(&mut self) {
        if self.stage == Stage::Briefing {
            self.stage = Stage::Assessment;
            self.cached_turn = None;
        }
    }

    /// Enters the terminal `Feedback` stage with the closing message.
    /// Called exactly once per session, after the cursor is exhausted.
    pub(crate) fn enter_feedback(&mut self, feedback: String) {
        debug_assert!(self.final_feedback.is_none());
        self.stage = Stage::Feedback;
        self.final_feedback = Some(feedback);
        self.cached_turn = None;
    }

    /// A deep point-in-time copy; later session mutations never affect it.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            timestamp: Utc::now(),
            total_score: self.transcript.total_score(),
            briefing_conversation: self.briefing.clone(),
            session_log: self.transcript.entries().to_vec(),
            final_feedback: self.final_feedback.clone(),
        }
    }

    /// Reinitializes every field, keeping the same question list.
    pub(crate) fn reset(&mut self) {
        *self = Session::new(self.cursor.rewound());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::QuestionCursor;

    fn session() -> Session {
        Session::new(QuestionCursor::new(vec!["Q1?".into(), "Q2?".into()]))
    }

    #[test]
    fn starts_in_briefing_with_a_clean_slate() {
        let s = session();
        assert_eq!(s.stage(), Stage::Briefing);
        assert_eq!(s.total_score(), 0);
        assert!(s.briefing.is_empty());
        assert!(s.final_feedback.is_none());
    }

    #[test]
    fn advance_past_briefing_is_idempotent() {
        let mut s = session();
        s.advance_past_briefing();
        assert_eq!(s.stage(), Stage::Assessment);
        s.advance_past_briefing();
        assert_eq!(s.stage(), Stage::Assessment);
    }

    #[test]
    fn reset_restores_all_initial_values() {
        let mut s = session();
        s.advance_past_briefing();
        s.briefing.push(BriefingTurn::patient("hello"));
        s.transcript
            .record_question_asked(0, 1, "Q1?", "Question one.")
            .unwrap();
        s.transcript.record_score(0, 6, "noted").unwrap();
        s.cursor.advance().unwrap();

        s.reset();
        assert_eq!(s.stage(), Stage::Briefing);
        assert_eq!(s.total_score(), 0);
        assert_eq!(s.cursor.position(), 0);
        assert_eq!(s.cursor.len(), 2);
        assert!(s.transcript.is_empty());
        assert!(s.briefing.is_empty());
        assert!(s.cached_turn.is_none());
    }

    #[test]
    fn snapshot_is_a_deep_copy() {
        let mut s = session();
        s.briefing.push(BriefingTurn::agent("Welcome."));
        let snap = s.snapshot();

        s.briefing.push(BriefingTurn::patient("hi"));
        s.transcript
            .record_question_asked(0, 1, "Q1?", "Question one.")
            .unwrap();

        assert_eq!(snap.briefing_conversation.len(), 1);
        assert!(snap.session_log.is_empty());
        assert_eq!(snap.total_score, 0);
    }

    #[test]
    fn speaker_labels_match_the_persona() {
        assert_eq!(Speaker::Agent.label(), "Nurse Celine");
        assert_eq!(Speaker::Patient.label(), "Patient");
        assert_eq!(
            serde_json::to_string(&Speaker::Agent).unwrap(),
            "\"agent\""
        );
    }
}
