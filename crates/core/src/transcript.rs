//! Append-only transcript of per-question interactions.
//!
//! One `QuestionRecord` exists per question reached. A record is created when
//! the question is asked, mutated once with the score and empathy reply, once
//! more with the patient's free-text reply and the closing remark, and is
//! immutable after that. The running total is maintained eagerly so partial
//! saves never recompute it by summation.

use crate::error::SessionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest legal CIWA item score (inclusive); the scale runs 0-7.
pub const MAX_SCORE: u8 = 7;

/// The full interaction trace for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub timestamp: DateTime<Utc>,
    /// One-based, as shown to the patient.
    pub question_number: usize,
    pub question_text: String,
    /// The exact text the agent spoke when asking.
    pub agent_prompt: String,
    pub score: Option<u8>,
    pub empathy_reply: Option<String>,
    pub patient_reply: Option<String>,
    pub closing_reply: Option<String>,
}

impl QuestionRecord {
    fn new(question_number: usize, question_text: &str, agent_prompt: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            question_number,
            question_text: question_text.to_string(),
            agent_prompt: agent_prompt.to_string(),
            score: None,
            empathy_reply: None,
            patient_reply: None,
            closing_reply: None,
        }
    }

    /// A record is complete once every post-creation field has been written.
    pub fn is_complete(&self) -> bool {
        self.score.is_some()
            && self.empathy_reply.is_some()
            && self.patient_reply.is_some()
            && self.closing_reply.is_some()
    }
}

/// One flattened export row per `QuestionRecord`. Field names are shared with
/// the JSON snapshot so the two projections stay comparable.
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub timestamp: DateTime<Utc>,
    pub question_number: usize,
    pub question_text: String,
    pub agent_prompt: String,
    pub score: Option<u8>,
    pub empathy_reply: Option<String>,
    pub patient_reply: Option<String>,
    pub closing_reply: Option<String>,
    /// Attached only to the last row of an export.
    pub final_feedback: Option<String>,
}

impl TableRow {
    /// Column order for tabular renderings of the export.
    pub const COLUMNS: [&'static str; 9] = [
        "timestamp",
        "question_number",
        "question_text",
        "agent_prompt",
        "score",
        "empathy_reply",
        "patient_reply",
        "closing_reply",
        "final_feedback",
    ];
}

/// Ordered per-question records plus the eagerly maintained total score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptStore {
    entries: Vec<QuestionRecord>,
    total_score: u32,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the record for question `index` (zero-based).
    ///
    /// Records are created strictly in index order; re-asking an existing
    /// index is a `DuplicateRecord`, skipping ahead a `NoSuchRecord`.
    pub fn record_question_asked(
        &mut self,
        index: usize,
        question_number: usize,
        question_text: &str,
        agent_prompt: &str,
    ) -> Result<(), SessionError> {
        if index < self.entries.len() {
            return Err(SessionError::DuplicateRecord(index));
        }
        if index > self.entries.len() {
            return Err(SessionError::NoSuchRecord(index));
        }
        self.entries
            .push(QuestionRecord::new(question_number, question_text, agent_prompt));
        Ok(())
    }

    /// Writes the score and empathy reply for question `index` and adds the
    /// score to the running total. A score is written exactly once.
    pub fn record_score(
        &mut self,
        index: usize,
        score: i64,
        empathy_reply: &str,
    ) -> Result<(), SessionError> {
        if score < 0 || score > i64::from(MAX_SCORE) {
            return Err(SessionError::InvalidScore(score));
        }
        let record = self
            .entries
            .get_mut(index)
            .ok_or(SessionError::NoSuchRecord(index))?;
        if record.score.is_some() {
            return Err(SessionError::DuplicateRecord(index));
        }
        record.score = Some(score as u8);
        record.empathy_reply = Some(empathy_reply.to_string());
        self.total_score += score as u32;
        Ok(())
    }

    /// Writes the patient's free-text reply and the agent's closing remark.
    /// Legal only after the question has been scored.
    pub fn record_patient_reply(
        &mut self,
        index: usize,
        patient_reply: &str,
        closing_reply: &str,
    ) -> Result<(), SessionError> {
        let record = self
            .entries
            .get_mut(index)
            .ok_or(SessionError::NoSuchRecord(index))?;
        if record.score.is_none() {
            return Err(SessionError::NotYetScored(index));
        }
        record.patient_reply = Some(patient_reply.to_string());
        record.closing_reply = Some(closing_reply.to_string());
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&QuestionRecord> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[QuestionRecord] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Flattens the transcript into export rows, ordered by question index
    /// (timestamps are carried but never drive ordering). The final feedback
    /// text, when present, is attached only to the last row.
    pub fn export_rows(
        &self,
        final_feedback: Option<&str>,
    ) -> Result<Vec<TableRow>, SessionError> {
        if self.entries.is_empty() {
            return Err(SessionError::EmptyExport);
        }
        Ok(rows_from_records(&self.entries, final_feedback))
    }
}

/// Flattens records into rows in index order, attaching the final feedback
/// only to the last row. Shared by the live store and by snapshots.
pub fn rows_from_records(
    records: &[QuestionRecord],
    final_feedback: Option<&str>,
) -> Vec<TableRow> {
    let last = records.len().wrapping_sub(1);
    records
        .iter()
        .enumerate()
        .map(|(i, record)| TableRow {
            timestamp: record.timestamp,
            question_number: record.question_number,
            question_text: record.question_text.clone(),
            agent_prompt: record.agent_prompt.clone(),
            score: record.score,
            empathy_reply: record.empathy_reply.clone(),
            patient_reply: record.patient_reply.clone(),
            closing_reply: record.closing_reply.clone(),
            final_feedback: if i == last {
                final_feedback.map(str::to_string)
            } else {
                None
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_one_asked() -> TranscriptStore {
        let mut store = TranscriptStore::new();
        store
            .record_question_asked(0, 1, "Do you feel nauseated?", "Question one. Do you feel nauseated?")
            .unwrap();
        store
    }

    #[test]
    fn total_score_accumulates_eagerly() {
        let mut store = store_with_one_asked();
        store.record_score(0, 5, "That sounds uncomfortable.").unwrap();
        store
            .record_question_asked(1, 2, "Any shaking?", "Question two. Any shaking?")
            .unwrap();
        store.record_score(1, 2, "Noted.").unwrap();
        assert_eq!(store.total_score(), 7);

        // The accumulator matches the sum of recorded scores at all times.
        let summed: u32 = store
            .entries()
            .iter()
            .filter_map(|r| r.score.map(u32::from))
            .sum();
        assert_eq!(store.total_score(), summed);
    }

    #[test]
    fn out_of_range_scores_are_rejected_and_leave_the_total_unchanged() {
        let mut store = store_with_one_asked();
        assert!(matches!(
            store.record_score(0, -1, "x"),
            Err(SessionError::InvalidScore(-1))
        ));
        assert!(matches!(
            store.record_score(0, 8, "x"),
            Err(SessionError::InvalidScore(8))
        ));
        assert_eq!(store.total_score(), 0);
        assert!(store.get(0).unwrap().score.is_none());
    }

    #[test]
    fn scoring_twice_is_rejected_without_double_counting() {
        let mut store = store_with_one_asked();
        store.record_score(0, 3, "first").unwrap();
        assert!(matches!(
            store.record_score(0, 4, "second"),
            Err(SessionError::DuplicateRecord(0))
        ));
        assert_eq!(store.total_score(), 3);
        assert_eq!(store.get(0).unwrap().empathy_reply.as_deref(), Some("first"));
    }

    #[test]
    fn patient_reply_requires_a_prior_score() {
        let mut store = store_with_one_asked();
        assert!(matches!(
            store.record_patient_reply(0, "it comes and goes", "Thank you."),
            Err(SessionError::NotYetScored(0))
        ));
        store.record_score(0, 2, "ok").unwrap();
        store
            .record_patient_reply(0, "it comes and goes", "Thank you.")
            .unwrap();
        assert!(store.get(0).unwrap().is_complete());
    }

    #[test]
    fn records_are_created_strictly_in_order() {
        let mut store = store_with_one_asked();
        assert!(matches!(
            store.record_question_asked(0, 1, "again", "again"),
            Err(SessionError::DuplicateRecord(0))
        ));
        assert!(matches!(
            store.record_question_asked(2, 3, "skip", "skip"),
            Err(SessionError::NoSuchRecord(2))
        ));
        assert!(matches!(
            store.record_score(1, 4, "x"),
            Err(SessionError::NoSuchRecord(1))
        ));
    }

    #[test]
    fn export_rows_match_entry_count_and_tolerate_incomplete_records() {
        let mut store = store_with_one_asked();
        store
            .record_question_asked(1, 2, "Any shaking?", "Question two.")
            .unwrap();
        store.record_score(0, 5, "ok").unwrap();

        let rows = store.export_rows(Some("All done.")).unwrap();
        assert_eq!(rows.len(), 2);
        // Incomplete fields export as empty, not as an error.
        assert_eq!(rows[1].score, None);
        assert_eq!(rows[1].patient_reply, None);
        // Final feedback lands only on the last row.
        assert_eq!(rows[0].final_feedback, None);
        assert_eq!(rows[1].final_feedback.as_deref(), Some("All done."));
    }

    #[test]
    fn export_of_an_empty_transcript_fails() {
        let store = TranscriptStore::new();
        assert!(matches!(
            store.export_rows(None),
            Err(SessionError::EmptyExport)
        ));
    }
}
