//! The fixed assessment question sequence and the cursor over it.

use crate::error::SessionError;
use std::sync::Arc;

/// The reference CIWA-Ar interview items, in assessment order.
pub const CIWA_QUESTIONS: [&str; 9] = [
    "Do you feel nauseated? Have you vomited?",
    "Do you notice any shaking in your hands?",
    "Are you sweating more than usual even when resting?",
    "Do you feel anxious or nervous right now?",
    "Do you feel restless or unable to sit still?",
    "Are you experiencing any unusual skin sensations, like itching or crawling?",
    "Have you heard things that others cannot hear?",
    "Have you seen anything unusual or that may not be there?",
    "Do you have a headache or feel pressure in your head?",
];

/// An ordered, immutable list of question texts with a single forward-only
/// position. The underlying list is never mutated; `reset` produces a fresh
/// cursor over the same shared list.
#[derive(Debug, Clone)]
pub struct QuestionCursor {
    questions: Arc<[String]>,
    position: usize,
}

impl QuestionCursor {
    /// Creates a cursor over a fixed question list.
    ///
    /// # Panics
    ///
    /// Panics if `questions` is empty; an interview needs at least one item.
    pub fn new(questions: Vec<String>) -> Self {
        assert!(
            !questions.is_empty(),
            "a question sequence needs at least one item"
        );
        Self {
            questions: questions.into(),
            position: 0,
        }
    }

    /// Cursor over the reference CIWA question set.
    pub fn ciwa() -> Self {
        Self::new(CIWA_QUESTIONS.iter().map(|q| q.to_string()).collect())
    }

    /// The question currently active.
    pub fn current(&self) -> Result<&str, SessionError> {
        self.questions
            .get(self.position)
            .map(String::as_str)
            .ok_or(SessionError::CursorExhausted)
    }

    /// Moves past the current question. Must not be called once exhausted.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        if self.is_exhausted() {
            return Err(SessionError::CursorExhausted);
        }
        self.position += 1;
        Ok(())
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.questions.len()
    }

    /// Zero-based index of the active question.
    pub fn position(&self) -> usize {
        self.position
    }

    /// One-based number of the active question, as shown to the patient.
    pub fn number(&self) -> usize {
        self.position + 1
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// A fresh cursor at position zero over the same question list.
    pub fn rewound(&self) -> Self {
        Self {
            questions: Arc::clone(&self.questions),
            position: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_questions() -> QuestionCursor {
        QuestionCursor::new(vec!["First?".to_string(), "Second?".to_string()])
    }

    #[test]
    fn walks_the_sequence_in_order() {
        let mut cursor = two_questions();
        assert_eq!(cursor.current().unwrap(), "First?");
        assert_eq!(cursor.number(), 1);
        cursor.advance().unwrap();
        assert_eq!(cursor.current().unwrap(), "Second?");
        assert_eq!(cursor.number(), 2);
        assert!(!cursor.is_exhausted());
        cursor.advance().unwrap();
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn current_and_advance_fail_once_exhausted() {
        let mut cursor = QuestionCursor::new(vec!["Only?".to_string()]);
        cursor.advance().unwrap();
        assert!(matches!(
            cursor.current(),
            Err(SessionError::CursorExhausted)
        ));
        assert!(matches!(
            cursor.advance(),
            Err(SessionError::CursorExhausted)
        ));
        // Position never moves past the end.
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn rewound_restarts_without_copying_the_list() {
        let mut cursor = two_questions();
        cursor.advance().unwrap();
        let fresh = cursor.rewound();
        assert_eq!(fresh.position(), 0);
        assert_eq!(fresh.current().unwrap(), "First?");
        assert_eq!(fresh.len(), 2);
    }

    #[test]
    fn reference_set_has_nine_items() {
        let cursor = QuestionCursor::ciwa();
        assert_eq!(cursor.len(), 9);
        assert_eq!(cursor.current().unwrap(), CIWA_QUESTIONS[0]);
    }

    #[test]
    #[should_panic(expected = "at least one item")]
    fn rejects_an_empty_sequence() {
        QuestionCursor::new(Vec::new());
    }
}
