//! Durable point-in-time session snapshots.

use crate::session::BriefingTurn;
use crate::transcript::{QuestionRecord, TableRow, rows_from_records};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable copy of the session at one instant. Field names are stable
/// and shared between the JSON snapshot and the tabular export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub timestamp: DateTime<Utc>,
    pub total_score: u32,
    pub briefing_conversation: Vec<BriefingTurn>,
    pub session_log: Vec<QuestionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_feedback: Option<String>,
}

impl SessionSnapshot {
    /// The tabular projection of this snapshot, one row per record.
    pub fn table_rows(&self) -> Vec<TableRow> {
        rows_from_records(&self.session_log, self.final_feedback.as_deref())
    }
}

/// Whether a snapshot closes a finished session or captures one in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Final,
    Partial,
}

/// Destination for durable snapshots. The write is synchronous and must
/// complete (or fail loudly) before the triggering request returns; the
/// returned string is the file prefix the snapshot was written under.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, snapshot: &SessionSnapshot, kind: SnapshotKind) -> anyhow::Result<String>;
}
