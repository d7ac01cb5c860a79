//! File-based session archive.
//!
//! Durable storage for session snapshots: every save writes a JSON snapshot
//! and a CSV rendering side by side under the sessions directory, named
//! `ciwa_session_<ts>` for a finished interview and `ciwa_partial_<ts>` for
//! one still in flight. Writes are synchronous; a failure propagates to the
//! request that triggered the save.

use celine_core::snapshot::{SessionSnapshot, SnapshotKind, SnapshotSink};
use celine_core::transcript::TableRow;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SessionArchive {
    dir: PathBuf,
}

impl SessionArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SnapshotSink for SessionArchive {
    fn persist(&self, snapshot: &SessionSnapshot, kind: SnapshotKind) -> anyhow::Result<String> {
        std::fs::create_dir_all(&self.dir)?;

        let stem = match kind {
            SnapshotKind::Final => "ciwa_session",
            SnapshotKind::Partial => "ciwa_partial",
        };
        let prefix = self
            .dir
            .join(format!("{stem}_{}", snapshot.timestamp.format("%Y%m%d_%H%M%S")));

        std::fs::write(
            prefix.with_extension("json"),
            serde_json::to_string_pretty(snapshot)?,
        )?;
        std::fs::write(prefix.with_extension("csv"), render_csv(snapshot))?;

        let prefix = prefix.to_string_lossy().into_owned();
        info!(file_prefix = %prefix, "session snapshot written");
        Ok(prefix)
    }
}

/// Renders a snapshot as CSV: the briefing conversation as leading `#`
/// comment rows, then a header and one row per question record in index
/// order. The closing feedback appears only on the last row.
pub fn render_csv(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();

    if !snapshot.briefing_conversation.is_empty() {
        out.push_str("# Briefing Conversation\n");
        for turn in &snapshot.briefing_conversation {
            let _ = writeln!(out, "# {}: {}", turn.speaker.label(), turn.text.replace('\n', " "));
        }
        out.push('\n');
    }

    out.push_str(&TableRow::COLUMNS.join(","));
    out.push('\n');
    for row in snapshot.table_rows() {
        let fields = [
            row.timestamp.to_rfc3339(),
            row.question_number.to_string(),
            row.question_text,
            row.agent_prompt,
            row.score.map(|s| s.to_string()).unwrap_or_default(),
            row.empathy_reply.unwrap_or_default(),
            row.patient_reply.unwrap_or_default(),
            row.closing_reply.unwrap_or_default(),
            row.final_feedback.unwrap_or_default(),
        ];
        let line: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
