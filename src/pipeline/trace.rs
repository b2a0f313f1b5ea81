// Session tracing
// Append-only JSONL record of each monitoring cycle

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during trace operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// A single line of the session trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// ISO 8601 timestamp of when this entry was created
    pub timestamp: String,

    /// Monitoring session this entry belongs to
    pub session: Uuid,

    /// Cycle number within the session (0 for session-level entries)
    pub cycle: u64,

    /// Stage name (e.g., "session", "classification", "skipped")
    pub stage: String,

    /// Human-readable message
    pub message: String,

    /// Optional structured data (scores, counters, alert level)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    pub fn new(session: Uuid, cycle: u64, stage: String, message: String) -> Self {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            session,
            cycle,
            stage,
            message,
            data: None,
        }
    }

    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Helper builder for creating trace entries
pub struct TraceBuilder {
    session: Uuid,
    cycle: u64,
    stage: String,
}

impl TraceBuilder {
    /// Start building an entry for a stage of a cycle
    pub fn stage(session: Uuid, cycle: u64, stage: impl Into<String>) -> Self {
        TraceBuilder {
            session,
            cycle,
            stage: stage.into(),
        }
    }

    /// Entry with a message only
    pub fn message(self, message: impl Into<String>) -> TraceEntry {
        TraceEntry::new(self.session, self.cycle, self.stage, message.into())
    }

    /// Entry with structured data attached
    pub fn with_data(self, message: impl Into<String>, data: serde_json::Value) -> TraceEntry {
        let mut entry = self.message(message);
        entry.data = Some(data);
        entry
    }
}

/// Session trace writer
/// Manages append-only JSONL trace file
pub struct TraceWriter {
    file_path: PathBuf,
    session: Uuid,
}

impl TraceWriter {
    /// Create a writer for a new session
    pub fn new(file_path: PathBuf) -> Self {
        TraceWriter {
            file_path,
            session: Uuid::new_v4(),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Builder bound to this writer's session
    pub fn stage(&self, cycle: u64, stage: impl Into<String>) -> TraceBuilder {
        TraceBuilder::stage(self.session, cycle, stage)
    }

    /// Append a trace entry to the file
    /// Creates file if it doesn't exist
    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        let json_line = entry.to_json_line()?;
        file.write_all(json_line.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Get the trace file path
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Read trace entries from a JSONL file
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let entry: TraceEntry = serde_json::from_str(line)?;
        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builder_carries_session_and_cycle() {
        let session = Uuid::new_v4();
        let entry = TraceBuilder::stage(session, 7, "classification").message("Ventricular");

        assert_eq!(entry.session, session);
        assert_eq!(entry.cycle, 7);
        assert_eq!(entry.stage, "classification");
        assert_eq!(entry.message, "Ventricular");
        assert!(entry.data.is_none());
    }

    #[test]
    fn test_entry_with_data() {
        let entry = TraceBuilder::stage(Uuid::new_v4(), 1, "classification")
            .with_data("scored", serde_json::json!({ "abnormal": 3 }));

        assert_eq!(entry.data.unwrap()["abnormal"], 3);
    }

    #[test]
    fn test_writer_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let trace_path = temp_dir.path().join("trace.jsonl");

        let writer = TraceWriter::new(trace_path.clone());
        writer.write(&writer.stage(0, "session").message("Start")).unwrap();
        writer.write(&writer.stage(1, "classification").message("Normal")).unwrap();

        let entries = read_trace_file(&trace_path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stage, "session");
        assert_eq!(entries[1].cycle, 1);
        assert!(entries.iter().all(|e| e.session == writer.session()));
    }

    #[test]
    fn test_json_line_format() {
        let entry = TraceBuilder::stage(Uuid::new_v4(), 2, "skipped").message("no data");
        let json_line = entry.to_json_line().unwrap();

        assert!(json_line.ends_with('\n'));
        let parsed: TraceEntry = serde_json::from_str(json_line.trim()).unwrap();
        assert_eq!(parsed.stage, "skipped");
        assert!(!json_line.contains("\"data\""));
    }
}
