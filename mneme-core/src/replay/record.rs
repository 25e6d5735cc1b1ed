//! Call trace types and persistence
//!
//! A [`CallTrace`] is the reconstructed history of one instrumented
//! operation. It renders as a human-readable report and can be saved to a
//! JSON-lines file for later inspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use super::REPLAY_SCHEMA_VERSION;
use crate::error::{MnemeError, Result};
use crate::recorder::OperationId;

/// The ordered call history of one operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTrace {
    /// Schema version for forward compatibility
    pub schema_version: u32,

    /// Operation the trace belongs to
    pub operation: OperationId,

    /// Invocation attempts according to the counter
    pub call_count: u64,

    /// Completed calls, oldest first
    pub calls: Vec<RecordedCall>,

    /// Log entries without a partner in the other log
    pub incomplete: usize,

    /// When the trace was reconstructed
    pub replayed_at: DateTime<Utc>,
}

/// One completed call: an input log entry paired with its output entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedCall {
    /// Position in the operation's logs
    pub sequence: u64,

    /// Serialized arguments
    pub input: String,

    /// Serialized result
    pub output: String,
}

/// First line of a saved trace
#[derive(Debug, Serialize, Deserialize)]
struct TraceHeader {
    #[serde(rename = "type")]
    kind: String,
    schema_version: u32,
    operation: OperationId,
    call_count: u64,
    incomplete: usize,
    replayed_at: DateTime<Utc>,
}

impl CallTrace {
    /// An empty trace for an operation that was never called
    pub fn empty(operation: OperationId) -> Self {
        Self {
            schema_version: REPLAY_SCHEMA_VERSION,
            operation,
            call_count: 0,
            calls: Vec::new(),
            incomplete: 0,
            replayed_at: Utc::now(),
        }
    }

    /// Number of completed calls in the trace
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Whether the input and output logs disagreed in length
    pub fn is_torn(&self) -> bool {
        self.incomplete > 0
    }

    /// Render the human-readable report
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Save the trace to a JSON-lines file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);

        let header = TraceHeader {
            kind: "header".to_string(),
            schema_version: self.schema_version,
            operation: self.operation.clone(),
            call_count: self.call_count,
            incomplete: self.incomplete,
            replayed_at: self.replayed_at,
        };
        writeln!(writer, "{}", serde_json::to_string(&header)?)?;

        for call in &self.calls {
            writeln!(writer, "{}", serde_json::to_string(call)?)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load a trace from a JSON-lines file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "Empty trace file")
        })??;
        let header: TraceHeader = serde_json::from_str(&header_line)?;

        if header.kind != "header" {
            return Err(MnemeError::Other(format!(
                "Expected trace header, found '{}'",
                header.kind
            )));
        }

        let mut trace = CallTrace {
            schema_version: header.schema_version,
            operation: header.operation,
            call_count: header.call_count,
            calls: Vec::new(),
            incomplete: header.incomplete,
            replayed_at: header.replayed_at,
        };

        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            trace.calls.push(serde_json::from_str(&line)?);
        }

        Ok(trace)
    }
}

impl fmt::Display for CallTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was called {} times:", self.operation, self.call_count)?;
        for call in &self.calls {
            write!(f, "\n{}({}) -> {}", self.operation, call.input, call.output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod record_tests {
    use super::*;

    fn sample_trace() -> CallTrace {
        let mut trace = CallTrace::empty(OperationId::new("Cache.store"));
        trace.call_count = 2;
        trace.calls = vec![
            RecordedCall {
                sequence: 0,
                input: "\"foo\"".to_string(),
                output: "\"k1\"".to_string(),
            },
            RecordedCall {
                sequence: 1,
                input: "123".to_string(),
                output: "\"k2\"".to_string(),
            },
        ];
        trace
    }

    #[test]
    fn test_render() {
        let trace = sample_trace();
        assert_eq!(
            trace.render(),
            "Cache.store was called 2 times:\n\
             Cache.store(\"foo\") -> \"k1\"\n\
             Cache.store(123) -> \"k2\""
        );
    }

    #[test]
    fn test_render_empty() {
        let trace = CallTrace::empty(OperationId::new("never.called"));
        assert!(trace.is_empty());
        assert!(!trace.is_torn());
        assert_eq!(trace.render(), "never.called was called 0 times:");
    }

    #[test]
    fn test_trace_save_load() {
        let mut trace = sample_trace();
        trace.incomplete = 1;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("trace.jsonl");

        trace.save(&path).unwrap();
        let loaded = CallTrace::load(&path).unwrap();

        assert_eq!(loaded, trace);
        assert!(loaded.is_torn());
    }

    #[test]
    fn test_load_empty_file_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.jsonl");
        std::fs::write(&path, "").unwrap();

        assert!(matches!(CallTrace::load(&path), Err(MnemeError::Io(_))));
    }
}
