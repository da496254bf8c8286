mod case;
mod runner;
mod source;

pub use case::{ExpectedEvent, TestAction, TestCase, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, play_case, run_case, RunReport};
pub use source::{read_dialogue_sources, read_test_case, DialogueSources};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BbToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("No .program.json file under {path}.")]
    SourceEmpty { path: PathBuf },
    #[error("More than one {kind} file under {path}.")]
    DuplicateSource { kind: &'static str, path: PathBuf },
    #[error("Dialogue error: {0}")]
    Dialogue(#[from] bb_core::DialogueError),
    #[error("Action missing at event index {event_index}: expected select.")]
    MissingAction { event_index: usize },
    #[error("Unused actions: used {used} of {total}.")]
    UnusedActions { used: usize, total: usize },
    #[error("Guard exceeded: max_steps={max_steps}.")]
    GuardExceeded { max_steps: usize },
    #[error("Expected event count {expected}, actual {actual}. observed={observed}")]
    EventCountMismatch {
        expected: usize,
        actual: usize,
        observed: String,
    },
    #[error("Event mismatch at index {index}. expected={expected} actual={actual}")]
    EventMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("Visit count mismatch for node \"{node}\": expected {expected}, actual {actual}.")]
    VisitMismatch {
        node: String,
        expected: i32,
        actual: i32,
    },
    #[error("Failed to serialize event for diff: {0}")]
    EventSerialize(serde_json::Error),
}
