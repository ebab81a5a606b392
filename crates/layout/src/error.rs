// Chunk: docs/chunks/layout_errors - Error type for layout data and persistence
//!
//! Error types for canopy-layout.
//!
//! Mutation operations never fail: targeting a pane or tab that does not exist
//! is a silent no-op reported through the return value. Errors only arise at
//! the edges of the engine, when decoding layout data, loading configuration,
//! or touching the filesystem.

use std::path::PathBuf;

use crate::pane_layout::PaneId;
use crate::tab::{SessionId, TabId};

/// Main error type for layout operations.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    // === Layout Data Errors ===
    #[error("Duplicate pane id {0} in layout data")]
    DuplicatePane(PaneId),

    #[error("Duplicate tab id {0} in layout data")]
    DuplicateTab(TabId),

    #[error("Split ratio {0} is outside (0, 1)")]
    InvalidRatio(f32),

    #[error("Active pane {0} does not exist in the layout")]
    MissingActivePane(PaneId),

    #[error("Active tab {tab_id} is not hosted by pane {pane_id}")]
    MissingActiveTab { pane_id: PaneId, tab_id: TabId },

    #[error("Active session {session_id} is not hosted by pane {pane_id}")]
    MissingActiveSession {
        pane_id: PaneId,
        session_id: SessionId,
    },

    #[error("Pane {pane_id} is malformed: {reason}")]
    MalformedPane { pane_id: PaneId, reason: String },

    #[error("Session {0} occupies more than one location")]
    DuplicateSession(SessionId),

    #[error("Counter {counter} = {value} does not exceed highest issued id {highest}")]
    StaleCounter {
        counter: &'static str,
        value: u64,
        highest: u64,
    },

    // === Persistence Errors ===
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: u32, found: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not determine the platform data directory")]
    NoDataDir,

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // === Logging Errors ===
    #[error("Logging error: {0}")]
    Logging(String),
}

impl LayoutError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a malformed-pane error
    pub fn malformed(pane_id: PaneId, reason: impl Into<String>) -> Self {
        Self::MalformedPane {
            pane_id,
            reason: reason.into(),
        }
    }
}

/// Result type alias using LayoutError
pub type Result<T> = std::result::Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LayoutError::MissingActiveTab {
            pane_id: 3,
            tab_id: 9,
        };
        assert_eq!(err.to_string(), "Active tab 9 is not hosted by pane 3");

        let err = LayoutError::SchemaMismatch {
            expected: 1,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "Schema version mismatch: expected 1, found 2"
        );
    }

    #[test]
    fn test_error_helpers() {
        let err = LayoutError::config("bad ratio");
        assert!(matches!(err, LayoutError::Config(ref m) if m == "bad ratio"));

        let err = LayoutError::malformed(4, "terminal pane hosts tabs");
        assert_eq!(err.to_string(), "Pane 4 is malformed: terminal pane hosts tabs");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: LayoutError = parse.unwrap_err().into();
        assert!(matches!(err, LayoutError::Json(_)));
    }
}
