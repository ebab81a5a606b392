// Chunk: docs/chunks/content_tab_bar - Async file reads feeding editor tabs
//!
//! Asynchronous file-content contract.
//!
//! The engine never reads files itself. A caller awaits a `ContentReader`
//! *before* issuing the open mutation, so the tree is never observed half
//! updated. A read that resolves after the user has moved on is still applied
//! to whichever pane is active at that point.

use std::future::Future;
use std::path::Path;

/// Result of reading a file for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Loaded { content: String },
    Failed { message: String },
}

impl ReadOutcome {
    /// Text to show in an editor tab. Failures become a readable error payload.
    pub fn into_display_content(self, path: &Path) -> String {
        match self {
            ReadOutcome::Loaded { content } => content,
            ReadOutcome::Failed { message } => {
                format!("Failed to open {}: {}", path.display(), message)
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ReadOutcome::Failed { .. })
    }
}

/// Reads file content on behalf of the engine.
pub trait ContentReader {
    fn read_file_content(&self, path: &Path) -> impl Future<Output = ReadOutcome> + Send;
}

/// Reads from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsContentReader;

impl ContentReader for FsContentReader {
    fn read_file_content(&self, path: &Path) -> impl Future<Output = ReadOutcome> + Send {
        let path = path.to_path_buf();
        async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => ReadOutcome::Loaded { content },
                Err(e) => ReadOutcome::Failed {
                    message: e.to_string(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_content() {
        let path = Path::new("/a.txt");
        let ok = ReadOutcome::Loaded {
            content: "hello".into(),
        };
        assert!(!ok.is_failed());
        assert_eq!(ok.into_display_content(path), "hello");

        let failed = ReadOutcome::Failed {
            message: "permission denied".into(),
        };
        assert!(failed.is_failed());
        assert_eq!(
            failed.into_display_content(path),
            "Failed to open /a.txt: permission denied"
        );
    }

    #[tokio::test]
    async fn test_fs_reader_loads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "fn main() {}").unwrap();

        let outcome = FsContentReader.read_file_content(&path).await;
        assert_eq!(
            outcome,
            ReadOutcome::Loaded {
                content: "fn main() {}".into()
            }
        );
    }

    #[tokio::test]
    async fn test_fs_reader_missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let outcome = FsContentReader
            .read_file_content(&dir.path().join("missing.txt"))
            .await;
        assert!(outcome.is_failed());
    }
}
