// Chunk: docs/chunks/content_tab_bar - Polymorphic tab model and tab strip bookkeeping
//!
//! Tab data model for editor panes.
//!
//! A `Tab` is a unit of content hosted inside an editor-type pane. Each tab
//! carries a common id plus a kind-specific payload (`TabKind`). Every match
//! over `TabKind` in this crate is exhaustive, so adding a kind is a
//! compile-time checked change everywhere tabs are labelled, serialized, or
//! searched.
//!
//! Two kinds are *resource-backed*: terminal and page tabs each reference an
//! externally managed session by id. The engine guarantees such a session
//! occupies at most one location at a time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a tab within one editor state.
pub type TabId = u64;

/// Opaque identifier for an externally managed session (terminal process,
/// embedded page view).
pub type SessionId = String;

/// Generates a new unique tab ID.
pub fn gen_tab_id(next_id: &mut u64) -> TabId {
    let id = *next_id;
    *next_id += 1;
    id
}

// =============================================================================
// ResourceKind
// =============================================================================

/// The kind of external session a resource-backed location refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Terminal,
    Page,
}

// =============================================================================
// Tab Payloads
// =============================================================================

/// A file being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorTab {
    pub path: PathBuf,
    pub name: String,
    pub content: String,
    pub is_dirty: bool,
    /// Preview tabs are replaced by the next preview open in the same pane.
    pub preview_mode: bool,
}

/// An embedded page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTab {
    pub page_session_id: SessionId,
    pub url: String,
    pub title: String,
}

/// A terminal session shown as a tab inside an editor pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalTab {
    pub terminal_session_id: SessionId,
    pub title: String,
}

/// A two-sided diff of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffTab {
    pub file_path: PathBuf,
    pub original_content: String,
    pub modified_content: String,
    pub language: Option<String>,
    pub is_staged: bool,
}

/// A freeform canvas document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasDocTab {
    pub name: String,
    pub content: String,
    pub is_dirty: bool,
    pub storage_path: Option<PathBuf>,
}

/// The settings panel, opened on a particular activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsTab {
    pub activity_selector: String,
}

// =============================================================================
// TabKind
// =============================================================================

/// The kind of content a tab holds, with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TabKind {
    Editor(EditorTab),
    Page(PageTab),
    Terminal(TerminalTab),
    Diff(DiffTab),
    Commit,
    CanvasDoc(CanvasDocTab),
    Settings(SettingsTab),
}

// =============================================================================
// Tab
// =============================================================================

/// A tab within an editor pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// Unique identifier for this tab
    pub id: TabId,
    /// The kind of content this tab holds
    #[serde(flatten)]
    pub kind: TabKind,
}

impl Tab {
    pub fn new(id: TabId, kind: TabKind) -> Self {
        Self { id, kind }
    }

    /// Creates a clean editor tab for a file.
    pub fn editor(id: TabId, path: PathBuf, name: String, content: String, preview_mode: bool) -> Self {
        Self::new(
            id,
            TabKind::Editor(EditorTab {
                path,
                name,
                content,
                is_dirty: false,
                preview_mode,
            }),
        )
    }

    pub fn terminal(id: TabId, session_id: SessionId, title: String) -> Self {
        Self::new(
            id,
            TabKind::Terminal(TerminalTab {
                terminal_session_id: session_id,
                title,
            }),
        )
    }

    pub fn page(id: TabId, session_id: SessionId, url: String, title: String) -> Self {
        Self::new(
            id,
            TabKind::Page(PageTab {
                page_session_id: session_id,
                url,
                title,
            }),
        )
    }

    /// Display label (file name, terminal title, etc.)
    pub fn label(&self) -> &str {
        match &self.kind {
            TabKind::Editor(tab) => &tab.name,
            TabKind::Page(tab) => &tab.title,
            TabKind::Terminal(tab) => &tab.title,
            TabKind::Diff(tab) => tab
                .file_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("Diff"),
            TabKind::Commit => "Commit",
            TabKind::CanvasDoc(tab) => &tab.name,
            TabKind::Settings(_) => "Settings",
        }
    }

    /// Returns the backing session if this tab is resource-backed.
    pub fn resource(&self) -> Option<(ResourceKind, &str)> {
        match &self.kind {
            TabKind::Terminal(tab) => Some((ResourceKind::Terminal, &tab.terminal_session_id)),
            TabKind::Page(tab) => Some((ResourceKind::Page, &tab.page_session_id)),
            TabKind::Editor(_)
            | TabKind::Diff(_)
            | TabKind::Commit
            | TabKind::CanvasDoc(_)
            | TabKind::Settings(_) => None,
        }
    }

    /// Returns true if this tab is backed by the given session.
    pub fn is_backed_by(&self, session_id: &str) -> bool {
        self.resource().is_some_and(|(_, sid)| sid == session_id)
    }

    /// Returns the file path for editor tabs.
    pub fn editor_path(&self) -> Option<&Path> {
        match &self.kind {
            TabKind::Editor(tab) => Some(&tab.path),
            _ => None,
        }
    }

    /// Whether the tab has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        match &self.kind {
            TabKind::Editor(tab) => tab.is_dirty,
            TabKind::CanvasDoc(tab) => tab.is_dirty,
            TabKind::Page(_)
            | TabKind::Terminal(_)
            | TabKind::Diff(_)
            | TabKind::Commit
            | TabKind::Settings(_) => false,
        }
    }

    /// Whether this is a clean editor tab opened in preview mode.
    pub fn is_replaceable_preview(&self) -> bool {
        matches!(&self.kind, TabKind::Editor(tab) if tab.preview_mode && !tab.is_dirty)
    }
}

// =============================================================================
// TabStrip
// =============================================================================

/// The ordered tabs of an editor pane plus its active-tab pointer.
///
/// An editor pane may legitimately hold zero tabs; `active_tab_id` is then
/// `None`. Whenever the strip is non-empty and a tab has been activated,
/// `active_tab_id` names a tab in `tabs`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TabStrip {
    pub tabs: Vec<Tab>,
    pub active_tab_id: Option<TabId>,
}

impl TabStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tab and makes it active.
    pub fn add_tab(&mut self, tab: Tab) -> TabId {
        let id = tab.id;
        self.tabs.push(tab);
        self.active_tab_id = Some(id);
        id
    }

    /// Inserts a tab at `index` (clamped to the end) and makes it active.
    pub fn insert_tab(&mut self, index: usize, tab: Tab) -> TabId {
        let id = tab.id;
        let index = index.min(self.tabs.len());
        self.tabs.insert(index, tab);
        self.active_tab_id = Some(id);
        id
    }

    /// Removes a tab, returning it.
    ///
    /// If the removed tab was active, the immediately preceding tab becomes
    /// active; failing that the new last tab; failing that nothing.
    pub fn close_tab(&mut self, tab_id: TabId) -> Option<Tab> {
        let index = self.position(tab_id)?;
        let removed = self.tabs.remove(index);

        if self.active_tab_id == Some(tab_id) {
            self.active_tab_id = if index > 0 {
                self.tabs.get(index - 1).map(|t| t.id)
            } else {
                self.tabs.last().map(|t| t.id)
            };
        }

        Some(removed)
    }

    /// Makes the given tab active. Returns false if it is not in this strip.
    pub fn activate(&mut self, tab_id: TabId) -> bool {
        if self.position(tab_id).is_some() {
            self.active_tab_id = Some(tab_id);
            true
        } else {
            false
        }
    }

    /// Moves the tab at `from` to `to`. Out-of-range indices are a no-op.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tabs.len() || to >= self.tabs.len() {
            return false;
        }
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        true
    }

    pub fn position(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    pub fn get(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    pub fn get_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == tab_id)
    }

    /// Returns the tab backed by the given session, if any.
    pub fn find_by_session(&self, session_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.is_backed_by(session_id))
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
