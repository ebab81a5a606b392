//! canopy-layout: the pane/tab layout engine for the canopy editor.
//!
//! Editing surfaces (file editors, embedded pages, terminals, diffs, the
//! commit view, settings, canvas documents) are arranged in a recursively
//! splittable binary tree of panes. One tree is kept per
//! (workspace, canvas) context, and sessions backing terminal and page tabs
//! occupy at most one location at a time.
//!
//! Start with [`LayoutEngine`]: it owns the live state, applies every
//! mutation synchronously, and publishes [`LayoutSnapshot`]s to subscribers.

pub mod config;
pub mod content;
pub mod context;
pub mod editor_state;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pane_layout;
pub mod session;
pub mod tab;
mod tab_lifecycle;

pub use config::LayoutConfig;
pub use content::{ContentReader, FsContentReader, ReadOutcome};
pub use context::{ContextKey, ContextStore};
pub use editor_state::{EditorState, SessionRef};
pub use engine::{LayoutEngine, LayoutSnapshot, SessionEvent};
pub use error::{LayoutError, Result};
pub use pane_layout::{
    calculate_pane_rects, Direction, Pane, PaneContent, PaneId, PaneLayoutNode, PaneRect, PaneType,
    SplitDirection, TerminalSessions,
};
pub use session::{
    deserialize_layout, serialize_layout, LayoutData, PaneData, PaneLayoutData, SessionData,
    SessionFile,
};
pub use tab::{
    CanvasDocTab, DiffTab, EditorTab, PageTab, ResourceKind, SessionId, SettingsTab, Tab, TabId,
    TabKind, TabStrip, TerminalTab,
};
