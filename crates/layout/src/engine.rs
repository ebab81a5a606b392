// Chunk: docs/chunks/context_scope - Layout engine facade
//!
//! The public face of the layout engine.
//!
//! `LayoutEngine` owns the live `EditorState` and the injected
//! `ContextStore`. Every request from a renderer or collaborator goes through
//! one of its methods, which:
//!
//! 1. runs the mutation synchronously to completion,
//! 2. emits `SessionEvent`s for sessions that gained or lost their only
//!    location,
//! 3. publishes an immutable `LayoutSnapshot` with a bumped version.
//!
//! Operations that turn out to be no-ops publish nothing.
//!
//! Content reads are the only suspension point, and they complete before the
//! open mutation begins (`open_file_from`).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::config::LayoutConfig;
use crate::content::{ContentReader, ReadOutcome};
use crate::context::{switch_context, ContextKey, ContextStore};
use crate::editor_state::{EditorState, SessionRef};
use crate::error::Result;
use crate::pane_layout::{Direction, PaneId, SplitDirection};
use crate::session::{deserialize_layout, serialize_layout, LayoutData};
use crate::tab::{CanvasDocTab, DiffTab, ResourceKind, Tab, TabId};

/// An immutable view of the live layout after some mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    /// Increases by one with every published mutation
    pub version: u64,
    pub context: Option<ContextKey>,
    pub state: EditorState,
}

/// Lifecycle signal for externally managed sessions.
///
/// `Attached` fires when a session first gains a location in the live layout;
/// `Released` when it loses its last location and is not held by any saved
/// context. Relocations emit nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Attached(SessionRef),
    Released(SessionRef),
}

/// Owner of the live layout state.
#[derive(Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    state: EditorState,
    contexts: ContextStore,
    active_workspace: Option<String>,
    active_canvas: Option<String>,
    version: u64,
    snapshot_tx: watch::Sender<Arc<LayoutSnapshot>>,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
    session_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
}

impl LayoutEngine {
    /// Creates an engine with no active context and a default live state.
    pub fn new(config: LayoutConfig, contexts: ContextStore) -> Self {
        Self::from_parts(config, contexts, EditorState::new(), None)
    }

    /// Creates an engine around an existing live state, e.g. one restored
    /// from disk.
    pub fn from_parts(
        config: LayoutConfig,
        contexts: ContextStore,
        state: EditorState,
        context: Option<ContextKey>,
    ) -> Self {
        let (active_workspace, active_canvas) = match context.clone() {
            Some(key) => (Some(key.workspace_id), Some(key.canvas_id)),
            None => (None, None),
        };
        let (snapshot_tx, _) = watch::channel(Arc::new(LayoutSnapshot {
            version: 0,
            context,
            state: state.clone(),
        }));
        let (session_tx, session_rx) = mpsc::unbounded_channel();

        Self {
            config,
            state,
            contexts,
            active_workspace,
            active_canvas,
            version: 0,
            snapshot_tx,
            session_tx,
            session_rx: Some(session_rx),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The live state. Mutate it only through the engine's methods.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    /// The live context, when both ids are known.
    pub fn context(&self) -> Option<ContextKey> {
        ContextKey::from_parts(self.active_workspace.as_deref(), self.active_canvas.as_deref())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<LayoutSnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribes to snapshot publication.
    pub fn subscribe(&self) -> watch::Receiver<Arc<LayoutSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Hands out the session event stream. Only the first call returns it.
    pub fn take_session_events(&mut self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.session_rx.take()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub fn split_pane(&mut self, pane_id: PaneId, direction: SplitDirection) -> Option<PaneId> {
        self.apply("split_pane", |state, config| {
            state.split_pane(config, pane_id, direction)
        })
    }

    /// Closes a pane, returning the new active pane. Sessions hosted only by
    /// the closed pane are released.
    pub fn close_pane(&mut self, pane_id: PaneId) -> Option<PaneId> {
        self.apply("close_pane", |state, _| state.close_pane(pane_id))
    }

    pub fn resize_split(&mut self, pane_id: PaneId, ratio: f32) -> bool {
        self.apply_bool("resize_split", |state, config| {
            state.resize_split(config, pane_id, ratio)
        })
    }

    pub fn focus_pane(&mut self, pane_id: PaneId) -> bool {
        self.apply_bool("focus_pane", |state, _| state.focus_pane(pane_id))
    }

    pub fn focus_in_direction(&mut self, direction: Direction) -> Option<PaneId> {
        self.apply("focus_in_direction", |state, _| {
            state.focus_in_direction(direction)
        })
    }

    pub fn activate_tab(&mut self, pane_id: PaneId, tab_id: TabId) -> bool {
        self.apply_bool("activate_tab", |state, _| state.activate_tab(pane_id, tab_id))
    }

    // =========================================================================
    // Tabs
    // =========================================================================

    pub fn close_tab(&mut self, pane_id: PaneId, tab_id: TabId) -> Option<Tab> {
        self.apply("close_tab", |state, _| state.close_tab(pane_id, tab_id))
    }

    pub fn move_tab(
        &mut self,
        from_pane_id: PaneId,
        to_pane_id: PaneId,
        tab_id: TabId,
        to_index: Option<usize>,
    ) -> bool {
        self.apply_bool("move_tab", |state, _| {
            state.move_tab(from_pane_id, to_pane_id, tab_id, to_index)
        })
    }

    pub fn reorder_tabs(&mut self, pane_id: PaneId, from_index: usize, to_index: usize) -> bool {
        self.apply_bool("reorder_tabs", |state, _| {
            state.reorder_tabs(pane_id, from_index, to_index)
        })
    }

    pub fn add_terminal_tab(
        &mut self,
        pane_id: PaneId,
        session_id: &str,
        title: Option<String>,
    ) -> bool {
        self.apply_bool("add_terminal_tab", |state, config| {
            state.add_terminal_tab(config, pane_id, session_id, title)
        })
    }

    pub fn open_terminal_pane(
        &mut self,
        pane_id: PaneId,
        direction: SplitDirection,
        session_id: &str,
    ) -> Option<PaneId> {
        self.apply("open_terminal_pane", |state, config| {
            state.open_terminal_pane(config, pane_id, direction, session_id)
        })
    }

    pub fn add_page_tab(
        &mut self,
        session_id: &str,
        url: &str,
        title: Option<String>,
        pane_id: Option<PaneId>,
    ) -> Option<TabId> {
        self.apply("add_page_tab", |state, config| {
            state.add_page_tab(config, session_id, url, title, pane_id)
        })
    }

    pub fn focus_by_resource(&mut self, session_id: &str) -> Option<PaneId> {
        self.apply("focus_by_resource", |state, _| {
            state.focus_by_resource(session_id)
        })
    }

    /// Drops every location of a session that was torn down externally.
    ///
    /// No `Released` event is emitted: the collaborator already disposed of it.
    pub fn remove_pending_resource_tabs(&mut self, session_id: &str) -> usize {
        let removed = self.state.remove_pending_resource_tabs(session_id);
        if removed > 0 {
            self.publish("remove_pending_resource_tabs");
        }
        removed
    }

    pub fn set_page_title(&mut self, session_id: &str, title: &str) -> bool {
        self.apply_bool("set_page_title", |state, _| {
            state.set_resource_title(ResourceKind::Page, session_id, title)
        })
    }

    pub fn set_terminal_title(&mut self, session_id: &str, title: &str) -> bool {
        self.apply_bool("set_terminal_title", |state, _| {
            state.set_resource_title(ResourceKind::Terminal, session_id, title)
        })
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Opens a file with an already resolved read outcome.
    pub fn open_file(
        &mut self,
        path: &Path,
        name: &str,
        outcome: ReadOutcome,
        preview: bool,
    ) -> Option<TabId> {
        self.apply("open_file", |state, config| {
            state.open_file(config, path, name, outcome, preview)
        })
    }

    /// Reads a file through `reader`, then opens it in whichever pane is
    /// active once the read completes.
    pub async fn open_file_from<R: ContentReader>(
        &mut self,
        reader: &R,
        path: &Path,
        name: &str,
        preview: bool,
    ) -> Option<TabId> {
        let outcome = reader.read_file_content(path).await;
        self.open_file(path, name, outcome, preview)
    }

    pub fn open_diff(&mut self, diff: DiffTab) -> Option<TabId> {
        self.apply("open_diff", |state, config| state.open_diff(config, diff))
    }

    pub fn open_commit(&mut self) -> Option<TabId> {
        self.apply("open_commit", |state, config| state.open_commit(config))
    }

    pub fn open_settings(&mut self, activity_selector: &str) -> Option<TabId> {
        self.apply("open_settings", |state, config| {
            state.open_settings(config, activity_selector)
        })
    }

    pub fn open_canvas_doc(&mut self, doc: CanvasDocTab) -> Option<TabId> {
        self.apply("open_canvas_doc", |state, config| {
            state.open_canvas_doc(config, doc)
        })
    }

    pub fn update_tab_content(&mut self, pane_id: PaneId, tab_id: TabId, content: String) -> bool {
        self.apply_bool("update_tab_content", |state, _| {
            state.update_tab_content(pane_id, tab_id, content)
        })
    }

    pub fn mark_tab_saved(
        &mut self,
        pane_id: PaneId,
        tab_id: TabId,
        storage_path: Option<PathBuf>,
    ) -> bool {
        self.apply_bool("mark_tab_saved", |state, _| {
            state.mark_tab_saved(pane_id, tab_id, storage_path)
        })
    }

    // =========================================================================
    // Context
    // =========================================================================

    /// Reacts to a change of active workspace and/or canvas.
    ///
    /// The outgoing live state is saved under the previous context when both
    /// of its ids were known; the incoming context's saved state is adopted,
    /// or a fresh default installed. Returns false if nothing changed.
    pub fn observe_context(&mut self, workspace_id: Option<&str>, canvas_id: Option<&str>) -> bool {
        if self.active_workspace.as_deref() == workspace_id
            && self.active_canvas.as_deref() == canvas_id
        {
            return false;
        }

        let previous = self.context();
        let next = ContextKey::from_parts(workspace_id, canvas_id);
        let outcome = switch_context(
            &mut self.contexts,
            &mut self.state,
            previous.as_ref(),
            next.as_ref(),
        );
        self.active_workspace = workspace_id.map(str::to_string);
        self.active_canvas = canvas_id.map(str::to_string);

        if let Some(discarded) = outcome.discarded {
            self.release_unretained(discarded.session_refs());
        }

        tracing::info!(
            from = ?previous,
            to = ?next,
            restored = outcome.restored,
            "switched layout context"
        );
        self.publish("observe_context");
        true
    }

    /// Drops every layout belonging to a deleted workspace and releases the
    /// sessions they held. If the live context is in that workspace, the live
    /// state is reset and the context cleared.
    pub fn forget_workspace(&mut self, workspace_id: &str) -> bool {
        let removed = self.contexts.remove_workspace(workspace_id);
        let mut orphaned: BTreeSet<SessionRef> = removed
            .iter()
            .flat_map(|(_, state)| state.session_refs())
            .collect();

        let live_affected = self.active_workspace.as_deref() == Some(workspace_id);
        if live_affected {
            orphaned.extend(std::mem::take(&mut self.state).session_refs());
            self.active_workspace = None;
            self.active_canvas = None;
        }

        if removed.is_empty() && !live_affected {
            return false;
        }

        self.release_unretained(orphaned);
        tracing::info!(
            workspace_id,
            contexts = removed.len(),
            live_affected,
            "forgot workspace"
        );
        if live_affected {
            self.publish("forget_workspace");
        }
        true
    }

    // =========================================================================
    // Layout data
    // =========================================================================

    /// Serializes the live state.
    pub fn export_layout(&self) -> LayoutData {
        serialize_layout(&self.state)
    }

    /// Replaces the live state with validated layout data.
    ///
    /// Sessions that appear or disappear as a result are announced.
    pub fn import_layout(&mut self, data: LayoutData) -> Result<()> {
        let imported = deserialize_layout(data)?;
        let before = self.state.session_refs();
        self.state = imported;
        self.emit_session_diff(&before);
        self.publish("import_layout");
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn apply<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut EditorState, &LayoutConfig) -> Option<T>,
    ) -> Option<T> {
        let before = self.state.session_refs();
        let Some(result) = f(&mut self.state, &self.config) else {
            tracing::trace!(op, "no-op");
            return None;
        };
        self.emit_session_diff(&before);
        self.publish(op);
        Some(result)
    }

    fn apply_bool(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut EditorState, &LayoutConfig) -> bool,
    ) -> bool {
        self.apply(op, |state, config| f(state, config).then_some(()))
            .is_some()
    }

    fn emit_session_diff(&self, before: &BTreeSet<SessionRef>) {
        let after = self.state.session_refs();
        for session in after.difference(before) {
            tracing::debug!(session_id = %session.session_id, kind = ?session.kind, "session attached");
            let _ = self.session_tx.send(SessionEvent::Attached(session.clone()));
        }
        let gone: BTreeSet<SessionRef> = before.difference(&after).cloned().collect();
        self.release_unretained(gone);
    }

    /// Releases sessions that no longer appear in the live state or any
    /// saved context.
    fn release_unretained(&self, candidates: BTreeSet<SessionRef>) {
        if candidates.is_empty() {
            return;
        }
        let live = self.context();
        let mut retained = self.state.session_refs();
        for (key, state) in self.contexts.iter() {
            if Some(key) != live.as_ref() {
                retained.extend(state.session_refs());
            }
        }
        for session in candidates.difference(&retained) {
            tracing::debug!(session_id = %session.session_id, kind = ?session.kind, "session released");
            let _ = self.session_tx.send(SessionEvent::Released(session.clone()));
        }
    }

    fn publish(&mut self, op: &'static str) {
        self.version += 1;
        let snapshot = Arc::new(LayoutSnapshot {
            version: self.version,
            context: self.context(),
            state: self.state.clone(),
        });
        self.snapshot_tx.send_replace(snapshot);
        tracing::debug!(op, version = self.version, "published layout snapshot");
    }
}
