// Chunk: docs/chunks/content_tab_bar - Tab lifecycle and resource uniqueness
//!
//! Tab operations on `EditorState`.
//!
//! Resource-backed tabs (terminal and page) each reference an externally
//! managed session. A session occupies at most one location at any time: a
//! tab in some editor pane, or an entry in some terminal pane's session list.
//! Duplicate requests re-activate or relocate the existing location.
//!
//! Content-backed openers (files, diffs, commit, settings, canvas documents)
//! deduplicate by re-activation. Any opener aimed at a terminal pane first
//! splits it and places the tab in the fresh editor sibling.

use std::path::{Path, PathBuf};

use crate::config::LayoutConfig;
use crate::content::ReadOutcome;
use crate::editor_state::EditorState;
use crate::pane_layout::{Pane, PaneId, PaneType, SplitDirection};
use crate::tab::{
    CanvasDocTab, DiffTab, EditorTab, ResourceKind, SettingsTab, Tab, TabId, TabKind,
};

impl EditorState {
    // =========================================================================
    // Resource-backed tabs
    // =========================================================================

    /// Places terminal session `session_id` in `pane_id`.
    ///
    /// - Already in `pane_id`: re-activated in place.
    /// - Elsewhere: detached from its old location and moved here, keeping
    ///   its tab id and title when it was a tab.
    /// - Nowhere: a new terminal tab (editor pane) or session-list entry
    ///   (terminal pane) is created.
    ///
    /// The destination becomes the active pane.
    pub fn add_terminal_tab(
        &mut self,
        config: &LayoutConfig,
        pane_id: PaneId,
        session_id: &str,
        title: Option<String>,
    ) -> bool {
        let Some(dest) = self.get_pane(pane_id) else {
            tracing::trace!(pane_id, session_id, "terminal destination missing");
            return false;
        };

        if dest.hosts_session(session_id) {
            self.activate_session_in(pane_id, session_id);
            self.active_pane_id = pane_id;
            tracing::debug!(pane_id, session_id, "re-activated terminal");
            return true;
        }

        // A detached terminal tab is reused so it keeps its id and title
        let existing = self
            .detach_session(session_id)
            .filter(|tab| matches!(tab.kind, TabKind::Terminal(_)));

        let Some(dest) = self.get_pane(pane_id) else {
            return false;
        };
        match dest.pane_type() {
            PaneType::Editor => {
                let tab = match existing {
                    Some(mut tab) => {
                        if let (TabKind::Terminal(terminal), Some(title)) = (&mut tab.kind, title)
                        {
                            terminal.title = title;
                        }
                        tab
                    }
                    None => {
                        let id = self.alloc_tab_id();
                        Tab::terminal(
                            id,
                            session_id.to_string(),
                            title.unwrap_or_else(|| config.default_terminal_title.clone()),
                        )
                    }
                };
                if let Some(strip) = self.get_pane_mut(pane_id).and_then(Pane::tab_strip_mut) {
                    strip.add_tab(tab);
                }
            }
            PaneType::Terminal => {
                if let Some(sessions) = self.get_pane_mut(pane_id).and_then(Pane::sessions_mut) {
                    sessions.add_session(session_id.to_string());
                }
            }
        }

        self.active_pane_id = pane_id;
        tracing::debug!(pane_id, session_id, "placed terminal");
        true
    }

    /// Splits `pane_id` and hosts `session_id` in a new terminal pane in the
    /// second slot. The session is detached from any previous location.
    pub fn open_terminal_pane(
        &mut self,
        config: &LayoutConfig,
        pane_id: PaneId,
        direction: SplitDirection,
        session_id: &str,
    ) -> Option<PaneId> {
        if !self.layout.contains_pane(pane_id) {
            return None;
        }
        self.detach_session(session_id);
        let new_id = self.alloc_pane_id();
        self.insert_split(
            config,
            pane_id,
            direction,
            Pane::new_terminal(new_id, session_id.to_string()),
        )
    }

    /// Adds a page tab for `session_id`.
    ///
    /// If the session already has a tab it is re-activated wherever it lives.
    /// Otherwise the tab goes to `pane_id` (or the active pane); a terminal
    /// target is split first. A terminal pane's session-list entry for the
    /// same id is removed, keeping one location per session.
    pub fn add_page_tab(
        &mut self,
        config: &LayoutConfig,
        session_id: &str,
        url: &str,
        title: Option<String>,
        pane_id: Option<PaneId>,
    ) -> Option<TabId> {
        if let Some(tab_id) = self.focus_tab_where(|tab| tab.is_backed_by(session_id)) {
            tracing::debug!(session_id, tab_id, "re-activated page");
            return Some(tab_id);
        }
        if !self.layout.contains_pane(pane_id.unwrap_or(self.active_pane_id)) {
            return None;
        }
        // A terminal pane listing the same id gives up its entry
        if self.layout.find_session(session_id).is_some() {
            self.detach_session(session_id);
            tracing::debug!(session_id, "detached session from terminal pane");
        }

        let target = self.editor_target(config, pane_id.unwrap_or(self.active_pane_id))?;
        let id = self.alloc_tab_id();
        let tab = Tab::page(
            id,
            session_id.to_string(),
            url.to_string(),
            title.unwrap_or_else(|| config.default_page_title.clone()),
        );
        self.push_tab(target, tab)
    }

    /// Focuses whatever location hosts `session_id`.
    pub fn focus_by_resource(&mut self, session_id: &str) -> Option<PaneId> {
        let pane_id = self.layout.find_session(session_id)?;
        self.activate_session_in(pane_id, session_id);
        self.active_pane_id = pane_id;
        Some(pane_id)
    }

    /// Removes every location referencing `session_id`, after the session
    /// was torn down externally. Returns the number of locations removed.
    pub fn remove_pending_resource_tabs(&mut self, session_id: &str) -> usize {
        let mut removed = 0;
        for pane in self.layout.all_panes_mut() {
            if let Some(strip) = pane.tab_strip_mut() {
                let doomed: Vec<TabId> = strip
                    .tabs
                    .iter()
                    .filter(|t| t.is_backed_by(session_id))
                    .map(|t| t.id)
                    .collect();
                for tab_id in doomed {
                    strip.close_tab(tab_id);
                    removed += 1;
                }
            } else if let Some(sessions) = pane.sessions_mut() {
                if sessions.remove_session(session_id) {
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            tracing::debug!(session_id, removed, "removed pending resource locations");
        }
        removed
    }

    /// Updates the title of the tab backed by a session.
    pub fn set_resource_title(&mut self, kind: ResourceKind, session_id: &str, title: &str) -> bool {
        for pane in self.layout.all_panes_mut() {
            let Some(strip) = pane.tab_strip_mut() else {
                continue;
            };
            for tab in strip.tabs.iter_mut() {
                match &mut tab.kind {
                    TabKind::Terminal(t)
                        if kind == ResourceKind::Terminal && t.terminal_session_id == session_id =>
                    {
                        t.title = title.to_string();
                        return true;
                    }
                    TabKind::Page(p) if kind == ResourceKind::Page && p.page_session_id == session_id => {
                        p.title = title.to_string();
                        return true;
                    }
                    _ => {}
                }
            }
        }
        false
    }

    // =========================================================================
    // Content-backed openers
    // =========================================================================

    /// Opens a file in the active pane (split first if it is a terminal pane).
    ///
    /// An already open path in that pane is re-activated, and pinned when
    /// `preview` is false. A preview open replaces the pane's clean preview
    /// tab in place. A failed read still opens a tab showing the error.
    pub fn open_file(
        &mut self,
        config: &LayoutConfig,
        path: &Path,
        name: &str,
        outcome: ReadOutcome,
        preview: bool,
    ) -> Option<TabId> {
        let target = self.editor_target(config, self.active_pane_id)?;
        let strip = self.get_pane_mut(target).and_then(Pane::tab_strip_mut)?;

        if let Some(tab) = strip.tabs.iter_mut().find(|t| t.editor_path() == Some(path)) {
            if let TabKind::Editor(editor) = &mut tab.kind {
                if !preview {
                    editor.preview_mode = false;
                }
            }
            let tab_id = tab.id;
            strip.activate(tab_id);
            self.active_pane_id = target;
            tracing::debug!(pane_id = target, tab_id, path = %path.display(), "re-activated file");
            return Some(tab_id);
        }

        if let ReadOutcome::Failed { message } = &outcome {
            tracing::warn!(path = %path.display(), %message, "opening file with error payload");
        }
        let content = outcome.into_display_content(path);
        let id = self.alloc_tab_id();
        let tab = Tab::editor(id, path.to_path_buf(), name.to_string(), content, preview);

        let strip = self.get_pane_mut(target).and_then(Pane::tab_strip_mut)?;
        let replace_at = if preview {
            strip.tabs.iter().position(Tab::is_replaceable_preview)
        } else {
            None
        };
        match replace_at {
            Some(index) => {
                let old = strip.tabs.remove(index);
                strip.insert_tab(index, tab);
                tracing::debug!(pane_id = target, replaced = old.id, tab_id = id, "replaced preview tab");
            }
            None => {
                strip.add_tab(tab);
            }
        }
        self.active_pane_id = target;
        tracing::debug!(pane_id = target, tab_id = id, path = %path.display(), "opened file");
        Some(id)
    }

    /// Opens a diff, re-activating (and refreshing) an existing diff of the
    /// same file and staging side.
    pub fn open_diff(&mut self, config: &LayoutConfig, diff: DiffTab) -> Option<TabId> {
        let mut refreshed = Some(diff);
        let existing = self.focus_tab_where_mut(|tab| match &mut tab.kind {
            TabKind::Diff(d)
                if refreshed
                    .as_ref()
                    .is_some_and(|new| new.file_path == d.file_path && new.is_staged == d.is_staged) =>
            {
                if let Some(new) = refreshed.take() {
                    *d = new;
                }
                true
            }
            _ => false,
        });
        if existing.is_some() {
            return existing;
        }
        let diff = refreshed?;
        self.open_new_tab(config, TabKind::Diff(diff))
    }

    /// Opens the singleton commit tab.
    pub fn open_commit(&mut self, config: &LayoutConfig) -> Option<TabId> {
        if let Some(tab_id) = self.focus_tab_where(|tab| matches!(tab.kind, TabKind::Commit)) {
            return Some(tab_id);
        }
        self.open_new_tab(config, TabKind::Commit)
    }

    /// Opens the singleton settings tab on `activity_selector`.
    pub fn open_settings(&mut self, config: &LayoutConfig, activity_selector: &str) -> Option<TabId> {
        let existing = self.focus_tab_where_mut(|tab| match &mut tab.kind {
            TabKind::Settings(settings) => {
                settings.activity_selector = activity_selector.to_string();
                true
            }
            _ => false,
        });
        if existing.is_some() {
            return existing;
        }
        self.open_new_tab(
            config,
            TabKind::Settings(SettingsTab {
                activity_selector: activity_selector.to_string(),
            }),
        )
    }

    /// Opens a canvas document. Documents with a storage path are
    /// deduplicated by it; unsaved documents always open a new tab.
    pub fn open_canvas_doc(&mut self, config: &LayoutConfig, doc: CanvasDocTab) -> Option<TabId> {
        if let Some(storage) = doc.storage_path.clone() {
            let found = self.focus_tab_where(|tab| {
                matches!(&tab.kind, TabKind::CanvasDoc(d) if d.storage_path.as_ref() == Some(&storage))
            });
            if found.is_some() {
                return found;
            }
        }
        self.open_new_tab(config, TabKind::CanvasDoc(doc))
    }

    // =========================================================================
    // Tab edits
    // =========================================================================

    /// Removes a tab. The pane survives even with zero tabs.
    pub fn close_tab(&mut self, pane_id: PaneId, tab_id: TabId) -> Option<Tab> {
        let strip = self.get_pane_mut(pane_id).and_then(Pane::tab_strip_mut)?;
        let removed = strip.close_tab(tab_id)?;
        tracing::debug!(pane_id, tab_id, "closed tab");
        Some(removed)
    }

    /// Moves a tab between editor panes, appending when `to_index` is `None`.
    ///
    /// The tab becomes active in the destination, the destination becomes the
    /// active pane, and the source activates per the tab-close rule. Moving
    /// within one pane reorders. Terminal panes cannot receive tabs.
    pub fn move_tab(
        &mut self,
        from_pane_id: PaneId,
        to_pane_id: PaneId,
        tab_id: TabId,
        to_index: Option<usize>,
    ) -> bool {
        if from_pane_id == to_pane_id {
            let Some(strip) = self.get_pane_mut(from_pane_id).and_then(Pane::tab_strip_mut) else {
                return false;
            };
            let Some(from) = strip.position(tab_id) else {
                return false;
            };
            let to = to_index.unwrap_or(strip.len() - 1).min(strip.len() - 1);
            strip.reorder(from, to);
            strip.activate(tab_id);
            self.active_pane_id = to_pane_id;
            return true;
        }

        let dest_ok = self
            .get_pane(to_pane_id)
            .is_some_and(|p| p.pane_type() == PaneType::Editor);
        let source_has = self
            .get_pane(from_pane_id)
            .and_then(Pane::tab_strip)
            .is_some_and(|s| s.get(tab_id).is_some());
        if !dest_ok || !source_has {
            tracing::trace!(from_pane_id, to_pane_id, tab_id, "move_tab target missing");
            return false;
        }

        let Some(tab) = self.close_tab(from_pane_id, tab_id) else {
            return false;
        };
        let Some(strip) = self.get_pane_mut(to_pane_id).and_then(Pane::tab_strip_mut) else {
            return false;
        };
        match to_index {
            Some(index) => strip.insert_tab(index, tab),
            None => strip.add_tab(tab),
        };
        self.active_pane_id = to_pane_id;
        tracing::debug!(from_pane_id, to_pane_id, tab_id, "moved tab");
        true
    }

    /// Reorders tabs within one pane. Out-of-range indices are a no-op.
    pub fn reorder_tabs(&mut self, pane_id: PaneId, from_index: usize, to_index: usize) -> bool {
        self.get_pane_mut(pane_id)
            .and_then(Pane::tab_strip_mut)
            .is_some_and(|strip| strip.reorder(from_index, to_index))
    }

    /// Replaces the text of an editor or canvas-doc tab, marking it dirty.
    /// Editing a preview tab pins it.
    pub fn update_tab_content(&mut self, pane_id: PaneId, tab_id: TabId, content: String) -> bool {
        let Some(tab) = self.tab_mut(pane_id, tab_id) else {
            return false;
        };
        match &mut tab.kind {
            TabKind::Editor(EditorTab {
                content: text,
                is_dirty,
                preview_mode,
                ..
            }) => {
                *text = content;
                *is_dirty = true;
                *preview_mode = false;
                true
            }
            TabKind::CanvasDoc(doc) => {
                doc.content = content;
                doc.is_dirty = true;
                true
            }
            TabKind::Page(_)
            | TabKind::Terminal(_)
            | TabKind::Diff(_)
            | TabKind::Commit
            | TabKind::Settings(_) => false,
        }
    }

    /// Clears the dirty flag after a save. Canvas docs may gain a storage path.
    pub fn mark_tab_saved(
        &mut self,
        pane_id: PaneId,
        tab_id: TabId,
        storage_path: Option<PathBuf>,
    ) -> bool {
        let Some(tab) = self.tab_mut(pane_id, tab_id) else {
            return false;
        };
        match &mut tab.kind {
            TabKind::Editor(editor) => {
                editor.is_dirty = false;
                true
            }
            TabKind::CanvasDoc(doc) => {
                doc.is_dirty = false;
                if storage_path.is_some() {
                    doc.storage_path = storage_path;
                }
                true
            }
            TabKind::Page(_)
            | TabKind::Terminal(_)
            | TabKind::Diff(_)
            | TabKind::Commit
            | TabKind::Settings(_) => false,
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn tab_mut(&mut self, pane_id: PaneId, tab_id: TabId) -> Option<&mut Tab> {
        self.get_pane_mut(pane_id)
            .and_then(Pane::tab_strip_mut)
            .and_then(|strip| strip.get_mut(tab_id))
    }

    /// Resolves the pane a new tab should land in: `pane_id` itself for an
    /// editor pane, or a fresh editor sibling split off a terminal pane.
    fn editor_target(&mut self, config: &LayoutConfig, pane_id: PaneId) -> Option<PaneId> {
        match self.get_pane(pane_id)?.pane_type() {
            PaneType::Editor => Some(pane_id),
            PaneType::Terminal => self.split_pane(config, pane_id, config.page_split_direction),
        }
    }

    fn push_tab(&mut self, pane_id: PaneId, tab: Tab) -> Option<TabId> {
        let strip = self.get_pane_mut(pane_id).and_then(Pane::tab_strip_mut)?;
        let tab_id = strip.add_tab(tab);
        self.active_pane_id = pane_id;
        tracing::debug!(pane_id, tab_id, "added tab");
        Some(tab_id)
    }

    fn open_new_tab(&mut self, config: &LayoutConfig, kind: TabKind) -> Option<TabId> {
        let target = self.editor_target(config, self.active_pane_id)?;
        let id = self.alloc_tab_id();
        self.push_tab(target, Tab::new(id, kind))
    }

    fn focus_tab_where(&mut self, pred: impl Fn(&Tab) -> bool) -> Option<TabId> {
        self.focus_tab_where_mut(|tab| pred(tab))
    }

    /// Activates and focuses the first tab (in pane order) accepted by `pred`.
    /// `pred` may update the tab it accepts.
    fn focus_tab_where_mut(&mut self, mut pred: impl FnMut(&mut Tab) -> bool) -> Option<TabId> {
        let mut found = None;
        for pane in self.layout.all_panes_mut() {
            let pane_id = pane.id;
            let Some(strip) = pane.tab_strip_mut() else {
                continue;
            };
            if let Some(index) = strip.tabs.iter_mut().position(|t| pred(t)) {
                let tab_id = strip.tabs[index].id;
                strip.activate(tab_id);
                found = Some((pane_id, tab_id));
                break;
            }
        }
        let (pane_id, tab_id) = found?;
        self.active_pane_id = pane_id;
        Some(tab_id)
    }

    fn activate_session_in(&mut self, pane_id: PaneId, session_id: &str) {
        let Some(pane) = self.get_pane_mut(pane_id) else {
            return;
        };
        if let Some(strip) = pane.tab_strip_mut() {
            if let Some(tab_id) = strip.find_by_session(session_id).map(|t| t.id) {
                strip.activate(tab_id);
            }
        } else if let Some(sessions) = pane.sessions_mut() {
            sessions.activate(session_id);
        }
    }

    /// Removes `session_id` from every location, returning its tab if it was
    /// hosted as one.
    fn detach_session(&mut self, session_id: &str) -> Option<Tab> {
        let mut detached = None;
        for pane in self.layout.all_panes_mut() {
            if let Some(strip) = pane.tab_strip_mut() {
                while let Some(tab_id) = strip.find_by_session(session_id).map(|t| t.id) {
                    let tab = strip.close_tab(tab_id);
                    if detached.is_none() {
                        detached = tab;
                    }
                }
            } else if let Some(sessions) = pane.sessions_mut() {
                sessions.remove_session(session_id);
            }
        }
        detached
    }
}
