// Chunk: docs/chunks/tiling_tree_model - Per-context layout state
//!
//! `EditorState` is the complete mutable layout state for one
//! (workspace, canvas) context: the pane tree, the active pane, and the
//! monotonically increasing id counters.
//!
//! Structural operations live here. Tab and session operations are in
//! `tab_lifecycle`, as a second `impl EditorState` block.
//!
//! Every operation targeting a pane or tab that does not exist is a no-op
//! signalled through the return value (`false` / `None`); nothing here ever
//! fails.

use std::collections::BTreeSet;

use crate::config::LayoutConfig;
use crate::pane_layout::{
    calculate_pane_rects, gen_pane_id, Direction, Pane, PaneId, PaneLayoutNode, PaneRect,
    SplitDirection,
};
use crate::tab::{gen_tab_id, ResourceKind, SessionId, TabId};

/// A session referenced somewhere in a layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionRef {
    pub kind: ResourceKind,
    pub session_id: SessionId,
}

/// The layout state for a single context.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    /// The root of the pane layout tree
    pub layout: PaneLayoutNode,
    /// Always names a pane present in `layout`
    pub active_pane_id: PaneId,
    /// Next pane id to hand out
    pub next_pane_id: u64,
    /// Next tab id to hand out
    pub next_tab_id: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// Creates the default state: a single empty editor pane with id 1.
    pub fn new() -> Self {
        let mut next_pane_id = 1;
        let pane_id = gen_pane_id(&mut next_pane_id);
        Self {
            layout: PaneLayoutNode::single_pane(Pane::new_editor(pane_id)),
            active_pane_id: pane_id,
            next_pane_id,
            next_tab_id: 1,
        }
    }

    pub fn pane_count(&self) -> usize {
        self.layout.pane_count()
    }

    pub fn get_pane(&self, pane_id: PaneId) -> Option<&Pane> {
        self.layout.get_pane(pane_id)
    }

    pub fn get_pane_mut(&mut self, pane_id: PaneId) -> Option<&mut Pane> {
        self.layout.get_pane_mut(pane_id)
    }

    pub fn active_pane(&self) -> Option<&Pane> {
        self.layout.get_pane(self.active_pane_id)
    }

    pub(crate) fn alloc_pane_id(&mut self) -> PaneId {
        gen_pane_id(&mut self.next_pane_id)
    }

    pub(crate) fn alloc_tab_id(&mut self) -> TabId {
        gen_tab_id(&mut self.next_tab_id)
    }

    /// Every session referenced by this layout, tab-hosted or listed.
    pub fn session_refs(&self) -> BTreeSet<SessionRef> {
        self.layout
            .all_panes()
            .into_iter()
            .flat_map(|pane| pane.resources())
            .map(|(kind, session_id)| SessionRef {
                kind,
                session_id: session_id.to_string(),
            })
            .collect()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Splits `pane_id`, placing a fresh empty editor pane in the second slot.
    ///
    /// Returns the new pane's id, which becomes the active pane.
    pub fn split_pane(
        &mut self,
        config: &LayoutConfig,
        pane_id: PaneId,
        direction: SplitDirection,
    ) -> Option<PaneId> {
        if !self.layout.contains_pane(pane_id) {
            tracing::trace!(pane_id, "split target missing");
            return None;
        }
        let new_id = self.alloc_pane_id();
        self.insert_split(config, pane_id, direction, Pane::new_editor(new_id))
    }

    /// Splits `pane_id` around an already constructed pane and focuses it.
    pub(crate) fn insert_split(
        &mut self,
        config: &LayoutConfig,
        pane_id: PaneId,
        direction: SplitDirection,
        new_pane: Pane,
    ) -> Option<PaneId> {
        let new_id = new_pane.id;
        if !self
            .layout
            .split_pane(pane_id, direction, config.default_split_ratio, new_pane)
        {
            return None;
        }
        self.active_pane_id = new_id;
        tracing::debug!(pane_id, new_pane_id = new_id, ?direction, "split pane");
        Some(new_id)
    }

    /// Closes `pane_id`, promoting its sibling subtree.
    ///
    /// Returns the new active pane. Closing the sole pane is rejected.
    pub fn close_pane(&mut self, pane_id: PaneId) -> Option<PaneId> {
        if self.pane_count() == 1 && self.layout.contains_pane(pane_id) {
            tracing::warn!(pane_id, "refusing to close the last pane");
            return None;
        }
        let (removed, new_active) = self.layout.close_pane(pane_id)?;
        self.active_pane_id = new_active;
        tracing::debug!(
            pane_id = removed.id,
            active_pane_id = new_active,
            "closed pane"
        );
        Some(new_active)
    }

    /// Sets the ratio of the split immediately containing `pane_id`.
    pub fn resize_split(&mut self, config: &LayoutConfig, pane_id: PaneId, ratio: f32) -> bool {
        let ratio = config.clamp_ratio(ratio);
        let resized = self.layout.resize_pane_split(pane_id, ratio);
        if resized {
            tracing::debug!(pane_id, ratio, "resized split");
        }
        resized
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Makes `pane_id` the active pane.
    ///
    /// Returns false if the pane does not exist or is already active.
    pub fn focus_pane(&mut self, pane_id: PaneId) -> bool {
        if self.active_pane_id == pane_id || !self.layout.contains_pane(pane_id) {
            return false;
        }
        self.active_pane_id = pane_id;
        true
    }

    /// Moves focus to the adjacent pane in `direction`.
    pub fn focus_in_direction(&mut self, direction: Direction) -> Option<PaneId> {
        let target = self
            .layout
            .find_pane_in_direction(self.active_pane_id, direction)?;
        self.active_pane_id = target;
        Some(target)
    }

    /// Activates a tab within its pane and focuses that pane.
    pub fn activate_tab(&mut self, pane_id: PaneId, tab_id: TabId) -> bool {
        let Some(strip) = self.get_pane_mut(pane_id).and_then(Pane::tab_strip_mut) else {
            return false;
        };
        if !strip.activate(tab_id) {
            return false;
        }
        self.active_pane_id = pane_id;
        true
    }

    /// Rectangles for every pane within `bounds` (`x, y, width, height`).
    pub fn pane_rects(&self, bounds: (f32, f32, f32, f32)) -> Vec<PaneRect> {
        calculate_pane_rects(bounds, &self.layout)
    }
}
