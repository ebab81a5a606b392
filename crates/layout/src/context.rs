// Chunk: docs/chunks/context_scope - Per (workspace, canvas) layout scoping
//!
//! Context scoping for layout state.
//!
//! Each (workspace id, canvas id) pair owns an independent `EditorState`.
//! Exactly one state is live inside the engine; the others rest in a
//! `ContextStore` that the application root owns and hands to the engine.
//! A state is saved into the store when the engine observes a switch away
//! from its context, and adopted verbatim when the context becomes active
//! again.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::editor_state::EditorState;

/// Identifies one layout scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContextKey {
    pub workspace_id: String,
    pub canvas_id: String,
}

impl ContextKey {
    pub fn new(workspace_id: impl Into<String>, canvas_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            canvas_id: canvas_id.into(),
        }
    }

    /// Builds a key only when both ids are known.
    pub fn from_parts(workspace_id: Option<&str>, canvas_id: Option<&str>) -> Option<Self> {
        Some(Self::new(workspace_id?, canvas_id?))
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workspace_id, self.canvas_id)
    }
}

/// Saved layout states for every context that is not currently live.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextStore {
    states: BTreeMap<ContextKey, EditorState>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ContextKey) -> Option<&EditorState> {
        self.states.get(key)
    }

    /// Saves a state, replacing any earlier save for the same context.
    pub fn insert(&mut self, key: ContextKey, state: EditorState) {
        self.states.insert(key, state);
    }

    pub fn contains(&self, key: &ContextKey) -> bool {
        self.states.contains_key(key)
    }

    /// Takes a saved state out of the store.
    pub fn remove(&mut self, key: &ContextKey) -> Option<EditorState> {
        self.states.remove(key)
    }

    /// Removes every saved state belonging to a workspace, returning them.
    pub fn remove_workspace(&mut self, workspace_id: &str) -> Vec<(ContextKey, EditorState)> {
        let keys: Vec<ContextKey> = self
            .states
            .keys()
            .filter(|k| k.workspace_id == workspace_id)
            .cloned()
            .collect();
        keys.into_iter()
            .filter_map(|k| self.states.remove(&k).map(|state| (k, state)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContextKey, &EditorState)> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl FromIterator<(ContextKey, EditorState)> for ContextStore {
    fn from_iter<I: IntoIterator<Item = (ContextKey, EditorState)>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}

/// Outcome of a context switch.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSwitch {
    /// Where the outgoing live state was saved, if its context was complete
    pub saved: Option<ContextKey>,
    /// The outgoing state when it had no complete context to be saved under
    pub discarded: Option<EditorState>,
    /// True if the incoming state came from the store rather than a fresh default
    pub restored: bool,
}

/// Performs the save-then-adopt step of a context switch.
///
/// The outgoing `live` state is stored under `previous` when that context is
/// complete; `live` is then replaced by the stored state for `next`, or a fresh
/// default. An adopted state leaves the store, so the store never holds a copy
/// of the live context. Both steps happen under one `&mut` borrow, so no mutation can
/// interleave.
pub fn switch_context(
    store: &mut ContextStore,
    live: &mut EditorState,
    previous: Option<&ContextKey>,
    next: Option<&ContextKey>,
) -> ContextSwitch {
    let outgoing = std::mem::take(live);
    let (saved, discarded) = match previous {
        Some(key) => {
            store.insert(key.clone(), outgoing);
            (Some(key.clone()), None)
        }
        None => (None, Some(outgoing)),
    };

    let stored = next.and_then(|key| store.remove(key));
    let restored = stored.is_some();
    *live = stored.unwrap_or_default();

    ContextSwitch {
        saved,
        discarded,
        restored,
    }
}
