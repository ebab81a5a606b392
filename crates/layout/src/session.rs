// Chunk: docs/chunks/workspace_session_persistence - Layout persistence
//!
//! Layout serialization and on-disk session storage.
//!
//! `serialize_layout` turns an `EditorState` into plain `LayoutData`;
//! `deserialize_layout` validates plain data back into an `EditorState`.
//! For any state produced by the engine the two are exact inverses.
//!
//! ## Session File
//!
//! `SessionData` captures the whole engine: the live state, the active
//! context, and every saved context. `SessionFile` writes it as pretty JSON
//! at `<data dir>/canopy/layout.json` by default, atomically (temp file then
//! rename).
//!
//! ## Schema Version
//!
//! The session file includes a schema version. If the version doesn't match
//! the current code, `SessionFile::load` discards the session (graceful
//! degradation to a fresh start).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::context::{ContextKey, ContextStore};
use crate::editor_state::EditorState;
use crate::engine::LayoutEngine;
use crate::error::{LayoutError, Result};
use crate::pane_layout::{
    Pane, PaneContent, PaneId, PaneLayoutNode, PaneType, SplitDirection, TerminalSessions,
};
use crate::tab::{SessionId, Tab, TabId, TabStrip};

/// Current schema version for the session file.
///
/// Increment this when making breaking changes to the session format.
pub const SCHEMA_VERSION: u32 = 1;

/// Application name used for the data directory.
const APP_NAME: &str = "canopy";

/// Session file name.
const SESSION_FILENAME: &str = "layout.json";

// =============================================================================
// Serializable Data Types
// =============================================================================

/// Plain representation of one `EditorState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutData {
    pub layout: PaneLayoutData,
    pub active_pane_id: PaneId,
    pub next_pane_id: u64,
    pub next_tab_id: u64,
}

/// Plain representation of the pane layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaneLayoutData {
    /// A leaf node containing a pane.
    Leaf(PaneData),
    /// A split node with two children.
    Split {
        direction: SplitDirection,
        /// The ratio of space given to the first child, in (0, 1).
        ratio: f32,
        first: Box<PaneLayoutData>,
        second: Box<PaneLayoutData>,
    },
}

/// Plain representation of a pane.
///
/// Editor panes carry `tabs`/`active_tab_id`; terminal panes carry
/// `session_ids`/`active_session_id`. Fields that do not apply are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneData {
    pub id: PaneId,
    pub pane_type: PaneType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<Tab>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tab_id: Option<TabId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_ids: Vec<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_session_id: Option<SessionId>,
}

// =============================================================================
// Serialize
// =============================================================================

/// Converts a state to its plain form. Never fails.
pub fn serialize_layout(state: &EditorState) -> LayoutData {
    LayoutData {
        layout: PaneLayoutData::from_node(&state.layout),
        active_pane_id: state.active_pane_id,
        next_pane_id: state.next_pane_id,
        next_tab_id: state.next_tab_id,
    }
}

impl PaneLayoutData {
    fn from_node(node: &PaneLayoutNode) -> Self {
        match node {
            PaneLayoutNode::Leaf(pane) => PaneLayoutData::Leaf(PaneData::from_pane(pane)),
            PaneLayoutNode::Split {
                direction,
                ratio,
                first,
                second,
            } => PaneLayoutData::Split {
                direction: *direction,
                ratio: *ratio,
                first: Box::new(Self::from_node(first)),
                second: Box::new(Self::from_node(second)),
            },
        }
    }
}

impl PaneData {
    fn from_pane(pane: &Pane) -> Self {
        match &pane.content {
            PaneContent::Editor(strip) => PaneData {
                id: pane.id,
                pane_type: PaneType::Editor,
                tabs: strip.tabs.clone(),
                active_tab_id: strip.active_tab_id,
                session_ids: Vec::new(),
                active_session_id: None,
            },
            PaneContent::Terminal(sessions) => PaneData {
                id: pane.id,
                pane_type: PaneType::Terminal,
                tabs: Vec::new(),
                active_tab_id: None,
                session_ids: sessions.session_ids.clone(),
                active_session_id: sessions.active_session_id.clone(),
            },
        }
    }
}

// =============================================================================
// Deserialize
// =============================================================================

/// Validates plain layout data and rebuilds the state.
///
/// Rejects duplicate pane or tab ids, split ratios outside (0, 1), dangling
/// active pointers, mismatched pane contents, sessions in more than one
/// location, and id counters that would re-issue an existing id.
pub fn deserialize_layout(data: LayoutData) -> Result<EditorState> {
    let mut seen = SeenIds::default();
    let layout = seen.build_node(data.layout)?;

    if !layout.contains_pane(data.active_pane_id) {
        return Err(LayoutError::MissingActivePane(data.active_pane_id));
    }
    check_counter("next_pane_id", data.next_pane_id, seen.max_pane_id)?;
    check_counter("next_tab_id", data.next_tab_id, seen.max_tab_id)?;

    Ok(EditorState {
        layout,
        active_pane_id: data.active_pane_id,
        next_pane_id: data.next_pane_id,
        next_tab_id: data.next_tab_id,
    })
}

fn check_counter(counter: &'static str, value: u64, highest: u64) -> Result<()> {
    if value > highest {
        Ok(())
    } else {
        Err(LayoutError::StaleCounter {
            counter,
            value,
            highest,
        })
    }
}

/// Ids encountered while rebuilding a tree.
#[derive(Default)]
struct SeenIds {
    panes: HashSet<PaneId>,
    tabs: HashSet<TabId>,
    sessions: HashSet<SessionId>,
    max_pane_id: u64,
    max_tab_id: u64,
}

impl SeenIds {
    fn build_node(&mut self, data: PaneLayoutData) -> Result<PaneLayoutNode> {
        match data {
            PaneLayoutData::Leaf(pane) => Ok(PaneLayoutNode::Leaf(self.build_pane(pane)?)),
            PaneLayoutData::Split {
                direction,
                ratio,
                first,
                second,
            } => {
                if !(ratio.is_finite() && ratio > 0.0 && ratio < 1.0) {
                    return Err(LayoutError::InvalidRatio(ratio));
                }
                Ok(PaneLayoutNode::Split {
                    direction,
                    ratio,
                    first: Box::new(self.build_node(*first)?),
                    second: Box::new(self.build_node(*second)?),
                })
            }
        }
    }

    fn build_pane(&mut self, data: PaneData) -> Result<Pane> {
        let pane_id = data.id;
        if !self.panes.insert(pane_id) {
            return Err(LayoutError::DuplicatePane(pane_id));
        }
        self.max_pane_id = self.max_pane_id.max(pane_id);

        let content = match data.pane_type {
            PaneType::Editor => {
                if !data.session_ids.is_empty() || data.active_session_id.is_some() {
                    return Err(LayoutError::malformed(
                        pane_id,
                        "editor pane lists terminal sessions",
                    ));
                }
                for tab in &data.tabs {
                    if !self.tabs.insert(tab.id) {
                        return Err(LayoutError::DuplicateTab(tab.id));
                    }
                    self.max_tab_id = self.max_tab_id.max(tab.id);
                    if let Some((_, session_id)) = tab.resource() {
                        self.claim_session(session_id)?;
                    }
                }
                if let Some(tab_id) = data.active_tab_id {
                    if !data.tabs.iter().any(|t| t.id == tab_id) {
                        return Err(LayoutError::MissingActiveTab { pane_id, tab_id });
                    }
                }
                PaneContent::Editor(TabStrip {
                    tabs: data.tabs,
                    active_tab_id: data.active_tab_id,
                })
            }
            PaneType::Terminal => {
                if !data.tabs.is_empty() || data.active_tab_id.is_some() {
                    return Err(LayoutError::malformed(pane_id, "terminal pane hosts tabs"));
                }
                for session_id in &data.session_ids {
                    self.claim_session(session_id)?;
                }
                if let Some(session_id) = &data.active_session_id {
                    if !data.session_ids.contains(session_id) {
                        return Err(LayoutError::MissingActiveSession {
                            pane_id,
                            session_id: session_id.clone(),
                        });
                    }
                }
                PaneContent::Terminal(TerminalSessions {
                    session_ids: data.session_ids,
                    active_session_id: data.active_session_id,
                })
            }
        };

        Ok(Pane {
            id: pane_id,
            content,
        })
    }

    fn claim_session(&mut self, session_id: &str) -> Result<()> {
        if self.sessions.insert(session_id.to_string()) {
            Ok(())
        } else {
            Err(LayoutError::DuplicateSession(session_id.to_string()))
        }
    }
}

/// Serializes a state to pretty JSON.
pub fn to_json(state: &EditorState) -> Result<String> {
    Ok(serde_json::to_string_pretty(&serialize_layout(state))?)
}

/// Parses and validates a state from JSON.
pub fn from_json(json: &str) -> Result<EditorState> {
    let data: LayoutData = serde_json::from_str(json)?;
    deserialize_layout(data)
}

// =============================================================================
// Session Data
// =============================================================================

/// Root session data structure: everything needed to rebuild an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// The context the live layout belongs to, if complete.
    pub active_context: Option<ContextKey>,
    /// The live layout.
    pub live: LayoutData,
    /// Saved layouts for every other context.
    #[serde(default)]
    pub contexts: Vec<ContextData>,
}

/// One saved context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    pub key: ContextKey,
    pub layout: LayoutData,
}

impl SessionData {
    /// Captures the engine's live and saved layouts.
    pub fn capture(engine: &LayoutEngine) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            active_context: engine.context(),
            live: serialize_layout(engine.state()),
            contexts: engine
                .contexts()
                .iter()
                .map(|(key, state)| ContextData {
                    key: key.clone(),
                    layout: serialize_layout(state),
                })
                .collect(),
        }
    }

    /// Rebuilds an engine. Any invalid layout fails the whole restore.
    pub fn restore(self, config: LayoutConfig) -> Result<LayoutEngine> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(LayoutError::SchemaMismatch {
                expected: SCHEMA_VERSION,
                found: self.schema_version,
            });
        }
        let state = deserialize_layout(self.live)?;
        let contexts = self
            .contexts
            .into_iter()
            .map(|c| Ok((c.key, deserialize_layout(c.layout)?)))
            .collect::<Result<ContextStore>>()?;

        tracing::info!(
            contexts = contexts.len(),
            active = ?self.active_context,
            "restored layout session"
        );
        Ok(LayoutEngine::from_parts(
            config,
            contexts,
            state,
            self.active_context,
        ))
    }
}

// =============================================================================
// Session File
// =============================================================================

/// A session file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform data dir>/canopy/layout.json`
    pub fn default_location() -> Result<Self> {
        let data_dir = dirs::data_dir().ok_or(LayoutError::NoDataDir)?;
        Ok(Self::at(data_dir.join(APP_NAME).join(SESSION_FILENAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the session atomically, creating the parent directory.
    pub fn save(&self, data: &SessionData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| LayoutError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(data)?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(|e| LayoutError::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| LayoutError::FileWrite {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::info!(path = %self.path.display(), "saved layout session");
        Ok(())
    }

    /// Loads the session, returning `None` on any problem so the caller can
    /// fall back to a fresh start.
    pub fn load(&self) -> Option<SessionData> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no layout session file");
            return None;
        }
        match self.load_strict() {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding layout session");
                None
            }
        }
    }

    /// Loads the session, reporting why it could not be used.
    pub fn load_strict(&self) -> Result<SessionData> {
        let contents = fs::read_to_string(&self.path).map_err(|e| LayoutError::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        let data: SessionData = serde_json::from_str(&contents)?;
        if data.schema_version != SCHEMA_VERSION {
            return Err(LayoutError::SchemaMismatch {
                expected: SCHEMA_VERSION,
                found: data.schema_version,
            });
        }
        Ok(data)
    }
}

// =============================================================================
// Tests
// =============================================================================
