// Chunk: docs/chunks/tiling_tree_model - Binary pane layout tree data model
//!
//! Binary pane layout tree for recursively splittable editor layouts.
//!
//! This module implements a binary space partitioning model for pane layout:
//! - **Leaf nodes** (`Pane`) host either an ordered tab strip (editor panes)
//!   or a list of terminal sessions (terminal panes)
//! - **Internal nodes** (`Split`) have a direction (Horizontal/Vertical), a ratio, and two children
//!
//! The tree is owned outright: every node has exactly one parent, and
//! structural edits move subtrees rather than copying them. Splitting a pane
//! moves the original leaf into the new split's first slot, so there is no
//! way to end up with two live references to the same pane.
//!
//! # Example Tree Structure
//!
//! ```text
//! HSplit(ratio=0.5)
//! ├── Pane[1]
//! └── VSplit(ratio=0.5)
//!     ├── Pane[2]
//!     └── Pane[3]
//! ```
//!
//! Pane 1 is on the left half, and panes 2 and 3 share the right half
//! (2 on top, 3 on bottom).

use serde::{Deserialize, Serialize};

use crate::tab::{ResourceKind, SessionId, Tab, TabId, TabStrip};

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a pane within a layout tree.
pub type PaneId = u64;

/// Generates a new unique pane ID.
///
/// This follows the same pattern as `gen_tab_id()`.
pub fn gen_pane_id(next_id: &mut u64) -> PaneId {
    let id = *next_id;
    *next_id += 1;
    id
}

// =============================================================================
// Direction Types
// =============================================================================

/// The direction of a split in the pane tree.
///
/// - `Horizontal`: Children are placed side-by-side (first=left, second=right)
/// - `Vertical`: Children are stacked (first=top, second=bottom)
///
/// The direction only affects the rendering axis; tree mutation treats both alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

impl SplitDirection {
    /// Returns true if the given direction is compatible with this split direction.
    ///
    /// - Horizontal splits are compatible with Left/Right
    /// - Vertical splits are compatible with Up/Down
    pub fn is_compatible(&self, direction: Direction) -> bool {
        match self {
            SplitDirection::Horizontal => {
                matches!(direction, Direction::Left | Direction::Right)
            }
            SplitDirection::Vertical => {
                matches!(direction, Direction::Up | Direction::Down)
            }
        }
    }
}

/// A cardinal direction for pane navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Returns true if this direction goes toward the second child of a compatible split.
    pub fn is_toward_second(&self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }

    /// Returns the opposite direction.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

// =============================================================================
// Pane
// =============================================================================

/// Whether a pane hosts tabs or terminal sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneType {
    Editor,
    Terminal,
}

/// The terminal sessions hosted directly by a terminal pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalSessions {
    pub session_ids: Vec<SessionId>,
    pub active_session_id: Option<SessionId>,
}

impl TerminalSessions {
    /// Appends a session (if absent) and makes it active.
    pub fn add_session(&mut self, session_id: SessionId) {
        if !self.contains(&session_id) {
            self.session_ids.push(session_id.clone());
        }
        self.active_session_id = Some(session_id);
    }

    /// Removes a session, activating its predecessor (or the new last one)
    /// if it was active.
    pub fn remove_session(&mut self, session_id: &str) -> bool {
        let Some(index) = self.session_ids.iter().position(|s| s == session_id) else {
            return false;
        };
        self.session_ids.remove(index);

        if self.active_session_id.as_deref() == Some(session_id) {
            self.active_session_id = if index > 0 {
                self.session_ids.get(index - 1).cloned()
            } else {
                self.session_ids.last().cloned()
            };
        }
        true
    }

    pub fn activate(&mut self, session_id: &str) -> bool {
        if self.contains(session_id) {
            self.active_session_id = Some(session_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.session_ids.iter().any(|s| s == session_id)
    }
}

/// What a pane hosts. Editor panes never host sessions directly and terminal
/// panes never host tabs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneContent {
    Editor(TabStrip),
    Terminal(TerminalSessions),
}

/// A pane: a leaf of the layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    /// Unique identifier for this pane
    pub id: PaneId,
    pub content: PaneContent,
}

impl Pane {
    /// Creates a new empty editor pane.
    pub fn new_editor(id: PaneId) -> Self {
        Self {
            id,
            content: PaneContent::Editor(TabStrip::new()),
        }
    }

    /// Creates a terminal pane hosting a single session.
    pub fn new_terminal(id: PaneId, session_id: SessionId) -> Self {
        let mut sessions = TerminalSessions::default();
        sessions.add_session(session_id);
        Self {
            id,
            content: PaneContent::Terminal(sessions),
        }
    }

    pub fn pane_type(&self) -> PaneType {
        match self.content {
            PaneContent::Editor(_) => PaneType::Editor,
            PaneContent::Terminal(_) => PaneType::Terminal,
        }
    }

    /// The tabs in this pane; always empty for terminal panes.
    pub fn tabs(&self) -> &[Tab] {
        match &self.content {
            PaneContent::Editor(strip) => &strip.tabs,
            PaneContent::Terminal(_) => &[],
        }
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        self.tab_strip().and_then(|strip| strip.active_tab_id)
    }

    pub fn tab_strip(&self) -> Option<&TabStrip> {
        match &self.content {
            PaneContent::Editor(strip) => Some(strip),
            PaneContent::Terminal(_) => None,
        }
    }

    pub fn tab_strip_mut(&mut self) -> Option<&mut TabStrip> {
        match &mut self.content {
            PaneContent::Editor(strip) => Some(strip),
            PaneContent::Terminal(_) => None,
        }
    }

    pub fn sessions(&self) -> Option<&TerminalSessions> {
        match &self.content {
            PaneContent::Terminal(sessions) => Some(sessions),
            PaneContent::Editor(_) => None,
        }
    }

    pub fn sessions_mut(&mut self) -> Option<&mut TerminalSessions> {
        match &mut self.content {
            PaneContent::Terminal(sessions) => Some(sessions),
            PaneContent::Editor(_) => None,
        }
    }

    /// Every session this pane references, tab-hosted or listed.
    pub fn resources(&self) -> Vec<(ResourceKind, &str)> {
        match &self.content {
            PaneContent::Editor(strip) => strip.tabs.iter().filter_map(Tab::resource).collect(),
            PaneContent::Terminal(sessions) => sessions
                .session_ids
                .iter()
                .map(|s| (ResourceKind::Terminal, s.as_str()))
                .collect(),
        }
    }

    /// Returns true if this pane references the session anywhere.
    pub fn hosts_session(&self, session_id: &str) -> bool {
        match &self.content {
            PaneContent::Editor(strip) => strip.find_by_session(session_id).is_some(),
            PaneContent::Terminal(sessions) => sessions.contains(session_id),
        }
    }
}

// =============================================================================
// PaneRect
// =============================================================================

/// A rectangle representing a pane's position and size.
///
/// This is the output of layout calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// The pane this rectangle belongs to
    pub pane_id: PaneId,
}

impl PaneRect {
    /// Returns true if the given point is inside this rectangle.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

// =============================================================================
// PaneLayoutNode
// =============================================================================

/// A node in the pane layout tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PaneLayoutNode {
    /// A leaf node containing a pane
    Leaf(Pane),
    /// A split node with two children
    Split {
        /// The direction of the split
        direction: SplitDirection,
        /// The ratio of space given to the first child, in (0, 1)
        ratio: f32,
        /// The first child (left for Horizontal, top for Vertical)
        first: Box<PaneLayoutNode>,
        /// The second child (right for Horizontal, bottom for Vertical)
        second: Box<PaneLayoutNode>,
    },
}

impl PaneLayoutNode {
    /// Creates a leaf node containing the given pane.
    pub fn single_pane(pane: Pane) -> Self {
        PaneLayoutNode::Leaf(pane)
    }

    /// Returns the number of panes (leaf nodes) in this tree.
    pub fn pane_count(&self) -> usize {
        match self {
            PaneLayoutNode::Leaf(_) => 1,
            PaneLayoutNode::Split { first, second, .. } => {
                first.pane_count() + second.pane_count()
            }
        }
    }

    /// Returns a flat list of all panes in the tree, first children first.
    pub fn all_panes(&self) -> Vec<&Pane> {
        match self {
            PaneLayoutNode::Leaf(pane) => vec![pane],
            PaneLayoutNode::Split { first, second, .. } => {
                let mut panes = first.all_panes();
                panes.extend(second.all_panes());
                panes
            }
        }
    }

    /// Returns a flat list of mutable references to all panes in the tree.
    pub fn all_panes_mut(&mut self) -> Vec<&mut Pane> {
        match self {
            PaneLayoutNode::Leaf(pane) => vec![pane],
            PaneLayoutNode::Split { first, second, .. } => {
                let mut panes = first.all_panes_mut();
                panes.extend(second.all_panes_mut());
                panes
            }
        }
    }

    /// Finds a pane by ID and returns a reference to it.
    pub fn get_pane(&self, pane_id: PaneId) -> Option<&Pane> {
        match self {
            PaneLayoutNode::Leaf(pane) => {
                if pane.id == pane_id {
                    Some(pane)
                } else {
                    None
                }
            }
            PaneLayoutNode::Split { first, second, .. } => {
                first.get_pane(pane_id).or_else(|| second.get_pane(pane_id))
            }
        }
    }

    /// Finds a pane by ID and returns a mutable reference to it.
    pub fn get_pane_mut(&mut self, pane_id: PaneId) -> Option<&mut Pane> {
        match self {
            PaneLayoutNode::Leaf(pane) => {
                if pane.id == pane_id {
                    Some(pane)
                } else {
                    None
                }
            }
            PaneLayoutNode::Split { first, second, .. } => {
                if first.contains_pane(pane_id) {
                    first.get_pane_mut(pane_id)
                } else {
                    second.get_pane_mut(pane_id)
                }
            }
        }
    }

    /// Returns true if this subtree contains the given pane ID.
    pub fn contains_pane(&self, pane_id: PaneId) -> bool {
        match self {
            PaneLayoutNode::Leaf(pane) => pane.id == pane_id,
            PaneLayoutNode::Split { first, second, .. } => {
                first.contains_pane(pane_id) || second.contains_pane(pane_id)
            }
        }
    }

    /// Returns the pane reached by always descending into the first child.
    pub fn first_leaf_id(&self) -> PaneId {
        match self {
            PaneLayoutNode::Leaf(pane) => pane.id,
            PaneLayoutNode::Split { first, .. } => first.first_leaf_id(),
        }
    }

    /// Returns the pane hosting the given tab.
    pub fn find_tab(&self, tab_id: TabId) -> Option<PaneId> {
        self.all_panes()
            .into_iter()
            .find(|pane| pane.tab_strip().is_some_and(|s| s.get(tab_id).is_some()))
            .map(|pane| pane.id)
    }

    /// Returns the pane referencing the given session, tab-hosted or listed.
    pub fn find_session(&self, session_id: &str) -> Option<PaneId> {
        self.all_panes()
            .into_iter()
            .find(|pane| pane.hosts_session(session_id))
            .map(|pane| pane.id)
    }

    // Chunk: docs/chunks/tiling_split_close - Structural split/close transforms

    /// Replaces the leaf `pane_id` with a split whose first child is the
    /// original pane and whose second child is `new_pane`.
    ///
    /// Returns false (tree unchanged) if the pane does not exist.
    pub fn split_pane(
        &mut self,
        pane_id: PaneId,
        direction: SplitDirection,
        ratio: f32,
        new_pane: Pane,
    ) -> bool {
        match self {
            PaneLayoutNode::Leaf(pane) => {
                if pane.id != pane_id {
                    return false;
                }
                let original = self.take();
                *self = PaneLayoutNode::Split {
                    direction,
                    ratio,
                    first: Box::new(original),
                    second: Box::new(PaneLayoutNode::Leaf(new_pane)),
                };
                true
            }
            PaneLayoutNode::Split { first, second, .. } => {
                if first.contains_pane(pane_id) {
                    first.split_pane(pane_id, direction, ratio, new_pane)
                } else if second.contains_pane(pane_id) {
                    second.split_pane(pane_id, direction, ratio, new_pane)
                } else {
                    false
                }
            }
        }
    }

    /// Removes the leaf `pane_id`, replacing its parent split with the sibling
    /// subtree.
    ///
    /// Returns the removed pane and the pane reached by descending first
    /// children from the promoted subtree. Returns `None` if the pane does not
    /// exist or is the sole root leaf.
    pub fn close_pane(&mut self, pane_id: PaneId) -> Option<(Pane, PaneId)> {
        let PaneLayoutNode::Split { first, second, .. } = self else {
            return None;
        };

        let first_is_target = matches!(first.as_ref(), PaneLayoutNode::Leaf(p) if p.id == pane_id);
        let second_is_target = matches!(second.as_ref(), PaneLayoutNode::Leaf(p) if p.id == pane_id);

        if first_is_target || second_is_target {
            let (target, promoted) = if first_is_target {
                (first.take(), second.take())
            } else {
                (second.take(), first.take())
            };
            *self = promoted;
            let new_active = self.first_leaf_id();
            return target.into_pane().map(|pane| (pane, new_active));
        }

        if first.contains_pane(pane_id) {
            first.close_pane(pane_id)
        } else {
            second.close_pane(pane_id)
        }
    }

    /// Sets the ratio of the innermost split containing `pane_id`.
    ///
    /// Returns false if the pane does not exist or is the root leaf.
    pub fn resize_pane_split(&mut self, pane_id: PaneId, new_ratio: f32) -> bool {
        match self {
            PaneLayoutNode::Leaf(_) => false,
            PaneLayoutNode::Split {
                ratio,
                first,
                second,
                ..
            } => {
                let child = if first.contains_pane(pane_id) {
                    first
                } else if second.contains_pane(pane_id) {
                    second
                } else {
                    return false;
                };
                if !child.resize_pane_split(pane_id, new_ratio) {
                    *ratio = new_ratio;
                }
                true
            }
        }
    }

    /// Moves this node out, leaving a throwaway empty leaf that the caller
    /// overwrites before the tree is observed again.
    fn take(&mut self) -> PaneLayoutNode {
        std::mem::replace(self, PaneLayoutNode::Leaf(Pane::new_editor(PaneId::MAX)))
    }

    fn into_pane(self) -> Option<Pane> {
        match self {
            PaneLayoutNode::Leaf(pane) => Some(pane),
            PaneLayoutNode::Split { .. } => None,
        }
    }

    // Chunk: docs/chunks/tiling_focus_keybindings - Directional pane focus

    /// Finds the nearest leaf in a subtree when entering from a direction.
    ///
    /// - Entering from Left: return leftmost leaf
    /// - Entering from Right: return rightmost leaf
    /// - Entering from Up: return topmost leaf
    /// - Entering from Down: return bottommost leaf
    pub fn nearest_leaf_toward(&self, direction: Direction) -> PaneId {
        match self {
            PaneLayoutNode::Leaf(pane) => pane.id,
            PaneLayoutNode::Split {
                direction: split_dir,
                first,
                second,
                ..
            } => {
                // Perpendicular splits default to the first child
                let go_to_second =
                    split_dir.is_compatible(direction) && direction.is_toward_second();

                if go_to_second {
                    second.nearest_leaf_toward(direction)
                } else {
                    first.nearest_leaf_toward(direction)
                }
            }
        }
    }

    /// Finds the pane adjacent to `pane_id` in `direction`.
    ///
    /// Walks up from the pane to the nearest split ancestor that is compatible
    /// with the direction and has a sibling on that side, then enters the
    /// sibling subtree from the opposite edge. Returns `None` if no pane lies
    /// that way.
    pub fn find_pane_in_direction(&self, pane_id: PaneId, direction: Direction) -> Option<PaneId> {
        let path = self.path_to_pane(pane_id)?;

        for ancestor in path.iter().rev() {
            if !ancestor.direction.is_compatible(direction) {
                continue;
            }
            let in_first = ancestor.first.contains_pane(pane_id);
            if in_first && direction.is_toward_second() {
                return Some(ancestor.second.nearest_leaf_toward(direction.opposite()));
            } else if !in_first && !direction.is_toward_second() {
                return Some(ancestor.first.nearest_leaf_toward(direction.opposite()));
            }
        }

        None
    }

    /// Builds the chain of split ancestors from the root down to a pane.
    ///
    /// Returns `None` if the pane is not found.
    fn path_to_pane(&self, pane_id: PaneId) -> Option<Vec<SplitAncestor<'_>>> {
        match self {
            PaneLayoutNode::Leaf(pane) => (pane.id == pane_id).then(Vec::new),
            PaneLayoutNode::Split {
                direction,
                first,
                second,
                ..
            } => {
                let mut path = first
                    .path_to_pane(pane_id)
                    .or_else(|| second.path_to_pane(pane_id))?;
                path.insert(
                    0,
                    SplitAncestor {
                        direction: *direction,
                        first: first.as_ref(),
                        second: second.as_ref(),
                    },
                );
                Some(path)
            }
        }
    }
}

/// A split on the path from the root to a pane.
#[derive(Debug)]
struct SplitAncestor<'a> {
    direction: SplitDirection,
    first: &'a PaneLayoutNode,
    second: &'a PaneLayoutNode,
}

// =============================================================================
// Layout Calculation
// =============================================================================

/// Calculates rectangles for all panes in a layout tree.
///
/// `bounds` is `(x, y, width, height)` for the entire layout. Returns one
/// `PaneRect` per pane.
pub fn calculate_pane_rects(bounds: (f32, f32, f32, f32), node: &PaneLayoutNode) -> Vec<PaneRect> {
    let (x, y, width, height) = bounds;

    match node {
        PaneLayoutNode::Leaf(pane) => {
            vec![PaneRect {
                x,
                y,
                width,
                height,
                pane_id: pane.id,
            }]
        }
        PaneLayoutNode::Split {
            direction,
            ratio,
            first,
            second,
        } => {
            let (first_bounds, second_bounds) = match direction {
                SplitDirection::Horizontal => {
                    let first_width = width * ratio;
                    (
                        (x, y, first_width, height),
                        (x + first_width, y, width - first_width, height),
                    )
                }
                SplitDirection::Vertical => {
                    let first_height = height * ratio;
                    (
                        (x, y, width, first_height),
                        (x, y + first_height, width, height - first_height),
                    )
                }
            };

            let mut rects = calculate_pane_rects(first_bounds, first);
            rects.extend(calculate_pane_rects(second_bounds, second));
            rects
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn test_pane(id: PaneId) -> Pane {
        Pane::new_editor(id)
    }

    fn leaf(id: PaneId) -> Box<PaneLayoutNode> {
        Box::new(PaneLayoutNode::Leaf(test_pane(id)))
    }

    // HSplit(A=1, VSplit(B=2, C=3))
    fn nested_tree() -> PaneLayoutNode {
        PaneLayoutNode::Split {
            direction: SplitDirection::Horizontal,
            ratio: 0.5,
            first: leaf(1),
            second: Box::new(PaneLayoutNode::Split {
                direction: SplitDirection::Vertical,
                ratio: 0.5,
                first: leaf(2),
                second: leaf(3),
            }),
        }
    }

    // =========================================================================
    // Direction Tests
    // =========================================================================

    #[test]
    fn test_split_direction_is_compatible() {
        assert!(SplitDirection::Horizontal.is_compatible(Direction::Left));
        assert!(SplitDirection::Horizontal.is_compatible(Direction::Right));
        assert!(!SplitDirection::Horizontal.is_compatible(Direction::Up));
        assert!(SplitDirection::Vertical.is_compatible(Direction::Down));
        assert!(!SplitDirection::Vertical.is_compatible(Direction::Left));
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert!(Direction::Right.is_toward_second());
        assert!(!Direction::Up.is_toward_second());
    }

    // =========================================================================
    // Pane Tests
    // =========================================================================

    #[test]
    fn test_pane_new_editor() {
        let pane = Pane::new_editor(1);
        assert_eq!(pane.pane_type(), PaneType::Editor);
        assert!(pane.tabs().is_empty());
        assert_eq!(pane.active_tab_id(), None);
        assert!(pane.sessions().is_none());
    }

    #[test]
    fn test_pane_new_terminal() {
        let pane = Pane::new_terminal(2, "t-1".into());
        assert_eq!(pane.pane_type(), PaneType::Terminal);
        assert!(pane.tabs().is_empty());
        assert!(pane.tab_strip().is_none());
        let sessions = pane.sessions().unwrap();
        assert_eq!(sessions.session_ids, vec!["t-1".to_string()]);
        assert_eq!(sessions.active_session_id.as_deref(), Some("t-1"));
        assert!(pane.hosts_session("t-1"));
    }

    #[test]
    fn test_pane_resources() {
        let mut pane = Pane::new_editor(1);
        let strip = pane.tab_strip_mut().unwrap();
        strip.add_tab(Tab::editor(1, PathBuf::from("/a"), "a".into(), String::new(), false));
        strip.add_tab(Tab::terminal(2, "t-1".into(), "Terminal".into()));
        strip.add_tab(Tab::page(3, "p-1".into(), "https://x".into(), "X".into()));

        assert_eq!(
            pane.resources(),
            vec![(ResourceKind::Terminal, "t-1"), (ResourceKind::Page, "p-1")]
        );
    }

    #[test]
    fn test_terminal_sessions_remove_activation() {
        let mut sessions = TerminalSessions::default();
        sessions.add_session("a".into());
        sessions.add_session("b".into());
        sessions.add_session("c".into());
        sessions.activate("b");

        assert!(sessions.remove_session("b"));
        assert_eq!(sessions.active_session_id.as_deref(), Some("a"));
        assert!(sessions.remove_session("a"));
        assert_eq!(sessions.active_session_id.as_deref(), Some("c"));
        assert!(!sessions.remove_session("zzz"));
    }

    #[test]
    fn test_terminal_sessions_add_is_unique() {
        let mut sessions = TerminalSessions::default();
        sessions.add_session("a".into());
        sessions.add_session("a".into());
        assert_eq!(sessions.session_ids.len(), 1);
    }

    // =========================================================================
    // Traversal Tests
    // =========================================================================

    #[test]
    fn test_pane_count_and_all_panes() {
        let tree = nested_tree();
        assert_eq!(tree.pane_count(), 3);
        let ids: Vec<PaneId> = tree.all_panes().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_pane() {
        let tree = nested_tree();
        assert_eq!(tree.get_pane(3).map(|p| p.id), Some(3));
        assert!(tree.get_pane(999).is_none());
        assert!(tree.contains_pane(2));
        assert!(!tree.contains_pane(999));
    }

    #[test]
    fn test_get_pane_mut() {
        let mut tree = nested_tree();
        let pane = tree.get_pane_mut(2).unwrap();
        pane.tab_strip_mut()
            .unwrap()
            .add_tab(Tab::new(5, crate::tab::TabKind::Commit));
        assert_eq!(tree.find_tab(5), Some(2));
    }

    #[test]
    fn test_first_leaf_id() {
        let tree = nested_tree();
        assert_eq!(tree.first_leaf_id(), 1);
        let PaneLayoutNode::Split { second, .. } = &tree else {
            panic!("Expected split node");
        };
        assert_eq!(second.first_leaf_id(), 2);
    }

    #[test]
    fn test_find_session() {
        let mut tree = PaneLayoutNode::Split {
            direction: SplitDirection::Horizontal,
            ratio: 0.5,
            first: leaf(1),
            second: Box::new(PaneLayoutNode::Leaf(Pane::new_terminal(2, "t-1".into()))),
        };
        assert_eq!(tree.find_session("t-1"), Some(2));

        tree.get_pane_mut(1)
            .unwrap()
            .tab_strip_mut()
            .unwrap()
            .add_tab(Tab::page(1, "p-1".into(), String::new(), String::new()));
        assert_eq!(tree.find_session("p-1"), Some(1));
        assert_eq!(tree.find_session("nope"), None);
    }

    // =========================================================================
    // Split / Close Tests
    // =========================================================================

    #[test]
    fn test_split_single_pane() {
        let mut tree = PaneLayoutNode::single_pane(test_pane(1));
        assert!(tree.split_pane(1, SplitDirection::Vertical, 0.5, test_pane(2)));

        match &tree {
            PaneLayoutNode::Split {
                direction,
                ratio,
                first,
                second,
            } => {
                assert_eq!(*direction, SplitDirection::Vertical);
                assert_eq!(*ratio, 0.5);
                assert_eq!(first.first_leaf_id(), 1);
                assert_eq!(second.first_leaf_id(), 2);
            }
            _ => panic!("Expected split node"),
        }
    }

    #[test]
    fn test_split_keeps_original_pane_contents() {
        let mut pane = test_pane(1);
        pane.tab_strip_mut()
            .unwrap()
            .add_tab(Tab::new(7, crate::tab::TabKind::Commit));
        let mut tree = PaneLayoutNode::single_pane(pane);

        assert!(tree.split_pane(1, SplitDirection::Horizontal, 0.5, test_pane(2)));
        assert_eq!(tree.get_pane(1).unwrap().tabs().len(), 1);
        assert!(tree.get_pane(2).unwrap().tabs().is_empty());
    }

    #[test]
    fn test_split_nested_pane() {
        let mut tree = nested_tree();
        assert!(tree.split_pane(3, SplitDirection::Horizontal, 0.5, test_pane(4)));
        assert_eq!(tree.pane_count(), 4);
        let ids: Vec<PaneId> = tree.all_panes().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_split_missing_pane_is_noop() {
        let mut tree = nested_tree();
        let before = tree.clone();
        assert!(!tree.split_pane(99, SplitDirection::Horizontal, 0.5, test_pane(4)));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_close_promotes_sibling() {
        let mut tree = nested_tree();
        let (removed, new_active) = tree.close_pane(1).unwrap();
        assert_eq!(removed.id, 1);
        // The VSplit(B, C) is promoted to root; descending first children reaches B
        assert_eq!(new_active, 2);
        assert_eq!(tree.pane_count(), 2);
        assert!(matches!(
            tree,
            PaneLayoutNode::Split {
                direction: SplitDirection::Vertical,
                ..
            }
        ));
    }

    #[test]
    fn test_close_nested_leaf() {
        let mut tree = nested_tree();
        let (removed, new_active) = tree.close_pane(2).unwrap();
        assert_eq!(removed.id, 2);
        assert_eq!(new_active, 3);
        let ids: Vec<PaneId> = tree.all_panes().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_close_sole_root_rejected() {
        let mut tree = PaneLayoutNode::single_pane(test_pane(1));
        assert!(tree.close_pane(1).is_none());
        assert_eq!(tree.pane_count(), 1);
    }

    #[test]
    fn test_close_missing_pane_is_noop() {
        let mut tree = nested_tree();
        let before = tree.clone();
        assert!(tree.close_pane(42).is_none());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_split_close_sequence_never_empties() {
        let mut tree = PaneLayoutNode::single_pane(test_pane(1));
        let mut next = 2;
        for target in [1, 2, 1, 3, 4] {
            if tree.contains_pane(target) {
                tree.split_pane(target, SplitDirection::Horizontal, 0.5, test_pane(next));
                next += 1;
            }
        }
        let ids: Vec<PaneId> = tree.all_panes().iter().map(|p| p.id).collect();
        for id in ids {
            tree.close_pane(id);
            assert!(tree.pane_count() >= 1);
        }
        assert_eq!(tree.pane_count(), 1);
        assert!(matches!(tree, PaneLayoutNode::Leaf(_)));
    }

    // =========================================================================
    // Resize Tests
    // =========================================================================

    #[test]
    fn test_resize_innermost_split() {
        let mut tree = nested_tree();
        assert!(tree.resize_pane_split(3, 0.25));
        match &tree {
            PaneLayoutNode::Split { ratio, second, .. } => {
                assert_eq!(*ratio, 0.5);
                match second.as_ref() {
                    PaneLayoutNode::Split { ratio, .. } => assert_eq!(*ratio, 0.25),
                    _ => panic!("Expected split node"),
                }
            }
            _ => panic!("Expected split node"),
        }

        assert!(tree.resize_pane_split(1, 0.7));
        match &tree {
            PaneLayoutNode::Split { ratio, .. } => assert_eq!(*ratio, 0.7),
            _ => panic!("Expected split node"),
        }
    }

    #[test]
    fn test_resize_root_leaf_is_noop() {
        let mut tree = PaneLayoutNode::single_pane(test_pane(1));
        assert!(!tree.resize_pane_split(1, 0.3));
        assert!(!nested_tree().resize_pane_split(42, 0.3));
    }

    // =========================================================================
    // Directional Navigation Tests
    // =========================================================================

    #[test]
    fn test_nearest_leaf_toward_nested() {
        let tree = nested_tree();
        assert_eq!(tree.nearest_leaf_toward(Direction::Left), 1);
        // HSplit: go to second; VSplit is perpendicular to Right, default first
        assert_eq!(tree.nearest_leaf_toward(Direction::Right), 2);
        assert_eq!(tree.nearest_leaf_toward(Direction::Down), 1);
    }

    #[test]
    fn test_find_pane_in_direction() {
        let tree = nested_tree();
        assert_eq!(tree.find_pane_in_direction(3, Direction::Left), Some(1));
        assert_eq!(tree.find_pane_in_direction(1, Direction::Right), Some(2));
        assert_eq!(tree.find_pane_in_direction(2, Direction::Down), Some(3));
        assert_eq!(tree.find_pane_in_direction(3, Direction::Up), Some(2));
    }

    #[test]
    fn test_find_pane_in_direction_none() {
        let tree = nested_tree();
        assert_eq!(tree.find_pane_in_direction(3, Direction::Right), None);
        assert_eq!(tree.find_pane_in_direction(1, Direction::Left), None);
        assert_eq!(tree.find_pane_in_direction(2, Direction::Up), None);
        assert_eq!(tree.find_pane_in_direction(999, Direction::Left), None);

        let single = PaneLayoutNode::single_pane(test_pane(1));
        assert_eq!(single.find_pane_in_direction(1, Direction::Down), None);
    }

    // =========================================================================
    // Layout Calculation Tests
    // =========================================================================

    #[test]
    fn test_pane_rect_contains() {
        let rect = PaneRect {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
            pane_id: 1,
        };
        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(109.9, 69.9));
        assert!(!rect.contains(110.0, 20.0));
        assert!(!rect.contains(10.0, 19.9));
    }

    #[test]
    fn test_single_pane_fills_bounds() {
        let tree = PaneLayoutNode::single_pane(test_pane(1));
        let rects = calculate_pane_rects((0.0, 0.0, 800.0, 600.0), &tree);
        assert_eq!(rects.len(), 1);
        assert!(approx_eq(rects[0].width, 800.0));
        assert!(approx_eq(rects[0].height, 600.0));
    }

    #[test]
    fn test_nested_rects() {
        let tree = nested_tree();
        let rects = calculate_pane_rects((0.0, 0.0, 800.0, 600.0), &tree);
        assert_eq!(rects.len(), 3);

        let a = rects.iter().find(|r| r.pane_id == 1).unwrap();
        assert!(approx_eq(a.width, 400.0));
        assert!(approx_eq(a.height, 600.0));

        let c = rects.iter().find(|r| r.pane_id == 3).unwrap();
        assert!(approx_eq(c.x, 400.0));
        assert!(approx_eq(c.y, 300.0));
        assert!(approx_eq(c.height, 300.0));
    }

    #[test]
    fn test_non_default_ratio_rects() {
        let tree = PaneLayoutNode::Split {
            direction: SplitDirection::Horizontal,
            ratio: 0.3,
            first: leaf(1),
            second: leaf(2),
        };
        let rects = calculate_pane_rects((0.0, 0.0, 1000.0, 600.0), &tree);
        let second = rects.iter().find(|r| r.pane_id == 2).unwrap();
        assert!(approx_eq(second.x, 300.0));
        assert!(approx_eq(second.width, 700.0));
    }

    #[test]
    fn test_gen_pane_id() {
        let mut next_id = 1u64;
        assert_eq!(gen_pane_id(&mut next_id), 1);
        assert_eq!(gen_pane_id(&mut next_id), 2);
        assert_eq!(next_id, 3);
    }
}
