// Chunk: docs/chunks/tiling_tree_model - End-to-end layout engine behavior
//!
//! Integration tests driving the engine through its public API only.

use std::path::Path;

use canopy_layout::{
    ContextKey, ContextStore, EditorState, LayoutConfig, LayoutEngine, PaneLayoutNode, ReadOutcome,
    SessionEvent, SplitDirection,
};

fn engine() -> LayoutEngine {
    LayoutEngine::new(LayoutConfig::default(), ContextStore::new())
}

fn loaded() -> ReadOutcome {
    ReadOutcome::Loaded {
        content: String::new(),
    }
}

/// Asserts no split in the tree has an empty side, and returns leaf count.
fn check_tree(node: &PaneLayoutNode) -> usize {
    match node {
        PaneLayoutNode::Leaf(_) => 1,
        PaneLayoutNode::Split { first, second, .. } => {
            let left = check_tree(first);
            let right = check_tree(second);
            assert!(left >= 1 && right >= 1);
            left + right
        }
    }
}

fn session_location_count(engine: &LayoutEngine, session_id: &str) -> usize {
    engine
        .state()
        .layout
        .all_panes()
        .iter()
        .map(|pane| {
            pane.resources()
                .iter()
                .filter(|(_, sid)| *sid == session_id)
                .count()
        })
        .sum()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_split_then_close_returns_to_single_pane() {
    let mut engine = engine();
    assert_eq!(engine.state().active_pane_id, 1);

    let new_pane = engine.split_pane(1, SplitDirection::Vertical).unwrap();
    assert_eq!(new_pane, 2);
    assert_eq!(engine.state().active_pane_id, 2);
    match &engine.state().layout {
        PaneLayoutNode::Split {
            direction,
            first,
            second,
            ..
        } => {
            assert_eq!(*direction, SplitDirection::Vertical);
            assert!(matches!(first.as_ref(), PaneLayoutNode::Leaf(p) if p.id == 1 && p.tabs().is_empty()));
            assert!(matches!(second.as_ref(), PaneLayoutNode::Leaf(p) if p.id == 2 && p.tabs().is_empty()));
        }
        _ => panic!("Expected split node"),
    }

    assert_eq!(engine.close_pane(2), Some(1));
    assert!(matches!(&engine.state().layout, PaneLayoutNode::Leaf(p) if p.id == 1));
    assert_eq!(engine.state().active_pane_id, 1);
}

#[test]
fn test_reopening_file_reactivates_tab() {
    let mut engine = engine();
    let first = engine
        .open_file(Path::new("/a.txt"), "a.txt", loaded(), false)
        .unwrap();
    let second = engine
        .open_file(Path::new("/a.txt"), "a.txt", loaded(), false)
        .unwrap();

    assert_eq!(first, second);
    let pane = engine.state().active_pane().unwrap();
    let matching = pane
        .tabs()
        .iter()
        .filter(|t| t.editor_path() == Some(Path::new("/a.txt")))
        .count();
    assert_eq!(matching, 1);
    assert_eq!(engine.state().next_tab_id, 2);
}

#[test]
fn test_move_page_tab_between_panes() {
    let mut engine = engine();
    engine.open_file(Path::new("/a.txt"), "a.txt", loaded(), false);
    let page = engine
        .add_page_tab("p1", "https://example.com", None, None)
        .unwrap();
    let dest = engine.split_pane(1, SplitDirection::Horizontal).unwrap();

    assert!(engine.move_tab(1, dest, page, None));
    let source = engine.state().get_pane(1).unwrap();
    let target = engine.state().get_pane(dest).unwrap();
    assert!(source.tabs().iter().all(|t| t.id != page));
    assert!(target.tabs().iter().any(|t| t.id == page));
    assert_eq!(target.active_tab_id(), Some(page));
}

#[test]
fn test_workspace_switch_saves_lazily() {
    let mut engine = engine();
    engine.observe_context(Some("W1"), Some("main"));
    assert_eq!(engine.state(), &EditorState::new());

    // First visit to W2 installs a fresh default; W1 is saved as it was left
    engine.observe_context(Some("W2"), Some("main"));
    assert_eq!(engine.state(), &EditorState::new());
    assert!(!engine.contexts().contains(&ContextKey::new("W2", "main")));
    assert_eq!(
        engine.contexts().get(&ContextKey::new("W1", "main")),
        Some(&EditorState::new())
    );

    engine.split_pane(1, SplitDirection::Horizontal);
    assert!(!engine.contexts().contains(&ContextKey::new("W2", "main")));

    engine.observe_context(Some("W1"), Some("main"));
    assert_eq!(engine.state(), &EditorState::new());
    assert_eq!(
        engine
            .contexts()
            .get(&ContextKey::new("W2", "main"))
            .map(EditorState::pane_count),
        Some(2)
    );

    engine.observe_context(Some("W2"), Some("main"));
    assert_eq!(engine.state().pane_count(), 2);
}

#[test]
fn test_canvas_switch_is_scoped_independently() {
    let mut engine = engine();
    engine.observe_context(Some("W1"), Some("a"));
    engine.open_file(Path::new("/a"), "a", loaded(), false);
    engine.observe_context(Some("W1"), Some("b"));
    assert!(engine.state().active_pane().unwrap().tabs().is_empty());
    engine.observe_context(Some("W1"), Some("a"));
    assert_eq!(engine.state().active_pane().unwrap().tabs().len(), 1);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_split_close_sequences_never_empty_the_tree() {
    let mut engine = engine();
    let directions = [SplitDirection::Horizontal, SplitDirection::Vertical];

    // Deterministic pseudo-random walk over split/close requests
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    for step in 0..200 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;

        let ids: Vec<u64> = engine.state().layout.all_panes().iter().map(|p| p.id).collect();
        let target = ids[(seed as usize) % ids.len()];
        if seed % 3 == 0 {
            engine.split_pane(target, directions[step % 2]);
        } else {
            engine.close_pane(target);
        }

        let count = check_tree(&engine.state().layout);
        assert!(count >= 1);
        assert!(engine.state().layout.contains_pane(engine.state().active_pane_id));
    }
}

#[test]
fn test_close_nonexistent_is_identity() {
    let mut engine = engine();
    engine.split_pane(1, SplitDirection::Horizontal);
    engine.add_terminal_tab(2, "t-1", None);
    let before = engine.state().clone();

    assert!(engine.close_pane(999).is_none());
    assert_eq!(engine.state(), &before);
    assert!(engine.close_tab(1, 999).is_none());
    assert_eq!(engine.state(), &before);
}

#[test]
fn test_terminal_session_has_one_location() {
    let mut engine = engine();
    let mut events = engine.take_session_events().unwrap();
    let second = engine.split_pane(1, SplitDirection::Horizontal).unwrap();

    engine.add_terminal_tab(1, "t-1", None);
    engine.add_terminal_tab(second, "t-1", None);

    assert_eq!(session_location_count(&engine, "t-1"), 1);
    assert!(engine.state().get_pane(1).unwrap().tabs().is_empty());
    assert_eq!(engine.state().get_pane(second).unwrap().tabs().len(), 1);

    let mut attached = 0;
    while let Ok(event) = events.try_recv() {
        assert!(matches!(event, SessionEvent::Attached(_)));
        attached += 1;
    }
    assert_eq!(attached, 1);
}

#[test]
fn test_page_tab_never_lands_in_terminal_pane() {
    let mut engine = engine();
    let term = engine
        .open_terminal_pane(1, SplitDirection::Vertical, "t-1")
        .unwrap();
    let tab = engine.add_page_tab("p1", "https://example.com", None, Some(term)).unwrap();

    let host = engine.state().layout.find_tab(tab).unwrap();
    assert_ne!(host, term);
    assert!(engine.state().get_pane(term).unwrap().tabs().is_empty());
    assert_eq!(engine.state().pane_count(), 3);
}

#[test]
fn test_stale_read_lands_in_current_pane() {
    let mut engine = engine();
    // The read was started while pane 1 was active...
    let outcome = ReadOutcome::Loaded {
        content: "late".into(),
    };
    // ...but the user split before it resolved
    let now_active = engine.split_pane(1, SplitDirection::Horizontal).unwrap();
    let tab = engine
        .open_file(Path::new("/slow.txt"), "slow.txt", outcome, false)
        .unwrap();
    assert_eq!(engine.state().layout.find_tab(tab), Some(now_active));
}
