//! Property tests for the viewport core.
//!
//! 1. Grid -> screen -> grid round-trips for any scale in range.
//! 2. Cursor-anchored zoom keeps the logical point under the cursor fixed.
//! 3. Main relationships never touch the root or the creation target.
//! 4. The creator set is all-or-nothing under arbitrary interaction.
//! 5. Smooth pan converges without overshoot in a bounded number of ticks.

use proptest::prelude::*;
use proptest::sample::Index;
use viewport::config::{MAX_SCALE, MIN_SCALE};
use viewport::*;

fn build_tree(parents: &[Index]) -> (MissionTree, Vec<NodeId>) {
    let mut tree = MissionTree::new("root");
    let mut ids = vec![tree.root()];
    for (i, pick) in parents.iter().enumerate() {
        let parent = ids[pick.index(ids.len())];
        let id = tree
            .add_child(parent, format!("n{i}"))
            .expect("parent was taken from the tree");
        ids.push(id);
    }
    (tree, ids)
}

fn non_root_ids(tree: &MissionTree) -> Vec<NodeId> {
    tree.depth_first().map(|(_, child)| child).collect()
}

fn scales() -> impl Strategy<Value = f64> {
    MIN_SCALE..=MAX_SCALE
}

fn bounds() -> Bounds {
    Bounds::new(Position::new(32.0, 48.0), Size::new(1024.0, 768.0))
}

// ── Transform ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn grid_round_trip(
        column in -200.0f64..200.0,
        row in -200.0f64..200.0,
        scale in scales(),
        ox in -5_000.0f64..5_000.0,
        oy in -5_000.0f64..5_000.0,
    ) {
        let metrics = GridMetrics::default();
        let transform = Transform::new(scale, Position::new(ox, oy));
        let viewport = bounds();
        let local = transform.to_screen(&metrics, GridPosition::new(column, row));
        let client = Position::new(local.x + viewport.origin.x, local.y + viewport.origin.y);
        let back = transform.to_logical(&metrics, client, &viewport);
        prop_assert!((back.column - column).abs() < 1e-6, "{} vs {}", back.column, column);
        prop_assert!((back.row - row).abs() < 1e-6, "{} vs {}", back.row, row);
    }

    #[test]
    fn zoom_keeps_cursor_anchor(
        start in scales(),
        requested in 0.05f64..4.0,
        cx in 0.0f64..1024.0,
        cy in 0.0f64..768.0,
        ox in -2_000.0f64..2_000.0,
        oy in -2_000.0f64..2_000.0,
    ) {
        let mut c = ViewportController::new(ViewportConfig::default());
        let viewport = bounds();
        c.set_bounds(viewport);
        c.set_offset(Position::new(ox, oy));
        c.zoom_at(start, viewport.origin);

        let cursor = Position::new(viewport.origin.x + cx, viewport.origin.y + cy);
        let anchor = c.transform().to_logical(c.metrics(), cursor, &viewport);
        c.zoom_at(requested, cursor);

        prop_assert!(c.scale() >= c.config().min_scale && c.scale() <= c.config().max_scale);
        let after = c.transform().to_screen(c.metrics(), anchor);
        prop_assert!((after.x + viewport.origin.x - cursor.x).abs() < 1e-6);
        prop_assert!((after.y + viewport.origin.y - cursor.y).abs() < 1e-6);
    }
}

// ── Relationships ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn main_edges_skip_root_and_target(
        parents in prop::collection::vec(any::<Index>(), 1..40),
        target_pick in any::<Option<Index>>(),
    ) {
        let (tree, ids) = build_tree(&parents);
        let target = target_pick.map(|pick| ids[1 + pick.index(ids.len() - 1)]);
        let creators = target
            .map(|t| CreatorSet::for_target(&tree, t, 1))
            .unwrap_or_default();
        let rel = resolve(&tree, target, creators.as_slice(), ResolveOptions::default());

        prop_assert_eq!(rel.nodes.len(), tree.len() - 1);
        for edge in &rel.main {
            prop_assert_ne!(edge.prerequisite, Endpoint::Node(tree.root()));
            if let Some(t) = target {
                prop_assert_ne!(edge.prerequisite, Endpoint::Node(t));
                prop_assert_ne!(edge.unlocks, Endpoint::Node(t));
            }
        }

        let kept = tree
            .depth_first()
            .filter(|&(p, c)| !tree.is_root(p) && Some(p) != target && Some(c) != target)
            .count();
        prop_assert_eq!(rel.main.len(), kept);

        match target {
            Some(t) => {
                let parent_edges = if tree.parent(t).is_some_and(|p| !tree.is_root(p)) { 3 } else { 0 };
                prop_assert_eq!(
                    rel.creator.len(),
                    parent_edges + 2 + tree.children(t).len()
                );
            }
            None => prop_assert!(rel.creator.is_empty()),
        }
    }
}

// ── Creator set under interaction ───────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Select(Index),
    Deselect,
    Activate,
    Deactivate,
    Commit(Index),
    Remove(Index),
    Retarget(Index),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<Index>().prop_map(Op::Select),
        1 => Just(Op::Deselect),
        3 => Just(Op::Activate),
        1 => Just(Op::Deactivate),
        2 => any::<Index>().prop_map(Op::Commit),
        1 => any::<Index>().prop_map(Op::Remove),
        1 => any::<Index>().prop_map(Op::Retarget),
    ]
}

proptest! {
    #[test]
    fn creator_set_is_all_or_nothing(
        parents in prop::collection::vec(any::<Index>(), 1..20),
        ops in prop::collection::vec(op(), 1..60),
    ) {
        let (tree, _) = build_tree(&parents);
        let mut mission = Mission::new(tree);
        let mut vp = MissionViewport::new(ViewportConfig::default());
        vp.controller_mut().set_bounds(bounds());

        for op in ops {
            let ids = non_root_ids(mission.tree());
            match op {
                Op::Select(pick) if !ids.is_empty() => {
                    vp.on_node_select(&mut mission, ids[pick.index(ids.len())]);
                }
                Op::Deselect => {
                    vp.on_node_deselect(&mut mission);
                }
                Op::Activate => {
                    vp.on_creation_activate(&mut mission);
                }
                Op::Deactivate => {
                    vp.on_creation_deactivate(&mut mission);
                }
                Op::Commit(pick) => {
                    let kind = CreatorKind::ALL[pick.index(CreatorKind::ALL.len())];
                    let _ = vp.on_creator_commit(&mut mission, kind);
                }
                Op::Remove(pick) if !ids.is_empty() => {
                    let _ = mission.tree_mut().remove_subtree(ids[pick.index(ids.len())]);
                }
                Op::Retarget(pick) if !ids.is_empty() => {
                    mission.set_creation_target(Some(ids[pick.index(ids.len())]));
                }
                _ => {}
            }

            vp.sync(&mut mission);
            let creators = vp.creators();
            prop_assert!(creators.len() == 0 || creators.len() == 4);
            prop_assert_eq!(creators.target(), vp.selection().creation_target());
            prop_assert_eq!(mission.creation_target(), vp.selection().creation_target());
            if let Some(target) = creators.target() {
                prop_assert!(mission.tree().contains(target));
                prop_assert!(creators.iter().all(|c| c.target() == target));
                prop_assert!(vp.relationships().creator.len() >= 2);
            }
            if let Some(selected) = vp.selection().selected() {
                prop_assert!(mission.tree().contains(selected));
            }
        }
    }
}

// ── Smooth pan ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn smooth_pan_converges_without_overshoot(
        sx in -5_000.0f64..5_000.0,
        sy in -5_000.0f64..5_000.0,
        tx in -5_000.0f64..5_000.0,
        ty in -5_000.0f64..5_000.0,
    ) {
        let mut c = ViewportController::new(ViewportConfig::default());
        c.set_offset(Position::new(sx, sy));
        let target = Position::new(tx, ty);
        c.pan_to(target);

        let mut remaining = (tx - sx, ty - sy);
        let mut ticks = 0;
        while c.tick() {
            ticks += 1;
            prop_assert!(ticks <= 100, "no convergence after {} ticks", ticks);
            let now = (tx - c.offset().x, ty - c.offset().y);
            for (before, after) in [(remaining.0, now.0), (remaining.1, now.1)] {
                prop_assert!(after.abs() <= before.abs());
                prop_assert!(after == 0.0 || after.signum() == before.signum());
            }
            remaining = now;
        }
        prop_assert_eq!(c.offset(), target);
        prop_assert!(!c.is_animating());
    }
}
