use serde::{Deserialize, Serialize};

use crate::tree::{MissionTree, NodeId};
use crate::types::GridPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatorKind {
    PrevSibling,
    NextSibling,
    ParentOnly,
    BetweenTargetAndChildren,
}

impl CreatorKind {
    pub const ALL: [CreatorKind; 4] = [
        CreatorKind::PrevSibling,
        CreatorKind::NextSibling,
        CreatorKind::ParentOnly,
        CreatorKind::BetweenTargetAndChildren,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreatorSlot {
    pub kind: CreatorKind,
    pub target: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatorId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct NodeCreator {
    pub id: CreatorId,
    pub slot: CreatorSlot,
    pub position: GridPosition,
    pub depth: u32,
}

impl NodeCreator {
    pub fn kind(&self) -> CreatorKind {
        self.slot.kind
    }

    pub fn target(&self) -> NodeId {
        self.slot.target
    }
}

pub fn placement(kind: CreatorKind, target: GridPosition, target_depth: u32) -> (GridPosition, u32) {
    match kind {
        CreatorKind::PrevSibling => (
            GridPosition::new(target.column, target.row - 1.0),
            target_depth,
        ),
        CreatorKind::NextSibling => (
            GridPosition::new(target.column, target.row + 1.0),
            target_depth,
        ),
        CreatorKind::ParentOnly => (
            GridPosition::new(target.column - 0.5, target.row),
            target_depth.saturating_sub(1),
        ),
        CreatorKind::BetweenTargetAndChildren => (
            GridPosition::new(target.column + 0.5, target.row),
            target_depth + 1,
        ),
    }
}

/// Either no creators or all four for one target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatorSet {
    creators: Vec<NodeCreator>,
    generation: u64,
}

impl CreatorSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_target(tree: &MissionTree, target: NodeId, generation: u64) -> Self {
        let Some(node) = tree.node(target) else {
            return Self::empty();
        };
        let creators = CreatorKind::ALL
            .iter()
            .enumerate()
            .map(|(i, &kind)| {
                let (position, depth) = placement(kind, node.position(), node.depth());
                NodeCreator {
                    id: CreatorId(generation * 4 + i as u64),
                    slot: CreatorSlot { kind, target },
                    position,
                    depth,
                }
            })
            .collect();
        Self {
            creators,
            generation,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.creators.len()
    }

    pub fn as_slice(&self) -> &[NodeCreator] {
        &self.creators
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeCreator> {
        self.creators.iter()
    }

    pub fn target(&self) -> Option<NodeId> {
        self.creators.first().map(|c| c.target())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, kind: CreatorKind) -> Option<&NodeCreator> {
        self.creators.iter().find(|c| c.kind() == kind)
    }

    pub fn max_depth(&self) -> Option<u32> {
        self.creators.iter().map(|c| c.depth).max()
    }

    pub fn max_column(&self) -> Option<f64> {
        self.creators
            .iter()
            .map(|c| c.position.column)
            .reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_all_or_nothing() {
        let mut tree = MissionTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        assert_eq!(CreatorSet::for_target(&tree, a, 1).len(), 4);
        assert_eq!(CreatorSet::for_target(&tree, NodeId(42), 1).len(), 0);
    }

    #[test]
    fn placement_is_relative_to_target() {
        let target = GridPosition::new(2.0, 3.0);
        assert_eq!(
            placement(CreatorKind::PrevSibling, target, 2),
            (GridPosition::new(2.0, 2.0), 2)
        );
        assert_eq!(
            placement(CreatorKind::NextSibling, target, 2),
            (GridPosition::new(2.0, 4.0), 2)
        );
        assert_eq!(
            placement(CreatorKind::ParentOnly, target, 2),
            (GridPosition::new(1.5, 3.0), 1)
        );
        assert_eq!(
            placement(CreatorKind::BetweenTargetAndChildren, target, 2),
            (GridPosition::new(2.5, 3.0), 3)
        );
    }

    #[test]
    fn ids_are_unique_per_generation() {
        let mut tree = MissionTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        let first = CreatorSet::for_target(&tree, a, 1);
        let second = CreatorSet::for_target(&tree, a, 2);
        for c in first.iter() {
            assert!(second.iter().all(|d| d.id != c.id));
        }
        assert_eq!(second.max_depth(), Some(2));
        assert_eq!(second.target(), Some(a));
    }
}
