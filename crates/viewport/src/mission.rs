use std::collections::HashSet;

use tracing::info;

use crate::creator::{CreatorKind, CreatorSlot};
use crate::error::MissionError;
use crate::tree::{MissionTree, NodeId};

pub trait MissionModel {
    fn tree(&self) -> &MissionTree;

    fn creation_target(&self) -> Option<NodeId>;

    fn set_creation_target(&mut self, target: Option<NodeId>);

    /// Host policy on whether `node` may get new neighbours.
    fn allows_creation(&self, _node: NodeId) -> bool {
        true
    }

    fn create_from(&mut self, slot: CreatorSlot) -> Result<NodeId, MissionError>;
}

#[derive(Debug, Clone)]
pub struct Mission {
    tree: MissionTree,
    creation_target: Option<NodeId>,
    locked: HashSet<NodeId>,
    creation_locked: bool,
    created: u64,
}

impl Mission {
    pub fn new(tree: MissionTree) -> Self {
        Self {
            tree,
            creation_target: None,
            locked: HashSet::new(),
            creation_locked: false,
            created: 0,
        }
    }

    pub fn tree_mut(&mut self) -> &mut MissionTree {
        &mut self.tree
    }

    pub fn set_creation_locked(&mut self, locked: bool) {
        self.creation_locked = locked;
    }

    pub fn lock_node(&mut self, id: NodeId) {
        self.locked.insert(id);
    }

    fn next_name(&mut self) -> String {
        self.created += 1;
        format!("New node {}", self.created)
    }
}

impl MissionModel for Mission {
    fn tree(&self) -> &MissionTree {
        &self.tree
    }

    fn creation_target(&self) -> Option<NodeId> {
        self.creation_target
    }

    fn set_creation_target(&mut self, target: Option<NodeId>) {
        self.creation_target = target;
    }

    fn allows_creation(&self, node: NodeId) -> bool {
        !self.creation_locked && !self.locked.contains(&node) && self.tree.contains(node)
    }

    fn create_from(&mut self, slot: CreatorSlot) -> Result<NodeId, MissionError> {
        let target = slot.target;
        if self.creation_target != Some(target) {
            return Err(MissionError::StaleCreator(slot));
        }
        if !self.allows_creation(target) {
            return Err(MissionError::CreationNotAllowed(target));
        }
        let name = self.next_name();
        let parent = self
            .tree
            .parent(target)
            .unwrap_or_else(|| self.tree.root());
        let index_of_target = self
            .tree
            .children(parent)
            .iter()
            .position(|c| *c == target);

        let id = match (slot.kind, index_of_target) {
            (CreatorKind::PrevSibling, Some(index)) => {
                self.tree.insert_child_at(parent, index, name)?
            }
            (CreatorKind::NextSibling, Some(index)) => {
                self.tree.insert_child_at(parent, index + 1, name)?
            }
            (CreatorKind::PrevSibling | CreatorKind::NextSibling, None) => {
                self.tree.add_child(parent, name)?
            }
            (CreatorKind::ParentOnly, _) if self.tree.is_root(target) => {
                return Err(MissionError::RootEdit("given a new parent"));
            }
            (CreatorKind::ParentOnly, _) => self.tree.interpose_parent(target, name)?,
            (CreatorKind::BetweenTargetAndChildren, _) => {
                self.tree.insert_between_children(target, name)?
            }
        };
        info!(node = %id, kind = ?slot.kind, around = %target, "node created");
        self.creation_target = None;
        Ok(id)
    }
}
