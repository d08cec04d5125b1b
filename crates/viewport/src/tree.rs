use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MissionError;
use crate::types::GridPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFlags {
    pub executable: bool,
    pub device: bool,
    pub color: Option<String>,
    pub open: bool,
    pub pending_open: bool,
    pub pending_exec: bool,
}

#[derive(Debug, Clone)]
pub struct MissionNode {
    id: NodeId,
    pub name: String,
    pub flags: NodeFlags,
    position: GridPosition,
    depth: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MissionNode {
    fn new(id: NodeId, name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            id,
            name: name.into(),
            flags: NodeFlags::default(),
            position: GridPosition::default(),
            depth: 0,
            parent,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct MissionTree {
    root: NodeId,
    nodes: HashMap<NodeId, MissionNode>,
    next_id: u64,
    version: u64,
}

impl MissionTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, MissionNode::new(root, root_name, None));
        Self {
            root,
            nodes,
            next_id: 1,
            version: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&MissionNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeEditor<'_>> {
        self.nodes.get_mut(&id).map(|node| NodeEditor { node })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Changes on every structural edit; equal versions mean equal shape.
    pub fn structure_version(&self) -> u64 {
        self.version
    }

    pub fn depth_first(&self) -> DepthFirst<'_> {
        let mut stack = Vec::new();
        let root = self.root;
        for &child in self.children(root).iter().rev() {
            stack.push((root, child));
        }
        DepthFirst { tree: self, stack }
    }

    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId, MissionError> {
        let index = self.children(parent).len();
        self.insert_child_at(parent, index, name)
    }

    pub fn insert_child_at(
        &mut self,
        parent: NodeId,
        index: usize,
        name: impl Into<String>,
    ) -> Result<NodeId, MissionError> {
        if !self.contains(parent) {
            return Err(MissionError::UnknownNode(parent));
        }
        let id = self.allocate();
        self.nodes.insert(id, MissionNode::new(id, name, Some(parent)));
        let siblings = &mut self.parent_entry(parent).children;
        let index = index.min(siblings.len());
        siblings.insert(index, id);
        self.touch();
        Ok(id)
    }

    /// Put a new node between `target` and its parent. The new node takes
    /// `target`'s slot in the parent's child list.
    pub fn interpose_parent(&mut self, target: NodeId, name: impl Into<String>) -> Result<NodeId, MissionError> {
        if self.is_root(target) {
            return Err(MissionError::RootEdit("given a new parent"));
        }
        let parent = self
            .parent(target)
            .ok_or(MissionError::UnknownNode(target))?;
        let id = self.allocate();
        let mut node = MissionNode::new(id, name, Some(parent));
        node.children.push(target);
        self.nodes.insert(id, node);

        let siblings = &mut self.parent_entry(parent).children;
        if let Some(slot) = siblings.iter_mut().find(|c| **c == target) {
            *slot = id;
        }
        if let Some(t) = self.nodes.get_mut(&target) {
            t.parent = Some(id);
        }
        self.touch();
        Ok(id)
    }

    /// Make a new node the only child of `target`, moving target's former
    /// children under it.
    pub fn insert_between_children(
        &mut self,
        target: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, MissionError> {
        if !self.contains(target) {
            return Err(MissionError::UnknownNode(target));
        }
        let id = self.allocate();
        let mut node = MissionNode::new(id, name, Some(target));
        node.children = std::mem::take(&mut self.parent_entry(target).children);
        for child in &node.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = Some(id);
            }
        }
        self.nodes.insert(id, node);
        self.parent_entry(target).children.push(id);
        self.touch();
        Ok(id)
    }

    pub fn remove_subtree(&mut self, id: NodeId) -> Result<(), MissionError> {
        if self.is_root(id) {
            return Err(MissionError::RootEdit("removed"));
        }
        let parent = self.parent(id).ok_or(MissionError::UnknownNode(id))?;
        self.parent_entry(parent).children.retain(|c| *c != id);

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.children);
            }
        }
        self.touch();
        Ok(())
    }

    fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // Only called with ids that were checked to exist.
    fn parent_entry(&mut self, id: NodeId) -> &mut MissionNode {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| unreachable!("node {id} checked before edit"))
    }

    fn touch(&mut self) {
        self.version += 1;
        self.relayout();
    }

    /// Column is depth; leaves take consecutive lanes in pre-order and an
    /// inner node shares the lane of its first child.
    fn relayout(&mut self) {
        let mut lane = 0u32;
        let mut stack = vec![(self.root, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            node.depth = depth;
            node.position = GridPosition::new(depth as f64, lane as f64);
            if node.children.is_empty() {
                if id != self.root {
                    lane += 1;
                }
            } else {
                for &child in node.children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
        tracing::trace!(version = self.version, lanes = lane, "mission tree relayout");
    }
}

pub struct NodeEditor<'a> {
    node: &'a mut MissionNode,
}

impl NodeEditor<'_> {
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.node.name = name.into();
        self
    }

    pub fn flags(&mut self) -> &mut NodeFlags {
        &mut self.node.flags
    }
}

pub struct DepthFirst<'a> {
    tree: &'a MissionTree,
    stack: Vec<(NodeId, NodeId)>,
}

impl Iterator for DepthFirst<'_> {
    type Item = (NodeId, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let (parent, child) = self.stack.pop()?;
        for &grandchild in self.tree.children(child).iter().rev() {
            self.stack.push((child, grandchild));
        }
        Some((parent, child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (MissionTree, NodeId, NodeId) {
        let mut tree = MissionTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        let b = tree.add_child(a, "b").unwrap();
        (tree, a, b)
    }

    #[test]
    fn depth_and_columns_follow_parent() {
        let (tree, a, b) = chain();
        assert_eq!(tree.node(a).unwrap().depth(), 1);
        assert_eq!(tree.node(b).unwrap().depth(), 2);
        assert_eq!(tree.node(b).unwrap().position(), GridPosition::new(2.0, 0.0));
        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn leaves_take_consecutive_lanes() {
        let mut tree = MissionTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        let a1 = tree.add_child(a, "a1").unwrap();
        let a2 = tree.add_child(a, "a2").unwrap();
        let b = tree.add_child(tree.root(), "b").unwrap();

        assert_eq!(tree.node(a).unwrap().position().row, 0.0);
        assert_eq!(tree.node(a1).unwrap().position().row, 0.0);
        assert_eq!(tree.node(a2).unwrap().position().row, 1.0);
        assert_eq!(tree.node(b).unwrap().position().row, 2.0);
    }

    #[test]
    fn depth_first_is_preorder() {
        let mut tree = MissionTree::new("root");
        let root = tree.root();
        let a = tree.add_child(root, "a").unwrap();
        let a1 = tree.add_child(a, "a1").unwrap();
        let b = tree.add_child(root, "b").unwrap();
        let pairs: Vec<_> = tree.depth_first().collect();
        assert_eq!(pairs, vec![(root, a), (a, a1), (root, b)]);
    }

    #[test]
    fn structural_edits_bump_version() {
        let (mut tree, a, _) = chain();
        let before = tree.structure_version();
        tree.node_mut(a).unwrap().set_name("renamed").flags().open = true;
        assert_eq!(tree.structure_version(), before);
        tree.add_child(a, "c").unwrap();
        assert!(tree.structure_version() > before);
    }

    #[test]
    fn interpose_parent_keeps_sibling_slot() {
        let mut tree = MissionTree::new("root");
        let root = tree.root();
        let a = tree.add_child(root, "a").unwrap();
        let b = tree.add_child(root, "b").unwrap();
        let p = tree.interpose_parent(a, "p").unwrap();
        assert_eq!(tree.children(root), &[p, b]);
        assert_eq!(tree.children(p), &[a]);
        assert_eq!(tree.node(a).unwrap().depth(), 2);
    }

    #[test]
    fn insert_between_children_adopts_all() {
        let (mut tree, a, b) = chain();
        let c = tree.add_child(a, "c").unwrap();
        let mid = tree.insert_between_children(a, "mid").unwrap();
        assert_eq!(tree.children(a), &[mid]);
        assert_eq!(tree.children(mid), &[b, c]);
        assert_eq!(tree.parent(c), Some(mid));
        assert_eq!(tree.node(c).unwrap().depth(), 3);
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let (mut tree, a, b) = chain();
        tree.remove_subtree(a).unwrap();
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn root_edits_are_rejected() {
        let mut tree = MissionTree::new("root");
        let root = tree.root();
        assert!(matches!(tree.remove_subtree(root), Err(MissionError::RootEdit(_))));
        assert!(matches!(tree.interpose_parent(root, "x"), Err(MissionError::RootEdit(_))));
        assert_eq!(
            tree.add_child(NodeId(99), "x"),
            Err(MissionError::UnknownNode(NodeId(99)))
        );
    }
}
