use tracing::warn;

use crate::creator::{CreatorKind, CreatorSlot, NodeCreator};
use crate::tree::{MissionTree, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Node(NodeId),
    Creator(CreatorSlot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relationship {
    pub prerequisite: Endpoint,
    pub unlocks: Endpoint,
}

impl Relationship {
    pub fn new(prerequisite: Endpoint, unlocks: Endpoint) -> Self {
        Self {
            prerequisite,
            unlocks,
        }
    }

    fn nodes(prerequisite: NodeId, unlocks: NodeId) -> Self {
        Self::new(Endpoint::Node(prerequisite), Endpoint::Node(unlocks))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationships {
    pub nodes: Vec<NodeId>,
    pub main: Vec<Relationship>,
    pub creator: Vec<Relationship>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub include_root_edges: bool,
}

pub fn resolve(
    tree: &MissionTree,
    target: Option<NodeId>,
    creators: &[NodeCreator],
    options: ResolveOptions,
) -> Relationships {
    let root = tree.root();
    let mut nodes = Vec::with_capacity(tree.len().saturating_sub(1));
    let mut main = Vec::new();

    for (parent, child) in tree.depth_first() {
        nodes.push(child);
        let root_edge = parent == root && !options.include_root_edges;
        let touches_target = Some(parent) == target || Some(child) == target;
        if root_edge || touches_target {
            continue;
        }
        main.push(Relationship::nodes(parent, child));
    }

    let creator = match target {
        Some(target) => creator_relationships(tree, target, creators),
        None => Vec::new(),
    };

    Relationships {
        nodes,
        main,
        creator,
    }
}

fn creator_relationships(
    tree: &MissionTree,
    target: NodeId,
    creators: &[NodeCreator],
) -> Vec<Relationship> {
    let find = |kind: CreatorKind| {
        creators
            .iter()
            .find(|c| c.kind() == kind && c.target() == target)
            .map(|c| Endpoint::Creator(c.slot))
    };

    let (Some(prev), Some(next), Some(parent_only), Some(between)) = (
        find(CreatorKind::PrevSibling),
        find(CreatorKind::NextSibling),
        find(CreatorKind::ParentOnly),
        find(CreatorKind::BetweenTargetAndChildren),
    ) else {
        warn!(
            node = %target,
            creators = creators.len(),
            "creation target set without a complete creator set; skipping creator edges"
        );
        return Vec::new();
    };

    let target_ep = Endpoint::Node(target);
    let mut edges = Vec::with_capacity(5 + tree.children(target).len());

    if let Some(parent) = tree.parent(target).filter(|p| !tree.is_root(*p)) {
        let parent_ep = Endpoint::Node(parent);
        edges.push(Relationship::new(parent_ep, parent_only));
        edges.push(Relationship::new(parent_ep, prev));
        edges.push(Relationship::new(parent_ep, next));
    }
    edges.push(Relationship::new(parent_only, target_ep));
    edges.push(Relationship::new(target_ep, between));
    for &child in tree.children(target) {
        edges.push(Relationship::new(between, Endpoint::Node(child)));
    }
    edges
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    version: u64,
    target: Option<NodeId>,
    generation: u64,
    options: ResolveOptions,
}

/// Memoizes [`resolve`] against the tree's structure version.
#[derive(Debug, Default)]
pub struct RelationshipCache {
    key: Option<CacheKey>,
    value: Relationships,
    recomputes: u64,
}

impl RelationshipCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_resolve(
        &mut self,
        tree: &MissionTree,
        target: Option<NodeId>,
        creators: &[NodeCreator],
        generation: u64,
        options: ResolveOptions,
    ) -> &Relationships {
        let key = CacheKey {
            version: tree.structure_version(),
            target,
            generation,
            options,
        };
        if self.key != Some(key) {
            self.value = resolve(tree, target, creators, options);
            self.key = Some(key);
            self.recomputes += 1;
            tracing::debug!(
                version = key.version,
                nodes = self.value.nodes.len(),
                edges = self.value.main.len() + self.value.creator.len(),
                "relationships recomputed"
            );
        }
        &self.value
    }

    pub fn current(&self) -> &Relationships {
        &self.value
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}
