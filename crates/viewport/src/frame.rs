use crate::controller::ViewportController;
use crate::creator::{CreatorId, CreatorSet, CreatorSlot};
use crate::cull;
use crate::relationships::{Endpoint, Relationship, Relationships};
use crate::selection::SelectionState;
use crate::transform::PaddingMode;
use crate::tree::{MissionTree, NodeFlags, NodeId};
use crate::types::{Bounds, Position, Size};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameNode {
    pub id: NodeId,
    pub name: String,
    pub rect: Bounds,
    pub selected: bool,
    pub creation_target: bool,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameCreator {
    pub id: CreatorId,
    pub slot: CreatorSlot,
    pub rect: Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameEdge {
    pub relationship: Relationship,
    pub from: Position,
    pub to: Position,
    pub creator: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub scale: f64,
    pub offset: Position,
    pub viewport: Bounds,
    pub nodes: Vec<FrameNode>,
    pub creators: Vec<FrameCreator>,
    pub edges: Vec<FrameEdge>,
}

impl Frame {
    pub fn node(&self, id: NodeId) -> Option<&FrameNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

pub(crate) fn project(
    tree: &MissionTree,
    relationships: &Relationships,
    creators: &CreatorSet,
    selection: &SelectionState,
    controller: &ViewportController,
) -> Frame {
    let transform = controller.transform();
    let metrics = controller.metrics();
    let config = controller.config();
    let viewport = controller.bounds();
    let local = Bounds::new(Position::default(), viewport.size);
    let culling = config.cull_offscreen && !viewport.is_empty();

    let node_rect = |id: NodeId| {
        tree.node(id).map(|node| {
            let mode = if selection.selected() == Some(id) {
                PaddingMode::FullHeight
            } else {
                PaddingMode::Padded
            };
            transform.node_rect(metrics, node.position(), mode)
        })
    };
    let creator_rect = |slot: &CreatorSlot| {
        creators
            .iter()
            .find(|c| c.slot == *slot)
            .map(|c| transform.marker_rect(metrics, c.position, config.creator_size))
    };
    let endpoint_rect = |ep: &Endpoint| match ep {
        Endpoint::Node(id) => node_rect(*id),
        Endpoint::Creator(slot) => creator_rect(slot),
    };

    let nodes = relationships
        .nodes
        .iter()
        .filter_map(|&id| {
            let node = tree.node(id)?;
            let rect = node_rect(id)?;
            if culling && !cull::visible(&rect, &local) {
                return None;
            }
            Some(FrameNode {
                id,
                name: node.name.clone(),
                rect,
                selected: selection.selected() == Some(id),
                creation_target: selection.creation_target() == Some(id),
                flags: node.flags.clone(),
            })
        })
        .collect();

    let frame_creators = creators
        .iter()
        .map(|c| FrameCreator {
            id: c.id,
            slot: c.slot,
            rect: transform.marker_rect(metrics, c.position, config.creator_size),
        })
        .filter(|c| !culling || cull::visible(&c.rect, &local))
        .collect();

    let main = relationships.main.iter().map(|r| (r, false));
    let extra = relationships.creator.iter().map(|r| (r, true));
    let edges = main
        .chain(extra)
        .filter_map(|(r, creator)| {
            let from_rect = endpoint_rect(&r.prerequisite)?;
            let to_rect = endpoint_rect(&r.unlocks)?;
            let from = Position::new(from_rect.right(), from_rect.center().y);
            let to = Position::new(to_rect.origin.x, to_rect.center().y);
            if culling && !cull::segment_visible(from, to, &local) {
                return None;
            }
            Some(FrameEdge {
                relationship: *r,
                from,
                to,
                creator,
            })
        })
        .collect();

    Frame {
        scale: transform.scale,
        offset: transform.offset,
        viewport,
        nodes,
        creators: frame_creators,
        edges,
    }
}

pub fn content_size(frame: &Frame) -> Size {
    let right = frame
        .nodes
        .iter()
        .map(|n| n.rect.right())
        .chain(frame.creators.iter().map(|c| c.rect.right()))
        .fold(0.0, f64::max);
    let bottom = frame
        .nodes
        .iter()
        .map(|n| n.rect.bottom())
        .chain(frame.creators.iter().map(|c| c.rect.bottom()))
        .fold(0.0, f64::max);
    Size::new(right, bottom)
}
