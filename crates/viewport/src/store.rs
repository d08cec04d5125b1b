use tracing::{debug, warn};

use crate::config::ViewportConfig;
use crate::controller::ViewportController;
use crate::creator::{CreatorKind, CreatorSet, CreatorSlot};
use crate::error::MissionError;
use crate::frame::{self, Frame};
use crate::mission::MissionModel;
use crate::relationships::{RelationshipCache, Relationships, ResolveOptions};
use crate::selection::{SelectionEvent, SelectionState};
use crate::tree::{MissionTree, NodeId};
use crate::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Selected(NodeId),
    Created(NodeId),
    PanStarted,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Node(NodeId),
    Creator(CreatorSlot),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct RevealWatermark {
    last_expanded: Option<NodeId>,
    last_creator_depth: Option<u32>,
}

#[derive(Debug)]
pub struct MissionViewport {
    controller: ViewportController,
    selection: SelectionState,
    creators: CreatorSet,
    generation: u64,
    cache: RelationshipCache,
    observed_version: Option<u64>,
    watermark: RevealWatermark,
}

impl MissionViewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            controller: ViewportController::new(config),
            selection: SelectionState::NoSelection,
            creators: CreatorSet::empty(),
            generation: 0,
            cache: RelationshipCache::new(),
            observed_version: None,
            watermark: RevealWatermark::default(),
        }
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ViewportController {
        &mut self.controller
    }

    pub fn config(&self) -> &ViewportConfig {
        self.controller.config()
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn creators(&self) -> &CreatorSet {
        &self.creators
    }

    pub fn relationships(&self) -> &Relationships {
        self.cache.current()
    }

    pub fn recompute_count(&self) -> u64 {
        self.cache.recomputes()
    }

    fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            include_root_edges: self.config().include_root_edges,
        }
    }

    pub fn sync<M: MissionModel>(&mut self, model: &mut M) -> &Relationships {
        self.heal_selection(model);
        self.heal_creation_target(model);

        let version = model.tree().structure_version();
        let version_changed = self.observed_version != Some(version);
        let target = self.selection.creation_target();

        if self.creators.target() != target || (version_changed && target.is_some()) {
            self.rebuild_creators(model.tree(), target);
        }

        let options = self.resolve_options();
        let tree = model.tree();
        self.cache.get_or_resolve(
            tree,
            target,
            self.creators.as_slice(),
            self.creators.generation(),
            options,
        );

        if version_changed {
            self.observed_version = Some(version);
            self.reveal_expanded(tree);
        }
        self.reveal_creators();

        self.cache.current()
    }

    fn heal_selection<M: MissionModel>(&mut self, model: &mut M) {
        let Some(selected) = self.selection.selected() else {
            return;
        };
        let tree = model.tree();
        if tree.contains(selected) && !tree.is_root(selected) {
            return;
        }
        warn!(node = %selected, "selected node no longer exists; clearing selection");
        self.selection.reset();
        if model.creation_target().is_some() {
            model.set_creation_target(None);
        }
    }

    fn heal_creation_target<M: MissionModel>(&mut self, model: &mut M) {
        let expected = self.selection.creation_target();
        let actual = model.creation_target();
        if actual == expected {
            return;
        }
        warn!(
            expected = ?expected,
            actual = ?actual,
            "creation target changed outside the viewport; restoring"
        );
        model.set_creation_target(expected);
    }

    fn rebuild_creators(&mut self, tree: &MissionTree, target: Option<NodeId>) {
        self.creators = match target {
            Some(target) => {
                self.generation += 1;
                CreatorSet::for_target(tree, target, self.generation)
            }
            None => CreatorSet::empty(),
        };
        if self.creators.is_empty() {
            self.watermark.last_creator_depth = None;
        }
    }

    /// Consumes the watermark: only the first structural change after an
    /// expand or commit may move the view.
    fn reveal_expanded(&mut self, tree: &MissionTree) {
        let Some(node) = self.watermark.last_expanded.take().and_then(|id| tree.node(id)) else {
            return;
        };
        let column = node
            .children()
            .iter()
            .filter_map(|c| tree.node(*c))
            .map(|c| c.position().column)
            .fold(node.position().column, f64::max);
        self.controller.reveal_column(column);
    }

    fn reveal_creators(&mut self) {
        let Some(depth) = self.creators.max_depth() else {
            return;
        };
        if self.watermark.last_creator_depth.is_some_and(|seen| seen >= depth) {
            return;
        }
        self.watermark.last_creator_depth = Some(depth);
        if let Some(column) = self.creators.max_column() {
            self.controller.reveal_column(column);
        }
    }

    fn transition<M: MissionModel>(&mut self, model: &mut M, event: SelectionEvent) -> bool {
        let before = self.selection;
        let after = before.apply(event);
        if after == before {
            return false;
        }
        debug!(?before, ?after, ?event, "selection transition");
        self.selection = after;
        if before.creation_target() != after.creation_target() {
            model.set_creation_target(after.creation_target());
            self.rebuild_creators(model.tree(), after.creation_target());
        }
        true
    }

    pub fn on_node_select<M: MissionModel>(&mut self, model: &mut M, id: NodeId) -> bool {
        let tree = model.tree();
        if !tree.contains(id) || tree.is_root(id) {
            debug!(node = %id, "ignoring selection of unknown or root node");
            return false;
        }
        self.transition(model, SelectionEvent::Select(id))
    }

    pub fn on_node_deselect<M: MissionModel>(&mut self, model: &mut M) -> bool {
        self.transition(model, SelectionEvent::Deselect)
    }

    pub fn on_creation_activate<M: MissionModel>(&mut self, model: &mut M) -> bool {
        let Some(selected) = self.selection.selected() else {
            return false;
        };
        let allowed = model.allows_creation(selected);
        if !allowed {
            debug!(node = %selected, "host refused node creation");
        }
        self.transition(model, SelectionEvent::ActivateCreation { allowed })
    }

    pub fn on_creation_deactivate<M: MissionModel>(&mut self, model: &mut M) -> bool {
        self.transition(model, SelectionEvent::DeactivateCreation)
    }

    pub fn on_creator_commit<M: MissionModel>(
        &mut self,
        model: &mut M,
        kind: CreatorKind,
    ) -> Result<NodeId, MissionError> {
        let target = self
            .selection
            .creation_target()
            .ok_or(MissionError::NoCreationTarget)?;
        let slot = self
            .creators
            .get(kind)
            .filter(|c| c.target() == target)
            .map(|c| c.slot)
            .ok_or(MissionError::StaleCreator(CreatorSlot { kind, target }))?;

        let created = model.create_from(slot)?;
        self.transition(model, SelectionEvent::NodeCreated(created));
        self.watermark.last_expanded = Some(created);
        Ok(created)
    }

    /// Host opened `id`; its children are revealed on the next structural change.
    pub fn on_node_expanded(&mut self, id: NodeId) {
        self.watermark.last_expanded = Some(id);
    }

    pub fn zoom_in(&mut self) -> bool {
        self.controller.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.controller.zoom_out()
    }

    pub fn hit_test<M: MissionModel>(&mut self, model: &mut M, client: Position) -> Option<Hit> {
        let frame = self.frame(model);
        let local = Position::new(
            client.x - frame.viewport.origin.x,
            client.y - frame.viewport.origin.y,
        );
        if let Some(c) = frame.creators.iter().find(|c| c.rect.contains(local)) {
            return Some(Hit::Creator(c.slot));
        }
        frame
            .nodes
            .iter()
            .rev()
            .find(|n| n.rect.contains(local))
            .map(|n| Hit::Node(n.id))
    }

    pub fn pointer_down<M: MissionModel>(
        &mut self,
        model: &mut M,
        client: Position,
    ) -> Result<PointerOutcome, MissionError> {
        match self.hit_test(model, client) {
            Some(Hit::Creator(slot)) => {
                let id = self.on_creator_commit(model, slot.kind)?;
                Ok(PointerOutcome::Created(id))
            }
            // Re-clicking the selection or the creation target changes nothing.
            Some(Hit::Node(id)) => Ok(if self.on_node_select(model, id) {
                PointerOutcome::Selected(id)
            } else {
                PointerOutcome::Ignored
            }),
            None if self.controller.pointer_down(client, false) => Ok(PointerOutcome::PanStarted),
            None => Ok(PointerOutcome::Ignored),
        }
    }

    pub fn frame<M: MissionModel>(&mut self, model: &mut M) -> Frame {
        self.sync(model);
        frame::project(
            model.tree(),
            self.cache.current(),
            &self.creators,
            &self.selection,
            &self.controller,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::Mission;
    use crate::types::{Bounds, Size};

    fn setup() -> (MissionViewport, Mission, NodeId, NodeId) {
        let mut tree = MissionTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        let b = tree.add_child(a, "b").unwrap();
        let mut vp = MissionViewport::new(ViewportConfig::default());
        vp.controller_mut()
            .set_bounds(Bounds::new(Position::default(), Size::new(1200.0, 800.0)));
        (vp, Mission::new(tree), a, b)
    }

    #[test]
    fn activation_creates_four_creators_and_sets_target() {
        let (mut vp, mut m, a, _) = setup();
        vp.on_node_select(&mut m, a);
        assert!(vp.on_creation_activate(&mut m));
        assert_eq!(vp.creators().len(), 4);
        assert_eq!(m.creation_target(), Some(a));
        assert!(vp.on_creation_deactivate(&mut m));
        assert!(vp.creators().is_empty());
        assert_eq!(m.creation_target(), None);
    }

    #[test]
    fn refused_activation_keeps_state() {
        let (mut vp, mut m, a, _) = setup();
        m.set_creation_locked(true);
        vp.on_node_select(&mut m, a);
        assert!(!vp.on_creation_activate(&mut m));
        assert_eq!(vp.selection(), SelectionState::NodeSelected(a));
        assert!(vp.creators().is_empty());
    }

    #[test]
    fn selecting_other_node_drops_creators() {
        let (mut vp, mut m, a, b) = setup();
        vp.on_node_select(&mut m, a);
        vp.on_creation_activate(&mut m);
        assert!(vp.on_node_select(&mut m, b));
        assert_eq!(vp.selection(), SelectionState::NodeSelected(b));
        assert!(vp.creators().is_empty());
        assert_eq!(m.creation_target(), None);
    }

    #[test]
    fn commit_selects_new_node() {
        let (mut vp, mut m, a, b) = setup();
        vp.on_node_select(&mut m, a);
        vp.on_creation_activate(&mut m);
        let created = vp
            .on_creator_commit(&mut m, CreatorKind::BetweenTargetAndChildren)
            .unwrap();
        assert_eq!(vp.selection(), SelectionState::NodeSelected(created));
        assert!(vp.creators().is_empty());
        assert_eq!(m.tree().children(created), &[b]);
        let rel = vp.sync(&mut m);
        assert!(rel.creator.is_empty());
        assert_eq!(rel.nodes.len(), 3);
    }

    #[test]
    fn commit_without_creation_mode_fails() {
        let (mut vp, mut m, a, _) = setup();
        vp.on_node_select(&mut m, a);
        assert_eq!(
            vp.on_creator_commit(&mut m, CreatorKind::NextSibling),
            Err(MissionError::NoCreationTarget)
        );
    }

    #[test]
    fn pan_and_zoom_do_not_recompute() {
        let (mut vp, mut m, _, _) = setup();
        vp.sync(&mut m);
        let before = vp.recompute_count();
        vp.zoom_in();
        vp.controller_mut().pointer_down(Position::new(5.0, 5.0), false);
        vp.controller_mut().pointer_move(Position::new(50.0, 5.0));
        vp.sync(&mut m);
        vp.frame(&mut m);
        assert_eq!(vp.recompute_count(), before);
    }

    #[test]
    fn root_cannot_be_selected() {
        let (mut vp, mut m, _, _) = setup();
        let root = m.tree().root();
        assert!(!vp.on_node_select(&mut m, root));
        assert_eq!(vp.selection(), SelectionState::NoSelection);
    }

    #[test]
    fn creators_follow_target_after_relayout() {
        let (mut vp, mut m, a, b) = setup();
        vp.on_node_select(&mut m, b);
        vp.on_creation_activate(&mut m);
        let row_before = vp.creators().get(CreatorKind::NextSibling).unwrap().position.row;
        m.tree_mut().insert_child_at(a, 0, "first").unwrap();
        vp.sync(&mut m);
        let row_after = vp.creators().get(CreatorKind::NextSibling).unwrap().position.row;
        assert_eq!(row_after, row_before + 1.0);
    }
}
