use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    NoSelection,
    NodeSelected(NodeId),
    CreationActive(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Select(NodeId),
    Deselect,
    ActivateCreation { allowed: bool },
    DeactivateCreation,
    NodeCreated(NodeId),
}

impl SelectionState {
    pub fn selected(&self) -> Option<NodeId> {
        match *self {
            SelectionState::NoSelection => None,
            SelectionState::NodeSelected(id) | SelectionState::CreationActive(id) => Some(id),
        }
    }

    pub fn creation_target(&self) -> Option<NodeId> {
        match *self {
            SelectionState::CreationActive(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, SelectionState::CreationActive(_))
    }

    /// Next state for `event`. Events with no entry in the table leave the
    /// state unchanged.
    pub fn apply(self, event: SelectionEvent) -> SelectionState {
        use SelectionEvent as E;
        use SelectionState as S;

        match (self, event) {
            (S::NoSelection, E::Select(id)) => S::NodeSelected(id),
            (S::NodeSelected(_), E::Select(id)) => S::NodeSelected(id),
            (S::NodeSelected(_), E::Deselect) => S::NoSelection,
            (S::NodeSelected(id), E::ActivateCreation { allowed: true }) => S::CreationActive(id),
            (S::CreationActive(id), E::DeactivateCreation) => S::NodeSelected(id),
            (S::CreationActive(current), E::Select(id)) if id != current => S::NodeSelected(id),
            (S::CreationActive(_), E::NodeCreated(id)) => S::NodeSelected(id),
            (state, _) => state,
        }
    }

    pub fn reset(&mut self) {
        *self = SelectionState::NoSelection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: NodeId = NodeId(1);
    const B: NodeId = NodeId(2);

    #[test]
    fn transition_table() {
        use SelectionEvent as E;
        use SelectionState as S;

        let cases = [
            (S::NoSelection, E::Select(A), S::NodeSelected(A)),
            (S::NoSelection, E::Deselect, S::NoSelection),
            (S::NoSelection, E::ActivateCreation { allowed: true }, S::NoSelection),
            (S::NoSelection, E::DeactivateCreation, S::NoSelection),
            (S::NoSelection, E::NodeCreated(B), S::NoSelection),
            (S::NodeSelected(A), E::Select(B), S::NodeSelected(B)),
            (S::NodeSelected(A), E::Select(A), S::NodeSelected(A)),
            (S::NodeSelected(A), E::Deselect, S::NoSelection),
            (S::NodeSelected(A), E::ActivateCreation { allowed: true }, S::CreationActive(A)),
            (S::NodeSelected(A), E::ActivateCreation { allowed: false }, S::NodeSelected(A)),
            (S::NodeSelected(A), E::DeactivateCreation, S::NodeSelected(A)),
            (S::NodeSelected(A), E::NodeCreated(B), S::NodeSelected(A)),
            (S::CreationActive(A), E::Select(B), S::NodeSelected(B)),
            (S::CreationActive(A), E::Select(A), S::CreationActive(A)),
            (S::CreationActive(A), E::Deselect, S::CreationActive(A)),
            (S::CreationActive(A), E::ActivateCreation { allowed: true }, S::CreationActive(A)),
            (S::CreationActive(A), E::DeactivateCreation, S::NodeSelected(A)),
            (S::CreationActive(A), E::NodeCreated(B), S::NodeSelected(B)),
        ];

        for (from, event, expected) in cases {
            assert_eq!(from.apply(event), expected, "{from:?} + {event:?}");
        }
    }

    #[test]
    fn selecting_other_node_ends_creation_in_one_step() {
        let next = SelectionState::CreationActive(A).apply(SelectionEvent::Select(B));
        assert_eq!(next.creation_target(), None);
        assert_eq!(next.selected(), Some(B));
    }
}
