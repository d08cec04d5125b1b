use thiserror::Error;

use crate::creator::CreatorSlot;
use crate::tree::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissionError {
    #[error("node {0} does not exist in the mission tree")]
    UnknownNode(NodeId),
    #[error("the root node cannot be {0}")]
    RootEdit(&'static str),
    #[error("no creation target is active")]
    NoCreationTarget,
    #[error("node creation is not allowed for node {0}")]
    CreationNotAllowed(NodeId),
    #[error("creator slot {0:?} does not belong to the active creation target")]
    StaleCreator(CreatorSlot),
}
