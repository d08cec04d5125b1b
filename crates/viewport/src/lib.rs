//! Mission graph viewport: coordinate transform, edge derivation, node
//! creators, pan/zoom and selection state for a tree of mission nodes.

pub mod config;
pub mod controller;
pub mod creator;
pub mod cull;
pub mod error;
pub mod frame;
pub mod mission;
pub mod relationships;
pub mod selection;
pub mod store;
pub mod svg;
pub mod transform;
pub mod tree;
pub mod types;

pub use config::ViewportConfig;
pub use controller::{Gesture, ViewportController, ZoomDirection};
pub use creator::{CreatorId, CreatorKind, CreatorSet, CreatorSlot, NodeCreator};
pub use error::MissionError;
pub use frame::{Frame, FrameCreator, FrameEdge, FrameNode};
pub use mission::{Mission, MissionModel};
pub use relationships::{
    Endpoint, Relationship, RelationshipCache, Relationships, ResolveOptions, resolve,
};
pub use selection::{SelectionEvent, SelectionState};
pub use store::{Hit, MissionViewport, PointerOutcome};
pub use transform::{GridMetrics, PaddingMode, Transform};
pub use tree::{MissionNode, MissionTree, NodeFlags, NodeId};
pub use types::{Bounds, GridPosition, Position, Size};
