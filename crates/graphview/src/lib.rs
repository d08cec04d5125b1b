//! gpui element that paints a mission graph and feeds pointer input back into
//! the viewport core.

mod edge;
mod graph;
mod node;

pub use graph::{MissionGraph, NodeCreated, NodeSelected};
pub use node::{CreatorButton, MissionNodeView, NodeHints};
