//! Project file tree
//!
//! This module contains:
//! - The node model (kinds, payloads, grafts, import records)
//! - The node arena and project root with its stats
//! - Sorted sibling maintenance and stock comparators
//! - Graft, import, mutation and navigation operations

pub mod compare;
mod graft;
mod import;
mod mutation;
mod navigation;
mod node;
mod project;
pub(crate) mod sorting;
mod stats;

pub use node::{
    FileNode, GraftPoint, Identity, ImportRecord, NodeFlags, NodeId, NodeKind, Payload,
    DIRECTORY_MIME,
};
pub use project::ProjectTree;
pub use sorting::Reordering;
pub use stats::TreeStats;
