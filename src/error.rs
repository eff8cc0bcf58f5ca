//! Error type for project tree operations
//!
//! The engine assumes pre-validated input. These errors only report
//! contract violations (stale handles, wrong node kind) and configuration
//! I/O failures; tree state is never modified before they are returned.

use crate::tree::NodeId;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Debug)]
pub enum TreeError {
    /// The handle does not refer to a live node (destroyed or never created)
    UnknownNode(NodeId),
    /// The operation needs a directory but the node is a file or unexplored
    NotADirectory(NodeId),
    /// The node already has a parent
    AlreadyLinked(NodeId),
    /// The operation is not allowed on the project root
    RootNode,
    /// The node is not part of an imported session
    NotImported(NodeId),
    /// Moving a node below itself
    Cycle { node: NodeId, parent: NodeId },
    /// Loading or saving the configuration failed
    Config(String),
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            TreeError::UnknownNode(id) => write!(f, "Unknown node {id}"),
            TreeError::NotADirectory(id) => write!(f, "Node {id} is not a directory"),
            TreeError::AlreadyLinked(id) => write!(f, "Node {id} already has a parent"),
            TreeError::RootNode => write!(f, "Operation not allowed on the root node"),
            TreeError::NotImported(id) => write!(f, "Node {id} is not imported"),
            TreeError::Cycle { node, parent } => {
                write!(f, "Cannot move node {node} below its descendant {parent}")
            }
            TreeError::Config(ref msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<serde_json::Error> for TreeError {
    fn from(error: serde_json::Error) -> Self {
        TreeError::Config(error.to_string())
    }
}

impl From<std::io::Error> for TreeError {
    fn from(error: std::io::Error) -> Self {
        TreeError::Config(error.to_string())
    }
}
