//! Probe results
//!
//! Probing the filesystem happens elsewhere, asynchronously. Its results
//! are handed to the tree on the thread that owns it, through
//! [`ProjectTree::apply_probe_result`] or [`ProjectTree::set_from_info`].

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::{FileNode, NodeId, ProjectTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeKind {
    File,
    Directory,
}

/// Description of the object behind a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeInfo {
    pub kind: ProbeKind,
    /// Size in bytes (ignored for directories)
    pub size: u64,
    pub mime: Option<String>,
    /// Set when the probed location is a symbolic link
    pub symlink_target: Option<String>,
}

impl ProbeInfo {
    pub fn file(size: u64, mime: Option<String>) -> Self {
        Self {
            kind: ProbeKind::File,
            size,
            mime,
            symlink_target: None,
        }
    }

    pub fn directory() -> Self {
        Self {
            kind: ProbeKind::Directory,
            size: 0,
            mime: None,
            symlink_target: None,
        }
    }

    pub fn with_symlink_target(mut self, target: impl Into<String>) -> Self {
        self.symlink_target = Some(target.into());
        self
    }
}

/// Outcome of a probe job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeResult {
    Completed(ProbeInfo),
    /// The job was cancelled before finishing
    Aborted,
    /// The location could not be read
    Failed(String),
}

/// What applying a probe result did to the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Resolved,
    /// Pending flags cleared, node otherwise unchanged
    Cancelled,
    /// Node and its subtree were destroyed
    Removed,
}

impl ProjectTree {
    /// Create a detached node already resolved from `info`
    pub fn new_from_info(&mut self, name: &str, info: &ProbeInfo) -> Result<NodeId> {
        let node = self.insert_node(FileNode::plain(name));
        self.set_from_info(node, info)?;
        Ok(node)
    }

    /// Flag `node` as waiting for a fresh probe result
    pub fn mark_reloading(&mut self, node: NodeId) -> Result<()> {
        self.node_mut(node)?.flags.is_reloading = true;
        Ok(())
    }

    /// Apply the result of a probe job to `node`
    pub fn apply_probe_result(
        &mut self,
        node: NodeId,
        result: ProbeResult,
    ) -> Result<ProbeOutcome> {
        match result {
            ProbeResult::Completed(info) => {
                self.set_from_info(node, &info)?;
                Ok(ProbeOutcome::Resolved)
            }
            ProbeResult::Aborted => {
                let target = self.node_mut(node)?;
                target.flags.is_loading = false;
                target.flags.is_reloading = false;
                Ok(ProbeOutcome::Cancelled)
            }
            ProbeResult::Failed(reason) => {
                log::warn!("Probe of {} failed: {}", node, reason);
                self.destroy(node)?;
                Ok(ProbeOutcome::Removed)
            }
        }
    }
}
