//! Grafts and size propagation
//!
//! A grafted node shows a name of its own and is backed by a content item
//! that may back other nodes too. Grafts are also size boundaries: a node's
//! sectors are summed into its ancestors up to and including the first
//! grafted one, and a grafted node keeps its own total to itself.

use std::cmp::Ordering;

use crate::content::ContentId;
use crate::error::{Result, TreeError};

use super::node::{FileNode, GraftPoint, Identity, NodeId};
use super::project::ProjectTree;
use super::sorting::Reordering;

impl ProjectTree {
    /// Add `delta` sectors to `from` and its ancestors, stopping after the
    /// first grafted node or the root
    pub(crate) fn propagate_size(&mut self, from: Option<NodeId>, delta: i64) {
        if delta == 0 {
            return;
        }

        let mut current = from;
        while let Some(id) = current {
            let Some(node) = self.get_mut(id) else {
                break;
            };
            node.sectors = node.sectors.saturating_add_signed(delta);
            if node.is_grafted() || node.is_root() {
                break;
            }
            current = node.parent;
        }
    }

    /// Contribution of `node` to its ancestors, signed for propagation
    pub(crate) fn size_contribution(&self, node: NodeId) -> i64 {
        self.get(node)
            .filter(|n| n.contributes_size())
            .map(|n| n.sectors as i64)
            .unwrap_or(0)
    }

    /// Back `node` with `content`
    ///
    /// The first graft captures the current name as the display name and
    /// removes the node's sectors from its ancestors. Grafting an already
    /// grafted node only switches its content.
    pub fn graft(&mut self, node: NodeId, content: ContentId) -> Result<()> {
        let (is_root, previous, parent) = {
            let current = self.node(node)?;
            (
                current.is_root(),
                current.graft().map(|g| g.content.clone()),
                current.parent,
            )
        };
        if is_root {
            return Err(TreeError::RootNode);
        }

        if let Some(previous) = previous {
            self.contents.detach(&previous, node);
            if let Identity::Grafted(graft) = self.node_mut(node)?.identity.base_mut() {
                graft.content = content.clone();
            }
            self.contents.attach(&content, node);
            log::debug!("Regrafted {} from {} to {}", node, previous, content);
            return Ok(());
        }

        let contribution = self.size_contribution(node);
        self.propagate_size(parent, -contribution);

        let base = self.node_mut(node)?.identity.base_mut();
        let name = match base {
            Identity::Plain(name) => std::mem::take(name),
            _ => String::new(),
        };
        *base = Identity::Grafted(GraftPoint {
            name,
            content: content.clone(),
        });
        self.contents.attach(&content, node);

        log::debug!("Grafted {} onto {}", node, content);
        Ok(())
    }

    /// Remove the graft of `node`, keeping its display name as plain name
    pub fn ungraft(&mut self, node: NodeId) -> Result<()> {
        let Some(content) = self.node(node)?.graft().map(|g| g.content.clone()) else {
            return Ok(());
        };
        self.contents.detach(&content, node);

        let base = self.node_mut(node)?.identity.base_mut();
        let name = match base {
            Identity::Grafted(graft) => std::mem::take(&mut graft.name),
            _ => String::new(),
        };
        *base = Identity::Plain(name);

        let contribution = self.size_contribution(node);
        let parent = self.node(node)?.parent;
        self.propagate_size(parent, contribution);

        log::debug!("Ungrafted {} from {}", node, content);
        Ok(())
    }

    /// Change the displayed name of `node` and move it to its new sorted place
    pub fn rename<F>(&mut self, node: NodeId, name: &str, cmp: F) -> Result<Reordering>
    where
        F: Fn(&FileNode, &FileNode) -> Ordering,
    {
        let target = self.node_mut(node)?;
        if target.is_root() {
            return Err(TreeError::RootNode);
        }
        target.set_name(name.to_string());
        self.need_resort(node, cmp)
    }

    /// Nodes currently backed by `content`
    pub fn grafts_of(&self, content: &ContentId) -> Vec<NodeId> {
        self.contents.nodes_for(content)
    }
}
