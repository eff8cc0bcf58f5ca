//! Read-only queries used by views and serializers

use crate::error::{Result, TreeError};

use super::node::NodeId;
use super::project::ProjectTree;
use super::stats::TreeStats;

impl ProjectTree {
    /// Topmost ancestor of `node` and the depth of `node` below it
    ///
    /// Depth counts the non-root nodes on the path, `node` included, so
    /// children of the root are at depth 1.
    pub fn root_with_depth(&self, node: NodeId) -> Result<(NodeId, usize)> {
        let mut current = node;
        let mut depth = 0;
        loop {
            let entry = self.node(current)?;
            if entry.is_root() {
                return Ok((current, depth));
            }
            depth += 1;
            match entry.parent {
                Some(parent) => current = parent,
                None => return Ok((current, depth)),
            }
        }
    }

    pub fn depth(&self, node: NodeId) -> Result<usize> {
        self.root_with_depth(node).map(|(_, depth)| depth)
    }

    /// Stats of the tree `node` belongs to; `None` for detached subtrees
    pub fn tree_stats(&self, node: NodeId) -> Result<Option<&TreeStats>> {
        if let Some(stats) = self.node(node)?.own_stats() {
            return Ok(Some(stats));
        }
        let (top, _) = self.root_with_depth(node)?;
        Ok(self.node(top)?.own_stats())
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(node)?.parent)
    }

    pub fn children(&self, node: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(node)?.children())
    }

    /// Number of visible children
    pub fn n_children(&self, node: NodeId) -> Result<usize> {
        let children = self.node(node)?.children();
        Ok(children
            .iter()
            .filter(|&&child| self.get(child).is_some_and(|c| !c.is_hidden()))
            .count())
    }

    /// Visible child at `index`
    pub fn nth_child(&self, node: NodeId, index: usize) -> Result<Option<NodeId>> {
        let children = self.node(node)?.children();
        Ok(children
            .iter()
            .copied()
            .filter(|&child| self.get(child).is_some_and(|c| !c.is_hidden()))
            .nth(index))
    }

    /// Index of `node` in its parent's child list
    pub fn position_as_child(&self, node: NodeId) -> Result<Option<usize>> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(None);
        };
        Ok(self
            .node(parent)?
            .children()
            .iter()
            .position(|&child| child == node))
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Child of `parent` named exactly `name`
    pub fn find_child(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>> {
        let children = self.node(parent)?.children();
        Ok(children
            .iter()
            .copied()
            .find(|&child| self.get(child).is_some_and(|c| c.name() == name)))
    }

    /// Child of `parent` whose name matches `name` ignoring case
    pub fn find_child_case_insensitive(
        &self,
        parent: NodeId,
        name: &str,
    ) -> Result<Option<NodeId>> {
        let wanted = name.to_lowercase();
        let children = self.node(parent)?.children();
        Ok(children.iter().copied().find(|&child| {
            self.get(child)
                .is_some_and(|c| c.name().to_lowercase() == wanted)
        }))
    }

    /// Resolve a slash separated path from the root
    ///
    /// Empty components are skipped, so `"/a//b/"` is the same as `"a/b"`.
    pub fn node_from_path(&self, path: &str) -> Option<NodeId> {
        let mut current = self.root();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            current = self.find_child(current, component).ok().flatten()?;
        }
        Some(current)
    }

    /// Slash separated path of `node` from the root (`"/"` for the root)
    pub fn path_of(&self, node: NodeId) -> Result<String> {
        let mut names = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let entry = self.node(id)?;
            if entry.is_root() {
                break;
            }
            names.push(entry.name());
            current = entry.parent;
        }

        if names.is_empty() {
            return Ok("/".to_string());
        }
        names.reverse();
        Ok(format!("/{}", names.join("/")))
    }

    /// `node` and its regular descendants in pre-order
    pub fn descendants(&self, node: NodeId) -> Result<Vec<NodeId>> {
        if !self.contains(node) {
            return Err(TreeError::UnknownNode(node));
        }

        let mut result = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            result.push(id);
            if let Some(entry) = self.get(id) {
                stack.extend(entry.children().iter().rev());
            }
        }
        Ok(result)
    }
}
