//! Node arena and project root
//!
//! Every node of a project lives in a single table owned by
//! [`ProjectTree`]. Parents refer to children by [`NodeId`] and children
//! refer back to their parent the same way; destroying a node frees its
//! slot and bumps the slot generation so old handles stop resolving.

use crate::config::TreeConfig;
use crate::content::ContentRegistry;
use crate::error::{Result, TreeError};

use super::node::{FileNode, NodeId};
use super::stats::TreeStats;

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<FileNode>,
}

/// A disc project: the root directory, every node below it, and the
/// content reverse index used by grafts
#[derive(Debug)]
pub struct ProjectTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    pub(crate) contents: ContentRegistry,
    pub(crate) config: TreeConfig,
}

impl Default for ProjectTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectTree {
    /// Create an empty project with the default configuration
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 0),
            contents: ContentRegistry::new(),
            config,
        };
        tree.root = tree.alloc(FileNode::root());
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn contents(&self) -> &ContentRegistry {
        &self.contents
    }

    /// Stats of the whole project
    pub fn stats(&self) -> TreeStats {
        self.get(self.root)
            .and_then(|root| root.own_stats().copied())
            .unwrap_or_default()
    }

    pub(crate) fn stats_mut(&mut self) -> Option<&mut TreeStats> {
        let root = self.root;
        self.get_mut(root).and_then(|node| node.stats.as_deref_mut())
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.node(self.root)
            .map(|root| root.children().is_empty() && !root.has_import())
            .unwrap_or(true)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&FileNode> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut FileNode> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn node(&self, id: NodeId) -> Result<&FileNode> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut FileNode> {
        self.get_mut(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Store a detached node and return its handle
    ///
    /// The node is not linked anywhere and not counted in the stats until
    /// it is added to a parent.
    pub fn insert_node(&mut self, node: FileNode) -> NodeId {
        self.alloc(node)
    }

    pub fn new_plain(&mut self, name: &str) -> NodeId {
        self.alloc(FileNode::plain(name))
    }

    pub fn new_loading(&mut self, name: &str) -> NodeId {
        self.alloc(FileNode::loading(name))
    }

    pub fn new_virtual(&mut self, name: &str) -> NodeId {
        self.alloc(FileNode::virtual_placeholder(name))
    }

    pub fn new_empty_folder(&mut self, name: &str) -> NodeId {
        self.alloc(FileNode::empty_folder(name))
    }

    pub fn new_imported_file(&mut self, name: &str, sectors: u64) -> NodeId {
        self.alloc(FileNode::imported_file(name, sectors))
    }

    pub fn new_imported_directory(&mut self, name: &str, address: u64) -> NodeId {
        self.alloc(FileNode::imported_directory(name, address))
    }

    fn alloc(&mut self, node: FileNode) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId::new(index, 0)
            }
        }
    }

    /// Release a slot; the node must already be unlinked from everything
    pub(crate) fn free(&mut self, id: NodeId) -> Option<FileNode> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index() as u32);
        Some(node)
    }

    /// Drop the whole project and start again with an empty root
    pub fn reset(&mut self) {
        let root = self.root;
        let _ = self.free_subtree(root);

        // Detached nodes that were never added anywhere
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }

        self.contents.clear();
        self.root = self.alloc(FileNode::root());
        log::debug!("Project tree reset");
    }
}
