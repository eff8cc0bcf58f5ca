//! Linking, relocating and destroying nodes
//!
//! Every mutation keeps the root's [`TreeStats`](super::TreeStats) and the
//! accumulated directory sizes consistent.

use std::cmp::Ordering;

use crate::error::{Result, TreeError};
use crate::probe::{ProbeInfo, ProbeKind};

use super::node::{FileNode, NodeId, Payload};
use super::project::ProjectTree;

impl ProjectTree {
    fn check_new_parent(&self, parent: NodeId, node: NodeId) -> Result<()> {
        let target = self.node(parent)?;
        if !matches!(target.payload, Payload::Directory { .. }) {
            return Err(TreeError::NotADirectory(parent));
        }
        if self.node(node)?.is_root() {
            return Err(TreeError::RootNode);
        }
        if parent == node || self.is_ancestor(node, parent) {
            return Err(TreeError::Cycle { node, parent });
        }
        Ok(())
    }

    /// Flag `node` deep if it sits past the configured depth for its kind
    ///
    /// Only ever sets the flag: moving a deep node higher up keeps it
    /// counted until it is destroyed.
    fn mark_deep(&mut self, node: NodeId) -> Result<()> {
        let (top, depth) = self.root_with_depth(node)?;
        if top != self.root() {
            return Ok(());
        }
        let threshold = if self.node(node)?.is_file() {
            self.config.deep_file_depth
        } else {
            self.config.deep_dir_depth
        };

        let target = self.node_mut(node)?;
        if depth < threshold || target.flags.is_deep {
            return Ok(());
        }
        target.flags.is_deep = true;
        let counted = target.counted;

        if counted {
            if let Some(stats) = self.stats_mut() {
                stats.num_deep += 1;
            }
        }
        log::debug!("{} is deep (depth {})", node, depth);
        Ok(())
    }

    /// Record the uncounted nodes of the subtree at `node` in the project
    /// stats
    ///
    /// Does nothing while the subtree is not below the project root; it is
    /// counted when it gets attached.
    fn count_subtree(&mut self, node: NodeId) -> Result<()> {
        let (top, _) = self.root_with_depth(node)?;
        if top != self.root() {
            return Ok(());
        }

        for id in self.descendants(node)? {
            let target = self.node_mut(id)?;
            if !target.is_countable() || target.counted {
                continue;
            }
            target.counted = true;
            let snapshot = target.clone();
            if let Some(stats) = self.stats_mut() {
                stats.record(&snapshot);
            }
            self.mark_deep(id)?;
        }
        Ok(())
    }

    /// Link a detached `node` below `parent` at its sorted position
    ///
    /// Returns the index of the node among the children of `parent`.
    pub fn add<F>(&mut self, parent: NodeId, node: NodeId, cmp: F) -> Result<usize>
    where
        F: Fn(&FileNode, &FileNode) -> Ordering,
    {
        self.check_new_parent(parent, node)?;
        if self.node(node)?.parent.is_some() {
            return Err(TreeError::AlreadyLinked(node));
        }

        let index = self.insert_sorted(parent, node, &cmp)?;
        self.node_mut(node)?.parent = Some(parent);
        self.count_subtree(node)?;

        let contribution = self.size_contribution(node);
        self.propagate_size(Some(parent), contribution);
        self.mark_deep(node)?;

        log::trace!("Added {} below {} at {}", node, parent, index);
        Ok(index)
    }

    /// Detach `node` from its parent, from the regular child list or from
    /// the parent's archived import entries
    ///
    /// Stats are untouched; the node keeps its subtree. Unlinking a node
    /// without a parent does nothing.
    pub fn unlink(&mut self, node: NodeId) -> Result<()> {
        let target = self.node(node)?;
        if target.is_root() {
            return Err(TreeError::RootNode);
        }
        let Some(parent) = target.parent else {
            log::debug!("Unlink of parentless node {} ignored", node);
            return Ok(());
        };
        let contribution = self.size_contribution(node);

        let in_children = self.node(parent)?.children().contains(&node);
        if in_children {
            self.with_children(parent, |_, children| children.retain(|&c| c != node))?;
            self.propagate_size(Some(parent), -contribution);
        } else {
            self.remove_archived(parent, node)?;
        }

        self.node_mut(node)?.parent = None;
        Ok(())
    }

    /// First half of a move: detach `node`
    ///
    /// Imported nodes are never relocated; returns `false` for them.
    pub fn move_from(&mut self, node: NodeId) -> Result<bool> {
        if self.node(node)?.is_imported() {
            log::debug!("Imported node {} not moved", node);
            return Ok(false);
        }
        self.unlink(node)?;
        Ok(true)
    }

    /// Second half of a move: link `node` below `parent`
    ///
    /// Nodes counted before the move stay counted as they are, except for
    /// newly deep ones. Nodes that were never counted are recorded like
    /// [`add`](Self::add) does. Returns the new index, or `None` for
    /// imported nodes which are never moved.
    pub fn move_to<F>(&mut self, node: NodeId, parent: NodeId, cmp: F) -> Result<Option<usize>>
    where
        F: Fn(&FileNode, &FileNode) -> Ordering,
    {
        if self.node(node)?.is_imported() {
            log::debug!("Imported node {} not moved", node);
            return Ok(None);
        }
        self.check_new_parent(parent, node)?;
        if self.node(node)?.parent.is_some() {
            self.unlink(node)?;
        }

        let index = self.insert_sorted(parent, node, &cmp)?;
        self.node_mut(node)?.parent = Some(parent);
        self.count_subtree(node)?;

        let contribution = self.size_contribution(node);
        self.propagate_size(Some(parent), contribution);
        self.mark_deep(node)?;

        log::debug!("Moved {} below {} at {}", node, parent, index);
        Ok(Some(index))
    }

    /// Free the detached `node` and everything below it, archived entries
    /// included
    ///
    /// Linked nodes are refused; use [`destroy`](Self::destroy) for them.
    pub fn destroy_with_children(&mut self, node: NodeId) -> Result<()> {
        let target = self.node(node)?;
        if target.is_root() {
            return Err(TreeError::RootNode);
        }
        if target.parent.is_some() {
            return Err(TreeError::AlreadyLinked(node));
        }
        self.free_subtree(node)
    }

    /// Free `node` and its subtree without looking at its parent
    pub(crate) fn free_subtree(&mut self, node: NodeId) -> Result<()> {
        let target = self.node(node)?;
        let mut below: Vec<NodeId> = target.children().to_vec();
        if let Some(record) = target.import_record() {
            below.extend_from_slice(record.replaced());
        }

        for child in below {
            self.free_subtree(child)?;
        }

        let Some(freed) = self.free(node) else {
            return Ok(());
        };
        if freed.counted {
            if let Some(stats) = self.stats_mut() {
                stats.forget(&freed);
                if freed.flags.is_deep {
                    stats.num_deep = stats.num_deep.saturating_sub(1);
                }
            }
        }
        if let Some(graft) = freed.graft() {
            self.contents.detach(&graft.content, node);
        }
        Ok(())
    }

    /// Unlink and free `node` with its whole subtree
    pub fn destroy(&mut self, node: NodeId) -> Result<()> {
        self.unlink(node)?;
        self.free_subtree(node)?;
        log::trace!("Destroyed {}", node);
        Ok(())
    }

    /// Finalize `node` from a probe result
    ///
    /// Switches the node between file and directory if the probe disagrees
    /// with the current kind (a directory turning into a file loses its
    /// children and archived entries), keeps the kind, symlink and oversize
    /// counters right and
    /// carries the size difference up to the graft boundary.
    pub fn set_from_info(&mut self, node: NodeId, info: &ProbeInfo) -> Result<()> {
        let before = self.node(node)?.clone();
        if before.is_root() {
            return Err(TreeError::RootNode);
        }

        let becomes_file = info.kind == ProbeKind::File;
        if becomes_file && !before.is_file() {
            for &child in before.children() {
                self.destroy(child)?;
            }
            if let Some(record) = before.import_record() {
                for &archived in record.replaced() {
                    self.destroy(archived)?;
                }
            }
        }

        let old_sectors = self.node(node)?.sectors;
        let new_sectors = if becomes_file {
            self.config.bytes_to_sectors(info.size)
        } else if before.is_file() {
            0
        } else {
            old_sectors
        };
        let oversized = becomes_file && self.config.is_oversized(info.size);

        let target = self.node_mut(node)?;
        let old_payload = std::mem::replace(&mut target.payload, Payload::File { mime: None });
        target.payload = match (becomes_file, old_payload) {
            (true, _) => Payload::File {
                mime: info.mime.clone(),
            },
            (false, Payload::Directory { children }) => Payload::Directory { children },
            (false, _) => Payload::Directory {
                children: Vec::new(),
            },
        };
        target.sectors = new_sectors;
        target.flags.is_symlink = info.symlink_target.is_some();
        target.flags.is_2gib = oversized;
        target.flags.is_loading = false;
        target.flags.is_reloading = false;
        target.flags.is_exploring = !becomes_file;

        let after = target.clone();
        if after.counted {
            if let Some(stats) = self.stats_mut() {
                stats.forget(&before);
                stats.record(&after);
            }
        }

        let old_contribution = if before.contributes_size() { old_sectors } else { 0 };
        let new_contribution = if after.contributes_size() { new_sectors } else { 0 };
        self.propagate_size(
            after.parent,
            new_contribution as i64 - old_contribution as i64,
        );

        log::trace!(
            "Probed {} as {:?}, {} sectors",
            node,
            info.kind,
            new_sectors
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{add_dir, add_file, build_scenario_a, sectors_of};
    use crate::tree::compare::by_name;
    use crate::tree::TreeStats;

    #[test]
    fn test_scenario_a_counts() {
        let (tree, _) = build_scenario_a();
        let root = tree.root();

        assert_eq!(tree.n_children(root).unwrap(), 5);
        let stats = tree.stats();
        assert_eq!(stats.children, 5);
        assert_eq!(stats.num_dir, 2);
        assert_eq!(sectors_of(&tree, root), 70);
    }

    #[test]
    fn test_add_propagates_size() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let a = add_dir(&mut tree, root, "a");
        let b = add_dir(&mut tree, a, "b");
        add_file(&mut tree, b, "f", 7);
        add_file(&mut tree, a, "g", 3);

        assert_eq!(sectors_of(&tree, b), 7);
        assert_eq!(sectors_of(&tree, a), 10);
        assert_eq!(sectors_of(&tree, root), 10);
    }

    #[test]
    fn test_add_detached_subtree_carries_size() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let dir = tree.new_empty_folder("dir");
        add_file(&mut tree, dir, "f", 4);
        assert_eq!(sectors_of(&tree, root), 0);
        assert_eq!(tree.stats(), TreeStats::default());
        assert!(tree.tree_stats(dir).unwrap().is_none());

        tree.add(root, dir, by_name).unwrap();

        assert_eq!(sectors_of(&tree, root), 4);
        assert_eq!(tree.stats().num_dir, 1);
        assert_eq!(tree.stats().children, 1);
    }

    #[test]
    fn test_add_rejects_linked_and_cycles() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let a = add_dir(&mut tree, root, "a");
        let b = add_dir(&mut tree, a, "b");
        let f = add_file(&mut tree, root, "f", 1);

        assert!(matches!(
            tree.add(root, b, by_name),
            Err(TreeError::AlreadyLinked(_))
        ));
        assert!(matches!(
            tree.move_to(a, b, by_name),
            Err(TreeError::Cycle { .. })
        ));
        let lone = tree.new_plain("x");
        assert!(matches!(
            tree.add(f, lone, by_name),
            Err(TreeError::NotADirectory(_))
        ));
        assert!(matches!(
            tree.add(a, root, by_name),
            Err(TreeError::RootNode)
        ));
    }

    #[test]
    fn test_create_destroy_round_trip() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        add_file(&mut tree, root, "keep", 2);
        let before = tree.stats();
        let nodes_before = tree.len();

        let dir = add_dir(&mut tree, root, "subtree");
        let inner = add_dir(&mut tree, dir, "inner");
        add_file(&mut tree, inner, "a", 5);
        add_file(&mut tree, dir, "b", 6);
        assert_ne!(tree.stats(), before);

        tree.destroy(dir).unwrap();

        assert_eq!(tree.stats(), before);
        assert_eq!(tree.len(), nodes_before);
        assert_eq!(sectors_of(&tree, root), 2);
        assert!(!tree.contains(inner));
    }

    #[test]
    fn test_destroy_grafted_clears_reverse_index() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let dir = add_dir(&mut tree, root, "d");
        let file = add_file(&mut tree, dir, "f", 3);
        let content = crate::content::ContentId::from_uri("file:///f");
        tree.graft(file, content.clone()).unwrap();

        tree.destroy(dir).unwrap();

        assert!(tree.grafts_of(&content).is_empty());
        assert!(tree.contents().is_empty());
        assert_eq!(tree.stats(), TreeStats::default());
    }

    #[test]
    fn test_detached_chain_marked_deep_on_attach() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let top = tree.new_empty_folder("top");
        let mut parent = top;
        for name in ["2", "3", "4", "5"] {
            parent = add_dir(&mut tree, parent, name);
        }
        assert!(!tree.node(parent).unwrap().is_deep());
        assert_eq!(tree.stats(), TreeStats::default());

        tree.add(root, top, by_name).unwrap();

        // "5" ends up at depth 5
        assert!(tree.node(parent).unwrap().is_deep());
        assert_eq!(tree.stats().num_dir, 5);
        assert_eq!(tree.stats().num_deep, 1);

        tree.destroy(top).unwrap();
        assert_eq!(tree.stats(), TreeStats::default());
    }

    #[test]
    fn test_destroy_with_children_refuses_linked_nodes() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let dir = add_dir(&mut tree, root, "d");
        add_file(&mut tree, dir, "f", 7);
        let stats = tree.stats();

        assert!(matches!(
            tree.destroy_with_children(dir),
            Err(TreeError::AlreadyLinked(_))
        ));
        assert!(matches!(
            tree.destroy_with_children(root),
            Err(TreeError::RootNode)
        ));
        assert!(tree.contains(dir));
        assert_eq!(tree.children(root).unwrap(), &[dir]);
        assert_eq!(sectors_of(&tree, root), 7);
        assert_eq!(tree.stats(), stats);

        assert!(tree.move_from(dir).unwrap());
        tree.destroy_with_children(dir).unwrap();

        assert!(!tree.contains(dir));
        assert!(tree.children(root).unwrap().is_empty());
        assert_eq!(sectors_of(&tree, root), 0);
        assert_eq!(tree.stats(), TreeStats::default());
    }

    #[test]
    fn test_destroy_root_rejected() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        assert!(matches!(tree.destroy(root), Err(TreeError::RootNode)));
    }

    #[test]
    fn test_unlink_parentless_is_noop() {
        let mut tree = ProjectTree::new();
        let lone = tree.new_plain("lone");
        tree.unlink(lone).unwrap();
        assert!(tree.contains(lone));
    }

    #[test]
    fn test_scenario_d_deep_asymmetry() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let mut parent = root;
        let mut dirs = Vec::new();
        for name in ["1", "2", "3", "4", "5"] {
            parent = add_dir(&mut tree, parent, name);
            dirs.push(parent);
        }
        // Directory "5" is at depth 5
        assert_eq!(tree.stats().num_deep, 1);

        let file = add_file(&mut tree, parent, "deep.txt", 1);
        assert_eq!(tree.depth(file).unwrap(), 6);
        assert!(tree.node(file).unwrap().is_deep());
        assert_eq!(tree.stats().num_deep, 2);

        // Move to depth 4: flag and counter stay
        assert!(tree.move_from(file).unwrap());
        tree.move_to(file, dirs[2], by_name).unwrap();
        assert_eq!(tree.depth(file).unwrap(), 4);
        assert!(tree.node(file).unwrap().is_deep());
        assert_eq!(tree.stats().num_deep, 2);

        // Moving it back deep does not count it twice
        tree.move_to(file, dirs[4], by_name).unwrap();
        assert_eq!(tree.stats().num_deep, 2);

        tree.destroy(file).unwrap();
        assert_eq!(tree.stats().num_deep, 1);
    }

    #[test]
    fn test_move_updates_sizes() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let a = add_dir(&mut tree, root, "a");
        let b = add_dir(&mut tree, root, "b");
        let f = add_file(&mut tree, a, "f", 9);

        let index = tree.move_to(f, b, by_name).unwrap();

        assert_eq!(index, Some(0));
        assert_eq!(sectors_of(&tree, a), 0);
        assert_eq!(sectors_of(&tree, b), 9);
        assert_eq!(sectors_of(&tree, root), 9);
        assert_eq!(tree.stats().children, 1);
    }

    #[test]
    fn test_move_to_counts_node_never_added() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let dir = tree.new_empty_folder("d");
        add_file(&mut tree, dir, "f", 2);

        let index = tree.move_to(dir, root, by_name).unwrap();

        assert_eq!(index, Some(0));
        assert_eq!(tree.n_children(root).unwrap(), 1);
        assert_eq!(tree.stats().num_dir, 1);
        assert_eq!(tree.stats().children, 1);
        assert_eq!(sectors_of(&tree, root), 2);

        tree.destroy(dir).unwrap();
        assert_eq!(tree.stats(), TreeStats::default());
    }

    #[test]
    fn test_imported_nodes_are_not_moved() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let dir = add_dir(&mut tree, root, "d");
        let imported = tree.new_imported_file("old.txt", 4);
        tree.add(root, imported, by_name).unwrap();

        assert!(!tree.move_from(imported).unwrap());
        assert_eq!(tree.move_to(imported, dir, by_name).unwrap(), None);
        assert_eq!(tree.node(imported).unwrap().parent(), Some(root));
    }

    #[test]
    fn test_imported_not_counted() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let imported = tree.new_imported_file("old.txt", 4);
        tree.add(root, imported, by_name).unwrap();

        assert_eq!(tree.stats(), TreeStats::default());
        assert_eq!(sectors_of(&tree, root), 0);
        assert_eq!(tree.n_children(root).unwrap(), 1);
    }

    #[test]
    fn test_set_from_info_resolves_loading_file() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let dir = add_dir(&mut tree, root, "d");
        let node = tree.new_loading("song.flac");
        tree.add(dir, node, by_name).unwrap();
        // Loading placeholders count as directories until probed
        assert_eq!(tree.stats().num_dir, 2);

        let info = ProbeInfo::file(5000, Some("audio/flac".to_string()));
        tree.set_from_info(node, &info).unwrap();

        let resolved = tree.node(node).unwrap();
        assert!(resolved.is_file());
        assert!(!resolved.flags().is_loading);
        assert_eq!(resolved.mime(), Some("audio/flac"));
        assert_eq!(resolved.sectors(), 3);
        assert_eq!(tree.stats().num_dir, 1);
        assert_eq!(tree.stats().children, 1);
        assert_eq!(sectors_of(&tree, dir), 3);
        assert_eq!(sectors_of(&tree, root), 3);
    }

    #[test]
    fn test_set_from_info_size_change_propagates_delta() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let dir = add_dir(&mut tree, root, "d");
        let file = add_file(&mut tree, dir, "f", 10);

        tree.set_from_info(file, &ProbeInfo::file(4 * 2048, None))
            .unwrap();

        assert_eq!(sectors_of(&tree, dir), 4);
        assert_eq!(sectors_of(&tree, root), 4);
    }

    #[test]
    fn test_set_from_info_symlink_and_oversize_counters() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let file = add_file(&mut tree, root, "big.iso", 1);

        let info = ProbeInfo::file(3 * 1024 * 1024 * 1024, None)
            .with_symlink_target("/data/big.iso");
        tree.set_from_info(file, &info).unwrap();
        assert_eq!(tree.stats().num_sym, 1);
        assert_eq!(tree.stats().num_2gib, 1);

        // Probing again with the same result does not double count
        tree.set_from_info(file, &info).unwrap();
        assert_eq!(tree.stats().num_sym, 1);
        assert_eq!(tree.stats().num_2gib, 1);

        tree.set_from_info(file, &ProbeInfo::file(10, None)).unwrap();
        assert_eq!(tree.stats().num_sym, 0);
        assert_eq!(tree.stats().num_2gib, 0);
    }

    #[test]
    fn test_set_from_info_file_becomes_directory() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let node = add_file(&mut tree, root, "was-file", 8);

        tree.set_from_info(node, &ProbeInfo::directory()).unwrap();

        let resolved = tree.node(node).unwrap();
        assert!(resolved.is_directory());
        assert!(resolved.flags().is_exploring);
        assert_eq!(resolved.sectors(), 0);
        assert_eq!(tree.stats().children, 0);
        assert_eq!(tree.stats().num_dir, 1);
        assert_eq!(sectors_of(&tree, root), 0);
    }

    #[test]
    fn test_set_from_info_directory_becomes_file_drops_children() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let dir = add_dir(&mut tree, root, "d");
        add_file(&mut tree, dir, "inner", 5);

        tree.set_from_info(dir, &ProbeInfo::file(2048, None)).unwrap();

        assert!(tree.node(dir).unwrap().is_file());
        assert_eq!(tree.stats().children, 1);
        assert_eq!(tree.stats().num_dir, 0);
        assert_eq!(sectors_of(&tree, root), 1);
    }

    #[test]
    fn test_set_from_info_directory_becomes_file_drops_archived_entries() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let dir = add_dir(&mut tree, root, "d");
        let old = tree.new_imported_file("old.txt", 3);
        tree.add(dir, old, by_name).unwrap();
        tree.save_imported(old, dir).unwrap();
        assert!(tree.node(dir).unwrap().has_import());

        tree.set_from_info(dir, &ProbeInfo::file(2048, None)).unwrap();

        let node = tree.node(dir).unwrap();
        assert!(node.is_file());
        assert!(!node.has_import());
        assert_eq!(node.name(), "d");
        assert!(!tree.contains(old));
        assert_eq!(tree.stats().children, 1);
        assert_eq!(tree.stats().num_dir, 0);
    }

    #[test]
    fn test_virtual_node_ignored_by_stats() {
        let mut tree = ProjectTree::new();
        let root = tree.root();
        let fake = tree.new_virtual("reserved");
        tree.add(root, fake, by_name).unwrap();

        assert_eq!(tree.stats(), TreeStats::default());
        assert_eq!(tree.n_children(root).unwrap(), 0);

        tree.destroy(fake).unwrap();
        assert_eq!(tree.stats(), TreeStats::default());
    }
}
