//! Multisession baseline archiving
//!
//! When a previous session is imported, its listing becomes part of the
//! tree as imported nodes. A user entry that takes the name of an imported
//! one pushes the imported node into the parent's [`ImportRecord`] so it
//! can be put back if the user entry goes away, without reading the disc
//! again.

use std::cmp::Ordering;

use crate::error::{Result, TreeError};

use super::node::{FileNode, Identity, ImportRecord, NodeId, Payload};
use super::project::ProjectTree;

impl ProjectTree {
    /// Archive the imported `node` into the import record of `parent`
    ///
    /// Non-imported children of `node` were added on top of the baseline
    /// and are destroyed; its imported children are archived into `node`'s
    /// own record.
    pub fn save_imported(&mut self, node: NodeId, parent: NodeId) -> Result<()> {
        let target = self.node(node)?;
        if !target.is_imported() {
            return Err(TreeError::NotImported(node));
        }
        if !matches!(self.node(parent)?.payload, Payload::Directory { .. }) {
            return Err(TreeError::NotADirectory(parent));
        }

        for child in target.children().to_vec() {
            if self.node(child)?.is_imported() {
                self.save_imported(child, node)?;
            } else {
                self.destroy(child)?;
            }
        }

        self.unlink(node)?;

        let owner = self.node_mut(parent)?;
        match &mut owner.identity {
            Identity::Importing(record) => record.replaced.push(node),
            identity => {
                let stashed = std::mem::replace(identity, Identity::Plain(String::new()));
                *identity = Identity::Importing(Box::new(ImportRecord {
                    stashed,
                    replaced: vec![node],
                }));
            }
        }
        self.node_mut(node)?.parent = Some(parent);

        log::debug!("Archived imported {} under {}", node, parent);
        Ok(())
    }

    /// Take back the archived baseline entry shadowed by `node`, if any
    ///
    /// Looks for an entry with the same name in the import record of
    /// `node`'s parent. The entry is returned detached, with its own
    /// archived entries intact; the record is dropped once empty.
    pub fn check_imported_sibling(&mut self, node: NodeId) -> Result<Option<NodeId>> {
        let target = self.node(node)?;
        let Some(parent) = target.parent else {
            return Ok(None);
        };
        let name = target.name().to_string();

        let Some(record) = self.node(parent)?.import_record() else {
            return Ok(None);
        };
        let found = record
            .replaced()
            .iter()
            .copied()
            .find(|&id| id != node && self.get(id).is_some_and(|n| n.name() == name));

        let Some(archived) = found else {
            return Ok(None);
        };
        self.remove_archived(parent, archived)?;
        self.node_mut(archived)?.parent = None;

        log::debug!("Restored archived {} from {}", archived, parent);
        Ok(Some(archived))
    }

    /// Remove `node` from the import record of `parent`, dropping the
    /// record and restoring `parent`'s identity when it becomes empty
    pub(crate) fn remove_archived(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        let owner = self.node_mut(parent)?;
        let Some(record) = owner.import_record_mut() else {
            return Ok(());
        };
        record.replaced.retain(|&id| id != node);
        if !record.replaced.is_empty() {
            return Ok(());
        }

        let identity = std::mem::replace(&mut owner.identity, Identity::Plain(String::new()));
        if let Identity::Importing(record) = identity {
            owner.identity = record.stashed;
        }
        Ok(())
    }

    /// Destroy the user entry `node` and put back the baseline entry it
    /// was shadowing
    ///
    /// Returns the restored entry, if there was one.
    pub fn revert_to_baseline<F>(&mut self, node: NodeId, cmp: F) -> Result<Option<NodeId>>
    where
        F: Fn(&FileNode, &FileNode) -> Ordering,
    {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(None);
        };
        let archived = self.check_imported_sibling(node)?;
        self.destroy(node)?;

        if let Some(archived) = archived {
            self.add(parent, archived, cmp)?;
        }
        Ok(archived)
    }

    /// Start reading the listing of an unexplored imported directory
    ///
    /// Returns the session address of the listing, or `None` if the
    /// directory was already explored.
    pub fn begin_exploring(&mut self, node: NodeId) -> Result<Option<u64>> {
        let target = self.node_mut(node)?;
        if !target.is_imported() {
            return Err(TreeError::NotImported(node));
        }
        let Some(address) = target.import_address() else {
            return Ok(None);
        };

        target.payload = Payload::Directory {
            children: Vec::new(),
        };
        target.flags.is_exploring = true;
        Ok(Some(address))
    }

    /// The listing of `node` has been fully added
    pub fn finish_exploring(&mut self, node: NodeId) -> Result<()> {
        self.node_mut(node)?.flags.is_exploring = false;
        Ok(())
    }
}
