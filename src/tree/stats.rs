//! Aggregate counters owned by the project root

use serde::{Deserialize, Serialize};

use super::node::FileNode;

/// Counts of the non-imported, non-virtual nodes of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub num_dir: u32,
    /// Number of files
    pub children: u32,
    pub num_deep: u32,
    pub num_2gib: u32,
    pub num_sym: u32,
}

impl TreeStats {
    /// Count a node that was just linked into the tree
    pub(crate) fn record(&mut self, node: &FileNode) {
        if node.is_file() {
            self.children += 1;
        } else {
            self.num_dir += 1;
        }
        if node.flags.is_symlink {
            self.num_sym += 1;
        }
        if node.flags.is_2gib {
            self.num_2gib += 1;
        }
    }

    /// Inverse of [`record`](Self::record)
    pub(crate) fn forget(&mut self, node: &FileNode) {
        if node.is_file() {
            self.children = self.children.saturating_sub(1);
        } else {
            self.num_dir = self.num_dir.saturating_sub(1);
        }
        if node.flags.is_symlink {
            self.num_sym = self.num_sym.saturating_sub(1);
        }
        if node.flags.is_2gib {
            self.num_2gib = self.num_2gib.saturating_sub(1);
        }
    }

    /// Total number of counted entries
    pub fn total(&self) -> u32 {
        self.num_dir + self.children
    }

    /// Whether the project needs ISO9660 level 3 for oversized files
    pub fn needs_iso_level3(&self) -> bool {
        self.num_2gib > 0
    }

    /// Whether the project has paths deeper than plain ISO9660 allows
    pub fn has_deep_paths(&self) -> bool {
        self.num_deep > 0
    }
}
