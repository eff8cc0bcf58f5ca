//! Backing content identities and the graft reverse index
//!
//! A content item (a source file or folder on the user's system) can back
//! several positions in the project tree. The registry keeps, for every
//! content item, the set of nodes grafted onto it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::tree::NodeId;

/// Identity of a backing content item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(pub String);

impl ContentId {
    /// Content identified by its source URI
    pub fn from_uri(uri: impl Into<String>) -> Self {
        ContentId(uri.into())
    }

    /// Content without a source location (e.g. a folder created in the project)
    pub fn new_unique() -> Self {
        ContentId(format!("virtual:{}", uuid::Uuid::new_v4()))
    }

    /// Check if this content has no source location
    pub fn is_virtual(&self) -> bool {
        self.0.starts_with("virtual:")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reverse index from content to the nodes grafted onto it
#[derive(Debug, Default)]
pub struct ContentRegistry {
    grafts: HashMap<ContentId, HashSet<NodeId>>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(&mut self, content: &ContentId, node: NodeId) {
        self.grafts.entry(content.clone()).or_default().insert(node);
    }

    /// Remove `node` from `content`'s set, dropping the entry once empty
    pub(crate) fn detach(&mut self, content: &ContentId, node: NodeId) {
        if let Some(nodes) = self.grafts.get_mut(content) {
            nodes.remove(&node);
            if nodes.is_empty() {
                self.grafts.remove(content);
            }
        }
    }

    /// Nodes grafted onto `content`, in no particular order
    pub fn nodes_for(&self, content: &ContentId) -> Vec<NodeId> {
        self.grafts
            .get(content)
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, content: &ContentId) -> bool {
        self.grafts.contains_key(content)
    }

    /// Number of content items with at least one graft
    pub fn len(&self) -> usize {
        self.grafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grafts.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.grafts.clear();
    }
}
