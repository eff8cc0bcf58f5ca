//! Project tree node
//!
//! A node is either a file, a directory, or an imported directory whose
//! listing has not been read yet. The payload enum makes sure only the
//! fields of the current kind exist.

use serde::{Deserialize, Serialize};

use crate::content::ContentId;

use super::stats::TreeStats;

/// Mime type reported for directories
pub const DIRECTORY_MIME: &str = "x-directory/normal";

/// Handle to a node in a [`ProjectTree`](super::ProjectTree)
///
/// The generation makes handles to destroyed nodes detectable after their
/// slot has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Kind of node, selecting which payload is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
    /// Imported directory from a previous session, not explored yet
    Unexplored,
}

#[derive(Debug, Clone)]
pub enum Payload {
    Directory { children: Vec<NodeId> },
    File { mime: Option<String> },
    /// Location of the directory record in the imported session
    Unexplored { address: u64 },
}

impl Payload {
    fn kind(&self) -> NodeKind {
        match self {
            Payload::Directory { .. } => NodeKind::Directory,
            Payload::File { .. } => NodeKind::File,
            Payload::Unexplored { .. } => NodeKind::Unexplored,
        }
    }
}

/// Display name override for a node backed by some content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraftPoint {
    pub name: String,
    pub content: ContentId,
}

/// Archived baseline entries of an imported session
///
/// Created on a directory the first time one of its imported children is
/// shadowed by a new entry. The directory's identity is stashed here while
/// the record exists.
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub(crate) stashed: Identity,
    pub(crate) replaced: Vec<NodeId>,
}

impl ImportRecord {
    pub fn replaced(&self) -> &[NodeId] {
        &self.replaced
    }
}

#[derive(Debug, Clone)]
pub enum Identity {
    Plain(String),
    Grafted(GraftPoint),
    Importing(Box<ImportRecord>),
}

impl Identity {
    pub fn name(&self) -> &str {
        match self {
            Identity::Plain(name) => name,
            Identity::Grafted(graft) => &graft.name,
            Identity::Importing(record) => record.stashed.name(),
        }
    }

    /// The plain or grafted identity, looking through an import record
    pub(crate) fn base(&self) -> &Identity {
        match self {
            Identity::Importing(record) => record.stashed.base(),
            other => other,
        }
    }

    pub(crate) fn base_mut(&mut self) -> &mut Identity {
        match self {
            Identity::Importing(record) => record.stashed.base_mut(),
            other => other,
        }
    }

    fn set_name(&mut self, name: String) {
        match self.base_mut() {
            Identity::Grafted(graft) => graft.name = name,
            base => *base = Identity::Plain(name),
        }
    }
}

/// State flags that are not implied by payload or identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFlags {
    pub is_root: bool,
    pub is_symlink: bool,
    /// Sorted after all visible siblings and excluded from child counts
    pub is_hidden: bool,
    /// Virtual placeholder, never counted in stats
    pub is_fake: bool,
    /// Part of a previous session on the disc
    pub is_imported: bool,
    /// Waiting for its first probe result
    pub is_loading: bool,
    /// Directory whose contents are being listed
    pub is_exploring: bool,
    /// Waiting for a new probe result after a previous one
    pub is_reloading: bool,
    pub is_deep: bool,
    pub is_2gib: bool,
}

#[derive(Debug, Clone)]
pub struct FileNode {
    pub(crate) identity: Identity,
    pub(crate) parent: Option<NodeId>,
    pub(crate) payload: Payload,
    /// File size, or accumulated total of a directory's contributing descendants
    pub(crate) sectors: u64,
    pub(crate) flags: NodeFlags,
    pub(crate) stats: Option<Box<TreeStats>>,
    /// Whether the node is currently included in the root's stats
    pub(crate) counted: bool,
}

impl FileNode {
    fn with_payload(name: &str, payload: Payload) -> Self {
        Self {
            identity: Identity::Plain(name.to_string()),
            parent: None,
            payload,
            sectors: 0,
            flags: NodeFlags::default(),
            stats: None,
            counted: false,
        }
    }

    pub(crate) fn root() -> Self {
        let mut node = Self::empty_folder("");
        node.flags.is_root = true;
        node.stats = Some(Box::default());
        node
    }

    /// Plain node with a name and nothing known about it yet
    pub fn plain(name: &str) -> Self {
        Self::with_payload(name, Payload::Directory { children: Vec::new() })
    }

    /// Placeholder shown while the probe for `name` is running
    pub fn loading(name: &str) -> Self {
        let mut node = Self::plain(name);
        node.flags.is_loading = true;
        node
    }

    /// Hidden placeholder reserving a name, ignored by stats
    pub fn virtual_placeholder(name: &str) -> Self {
        let mut node = Self::plain(name);
        node.flags.is_fake = true;
        node.flags.is_hidden = true;
        node
    }

    /// Directory created by the user, with no backing content
    pub fn empty_folder(name: &str) -> Self {
        Self::plain(name)
    }

    /// File entry from a previous session
    pub fn imported_file(name: &str, sectors: u64) -> Self {
        let mut node = Self::with_payload(name, Payload::File { mime: None });
        node.sectors = sectors;
        node.flags.is_imported = true;
        node
    }

    /// Directory entry from a previous session whose listing is at `address`
    pub fn imported_directory(name: &str, address: u64) -> Self {
        let mut node = Self::with_payload(name, Payload::Unexplored { address });
        node.flags.is_imported = true;
        node
    }

    /// Displayed name (graft override if grafted)
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.identity.set_name(name);
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn graft(&self) -> Option<&GraftPoint> {
        match self.identity.base() {
            Identity::Grafted(graft) => Some(graft),
            _ => None,
        }
    }

    pub fn import_record(&self) -> Option<&ImportRecord> {
        match &self.identity {
            Identity::Importing(record) => Some(record),
            _ => None,
        }
    }

    pub(crate) fn import_record_mut(&mut self) -> Option<&mut ImportRecord> {
        match &mut self.identity {
            Identity::Importing(record) => Some(record),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn sectors(&self) -> u64 {
        self.sectors
    }

    pub fn is_file(&self) -> bool {
        matches!(self.payload, Payload::File { .. })
    }

    pub fn is_directory(&self) -> bool {
        !self.is_file()
    }

    pub fn is_root(&self) -> bool {
        self.flags.is_root
    }

    pub fn is_grafted(&self) -> bool {
        self.graft().is_some()
    }

    pub fn has_import(&self) -> bool {
        self.import_record().is_some()
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.is_hidden
    }

    pub fn is_imported(&self) -> bool {
        self.flags.is_imported
    }

    pub fn is_deep(&self) -> bool {
        self.flags.is_deep
    }

    /// Whether the node is included in the stats when linked
    pub fn is_countable(&self) -> bool {
        !self.flags.is_imported && !self.flags.is_fake && !self.flags.is_root
    }

    /// Whether the node's sectors are added into its ancestors
    ///
    /// Directory totals only hold what their descendants contributed, so
    /// they always pass it on unless a graft stops it.
    pub(crate) fn contributes_size(&self) -> bool {
        if self.is_grafted() || self.flags.is_root {
            return false;
        }
        match self.payload {
            Payload::File { .. } => self.is_countable() && !self.flags.is_hidden,
            _ => true,
        }
    }

    /// Regular (non-archived) children; empty for files
    pub fn children(&self) -> &[NodeId] {
        match &self.payload {
            Payload::Directory { children } => children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.payload {
            Payload::Directory { children } => Some(children),
            _ => None,
        }
    }

    pub fn mime(&self) -> Option<&str> {
        match &self.payload {
            Payload::File { mime } => mime.as_deref(),
            _ => Some(DIRECTORY_MIME),
        }
    }

    /// Location of the unexplored imported directory record
    pub fn import_address(&self) -> Option<u64> {
        match self.payload {
            Payload::Unexplored { address } => Some(address),
            _ => None,
        }
    }

    /// Own stats block (root only)
    pub fn own_stats(&self) -> Option<&TreeStats> {
        self.stats.as_deref()
    }
}
