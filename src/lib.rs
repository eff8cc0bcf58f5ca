//! Disc Project Tree
//!
//! The file tree behind a CD/DVD data project: what will be written to the
//! disc, under which names, how big it is, and which parts come from a
//! previous session.
//!
//! ```
//! use disc_project_tree::probe::ProbeInfo;
//! use disc_project_tree::tree::{compare, ProjectTree};
//!
//! let mut tree = ProjectTree::new();
//! let root = tree.root();
//! let docs = tree.new_empty_folder("docs");
//! tree.add(root, docs, compare::by_name).unwrap();
//!
//! let file = tree.new_from_info("notes.txt", &ProbeInfo::file(5000, None)).unwrap();
//! tree.add(docs, file, compare::by_name).unwrap();
//!
//! assert_eq!(tree.path_of(file).unwrap(), "/docs/notes.txt");
//! assert_eq!(tree.node(root).unwrap().sectors(), 3);
//! assert_eq!(tree.stats().children, 1);
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod probe;
pub mod tree;

#[cfg(test)]
mod test_fixtures;

pub use config::TreeConfig;
pub use content::{ContentId, ContentRegistry};
pub use error::{Result, TreeError};
pub use probe::{ProbeInfo, ProbeKind, ProbeOutcome, ProbeResult};
pub use tree::{FileNode, NodeId, NodeKind, ProjectTree, Reordering, TreeStats};
