//! Stock sibling comparators
//!
//! Any `Fn(&FileNode, &FileNode) -> Ordering` can order siblings; these are
//! the orders a project view usually offers. Hidden nodes are moved to the
//! end by the sorting engine, not here.

use std::cmp::Ordering;

use super::node::FileNode;

/// Alphabetical by displayed name
pub fn by_name(a: &FileNode, b: &FileNode) -> Ordering {
    a.name().cmp(b.name())
}

/// Directories first, then alphabetical
pub fn by_name_dirs_first(a: &FileNode, b: &FileNode) -> Ordering {
    match (a.is_file(), b.is_file()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        _ => by_name(a, b),
    }
}

/// Directories first, then by size, then by name
pub fn by_size(a: &FileNode, b: &FileNode) -> Ordering {
    match (a.is_file(), b.is_file()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        _ => a.sectors().cmp(&b.sectors()).then_with(|| by_name(a, b)),
    }
}

/// By mime type, then by name
pub fn by_mime(a: &FileNode, b: &FileNode) -> Ordering {
    a.mime()
        .unwrap_or_default()
        .cmp(b.mime().unwrap_or_default())
        .then_with(|| by_name(a, b))
}
