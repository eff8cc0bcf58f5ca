//! Test fixtures for project tree tests
//!
//! Builders for small trees and helpers to inspect them.

#![cfg(test)]

use std::cmp::Ordering;

use crate::config::SECTOR_SIZE;
use crate::probe::ProbeInfo;
use crate::tree::compare::by_name;
use crate::tree::sorting::ordered;
use crate::tree::{FileNode, NodeId, ProjectTree};

/// Add an empty folder named `name` below `parent`
pub fn add_dir(tree: &mut ProjectTree, parent: NodeId, name: &str) -> NodeId {
    let node = tree.new_empty_folder(name);
    tree.add(parent, node, by_name).expect("Failed to add directory");
    node
}

/// Add a probed file of exactly `sectors` sectors below `parent`
pub fn add_file(tree: &mut ProjectTree, parent: NodeId, name: &str, sectors: u64) -> NodeId {
    let info = ProbeInfo::file(sectors * SECTOR_SIZE, None);
    let node = tree
        .new_from_info(name, &info)
        .expect("Failed to create file");
    tree.add(parent, node, by_name).expect("Failed to add file");
    node
}

/// Names of the regular children of `parent`, in order
pub fn names(tree: &ProjectTree, parent: NodeId) -> Vec<String> {
    tree.children(parent)
        .expect("Unknown parent")
        .iter()
        .map(|&id| tree.node(id).expect("Dangling child").name().to_string())
        .collect()
}

pub fn sectors_of(tree: &ProjectTree, node: NodeId) -> u64 {
    tree.node(node).expect("Unknown node").sectors()
}

/// Root with files of 10, 20 and 30 sectors and two directories holding
/// one 5 sector file each; returns the tree and the two directories
pub fn build_scenario_a() -> (ProjectTree, Vec<NodeId>) {
    let mut tree = ProjectTree::new();
    let root = tree.root();
    add_file(&mut tree, root, "ten", 10);
    add_file(&mut tree, root, "twenty", 20);
    add_file(&mut tree, root, "thirty", 30);

    let dirs: Vec<NodeId> = ["dir1", "dir2"]
        .iter()
        .map(|name| {
            let dir = add_dir(&mut tree, root, name);
            add_file(&mut tree, dir, "five", 5);
            dir
        })
        .collect();

    (tree, dirs)
}

/// Check sizes, ordering and child links of every node below `top`
pub fn assert_consistent<F>(tree: &ProjectTree, top: NodeId, cmp: F)
where
    F: Fn(&FileNode, &FileNode) -> Ordering,
{
    for id in tree.descendants(top).expect("Unknown top") {
        let node = tree.node(id).expect("Dangling node");
        let children = node.children();

        for &child in children {
            assert_eq!(
                tree.node(child).expect("Dangling child").parent(),
                Some(id),
                "{} lists {} but is not its parent",
                id,
                child
            );
        }

        for pair in children.windows(2) {
            let a = tree.node(pair[0]).expect("Dangling child");
            let b = tree.node(pair[1]).expect("Dangling child");
            assert_ne!(
                ordered(&cmp, a, b),
                Ordering::Greater,
                "{:?} sorted before {:?}",
                a.name(),
                b.name()
            );
        }

        if !node.is_file() {
            let expected: u64 = children
                .iter()
                .filter_map(|&child| tree.get(child))
                .filter(|child| child.contributes_size())
                .map(|child| child.sectors())
                .sum();
            assert_eq!(node.sectors(), expected, "size of {:?}", node.name());
        }
    }
}
