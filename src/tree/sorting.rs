//! Sorted sibling lists
//!
//! Children of a directory are kept ordered by a caller-supplied comparator,
//! with hidden nodes always after visible ones. Reordering operations return
//! a [`Reordering`] so a view can move rows instead of reloading the list.

use std::cmp::Ordering;

use crate::error::{Result, TreeError};

use super::node::{FileNode, NodeId};
use super::project::ProjectTree;

/// Result of a reorder: `new_order[i]` is the old index of the child now
/// at position `offset + i`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reordering {
    pub offset: usize,
    pub new_order: Vec<usize>,
}

impl Reordering {
    /// No child moved
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.new_order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.new_order.len()
    }

    /// Old index of the child now at `new_index`, if it lies in the span
    pub fn old_index(&self, new_index: usize) -> Option<usize> {
        new_index
            .checked_sub(self.offset)
            .and_then(|i| self.new_order.get(i).copied())
    }

    /// Whether any entry actually changed position
    pub fn is_identity(&self) -> bool {
        self.new_order
            .iter()
            .enumerate()
            .all(|(i, &old)| old == self.offset + i)
    }
}

/// Apply the hidden-last rule on top of `cmp`
pub(crate) fn ordered<F>(cmp: &F, a: &FileNode, b: &FileNode) -> Ordering
where
    F: Fn(&FileNode, &FileNode) -> Ordering,
{
    match (a.is_hidden(), b.is_hidden()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        _ => cmp(a, b),
    }
}

impl ProjectTree {
    /// Run `f` on the regular child list of `parent`
    pub(crate) fn with_children<R>(
        &mut self,
        parent: NodeId,
        f: impl FnOnce(&Self, &mut Vec<NodeId>) -> R,
    ) -> Result<R> {
        let mut children = {
            let node = self.node_mut(parent)?;
            std::mem::take(
                node.children_mut()
                    .ok_or(TreeError::NotADirectory(parent))?,
            )
        };

        let result = f(self, &mut children);

        if let Some(slot) = self.get_mut(parent).and_then(|n| n.children_mut()) {
            *slot = children;
        }
        Ok(result)
    }

    /// First position in `children[start..]` where `node` sorts strictly
    /// before the child, so equal keys keep insertion order
    fn insert_position<F>(
        &self,
        children: &[NodeId],
        start: usize,
        node: &FileNode,
        cmp: &F,
    ) -> usize
    where
        F: Fn(&FileNode, &FileNode) -> Ordering,
    {
        children[start..]
            .iter()
            .position(|&child| {
                self.get(child)
                    .is_some_and(|child| ordered(cmp, node, child) == Ordering::Less)
            })
            .map(|i| start + i)
            .unwrap_or(children.len())
    }

    /// Insert `node` into the sorted child list of `parent`; returns its index
    pub(crate) fn insert_sorted<F>(
        &mut self,
        parent: NodeId,
        node: NodeId,
        cmp: &F,
    ) -> Result<usize>
    where
        F: Fn(&FileNode, &FileNode) -> Ordering,
    {
        let inserted = self.node(node)?.clone();
        self.with_children(parent, |tree, children| {
            let pos = tree.insert_position(children, 0, &inserted, cmp);
            children.insert(pos, node);
            pos
        })
    }

    /// Move `node` to its sorted position after its sort key changed
    ///
    /// Only `node` is relocated; the rest of the list is assumed sorted.
    /// Returns an empty [`Reordering`] when the node is already in place.
    pub fn need_resort<F>(&mut self, node: NodeId, cmp: F) -> Result<Reordering>
    where
        F: Fn(&FileNode, &FileNode) -> Ordering,
    {
        let moved = self.node(node)?.clone();
        let Some(parent) = moved.parent else {
            return Ok(Reordering::none());
        };
        if !self.node(parent)?.children().contains(&node) {
            // Archived in an import record, not part of the visible order
            return Ok(Reordering::none());
        }

        let reordering = self.with_children(parent, |tree, children| {
            let Some(old) = children.iter().position(|&c| c == node) else {
                return Reordering::none();
            };

            let prev = old
                .checked_sub(1)
                .and_then(|i| tree.get(children[i]));
            let next = children.get(old + 1).and_then(|&c| tree.get(c));

            if prev.is_some_and(|prev| ordered(&cmp, prev, &moved) == Ordering::Greater) {
                children.remove(old);
                let new = tree.insert_position(&children[..old], 0, &moved, &cmp);
                children.insert(new, node);

                Reordering {
                    offset: new,
                    new_order: std::iter::once(old).chain(new..old).collect(),
                }
            } else if next.is_some_and(|next| ordered(&cmp, &moved, next) == Ordering::Greater) {
                children.remove(old);
                let new = tree.insert_position(children, old, &moved, &cmp);
                children.insert(new, node);

                Reordering {
                    offset: old,
                    new_order: (old + 1..=new).chain(std::iter::once(old)).collect(),
                }
            } else {
                Reordering::none()
            }
        })?;

        if !reordering.is_empty() {
            log::trace!(
                "Resorted {} within {}: {:?}",
                node,
                parent,
                reordering.new_order
            );
        }
        Ok(reordering)
    }

    /// Re-sort every child of `parent` with `cmp`
    ///
    /// Stable, so siblings with equal keys keep their relative order. The
    /// returned reordering covers the whole child list.
    pub fn sort_children<F>(&mut self, parent: NodeId, cmp: F) -> Result<Reordering>
    where
        F: Fn(&FileNode, &FileNode) -> Ordering,
    {
        self.with_children(parent, |tree, children| {
            let mut new_order: Vec<usize> = (0..children.len()).collect();
            new_order.sort_by(|&a, &b| match (tree.get(children[a]), tree.get(children[b])) {
                (Some(a), Some(b)) => ordered(&cmp, a, b),
                _ => Ordering::Equal,
            });

            let sorted: Vec<NodeId> = new_order.iter().map(|&i| children[i]).collect();
            *children = sorted;

            Reordering {
                offset: 0,
                new_order,
            }
        })
    }

    /// Reverse the order of the children of `parent`
    ///
    /// Directories stay before files: each segment is reversed on its own.
    /// Hidden nodes keep their place at the end.
    pub fn reverse_children(&mut self, parent: NodeId) -> Result<Reordering> {
        self.with_children(parent, |tree, children| {
            let visible = |i: &usize| tree.get(children[*i]).is_some_and(|n| !n.is_hidden());
            let is_file = |i: &usize| tree.get(children[*i]).is_some_and(|n| n.is_file());

            let dirs = (0..children.len())
                .rev()
                .filter(|i| visible(i) && !is_file(i));
            let files = (0..children.len())
                .rev()
                .filter(|i| visible(i) && is_file(i));
            let hidden = (0..children.len()).filter(|i| !visible(i));

            let new_order: Vec<usize> = dirs.chain(files).chain(hidden).collect();
            let reversed: Vec<NodeId> = new_order.iter().map(|&i| children[i]).collect();
            *children = reversed;

            Reordering {
                offset: 0,
                new_order,
            }
        })
    }
}
