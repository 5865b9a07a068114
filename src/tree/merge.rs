use std::cmp::Ordering;

use super::{AugmentedTree, Node};
use crate::{Error, Result};

/// Merges two trees in time linear to their level counts, whatever the
/// number of records. Buckets on a shared level are summed in O(scale).
///
/// The node lists are reserved up front by [`TreeMerge::new`] and the input
/// nodes are reused for the merged tree, so once `new` succeeds
/// [`TreeMerge::merge`] allocates nothing and neither input is lost on an
/// allocation failure.
pub struct TreeMerge {
    left: Vec<Box<Node>>,
    right: Vec<Box<Node>>,
    merged: Vec<Box<Node>>,
}

impl TreeMerge {
    pub fn new(a: &AugmentedTree, b: &AugmentedTree) -> Result<Self> {
        if a.scale() != b.scale() {
            return Err(Error::InvalidInput("merging trees of different scale"));
        }

        let mut left = Vec::new();
        left.try_reserve_exact(a.level_count())?;
        let mut right = Vec::new();
        right.try_reserve_exact(b.level_count())?;
        let mut merged = Vec::new();
        merged.try_reserve_exact(a.level_count() + b.level_count())?;

        Ok(Self {
            left,
            right,
            merged,
        })
    }

    /// Consume both trees, returns one tree holding every record of both
    pub fn merge(mut self, a: AugmentedTree, b: AugmentedTree) -> AugmentedTree {
        let scale = a.scale();
        let (a_levels, b_levels) = (a.level_count(), b.level_count());

        flatten(a.root, &mut self.left);
        flatten(b.root, &mut self.right);

        let mut left = self.left.into_iter().peekable();
        let mut right = self.right.into_iter().peekable();
        loop {
            let order = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => l.level.cmp(&r.level),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };
            let next = match order {
                Ordering::Less => left.next(),
                Ordering::Greater => right.next(),
                Ordering::Equal => match (left.next(), right.next()) {
                    (Some(mut node), Some(other)) => {
                        node.bucket.merge(other.bucket);
                        Some(node)
                    }
                    (l, r) => l.or(r),
                },
            };
            self.merged.extend(next);
        }

        let level_count = self.merged.len();
        tracing::trace!(a_levels, b_levels, level_count, "merged trees");

        let mut nodes = self.merged.into_iter();
        let root = build(level_count, &mut nodes);
        AugmentedTree::new_from_parts(root, scale, level_count)
    }
}

impl AugmentedTree {
    /// Merge two trees, see [`TreeMerge`]
    pub fn merge(a: AugmentedTree, b: AugmentedTree) -> Result<AugmentedTree> {
        let merge = TreeMerge::new(&a, &b)?;
        Ok(merge.merge(a, b))
    }
}

/// In-order walk, detaches every node of the subtree into `out`
fn flatten(node: Option<Box<Node>>, out: &mut Vec<Box<Node>>) {
    let Some(mut node) = node else {
        return;
    };
    let (left, right) = (node.left.take(), node.right.take());

    flatten(left, out);
    out.push(node);
    flatten(right, out);
}

/// Build a balanced subtree from the next `len` nodes by bisection, the middle
/// node becomes the root. Aggregates are computed bottom up on the way back.
fn build<I>(len: usize, nodes: &mut I) -> Option<Box<Node>>
where
    I: Iterator<Item = Box<Node>>,
{
    if len == 0 {
        return None;
    }

    let left_len = len / 2;
    let left = build(left_len, nodes);
    let mut node = nodes.next()?;
    let right = build(len - left_len - 1, nodes);

    node.left = left;
    node.right = right;
    node.update();
    Some(node)
}
