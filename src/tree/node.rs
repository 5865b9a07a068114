use crate::Level;

use super::{Bucket, Summary};

/// Tree node, owns one level's bucket and both children
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) level: Level,
    pub(crate) bucket: Bucket,
    /// leaf has height 1
    pub(crate) height: u32,
    pub(crate) summary: Summary,
    pub(crate) left: Option<Box<Node>>,
    pub(crate) right: Option<Box<Node>>,
}

impl Node {
    pub(crate) fn new(level: Level, scale: usize) -> Self {
        Self::with_bucket(level, Bucket::new(scale))
    }

    pub(crate) fn with_bucket(level: Level, bucket: Bucket) -> Self {
        let mut summary = Summary::new(bucket.scale());
        summary.refresh(level, &bucket, None, None);
        Self {
            level,
            bucket,
            height: 1,
            summary,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    /// Aggregate of the whole subtree rooted here
    #[inline]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    #[inline]
    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    #[inline]
    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    #[inline]
    pub fn left_summary(&self) -> Option<&Summary> {
        self.left.as_deref().map(|n| &n.summary)
    }

    #[inline]
    pub fn right_summary(&self) -> Option<&Summary> {
        self.right.as_deref().map(|n| &n.summary)
    }

    /// Records in the right subtree
    #[inline]
    pub fn right_count(&self) -> usize {
        self.right_summary().map_or(0, Summary::count)
    }

    /// Records in the left subtree
    #[inline]
    pub fn left_count(&self) -> usize {
        self.left_summary().map_or(0, Summary::count)
    }

    #[inline]
    pub(crate) fn fix_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    /// Recompute height and aggregate from own bucket and children
    pub(crate) fn update(&mut self) {
        self.fix_height();
        self.summary.refresh(
            self.level,
            &self.bucket,
            self.left.as_deref().map(|n| &n.summary),
            self.right.as_deref().map(|n| &n.summary),
        );
    }

    #[inline]
    pub(crate) fn balance_factor(&self) -> i64 {
        height(&self.left) as i64 - height(&self.right) as i64
    }
}

#[inline]
pub(crate) fn height(node: &Option<Box<Node>>) -> u32 {
    node.as_ref().map_or(0, |n| n.height)
}

/// ```text
///      node                pivot
///     /    \              /     \
///  pivot    c    =>      a      node
///  /   \                        /   \
/// a     b                      b     c
/// ```
fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update();
    pivot.right = Some(node);
    pivot.update();
    pivot
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update();
    pivot.left = Some(node);
    pivot.update();
    pivot
}

/// Restore the AVL property at `node`, whose children are balanced and whose
/// aggregate is already correct. Only rotated nodes get their aggregate
/// recomputed.
pub(crate) fn balance(mut node: Box<Node>) -> Box<Node> {
    node.fix_height();

    match node.balance_factor() {
        2 => {
            if node.left.as_ref().is_some_and(|l| l.balance_factor() < 0) {
                node.left = node.left.take().map(rotate_left);
            }
            rotate_right(node)
        }
        -2 => {
            if node.right.as_ref().is_some_and(|r| r.balance_factor() > 0) {
                node.right = node.right.take().map(rotate_right);
            }
            rotate_left(node)
        }
        _ => node,
    }
}

/// Balance the subtree in place
pub(crate) fn balance_slot(slot: &mut Option<Box<Node>>) {
    if let Some(node) = slot.take() {
        *slot = Some(balance(node));
    }
}
