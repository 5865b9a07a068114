use std::cmp::Ordering;

mod bucket;
pub use bucket::*;
mod summary;
pub use summary::*;
mod node;
pub use node::Node;
use node::{balance, balance_slot};
mod iterator;
pub use iterator::*;
mod visit;
pub use visit::*;

mod merge;
pub use merge::TreeMerge;
mod query;

use crate::{Error, Level, Record, Result, Score, SENTINEL_LEVEL};

/// Height balanced (AVL) tree keyed by level, each node holding the bucket
/// of records at that level plus the aggregate of its subtree.
///
/// The level 0 node always exists, even when its bucket is empty.
///
/// # Example
/// ```rust
/// use level_forest::{AugmentedTree, Record};
///
/// let mut tree = AugmentedTree::new(10);
/// tree.insert(&Record::new(1, 1, 5)).unwrap();
/// tree.insert(&Record::new(2, 1, 5).with_level(3)).unwrap();
/// tree.insert(&Record::new(3, 1, 9).with_level(3)).unwrap();
/// tree.insert(&Record::new(4, 1, 5).with_level(5)).unwrap();
///
/// assert_eq!(tree.len(), 4);
/// assert_eq!(tree.level_count(), 3);
///
/// let avg = tree.average_level_of_top(3).unwrap();
/// assert!((avg - 11. / 3.).abs() < 1e-9);
/// assert_eq!(tree.score_bounds_among_top(5, 2), (1, 2));
/// ```
#[derive(Debug, Clone)]
pub struct AugmentedTree {
    root: Option<Box<Node>>,
    scale: usize,
    level_count: usize,
}

impl AugmentedTree {
    /// Create a tree holding only the empty level 0 node
    pub fn new(scale: usize) -> Self {
        Self {
            root: Some(Box::new(Node::new(SENTINEL_LEVEL, scale))),
            scale,
            level_count: 1,
        }
    }

    /// Create a tree from parts, used by [`TreeMerge`]
    fn new_from_parts(root: Option<Box<Node>>, scale: usize, level_count: usize) -> Self {
        let me = Self {
            root,
            scale,
            level_count,
        };

        #[cfg(test)]
        me.validate();

        me
    }

    /// Score domain size
    pub fn scale(&self) -> usize {
        self.scale
    }

    /// Returns the number of records in the tree.
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.summary().count())
    }

    /// Returns true if the tree contains no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct levels, the level 0 node included
    pub fn level_count(&self) -> usize {
        self.level_count
    }

    pub fn height(&self) -> u32 {
        node::height(&self.root)
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    /// Aggregate over every record
    pub fn summary(&self) -> Option<&Summary> {
        self.root.as_deref().map(Node::summary)
    }

    /// Nodes in level order
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// `(level, score)` of every record in the tree, by ascending level
    pub fn entries(&self) -> impl Iterator<Item = (Level, Score)> + '_ {
        self.iter().flat_map(|node| {
            let level = node.level();
            node.bucket().scores().map(move |score| (level, score))
        })
    }

    /// Get the bucket at `level`
    pub fn find(&self, level: Level) -> Option<&Bucket> {
        let mut node = self.root.as_deref();
        while let Some(n) = node {
            node = match level.cmp(&n.level) {
                Ordering::Less => n.left(),
                Ordering::Greater => n.right(),
                Ordering::Equal => return Some(n.bucket()),
            };
        }
        None
    }

    /// Whether some record at the record's level has its score
    pub fn contains(&self, record: &Record) -> bool {
        self.find(record.level)
            .is_some_and(|bucket| bucket.score_count(record.score) > 0)
    }

    /// Insert a record. A missing level gets a new node and the path is rebalanced,
    /// otherwise only the aggregates on the path change.
    ///
    /// Records are counted by level and score, not by id. The caller owns id
    /// uniqueness: inserting the same id twice indexes it twice.
    pub fn insert(&mut self, record: &Record) -> Result<()> {
        if record.score >= self.scale {
            return Err(Error::InvalidInput("score out of range"));
        }

        if Self::descend_insert(&mut self.root, record, self.scale)? {
            self.level_count += 1;
        }

        #[cfg(test)]
        self.validate();

        Ok(())
    }

    /// Returns whether a new level node was created
    fn descend_insert(slot: &mut Option<Box<Node>>, record: &Record, scale: usize) -> Result<bool> {
        let Some(node) = slot.as_mut() else {
            let mut node = Node::new(record.level, scale);
            node.bucket.add(record)?;
            node.update();
            *slot = Some(Box::new(node));
            return Ok(true);
        };

        let created = match record.level.cmp(&node.level) {
            Ordering::Less => Self::descend_insert(&mut node.left, record, scale)?,
            Ordering::Greater => Self::descend_insert(&mut node.right, record, scale)?,
            Ordering::Equal => {
                node.bucket.add(record)?;
                false
            }
        };
        node.summary.add(record.level, record.score);

        if created {
            balance_slot(slot);
        }
        Ok(created)
    }

    /// Remove a record. A level other than 0 whose bucket empties is deleted.
    ///
    /// Fails with `RecordNotFound` when no record at the record's level has
    /// its score.
    pub fn remove(&mut self, record: &Record) -> Result<()> {
        if Self::descend_remove(&mut self.root, record)? {
            self.level_count -= 1;
        }

        #[cfg(test)]
        self.validate();

        Ok(())
    }

    /// Returns whether the record's level node was deleted
    fn descend_remove(slot: &mut Option<Box<Node>>, record: &Record) -> Result<bool> {
        let node = slot.as_mut().ok_or(Error::LevelNotFound(record.level))?;

        let child = match record.level.cmp(&node.level) {
            Ordering::Less => &mut node.left,
            Ordering::Greater => &mut node.right,
            Ordering::Equal => {
                node.bucket.remove(record)?;
                node.summary.remove(record.level, record.score);

                if !node.bucket.is_empty() || node.level == SENTINEL_LEVEL {
                    return Ok(false);
                }
                if let Some(node) = slot.take() {
                    *slot = Self::unlink(node);
                }
                return Ok(true);
            }
        };

        let level_removed = Self::descend_remove(child, record)?;
        node.summary.remove(record.level, record.score);

        if level_removed {
            balance_slot(slot);
        }
        Ok(level_removed)
    }

    /// Drop an emptied node from its subtree, returns the new subtree root.
    /// With two children the in-order successor's level and bucket move in.
    fn unlink(mut node: Box<Node>) -> Option<Box<Node>> {
        match (node.left.take(), node.right.take()) {
            (None, None) => None,
            (Some(child), None) | (None, Some(child)) => Some(child),
            (Some(left), Some(right)) => {
                let (successor, rest) = Self::detach_min(right);
                let Node { level, bucket, .. } = *successor;
                node.level = level;
                node.bucket = bucket;
                node.left = Some(left);
                node.right = rest;
                node.update();
                Some(balance(node))
            }
        }
    }

    /// Split off the lowest level node, returns it and the rest of the subtree
    fn detach_min(mut node: Box<Node>) -> (Box<Node>, Option<Box<Node>>) {
        match node.left.take() {
            None => {
                let rest = node.right.take();
                (node, rest)
            }
            Some(left) => {
                let (min, rest) = Self::detach_min(left);
                node.left = rest;
                node.update();
                (min, Some(balance(node)))
            }
        }
    }

    /// Move a record from its current score to `score`. Shape of the tree is
    /// untouched.
    pub fn change_score(&mut self, record: &Record, score: Score) -> Result<()> {
        if score >= self.scale {
            return Err(Error::InvalidInput("score out of range"));
        }
        Self::descend_change_score(&mut self.root, record, score)?;

        #[cfg(test)]
        self.validate();

        Ok(())
    }

    fn descend_change_score(
        slot: &mut Option<Box<Node>>,
        record: &Record,
        score: Score,
    ) -> Result<()> {
        let node = slot.as_mut().ok_or(Error::LevelNotFound(record.level))?;

        match record.level.cmp(&node.level) {
            Ordering::Less => Self::descend_change_score(&mut node.left, record, score)?,
            Ordering::Greater => Self::descend_change_score(&mut node.right, record, score)?,
            Ordering::Equal => node.bucket.change_score(record, score)?,
        }
        node.summary.move_score(record.score, score);
        Ok(())
    }

    /// Check every structural and aggregate invariant
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        fn check(node: &Node, lower: Option<Level>, upper: Option<Level>) -> (u32, usize) {
            if let Some(lower) = lower {
                assert!(node.level > lower, "level order broken at {}", node.level);
            }
            if let Some(upper) = upper {
                assert!(node.level < upper, "level order broken at {}", node.level);
            }
            assert!(
                !node.bucket.is_empty() || node.level == SENTINEL_LEVEL,
                "empty bucket kept at level {}",
                node.level
            );

            let (lh, ln) = node.left().map_or((0, 0), |l| check(l, lower, Some(node.level)));
            let (rh, rn) = node.right().map_or((0, 0), |r| check(r, Some(node.level), upper));

            assert!(lh.abs_diff(rh) <= 1, "unbalanced at level {}", node.level);
            assert_eq!(node.height, 1 + lh.max(rh));

            let mut expected = Summary::new(node.bucket.scale());
            expected.refresh(node.level, &node.bucket, node.left_summary(), node.right_summary());
            assert_eq!(node.summary, expected, "stale aggregate at level {}", node.level);

            (node.height, ln + rn + 1)
        }

        let Some(root) = self.root.as_deref() else {
            assert_eq!(self.level_count, 0);
            return;
        };
        let (_, levels) = check(root, None, None);
        assert_eq!(levels, self.level_count);
        assert!(self.find(SENTINEL_LEVEL).is_some(), "level 0 node missing");
    }
}
