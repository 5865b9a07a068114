use crate::{Level, Score};

use super::Bucket;

/// Subtree aggregate stored in every node.
///
/// It turns the level tree into an order statistic tree that also knows
/// the level sum and the score histogram of each subtree:
///
/// ```text
///                  [3](count 4, sum 11)
///     [0](count 1, sum 0)       [5](count 1, sum 5)
/// ```
///
/// The mean level is derived from the exact sum so it never drifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    count: usize,
    level_sum: u128,
    histogram: Box<[usize]>,
}

impl Summary {
    pub fn new(scale: usize) -> Self {
        Self {
            count: 0,
            level_sum: 0,
            histogram: vec![0; scale].into_boxed_slice(),
        }
    }

    /// Records in the subtree
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sum of every record's level in the subtree
    #[inline]
    pub fn level_sum(&self) -> u128 {
        self.level_sum
    }

    /// Count-weighted mean level, 0 for an empty subtree
    pub fn mean_level(&self) -> f64 {
        if self.count == 0 {
            0.
        } else {
            self.level_sum as f64 / self.count as f64
        }
    }

    #[inline]
    pub fn score_count(&self, score: Score) -> usize {
        self.histogram.get(score).copied().unwrap_or(0)
    }

    pub fn histogram(&self) -> &[usize] {
        &self.histogram
    }

    /// Rebuild from the node's own bucket and its (already correct) children
    pub(crate) fn refresh(
        &mut self,
        level: Level,
        bucket: &Bucket,
        left: Option<&Summary>,
        right: Option<&Summary>,
    ) {
        self.count = bucket.len();
        self.level_sum = level as u128 * bucket.len() as u128;
        self.histogram.copy_from_slice(bucket.histogram());

        for child in [left, right].into_iter().flatten() {
            self.count += child.count;
            self.level_sum += child.level_sum;
            for (mine, theirs) in self.histogram.iter_mut().zip(child.histogram.iter()) {
                *mine += *theirs;
            }
        }
    }

    /// One record at `level` with `score` joined the subtree
    #[inline]
    pub(crate) fn add(&mut self, level: Level, score: Score) {
        self.count += 1;
        self.level_sum += level as u128;
        self.histogram[score] += 1;
    }

    /// One record at `level` with `score` left the subtree
    #[inline]
    pub(crate) fn remove(&mut self, level: Level, score: Score) {
        self.count -= 1;
        self.level_sum -= level as u128;
        self.histogram[score] -= 1;
    }

    #[inline]
    pub(crate) fn move_score(&mut self, from: Score, to: Score) {
        self.histogram[from] -= 1;
        self.histogram[to] += 1;
    }
}
