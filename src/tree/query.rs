//! Order statistic queries, each one a single root-to-leaf descent.

use super::{AugmentedTree, DescendVisit, DescendVisitResult, Node};
use crate::{Error, Level, Result, Score};

/// Sum of levels of the `m` highest records, walking from the highest level down.
struct TopLevelSum {
    remaining: usize,
    level_sum: u128,
}

impl DescendVisit for TopLevelSum {
    type Result = u128;

    fn visit_node(&mut self, node: &Node) -> DescendVisitResult<u128> {
        let right = node.right_summary();
        let right_count = right.map_or(0, |s| s.count());
        if self.remaining <= right_count {
            return DescendVisitResult::GoRight;
        }

        // the whole right subtree is in
        self.level_sum += right.map_or(0, |s| s.level_sum());
        self.remaining -= right_count;

        let taken = self.remaining.min(node.bucket().len());
        self.level_sum += node.level() as u128 * taken as u128;
        self.remaining -= taken;

        if self.remaining == 0 {
            DescendVisitResult::Complete(self.level_sum)
        } else {
            DescendVisitResult::GoLeft
        }
    }

    fn visit_empty(self) -> Option<u128> {
        (self.remaining == 0).then_some(self.level_sum)
    }
}

/// Best and worst case count of `score` among the `m` highest records.
struct TopScoreBounds {
    score: Score,
    remaining: usize,
    lower: usize,
    upper: usize,
}

impl DescendVisit for TopScoreBounds {
    type Result = (usize, usize);

    fn visit_node(&mut self, node: &Node) -> DescendVisitResult<(usize, usize)> {
        if self.remaining == 0 {
            return DescendVisitResult::Complete((self.lower, self.upper));
        }

        let right = node.right_summary();
        let right_count = right.map_or(0, |s| s.count());
        if self.remaining <= right_count {
            return DescendVisitResult::GoRight;
        }

        let right_matches = right.map_or(0, |s| s.score_count(self.score));
        self.lower += right_matches;
        self.upper += right_matches;
        self.remaining -= right_count;

        let bucket = node.bucket();
        let matches = bucket.score_count(self.score);
        if self.remaining >= bucket.len() {
            self.lower += matches;
            self.upper += matches;
            self.remaining -= bucket.len();
            return DescendVisitResult::GoLeft;
        }

        // boundary level, only part of the bucket is in and ties are unresolved
        let others = bucket.len() - matches;
        self.upper += self.remaining.min(matches);
        self.lower += self.remaining.saturating_sub(others);
        self.remaining = 0;
        DescendVisitResult::Complete((self.lower, self.upper))
    }

    fn visit_empty(self) -> Option<(usize, usize)> {
        Some((self.lower, self.upper))
    }
}

/// Records (and records with `score`) at levels up to `bound`, or strictly
/// below it when not `inclusive`.
struct Rank {
    bound: Level,
    inclusive: bool,
    score: Score,
    count: usize,
    score_count: usize,
}

impl DescendVisit for Rank {
    type Result = (usize, usize);

    fn visit_node(&mut self, node: &Node) -> DescendVisitResult<(usize, usize)> {
        let summary = node.summary();
        let right = node.right_summary();

        if node.level() == self.bound {
            // everything here minus the right subtree over-count
            self.count += summary.count() - right.map_or(0, |s| s.count());
            self.score_count +=
                summary.score_count(self.score) - right.map_or(0, |s| s.score_count(self.score));
            if !self.inclusive {
                self.count -= node.bucket().len();
                self.score_count -= node.bucket().score_count(self.score);
            }
            return DescendVisitResult::Complete((self.count, self.score_count));
        }

        if node.level() < self.bound {
            let left = node.left_summary();
            self.count += left.map_or(0, |s| s.count()) + node.bucket().len();
            self.score_count += left.map_or(0, |s| s.score_count(self.score))
                + node.bucket().score_count(self.score);
            DescendVisitResult::GoRight
        } else {
            DescendVisitResult::GoLeft
        }
    }

    fn visit_empty(self) -> Option<(usize, usize)> {
        Some((self.count, self.score_count))
    }
}

/// Closest existing level on one side of a bound
struct Closest {
    bound: Level,
    above: bool,
    best: Option<Level>,
}

impl DescendVisit for Closest {
    type Result = Level;

    fn visit_node(&mut self, node: &Node) -> DescendVisitResult<Level> {
        let level = node.level();
        if level == self.bound {
            return DescendVisitResult::Complete(level);
        }

        match (self.above, level > self.bound) {
            (true, true) => {
                self.best = Some(level);
                DescendVisitResult::GoLeft
            }
            (false, false) => {
                self.best = Some(level);
                DescendVisitResult::GoRight
            }
            (true, false) => DescendVisitResult::GoRight,
            (false, true) => DescendVisitResult::GoLeft,
        }
    }

    fn visit_empty(self) -> Option<Level> {
        self.best
    }
}

impl AugmentedTree {
    /// Smallest existing level `>= bound`
    pub fn ceiling_level(&self, bound: Level) -> Option<Level> {
        self.descend_visit(Closest {
            bound,
            above: true,
            best: None,
        })
    }

    /// Largest existing level `<= bound`
    pub fn floor_level(&self, bound: Level) -> Option<Level> {
        self.descend_visit(Closest {
            bound,
            above: false,
            best: None,
        })
    }

    fn rank(&self, bound: Level, inclusive: bool, score: Score) -> (usize, usize) {
        self.descend_visit(Rank {
            bound,
            inclusive,
            score,
            count: 0,
            score_count: 0,
        })
        .unwrap_or_default()
    }

    /// Mean level of the `m` records with the highest levels.
    ///
    /// Fails with `NotEnoughRecords` if `m` exceeds the population.
    pub fn average_level_of_top(&self, m: usize) -> Result<f64> {
        if m == 0 {
            return Err(Error::InvalidInput("m must be positive"));
        }
        let available = self.len();
        if m > available {
            return Err(Error::NotEnoughRecords {
                requested: m,
                available,
            });
        }

        let level_sum = self
            .descend_visit(TopLevelSum {
                remaining: m,
                level_sum: 0,
            })
            .ok_or(Error::NotEnoughRecords {
                requested: m,
                available,
            })?;
        Ok(level_sum as f64 / m as f64)
    }

    /// `(min, max)` possible number of records with `score` among the `m`
    /// highest records, ties at the boundary level counted both ways.
    ///
    /// `m` beyond the population is clamped to it; callers that need a hard
    /// failure check [`len`](Self::len) first.
    pub fn score_bounds_among_top(&self, score: Score, m: usize) -> (usize, usize) {
        self.descend_visit(TopScoreBounds {
            score,
            remaining: m.min(self.len()),
            lower: 0,
            upper: 0,
        })
        .unwrap_or_default()
    }

    /// Percentage of records with `score` among records whose level is in
    /// `[lower, upper]`, both ends inclusive.
    ///
    /// Returns `None` when the range holds no records.
    pub fn percent_with_score_in_range(
        &self,
        lower: Level,
        upper: Level,
        score: Score,
    ) -> Option<f64> {
        if lower > upper {
            return None;
        }
        let closest_lower = self.ceiling_level(lower)?;
        let closest_upper = self.floor_level(upper)?;
        if closest_lower > closest_upper {
            return None;
        }

        let (below_count, below_score) = self.rank(closest_lower, false, score);
        let (upto_count, upto_score) = self.rank(closest_upper, true, score);

        let count = upto_count - below_count;
        if count == 0 {
            return None;
        }
        let score_count = upto_score - below_score;
        Some(100. * score_count as f64 / count as f64)
    }
}
