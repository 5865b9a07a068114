use crate::{AugmentedTree, Error, GroupId, Record, Result, Score, TreeMerge};

/// A group of records and the tree indexing them
#[derive(Debug, Clone)]
pub struct Group {
    id: GroupId,
    /// `None` once the group has been absorbed by another representative
    tree: Option<AugmentedTree>,
    len: usize,
}

impl Group {
    fn new(id: GroupId, scale: usize) -> Self {
        Self {
            id,
            tree: Some(AugmentedTree::new(scale)),
            len: 0,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Records in the group, absorbed groups included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn tree(&self) -> Option<&AugmentedTree> {
        self.tree.as_ref()
    }
}

/// Weighted union-find over groups `1..=n`, each representative owning the
/// tree of its whole set.
///
/// # Example
/// ```rust
/// use level_forest::{DisjointGroupForest, Record};
///
/// let mut forest = DisjointGroupForest::new(3, 10);
/// forest.insert(&Record::new(1, 1, 4)).unwrap();
/// forest.insert(&Record::new(2, 3, 4)).unwrap();
///
/// let rep = forest.union(1, 3).unwrap();
/// assert_eq!(forest.find(1).unwrap(), rep);
/// assert_eq!(forest.find(3).unwrap(), rep);
/// assert_eq!(forest.tree(3).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DisjointGroupForest {
    parent: Vec<usize>,
    size: Vec<usize>,
    groups: Vec<Group>,
}

impl DisjointGroupForest {
    /// Create `groups` singleton sets, each with an empty tree
    pub fn new(groups: usize, scale: usize) -> Self {
        Self {
            parent: (0..groups).collect(),
            size: vec![1; groups],
            groups: (0..groups).map(|i| Group::new(i + 1, scale)).collect(),
        }
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn index(&self, id: GroupId) -> Result<usize> {
        if id == 0 || id > self.groups.len() {
            return Err(Error::GroupNotFound(id));
        }
        Ok(id - 1)
    }

    /// Walk up to the root, then point every visited slot straight at it
    fn find_index(&mut self, idx: usize) -> usize {
        let mut root = idx;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = idx;
        while current != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Representative of the set containing `id`
    pub fn find(&mut self, id: GroupId) -> Result<GroupId> {
        let idx = self.index(id)?;
        Ok(self.find_index(idx) + 1)
    }

    /// Merge the sets of `a` and `b`, returns the surviving representative.
    ///
    /// The smaller set goes under the larger one (lower index on ties) and the
    /// two trees are merged into the survivor's.
    pub fn union(&mut self, a: GroupId, b: GroupId) -> Result<GroupId> {
        let (ia, ib) = (self.index(a)?, self.index(b)?);
        let ra = self.find_index(ia);
        let rb = self.find_index(ib);
        if ra == rb {
            return Ok(ra + 1);
        }

        let a_wins = match self.size[ra].cmp(&self.size[rb]) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => ra < rb,
        };
        let (winner, loser) = if a_wins {
            (ra, rb)
        } else {
            (rb, ra)
        };

        let (Some(larger), Some(smaller)) = (
            self.groups[winner].tree.as_ref(),
            self.groups[loser].tree.as_ref(),
        ) else {
            return Err(Error::GroupNotFound(loser + 1));
        };
        let merge = TreeMerge::new(larger, smaller)?;

        if let (Some(larger), Some(smaller)) = (
            self.groups[winner].tree.take(),
            self.groups[loser].tree.take(),
        ) {
            self.groups[winner].tree = Some(merge.merge(larger, smaller));
        }

        self.parent[loser] = winner;
        self.size[winner] += self.size[loser];
        self.groups[winner].len += self.groups[loser].len;

        tracing::debug!(
            winner = winner + 1,
            loser = loser + 1,
            size = self.size[winner],
            records = self.groups[winner].len,
            "groups merged"
        );
        Ok(winner + 1)
    }

    /// The representative group of `id`
    pub fn group(&mut self, id: GroupId) -> Result<&Group> {
        let root = self.find(id)? - 1;
        Ok(&self.groups[root])
    }

    fn group_mut(&mut self, id: GroupId) -> Result<&mut Group> {
        let root = self.find(id)? - 1;
        Ok(&mut self.groups[root])
    }

    /// The tree shared by every group in `id`'s set
    pub fn tree(&mut self, id: GroupId) -> Result<&AugmentedTree> {
        self.group(id)?.tree().ok_or(Error::GroupNotFound(id))
    }

    /// Records in `id`'s set
    pub fn group_len(&mut self, id: GroupId) -> Result<usize> {
        Ok(self.group(id)?.len())
    }

    /// Index the record under its group's representative
    pub fn insert(&mut self, record: &Record) -> Result<()> {
        let group = self.group_mut(record.group)?;
        group
            .tree
            .as_mut()
            .ok_or(Error::GroupNotFound(record.group))?
            .insert(record)?;
        group.len += 1;
        Ok(())
    }

    pub fn remove(&mut self, record: &Record) -> Result<()> {
        let group = self.group_mut(record.group)?;
        group
            .tree
            .as_mut()
            .ok_or(Error::GroupNotFound(record.group))?
            .remove(record)?;
        group.len -= 1;
        Ok(())
    }

    pub fn change_score(&mut self, record: &Record, score: Score) -> Result<()> {
        self.group_mut(record.group)?
            .tree
            .as_mut()
            .ok_or(Error::GroupNotFound(record.group))?
            .change_score(record, score)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_singletons() {
        let mut forest = DisjointGroupForest::new(4, 3);
        for id in 1..=4 {
            assert_eq!(forest.find(id).unwrap(), id);
            assert!(forest.tree(id).unwrap().is_empty());
        }
        assert_eq!(forest.find(0), Err(Error::GroupNotFound(0)));
        assert_eq!(forest.find(5), Err(Error::GroupNotFound(5)));
    }

    #[test]
    fn test_union_by_size() {
        let mut forest = DisjointGroupForest::new(5, 3);
        assert_eq!(forest.union(2, 3).unwrap(), 2);
        // {2, 3} is larger than {4}
        assert_eq!(forest.union(4, 3).unwrap(), 2);
        assert_eq!(forest.union(5, 1).unwrap(), 1);
        assert_eq!(forest.union(1, 4).unwrap(), 2);

        for id in 1..=5 {
            assert_eq!(forest.find(id).unwrap(), 2);
        }
        // same set again is a no-op
        assert_eq!(forest.union(5, 3).unwrap(), 2);
    }

    #[test]
    fn test_path_compression() {
        let mut forest = DisjointGroupForest::new(8, 2);
        forest.union(1, 2).unwrap();
        forest.union(3, 4).unwrap();
        forest.union(1, 3).unwrap();
        forest.union(5, 6).unwrap();
        forest.union(7, 8).unwrap();
        forest.union(5, 7).unwrap();
        forest.union(1, 5).unwrap();

        // 8 -> 7 -> 5 -> 1 before compression
        assert_eq!(forest.find(8).unwrap(), 1);
        assert_eq!(forest.parent[7], 0);
        assert_eq!(forest.parent[6], 0);
        assert_eq!(forest.parent[4], 0);
    }

    #[test]
    fn test_union_merges_trees() {
        let mut forest = DisjointGroupForest::new(3, 10);
        forest.insert(&Record::new(1, 1, 5)).unwrap();
        forest.insert(&Record::new(2, 1, 5).with_level(3)).unwrap();
        forest.insert(&Record::new(3, 2, 9).with_level(3)).unwrap();
        forest.insert(&Record::new(4, 2, 5).with_level(5)).unwrap();

        let rep = forest.union(2, 1).unwrap();
        assert_eq!(rep, 1);
        assert!(forest.groups[1].tree().is_none());
        assert_eq!(forest.group_len(2).unwrap(), 4);

        let tree = forest.tree(2).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.level_count(), 3);
        assert_eq!(tree.score_bounds_among_top(5, 2), (1, 2));
        let avg = tree.average_level_of_top(3).unwrap();
        assert!((avg - 11. / 3.).abs() < 1e-9);

        // records of the absorbed group are reachable through either id
        forest.remove(&Record::new(3, 2, 9).with_level(3)).unwrap();
        assert_eq!(forest.tree(1).unwrap().len(), 3);
        assert_eq!(forest.group_len(1).unwrap(), 3);
    }

    #[test]
    fn test_insert_unknown_group() {
        let mut forest = DisjointGroupForest::new(2, 10);
        assert_eq!(
            forest.insert(&Record::new(1, 3, 1)),
            Err(Error::GroupNotFound(3))
        );
        forest.insert(&Record::new(1, 2, 1)).unwrap();
        assert_eq!(
            forest.remove(&Record::new(1, 2, 4)),
            Err(Error::RecordNotFound(1))
        );
        assert_eq!(forest.group_len(2).unwrap(), 1);
        assert_eq!(forest.group_len(1).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn prop_matches_naive_partition(
            unions in prop::collection::vec((1..=12usize, 1..=12usize), 0..40),
        ) {
            let mut forest = DisjointGroupForest::new(12, 4);
            for id in 1..=12u64 {
                let group = id as usize;
                forest.insert(&Record::new(id, group, group % 4).with_level(id % 5)).unwrap();
            }

            // naive: label per group, relabel on union
            let mut label = (0..=12usize).collect::<Vec<_>>();
            for (a, b) in unions {
                forest.union(a, b).unwrap();
                let (from, to) = (label[b], label[a]);
                for l in label.iter_mut() {
                    if *l == from {
                        *l = to;
                    }
                }
            }

            for a in 1..=12usize {
                for b in 1..=12usize {
                    let same = label[a] == label[b];
                    prop_assert_eq!(forest.find(a).unwrap() == forest.find(b).unwrap(), same);
                }
                let members = (1..=12usize).filter(|b| label[*b] == label[a]).count();
                prop_assert_eq!(forest.tree(a).unwrap().len(), members);
                prop_assert_eq!(forest.group_len(a).unwrap(), members);
            }
        }
    }
}
