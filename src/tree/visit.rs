use super::{AugmentedTree, Node};

pub enum DescendVisitResult<R> {
    GoLeft,
    GoRight,
    /// The visit is completed, R will be returned
    /// This is used in cases that the result can be determined without reaching the bottom.
    Complete(R),
}

/// This kind visit is used to visit the tree from root towards a leaf, each layer visit one node.
/// Mainly used as search like visit. Each node chooses at most one child to visit.
/// Time complexity for this visit is log(levels)
pub trait DescendVisit {
    type Result;

    fn visit_node(&mut self, node: &Node) -> DescendVisitResult<Self::Result>;

    /// Called when the chosen child does not exist
    fn visit_empty(self) -> Option<Self::Result>;
}

impl AugmentedTree {
    pub fn descend_visit<V>(&self, mut v: V) -> Option<V::Result>
    where
        V: DescendVisit,
    {
        let mut node = self.root.as_deref();
        while let Some(n) = node {
            node = match v.visit_node(n) {
                DescendVisitResult::GoLeft => n.left(),
                DescendVisitResult::GoRight => n.right(),
                DescendVisitResult::Complete(r) => return Some(r),
            };
        }
        v.visit_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Level, Record};

    /// Finds the smallest level strictly greater than `target`
    struct Successor {
        target: Level,
        best: Option<Level>,
    }

    impl DescendVisit for Successor {
        type Result = Level;

        fn visit_node(&mut self, node: &Node) -> DescendVisitResult<Level> {
            if node.level() > self.target {
                self.best = Some(node.level());
                DescendVisitResult::GoLeft
            } else {
                DescendVisitResult::GoRight
            }
        }

        fn visit_empty(self) -> Option<Level> {
            self.best
        }
    }

    #[test]
    fn test_descend_visit() {
        let mut tree = AugmentedTree::new(4);
        for (id, level) in [(1, 10), (2, 20), (3, 30), (4, 40)] {
            tree.insert(&Record::new(id, 1, 0).with_level(level)).unwrap();
        }

        let visit = |target| tree.descend_visit(Successor { target, best: None });
        assert_eq!(visit(0), Some(10));
        assert_eq!(visit(15), Some(20));
        assert_eq!(visit(30), Some(40));
        assert_eq!(visit(40), None);
    }
}
