use super::{AugmentedTree, Node};

/// In-order iterator over the nodes of an [`AugmentedTree`], lowest level first
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(tree: &'a AugmentedTree) -> Self {
        let mut me = Self {
            stack: Vec::with_capacity(tree.height() as usize),
        };
        me.push_left_spine(tree.root());
        me
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;

    use crate::{AugmentedTree, Record};

    #[test]
    fn test_iter_in_level_order() {
        let mut levels = (1..200u64).collect::<Vec<_>>();
        levels.shuffle(&mut rand::thread_rng());

        let mut tree = AugmentedTree::new(2);
        for (id, level) in levels.iter().enumerate() {
            tree.insert(&Record::new(id as u64 + 1, 1, 1).with_level(*level))
                .unwrap();
        }

        let visited = tree.iter().map(|n| n.level()).collect::<Vec<_>>();
        assert_eq!(visited, (0..200u64).collect::<Vec<_>>());
    }
}
