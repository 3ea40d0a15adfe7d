use std::{collections::BTreeSet, hash::Hash};

pub use crate::{Map, Set};

/// A partition is a different view on a congruence relation, by grouping elements of
/// type `I` into their respective classes under the relation.
///
/// The classes are kept in a fixed order and every class is ordered as well. Operations
/// that care about reproducibility, such as naming the classes of a minimized machine,
/// rely on this order.
#[derive(Debug, Clone)]
pub struct Partition<I: Hash + Eq>(Vec<BTreeSet<I>>);

impl<I: Hash + Eq> std::ops::Deref for Partition<I> {
    type Target = Vec<BTreeSet<I>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, I: Hash + Eq> IntoIterator for &'a Partition<I> {
    type Item = &'a BTreeSet<I>;
    type IntoIter = std::slice::Iter<'a, BTreeSet<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I: Hash + Eq> PartialEq for Partition<I> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|o| other.contains(o))
    }
}
impl<I: Hash + Eq> Eq for Partition<I> {}

impl<I: Hash + Eq + Ord> Partition<I> {
    /// Returns the size of the partition, i.e. the number of classes.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Builds a new partition from an iterator that yields iterators
    /// which yield elements of type `I`. Empty classes are dropped.
    pub fn new<X: IntoIterator<Item = I>, Y: IntoIterator<Item = X>>(iter: Y) -> Self {
        Self(
            iter.into_iter()
                .map(|it| it.into_iter().collect::<BTreeSet<_>>())
                .filter(|class| !class.is_empty())
                .collect(),
        )
    }
}

impl Partition<usize> {
    /// Produces a lookup table that maps each element in `0..universe` to the position of its
    /// class, or to `None` if the element is not covered. The table is computed once and does
    /// not follow later changes to the partition.
    pub fn class_index(&self, universe: usize) -> Vec<Option<usize>> {
        let mut index = vec![None; universe];
        for (id, class) in self.0.iter().enumerate() {
            for &q in class {
                if let Some(slot) = index.get_mut(q) {
                    *slot = Some(id);
                }
            }
        }
        index
    }
}

impl<I: Hash + Eq + Ord> From<Vec<BTreeSet<I>>> for Partition<I> {
    fn from(value: Vec<BTreeSet<I>>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Partition;

    #[test]
    fn partition_equality_ignores_class_order() {
        let left = Partition::new([vec![0, 2], vec![1]]);
        let right = Partition::new([vec![1], vec![2, 0]]);
        assert_eq!(left, right);
        assert_ne!(left, Partition::new([vec![0], vec![1], vec![2]]));
    }

    #[test]
    fn class_index_snapshot() {
        let partition = Partition::new([vec![3, 0], vec![1], vec![]]);
        assert_eq!(partition.size(), 2);
        assert_eq!(
            partition.class_index(5),
            vec![Some(0), Some(1), None, Some(0), None]
        );
    }
}
