use std::{collections::BTreeSet, hash::Hash};

use tracing::trace;

use crate::{
    math::{Map, Partition},
    transition_system::{Edge, StateIndex, Target},
    Color, DTS,
};

/// The class that a transition leads into, as seen from the partition at the start of a
/// refinement round. Undefined transitions, and transitions into states that the partition
/// does not cover, lead into a block of their own that differs from every class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Block {
    Class(usize),
    Undefined,
}

impl Block {
    pub(crate) fn of(snapshot: &[Option<usize>], target: Target) -> Self {
        match target.state().and_then(|p| snapshot.get(p).copied().flatten()) {
            Some(class) => Block::Class(class),
            None => Block::Undefined,
        }
    }
}

/// Groups `members` by the value of `key`. Groups appear in the order in which their first
/// member is encountered in `members`.
fn split_by<K, F>(
    members: impl IntoIterator<Item = StateIndex>,
    mut key: F,
) -> Vec<BTreeSet<StateIndex>>
where
    K: Hash + Eq,
    F: FnMut(StateIndex) -> K,
{
    let mut positions: Map<K, usize> = Map::default();
    let mut groups: Vec<BTreeSet<StateIndex>> = vec![];
    for q in members {
        let position = *positions.entry(key(q)).or_insert_with(|| {
            groups.push(BTreeSet::new());
            groups.len() - 1
        });
        groups[position].insert(q);
    }
    groups
}

/// Groups the states of `ts` by what can be observed without reading any input, i.e. the
/// color of the state together with the colors of all outgoing edges in alphabet order. For a
/// Moore machine this is the output of the state, for a Mealy machine it is the sequence of
/// outputs on the outgoing transitions.
pub(crate) fn initial_partition<Q: Color, C: Color>(ts: &DTS<Q, C>) -> Partition<StateIndex> {
    let groups = split_by(ts.state_indices(), |q| {
        (
            ts.state_color(q),
            ts.edges_from(q)
                .unwrap_or_default()
                .iter()
                .map(Edge::color)
                .collect::<Vec<_>>(),
        )
    });
    Partition::from(groups)
}

/// Performs a single refinement round. Every class is split according to the signatures of
/// its members, where the signature of a state lists for each input symbol the emitted edge
/// color and the [`Block`] that the transition leads into. Blocks are looked up in a snapshot
/// of `partition` that is taken once before any signature is computed.
///
/// Returns `None` if no class was split, which means `partition` is stable.
pub(crate) fn refine_round<Q: Color, C: Color>(
    ts: &DTS<Q, C>,
    partition: &Partition<StateIndex>,
) -> Option<Partition<StateIndex>> {
    let snapshot = partition.class_index(ts.size());
    let signature = |q: StateIndex| {
        ts.edges_from(q)
            .unwrap_or_default()
            .iter()
            .map(|edge| (edge.color(), Block::of(&snapshot, edge.target())))
            .collect::<Vec<_>>()
    };

    let mut split = false;
    let mut refined = Vec::with_capacity(partition.size());
    for (id, class) in partition.iter().enumerate() {
        let groups = split_by(class.iter().copied(), &signature);
        if groups.len() > 1 {
            trace!("class {id} {class:?} splits into {groups:?}");
            split = true;
        }
        refined.extend(groups);
    }

    split.then(|| Partition::from(refined))
}

#[derive(Debug, Clone)]
enum Progress {
    Start,
    Running(Partition<StateIndex>),
    Done,
}

/// Iterator over the partitions that are computed during partition refinement. The first
/// item is the initial partition, which groups states by their immediately observable
/// outputs. Every further item is the result of a round that split at least one class. The
/// iterator ends as soon as a round leaves every class intact, the last partition that was
/// produced is then the coarsest congruence.
///
/// Since every round that does not end the iteration splits at least one class, there are at
/// most as many items as `ts` has states.
#[derive(Debug, Clone)]
pub struct PartitionRefinement<'a, Q, C> {
    ts: &'a DTS<Q, C>,
    progress: Progress,
}

impl<'a, Q, C> PartitionRefinement<'a, Q, C> {
    /// Starts the refinement of the states of `ts`.
    pub fn new(ts: &'a DTS<Q, C>) -> Self {
        Self {
            ts,
            progress: Progress::Start,
        }
    }
}

impl<'a, Q: Color, C: Color> Iterator for PartitionRefinement<'a, Q, C> {
    type Item = Partition<StateIndex>;

    fn next(&mut self) -> Option<Self::Item> {
        let partition = match std::mem::replace(&mut self.progress, Progress::Done) {
            Progress::Start => initial_partition(self.ts),
            Progress::Running(current) => refine_round(self.ts, &current)?,
            Progress::Done => return None,
        };
        self.progress = Progress::Running(partition.clone());
        Some(partition)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use super::{initial_partition, refine_round, Block};

    #[test]
    fn blocks_distinguish_undefined() {
        let snapshot = [Some(0), Some(1), None];
        assert_eq!(Block::of(&snapshot, Target::State(1)), Block::Class(1));
        assert_eq!(Block::of(&snapshot, Target::Undefined), Block::Undefined);
        assert_eq!(Block::of(&snapshot, Target::State(2)), Block::Undefined);
        assert_eq!(Block::of(&snapshot, Target::State(17)), Block::Undefined);
    }

    #[test]
    fn initial_partition_of_moore_groups_by_output() {
        let moore: MooreMachine = MooreMachine::new(
            ["q0", "q1", "q2", "q3"],
            ["a"],
            [Some("1"), None, Some("0"), Some("1")],
            [[None::<&str>], [None], [None], [None]],
        )
        .unwrap();
        let partition = initial_partition(&moore);
        assert_eq!(
            partition.iter().map(|c| c.iter().copied().collect()).collect::<Vec<Vec<_>>>(),
            vec![vec![0, 3], vec![1], vec![2]]
        );
    }

    #[test]
    fn initial_partition_of_mealy_groups_by_output_signature() {
        let mealy = crate::tests::partial_mealy();
        let partition = initial_partition(&mealy);
        // s1 and s3 emit 1/0, s2 emits 1 and nothing, s4 emits 0/0
        assert_eq!(
            partition,
            Partition::new([vec![0], vec![1, 3], vec![2], vec![4]])
        );
    }

    #[test]
    fn rounds_use_the_partition_from_the_start_of_the_round() {
        // {q0, q1} splits on `b`, q2 and q3 move on `a` into q0 and q1 respectively and
        // must stay together since both lead into the old class of q0 and q1
        let moore: MooreMachine = MooreMachine::new(
            ["q0", "q1", "q2", "q3"],
            ["a", "b"],
            [Some("0"), Some("0"), Some("0"), Some("0")],
            [
                [Some("q0"), None],
                [Some("q0"), Some("q1")],
                [Some("q0"), Some("q2")],
                [Some("q1"), Some("q2")],
            ],
        )
        .unwrap();
        let partition = Partition::new([vec![0, 1], vec![2, 3]]);
        let refined = refine_round(&moore, &partition).unwrap();
        assert_eq!(
            refined.iter().map(|c| c.iter().copied().collect()).collect::<Vec<Vec<_>>>(),
            vec![vec![0], vec![1], vec![2, 3]]
        );
    }

    #[test]
    fn chain_loses_one_state_per_round() {
        // a chain that ends in an undefined transition, every round separates exactly one
        // more state from the end of the chain
        let moore: MooreMachine = MooreMachine::new(
            ["q0", "q1", "q2", "q3"],
            ["a"],
            [Some("0"), Some("0"), Some("0"), Some("0")],
            [[Some("q1")], [Some("q2")], [Some("q3")], [None]],
        )
        .unwrap();
        let initial = initial_partition(&moore);
        assert_eq!(initial.size(), 1);
        let first = refine_round(&moore, &initial).unwrap();
        assert_eq!(first, Partition::new([vec![0, 1, 2], vec![3]]));
        let second = refine_round(&moore, &first).unwrap();
        assert_eq!(second, Partition::new([vec![0, 1], vec![2], vec![3]]));
        let third = refine_round(&moore, &second).unwrap();
        assert_eq!(third.size(), 4);
        assert!(refine_round(&moore, &third).is_none());
    }

    #[test]
    fn refinement_iterator_is_monotone() {
        let moore: MooreMachine = MooreMachine::new(
            ["q0", "q1", "q2", "q3", "q4"],
            ["a", "b"],
            [Some("0"), Some("0"), Some("0"), Some("0"), Some("1")],
            [
                [Some("q1"), Some("q2")],
                [Some("q1"), Some("q3")],
                [Some("q1"), Some("q2")],
                [Some("q1"), Some("q4")],
                [Some("q1"), Some("q2")],
            ],
        )
        .unwrap();
        let rounds: Vec<_> = PartitionRefinement::new(&moore).collect();
        assert!(rounds.len() <= moore.size());
        for window in rounds.windows(2) {
            assert!(window[0].size() < window[1].size());
            // every class of the later partition lies within a class of the earlier one
            for class in window[1].iter() {
                assert!(window[0].iter().any(|c| class.is_subset(c)));
            }
        }
        assert_eq!(rounds.last().unwrap(), &moore.refine());
        assert_eq!(moore.refine().size(), 4);
    }
}
