use std::collections::VecDeque;

use tracing::debug;

use crate::{math::Set, Color};

use super::{Edge, StateIndex, DTS};

/// Allows iterating over the reachable states of a transition system. States are produced
/// in breadth-first order, starting with the origin. Undefined transitions are skipped, so
/// they never contribute anything to the reachable set.
#[derive(Debug, Clone)]
pub struct Reachable<'a, Q, C> {
    ts: &'a DTS<Q, C>,
    seen: Set<StateIndex>,
    queue: VecDeque<StateIndex>,
}

impl<'a, Q, C> Reachable<'a, Q, C> {
    /// Creates a new iterator that will yield the states of `ts` that are reachable from `origin`.
    /// If `origin` does not exist, nothing is yielded.
    pub fn new(ts: &'a DTS<Q, C>, origin: StateIndex) -> Self {
        let mut seen = Set::with_capacity_and_hasher(ts.size(), Default::default());
        let mut queue = VecDeque::with_capacity(ts.size());
        if origin < ts.size() {
            seen.insert(origin);
            queue.push_back(origin);
        }
        Self { ts, seen, queue }
    }
}

impl<'a, Q, C> Iterator for Reachable<'a, Q, C> {
    type Item = StateIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let q = self.queue.pop_front()?;
        for edge in self.ts.edges_from(q).unwrap_or_default() {
            if let Some(p) = edge.target().state() {
                if self.seen.insert(p) {
                    self.queue.push_back(p);
                }
            }
        }
        Some(q)
    }
}

impl<Q, C> DTS<Q, C> {
    /// Returns an iterator over the states that are reachable from the initial state.
    pub fn reachable_state_indices(&self) -> Reachable<'_, Q, C> {
        self.reachable_state_indices_from(self.initial())
    }

    /// Returns an iterator over the states that are reachable from `origin`.
    pub fn reachable_state_indices_from(&self, origin: StateIndex) -> Reachable<'_, Q, C> {
        Reachable::new(self, origin)
    }
}

impl<Q: Color, C: Color> DTS<Q, C> {
    /// Returns a copy of `self` that is restricted to the states reachable from the initial
    /// state. The remaining states keep their names, colors and relative order, the alphabet
    /// is left untouched. Unreachable states are dropped silently.
    pub fn prune(&self) -> Self {
        let mut reachable = vec![false; self.size()];
        for q in self.reachable_state_indices() {
            reachable[q] = true;
        }

        let mut remap = vec![None; self.size()];
        let mut kept = Vec::with_capacity(self.size());
        for q in self.state_indices().filter(|&q| reachable[q]) {
            remap[q] = Some(kept.len());
            kept.push(q);
        }
        if kept.len() < self.size() {
            debug!(
                "pruned {} of {} states as unreachable",
                self.size() - kept.len(),
                self.size()
            );
        }

        let states = kept.iter().map(|&q| self.states[q].clone()).collect();
        let state_colors = kept.iter().map(|&q| self.state_colors[q].clone()).collect();
        let edges = kept
            .iter()
            .map(|&q| {
                self.edges[q]
                    .iter()
                    .map(|edge| {
                        debug_assert!(edge.target().state().map_or(true, |p| reachable[p]));
                        let target = edge.target().state().and_then(|p| remap[p]).into();
                        Edge::new(target, edge.color().clone())
                    })
                    .collect()
            })
            .collect();

        Self::from_parts(states, self.inputs.clone(), state_colors, edges)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;

    #[test]
    fn reachable_states() {
        let moore: MooreMachine = MooreMachine::new(
            ["q0", "q1", "q2", "q3"],
            ["a", "b"],
            [Some("0"), Some("1"), Some("0"), Some("1")],
            [
                [Some("q2"), None],
                [Some("q0"), Some("q3")],
                [Some("q2"), Some("q0")],
                [Some("q1"), Some("q1")],
            ],
        )
        .unwrap();

        assert_eq!(moore.reachable_state_indices().collect_vec(), vec![0, 2]);
        assert_eq!(
            moore.reachable_state_indices_from(1).collect_vec(),
            vec![1, 0, 3, 2]
        );
        assert_eq!(moore.reachable_state_indices_from(7).count(), 0);
    }

    #[test_log::test]
    fn prune_drops_unreachable_states() {
        let mealy = crate::tests::partial_mealy();
        let pruned = mealy.prune();
        assert_eq!(pruned.states(), ["s0", "s1", "s2", "s3"]);
        assert_eq!(pruned.inputs(), mealy.inputs());
        assert_eq!(pruned.next("s0", "y"), Some(Target::State("s2")));
        assert_eq!(pruned.next("s2", "y"), Some(Target::Undefined));
        assert_eq!(pruned.output("s3", "x"), Some(&"1".to_string()));
        for q in pruned.state_indices() {
            let name = pruned.state_name(q).unwrap();
            assert!(pruned
                .reachable_state_indices()
                .any(|p| pruned.state_name(p) == Some(name)));
        }
    }

    #[test]
    fn prune_preserves_declaration_order() {
        // BFS discovers q2 before q1, the pruned machine must still list q1 first.
        let moore: MooreMachine = MooreMachine::new(
            ["q0", "q1", "q2", "dead"],
            ["a"],
            [Some("x"), Some("y"), Some("z"), Some("x")],
            [[Some("q2")], [Some("q1")], [Some("q1")], [Some("q0")]],
        )
        .unwrap();
        let pruned = moore.prune();
        assert_eq!(pruned.states(), ["q0", "q1", "q2"]);
        assert_eq!(pruned.next("q0", "a"), Some(Target::State("q2")));
        assert_eq!(pruned.output_of("q2"), Some(&"z".to_string()));
        assert_eq!(pruned.output_of("dead"), None);
    }

    #[test]
    fn prune_trivial_cases() {
        let lonely: MooreMachine = MooreMachine::new(
            ["q0", "q1"],
            ["a", "b"],
            [Some("0"), Some("1")],
            [[None, None], [Some("q0"), Some("q1")]],
        )
        .unwrap();
        assert_eq!(lonely.prune().states(), ["q0"]);

        let single: MooreMachine =
            MooreMachine::new(["q"], ["a"], [Some("0")], [[Some("q")]]).unwrap();
        assert_eq!(single.prune(), single);
    }
}
