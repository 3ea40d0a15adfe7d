mod partition_refinement;
pub use partition_refinement::PartitionRefinement;

mod quotient;

use tracing::debug;

use crate::{
    error::AutomatonError, math::Partition, transition_system::StateIndex, Color, DTS,
};

impl<Q: Color, C: Color> DTS<Q, C> {
    /// Returns the unique minimal machine that produces the same outputs as `self` from the
    /// initial state. Unreachable states are removed first, then the remaining states are
    /// partitioned into classes of equivalent states (see [`Self::refine`]) and finally every
    /// class is collapsed into a single state (see [`Self::quotient`]). The states of the
    /// result are called `X1`, `X2`, ... where `X1` is the initial state.
    ///
    /// # Example
    /// ```
    /// use automata_minimize::prelude::*;
    ///
    /// let moore: MooreMachine = MooreMachine::new(
    ///     ["q0", "q1", "q2"],
    ///     ["a", "b"],
    ///     [Some("0"), Some("0"), Some("1")],
    ///     [
    ///         [Some("q1"), Some("q2")],
    ///         [Some("q1"), Some("q2")],
    ///         [Some("q1"), Some("q2")],
    ///     ],
    /// )
    /// .unwrap();
    /// let minimal = moore.minimize().unwrap();
    /// assert_eq!(minimal.states(), ["X1", "X2"]);
    /// assert_eq!(minimal.next("X1", "b"), Some(Target::State("X2")));
    /// ```
    pub fn minimize(&self) -> Result<Self, AutomatonError> {
        let pruned = self.prune();
        let partition = pruned.refine();
        pruned.quotient(&partition)
    }

    /// Computes the coarsest partition of the states of `self` such that two states are in the
    /// same class if and only if they emit the same outputs and, for every input symbol, their
    /// transitions lead into the same class. An undefined transition only agrees with another
    /// undefined transition.
    ///
    /// Classes are ordered by their first member in declaration order, in particular the
    /// initial state is always in the first class. Each class lists its members in
    /// declaration order.
    pub fn refine(&self) -> Partition<StateIndex> {
        let mut partition = partition_refinement::initial_partition(self);
        let mut rounds = 0;
        while let Some(refined) = partition_refinement::refine_round(self, &partition) {
            partition = refined;
            rounds += 1;
        }
        debug!(
            "partition refinement converged to {} classes of {} states after {} splitting rounds",
            partition.size(),
            self.size(),
            rounds
        );
        partition
    }

    /// Performs a single round of partition refinement on `partition`. Returns the refined
    /// partition, or `None` if no class is split, in which case `partition` is a congruence.
    pub fn refine_round(
        &self,
        partition: &Partition<StateIndex>,
    ) -> Option<Partition<StateIndex>> {
        partition_refinement::refine_round(self, partition)
    }

    /// Returns an iterator over the partitions that are computed by [`Self::refine`], starting
    /// with the initial one.
    pub fn partition_refinement(&self) -> PartitionRefinement<'_, Q, C> {
        PartitionRefinement::new(self)
    }
}
