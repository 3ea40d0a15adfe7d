use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    error::AutomatonError,
    math::Partition,
    transition_system::{Edge, StateIndex},
    Color, DTS,
};

use super::partition_refinement::Block;

impl<Q: Color, C: Color> DTS<Q, C> {
    /// Collapses every class of `partition` into a single state. The classes are named `X1`,
    /// `X2`, ... in the order in which they appear in `partition`, except that the class of the
    /// initial state always becomes `X1` so that it is the initial state of the result. For
    /// partitions computed by [`DTS::refine`] this class is already the first one.
    ///
    /// Each class is represented by its first member in declaration order. The state color and
    /// the edges of a class are those of the representative, where the target of every edge is
    /// replaced by the class that contains it.
    ///
    /// Fails with [`AutomatonError::InconsistentPartition`] if the partition does not cover
    /// each state exactly once, or if some state disagrees with the representative of its class
    /// on a color or on the class that a transition leads into.
    pub fn quotient(&self, partition: &Partition<StateIndex>) -> Result<Self, AutomatonError> {
        let mut classes: Vec<&BTreeSet<StateIndex>> =
            partition.iter().filter(|class| !class.is_empty()).collect();
        if let Some(pos) = classes.iter().position(|class| class.contains(&self.initial())) {
            let initial = classes.remove(pos);
            classes.insert(0, initial);
        }

        let mut owner: Vec<Option<usize>> = vec![None; self.size()];
        for (id, class) in classes.iter().enumerate() {
            for &q in class.iter() {
                let Some(slot) = owner.get_mut(q) else {
                    return Err(AutomatonError::InconsistentPartition {
                        class: Some(id),
                        state: format!("#{q}"),
                    });
                };
                if slot.is_some() {
                    return Err(self.inconsistent(Some(id), q));
                }
                *slot = Some(id);
            }
        }
        if let Some(q) = owner.iter().position(Option::is_none) {
            return Err(self.inconsistent(None, q));
        }

        let mut state_colors = Vec::with_capacity(classes.len());
        let mut edges = Vec::with_capacity(classes.len());
        for (id, class) in classes.iter().enumerate() {
            let mut members = class.iter().copied();
            let Some(representative) = members.next() else {
                continue;
            };
            let rep_color = self.state_color(representative);
            let rep_edges = self.edges_from(representative).unwrap_or_default();

            for q in members {
                let agrees = self.state_color(q) == rep_color
                    && self
                        .edges_from(q)
                        .unwrap_or_default()
                        .iter()
                        .zip(rep_edges)
                        .all(|(e, r)| {
                            e.color() == r.color()
                                && Block::of(&owner, e.target())
                                    == Block::of(&owner, r.target())
                        });
                if !agrees {
                    return Err(self.inconsistent(Some(id), q));
                }
            }

            let Some(rep_color) = rep_color.cloned() else {
                return Err(self.inconsistent(Some(id), representative));
            };
            state_colors.push(rep_color);
            edges.push(
                rep_edges
                    .iter()
                    .map(|edge| {
                        let target = edge.target().state().and_then(|p| owner[p]).into();
                        Edge::new(target, edge.color().clone())
                    })
                    .collect(),
            );
        }

        debug!(
            "collapsed {} states into {} classes",
            self.size(),
            classes.len()
        );

        let names = (1..=classes.len()).map(|i| format!("X{i}")).collect();
        Ok(Self::from_parts(
            names,
            self.inputs().to_vec(),
            state_colors,
            edges,
        ))
    }

    fn inconsistent(&self, class: Option<usize>, q: StateIndex) -> AutomatonError {
        AutomatonError::InconsistentPartition {
            class,
            state: self.state_name(q).unwrap_or_default().to_string(),
        }
    }
}
