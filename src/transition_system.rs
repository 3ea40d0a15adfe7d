use std::fmt::Debug;

use itertools::Itertools;

use crate::{error::AutomatonError, Color, Map};

/// Contains the breadth-first search over a [`DTS`] and the pruning of unreachable states.
pub mod reachable;

/// States of a [`DTS`] are addressed by their position in declaration order.
pub type StateIndex = usize;
/// Input symbols of a [`DTS`] are addressed by their position in the alphabet.
pub type InputIndex = usize;

/// The target of a transition. A transition either leads to some state or it is undefined,
/// meaning the machine has no outgoing edge for that state/symbol pair. The two are never
/// interchangeable, in particular an undefined target is not a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target<Q = StateIndex> {
    /// The transition leads to the given state.
    State(Q),
    /// There is no transition.
    Undefined,
}

impl<Q> Target<Q> {
    /// Returns the state that is reached, or `None` if the transition is undefined.
    pub fn state(self) -> Option<Q> {
        match self {
            Target::State(q) => Some(q),
            Target::Undefined => None,
        }
    }

    /// Applies `f` to the reached state, keeping undefined targets undefined.
    pub fn map<P, F: FnOnce(Q) -> P>(self, f: F) -> Target<P> {
        match self {
            Target::State(q) => Target::State(f(q)),
            Target::Undefined => Target::Undefined,
        }
    }
}

impl<Q> From<Option<Q>> for Target<Q> {
    fn from(value: Option<Q>) -> Self {
        value.map(Target::State).unwrap_or(Target::Undefined)
    }
}

/// An edge of a [`DTS`], consisting of the [`Target`] and the color that is emitted when
/// the edge is taken.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<C> {
    target: Target,
    color: C,
}

impl<C> Edge<C> {
    /// Creates a new edge leading to `target` and emitting `color`.
    pub fn new(target: Target, color: C) -> Self {
        Self { target, color }
    }

    /// Where the edge leads.
    pub fn target(&self) -> Target {
        self.target
    }

    /// The color that is emitted on the edge.
    pub fn color(&self) -> &C {
        &self.color
    }
}

/// A deterministic transition system with named states, a named input alphabet, a color of
/// type `Q` on every state and a color of type `C` on every edge. For every state and input
/// symbol there is exactly one [`Edge`], which may however lead to [`Target::Undefined`].
///
/// The first declared state is the initial state. Instances are never modified once they
/// are built, all transformations (see [`DTS::prune`], [`DTS::quotient`], [`DTS::minimize`])
/// produce a new [`DTS`].
#[derive(Clone, PartialEq, Eq)]
pub struct DTS<Q, C> {
    states: Vec<String>,
    state_lookup: Map<String, StateIndex>,
    inputs: Vec<String>,
    input_lookup: Map<String, InputIndex>,
    state_colors: Vec<Q>,
    edges: Vec<Vec<Edge<C>>>,
}

/// Builds the lookup from names to positions, failing if a name occurs twice.
fn index_names(names: &[String], what: &str) -> Result<Map<String, usize>, AutomatonError> {
    let mut lookup = Map::default();
    for (i, name) in names.iter().enumerate() {
        if lookup.insert(name.clone(), i).is_some() {
            return Err(AutomatonError::malformed(format!(
                "{what} `{name}` is declared more than once"
            )));
        }
    }
    Ok(lookup)
}

impl<Q: Color, C: Color> DTS<Q, C> {
    /// Validates and assembles a transition system from named parts. There must be one
    /// row per state and every row must contain one cell per input symbol. A cell is the name
    /// of the target state (or `None` if the transition is undefined) together with the
    /// edge color.
    pub(crate) fn assemble<S: AsRef<str>>(
        states: Vec<String>,
        inputs: Vec<String>,
        state_colors: Vec<Q>,
        rows: Vec<Vec<(Option<S>, C)>>,
    ) -> Result<Self, AutomatonError> {
        if states.is_empty() {
            return Err(AutomatonError::malformed("no states are declared"));
        }
        if states.iter().any(String::is_empty) {
            return Err(AutomatonError::malformed("state names must not be empty"));
        }
        if state_colors.len() != states.len() {
            return Err(AutomatonError::malformed(format!(
                "{} states are declared but {} outputs are given",
                states.len(),
                state_colors.len()
            )));
        }
        if rows.len() != states.len() {
            return Err(AutomatonError::malformed(format!(
                "{} states are declared but the transition table has {} rows",
                states.len(),
                rows.len()
            )));
        }
        if let Some((q, row)) = rows.iter().find_position(|row| row.len() != inputs.len()) {
            return Err(AutomatonError::malformed(format!(
                "row of state `{}` has {} entries but the alphabet has {} symbols",
                states[q],
                row.len(),
                inputs.len()
            )));
        }

        let state_lookup = index_names(&states, "state")?;
        let input_lookup = index_names(&inputs, "input symbol")?;

        let mut edges = Vec::with_capacity(rows.len());
        for (q, row) in rows.into_iter().enumerate() {
            let mut resolved = Vec::with_capacity(row.len());
            for (a, (target, color)) in row.into_iter().enumerate() {
                let target = match target {
                    None => Target::Undefined,
                    Some(name) => match state_lookup.get(name.as_ref()) {
                        Some(&p) => Target::State(p),
                        None => {
                            return Err(AutomatonError::UnknownStateReference {
                                state: states[q].clone(),
                                input: inputs[a].clone(),
                                target: name.as_ref().to_string(),
                            })
                        }
                    },
                };
                resolved.push(Edge::new(target, color));
            }
            edges.push(resolved);
        }

        Ok(Self {
            states,
            state_lookup,
            inputs,
            input_lookup,
            state_colors,
            edges,
        })
    }

    /// Builds a transition system from parts that are known to be consistent, i.e. names are
    /// unique, there is one row of edges per state with one edge per input and every target is
    /// in range. Used by the transformations, which preserve these properties.
    pub(crate) fn from_parts(
        states: Vec<String>,
        inputs: Vec<String>,
        state_colors: Vec<Q>,
        edges: Vec<Vec<Edge<C>>>,
    ) -> Self {
        debug_assert!(!states.is_empty());
        debug_assert_eq!(states.len(), state_colors.len());
        debug_assert_eq!(states.len(), edges.len());
        debug_assert!(edges.iter().flatten().all(|e| match e.target() {
            Target::State(p) => p < states.len(),
            Target::Undefined => true,
        }));
        let state_lookup = states
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let input_lookup = inputs
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            states,
            state_lookup,
            inputs,
            input_lookup,
            state_colors,
            edges,
        }
    }
}

impl<Q, C> DTS<Q, C> {
    /// The names of all states in declaration order.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// The input symbols in the order in which they were declared.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Iterates over the indices of all states.
    pub fn state_indices(&self) -> std::ops::Range<StateIndex> {
        0..self.states.len()
    }

    /// The initial state, which is always the first declared state.
    pub fn initial(&self) -> StateIndex {
        0
    }

    /// Looks up the index of the state called `name`.
    pub fn state_index(&self, name: &str) -> Option<StateIndex> {
        self.state_lookup.get(name).copied()
    }

    /// Looks up the index of the input symbol `name`.
    pub fn input_index(&self, name: &str) -> Option<InputIndex> {
        self.input_lookup.get(name).copied()
    }

    /// Returns the name of the state with index `q`.
    pub fn state_name(&self, q: StateIndex) -> Option<&str> {
        self.states.get(q).map(String::as_str)
    }

    /// Returns the color of the state with index `q`.
    pub fn state_color(&self, q: StateIndex) -> Option<&Q> {
        self.state_colors.get(q)
    }

    /// Returns the edge leaving `q` on the input with index `a`.
    pub fn edge(&self, q: StateIndex, a: InputIndex) -> Option<&Edge<C>> {
        self.edges.get(q).and_then(|row| row.get(a))
    }

    /// Returns all edges leaving `q`, ordered like the alphabet.
    pub fn edges_from(&self, q: StateIndex) -> Option<&[Edge<C>]> {
        self.edges.get(q).map(Vec::as_slice)
    }

    /// Returns the [`Target`] of the transition from `q` on the input with index `a`. If
    /// either index is out of range, the transition is considered to be undefined.
    pub fn successor(&self, q: StateIndex, a: InputIndex) -> Target {
        self.edge(q, a)
            .map(Edge::target)
            .unwrap_or(Target::Undefined)
    }

    /// Name based variant of [`Self::successor`]. Returns `None` if `state` or `input` is
    /// not known, otherwise the name of the reached state or [`Target::Undefined`].
    pub fn next(&self, state: &str, input: &str) -> Option<Target<&str>> {
        let q = self.state_index(state)?;
        let a = self.input_index(input)?;
        Some(self.successor(q, a).map(|p| self.states[p].as_str()))
    }

    /// Returns a string representation of the transition table, with one row per state and
    /// one column per input symbol.
    pub(crate) fn build_transition_table<SD, ED>(
        &self,
        state_decorator: SD,
        edge_decorator: ED,
    ) -> String
    where
        SD: Fn(StateIndex, &Q) -> String,
        ED: Fn(&Edge<C>) -> String,
    {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(std::iter::once("State".to_string()).chain(self.inputs.iter().cloned()));
        for q in self.state_indices() {
            let mut row = vec![state_decorator(q, &self.state_colors[q])];
            row.extend(self.edges[q].iter().map(&edge_decorator));
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }

    /// Renders a target as the name of the state it leads to, or `-` if undefined.
    pub(crate) fn show_target(&self, target: Target) -> String {
        match target {
            Target::State(p) => self.states[p].clone(),
            Target::Undefined => "-".to_string(),
        }
    }
}

impl<Q: Debug, C: Debug> Debug for DTS<Q, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{}",
            self.build_transition_table(
                |q, color| format!("{} {:?}", self.states[q], color),
                |edge| format!("{} {:?}", self.show_target(edge.target()), edge.color())
            )
        )
    }
}
