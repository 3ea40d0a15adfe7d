use std::fmt::Display;

use crate::{
    error::AutomatonError,
    transition_system::{StateIndex, Target},
    Color, Void, DTS,
};

use super::resolve_word;

/// A Mealy machine is a transition system where each transition has an output. Thus, the output
/// of running a Mealy machine on a word produces a sequence of outputs, one for each transition
/// that is taken. Note that since the empty word does not take any transitions, it does not
/// produce any output. For a word of length `n`, there are `n` outputs.
///
/// Undefined transitions carry the output `None`, every defined transition carries some output.
pub type MealyMachine<O = String> = DTS<Void, Option<O>>;

impl<O: Color> MealyMachine<O> {
    /// Creates a new Mealy machine. The first of the given `states` is the initial state and
    /// `rows` contains one row per state with a cell for every input symbol. A cell is either
    /// `None` if the transition is undefined, or the name of the successor together with the
    /// output that is emitted.
    ///
    /// # Example
    /// ```
    /// use automata_minimize::prelude::*;
    ///
    /// let mealy: MealyMachine = MealyMachine::new(
    ///     ["idle", "busy"],
    ///     ["go", "stop"],
    ///     [
    ///         [Some(("busy", "start")), None],
    ///         [Some(("busy", "wait")), Some(("idle", "halt"))],
    ///     ],
    /// )
    /// .unwrap();
    /// assert_eq!(mealy.output("busy", "stop"), Some(&"halt".to_string()));
    /// assert_eq!(mealy.next("idle", "stop"), Some(Target::Undefined));
    /// ```
    pub fn new<X, Y, R, S, P>(
        states: X,
        inputs: Y,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Self, AutomatonError>
    where
        X: IntoIterator,
        X::Item: Into<String>,
        Y: IntoIterator,
        Y::Item: Into<String>,
        R: IntoIterator<Item = Option<(S, P)>>,
        S: AsRef<str>,
        P: Into<O>,
    {
        let states: Vec<String> = states.into_iter().map(Into::into).collect();
        let state_colors = vec![Void; states.len()];
        Self::assemble(
            states,
            inputs.into_iter().map(Into::into).collect(),
            state_colors,
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| match cell {
                            Some((target, output)) => (Some(target), Some(output.into())),
                            None => (None, None),
                        })
                        .collect()
                })
                .collect(),
        )
    }

    /// Returns the output that is emitted when reading `input` in `state`. Gives `None` if
    /// the state or symbol is unknown or if the transition is undefined.
    pub fn output(&self, state: &str, input: &str) -> Option<&O> {
        let q = self.state_index(state)?;
        let a = self.input_index(input)?;
        self.edge(q, a).and_then(|edge| edge.color().as_ref())
    }

    /// Runs `word` from `origin` and collects the output of every transition that is taken.
    /// The run ends early if a transition is undefined or a symbol does not belong to the
    /// alphabet.
    pub fn transduce_from<W, S>(&self, origin: StateIndex, word: W) -> Vec<&O>
    where
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outputs = vec![];
        let mut q = origin;
        for a in resolve_word(self, word) {
            let Some(edge) = self.edge(q, a) else {
                break;
            };
            let (Target::State(p), Some(output)) = (edge.target(), edge.color()) else {
                break;
            };
            outputs.push(output);
            q = p;
        }
        outputs
    }

    /// Same as [`Self::transduce_from`], starting in the initial state.
    pub fn transduce<W, S>(&self, word: W) -> Vec<&O>
    where
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.transduce_from(self.initial(), word)
    }
}

impl<O: Color + Display> Display for MealyMachine<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.build_transition_table(
                |q, _| self.states()[q].clone(),
                |edge| match (edge.target(), edge.color()) {
                    (Target::State(p), Some(o)) => format!("{}/{o}", self.states()[p]),
                    (target, _) => self.show_target(target),
                }
            )
        )
    }
}
