use std::fmt::Display;

use crate::{
    error::AutomatonError,
    transition_system::{StateIndex, Target},
    Color, Void, DTS,
};

use super::resolve_word;

/// A Moore machine is a transition system where each state has an output. Thus, the output
/// of running a Moore machine on a word produces a sequence of outputs, one for each state
/// that is visited. For a word of length `n`, there are `n+1` outputs, note in particular
/// that the empty word produces an output, which is in contrast to [`crate::MealyMachine`]s,
/// where the empty word produces no output.
///
/// A state whose output is `None` has no output at all. It is never considered equivalent to a
/// state that has some output.
pub type MooreMachine<O = String> = DTS<Option<O>, Void>;

impl<O: Color> MooreMachine<O> {
    /// Creates a new Moore machine. The first of the given `states` is the initial state.
    /// `outputs` gives the output of each state in the same order, and `rows` contains one
    /// row per state holding the name of the successor for every input symbol, where `None`
    /// marks an undefined transition.
    ///
    /// # Example
    /// ```
    /// use automata_minimize::prelude::*;
    ///
    /// let moore: MooreMachine = MooreMachine::new(
    ///     ["q0", "q1"],
    ///     ["a"],
    ///     [Some("even"), Some("odd")],
    ///     [[Some("q1")], [Some("q0")]],
    /// )
    /// .unwrap();
    /// assert_eq!(moore.output_of("q1"), Some(&"odd".to_string()));
    /// assert_eq!(moore.next("q1", "a"), Some(Target::State("q0")));
    /// ```
    pub fn new<X, Y, P, R, S>(
        states: X,
        inputs: Y,
        outputs: impl IntoIterator<Item = Option<P>>,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Self, AutomatonError>
    where
        X: IntoIterator,
        X::Item: Into<String>,
        Y: IntoIterator,
        Y::Item: Into<String>,
        P: Into<O>,
        R: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        Self::assemble(
            states.into_iter().map(Into::into).collect(),
            inputs.into_iter().map(Into::into).collect(),
            outputs.into_iter().map(|o| o.map(Into::into)).collect(),
            rows.into_iter()
                .map(|row| row.into_iter().map(|target| (target, Void)).collect())
                .collect(),
        )
    }

    /// Returns the output of the state called `state`. Gives `None` if there is no such
    /// state or if the state has no output.
    pub fn output_of(&self, state: &str) -> Option<&O> {
        self.state_index(state)
            .and_then(|q| self.state_color(q))
            .and_then(Option::as_ref)
    }

    /// Runs `word` from `origin` and collects the output of every state that is visited,
    /// including `origin` itself. The run ends early if a transition is undefined or a symbol
    /// does not belong to the alphabet.
    pub fn run_from<W, S>(&self, origin: StateIndex, word: W) -> Vec<Option<&O>>
    where
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(color) = self.state_color(origin) else {
            return vec![];
        };
        let mut outputs = vec![color.as_ref()];
        let mut q = origin;
        for a in resolve_word(self, word) {
            let Target::State(p) = self.successor(q, a) else {
                break;
            };
            q = p;
            outputs.push(self.state_color(q).and_then(Option::as_ref));
        }
        outputs
    }

    /// Same as [`Self::run_from`], starting in the initial state.
    pub fn run<W, S>(&self, word: W) -> Vec<Option<&O>>
    where
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.run_from(self.initial(), word)
    }
}

impl<O: Color + Display> Display for MooreMachine<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.build_transition_table(
                |q, output| match output {
                    Some(o) => format!("{} | {o}", self.states()[q]),
                    None => format!("{} | -", self.states()[q]),
                },
                |edge| self.show_target(edge.target())
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn construction_errors() {
        let empty = MooreMachine::<String>::new(
            Vec::<&str>::new(),
            ["a"],
            Vec::<Option<&str>>::new(),
            Vec::<[Option<&str>; 1]>::new(),
        );
        assert!(matches!(empty, Err(AutomatonError::MalformedAutomaton(_))));

        let short_row: Result<MooreMachine, _> = MooreMachine::new(
            ["q0", "q1"],
            ["a", "b"],
            [Some("0"), Some("1")],
            [vec![Some("q1"), Some("q0")], vec![Some("q1")]],
        );
        assert!(matches!(
            short_row,
            Err(AutomatonError::MalformedAutomaton(_))
        ));

        let missing_output: Result<MooreMachine, _> =
            MooreMachine::new(["q0", "q1"], ["a"], [Some("0")], [[None::<&str>], [None]]);
        assert!(matches!(
            missing_output,
            Err(AutomatonError::MalformedAutomaton(_))
        ));

        let duplicate: Result<MooreMachine, _> =
            MooreMachine::new(
                ["q0", "q0"],
                ["a"],
                [Some("0"), Some("0")],
                [[None::<&str>], [None]],
            );
        assert!(matches!(
            duplicate,
            Err(AutomatonError::MalformedAutomaton(_))
        ));

        let unknown: Result<MooreMachine, _> = MooreMachine::new(
            ["q0", "q1"],
            ["a"],
            [Some("0"), Some("1")],
            [[Some("q1")], [Some("q7")]],
        );
        assert_eq!(
            unknown.unwrap_err(),
            AutomatonError::UnknownStateReference {
                state: "q1".into(),
                input: "a".into(),
                target: "q7".into()
            }
        );
    }

    #[test]
    fn outputs_and_runs() {
        let moore = crate::tests::merging_moore();
        assert_eq!(moore.output_of("q2"), Some(&"1".to_string()));
        assert_eq!(moore.output_of("q9"), None);
        let zero = "0".to_string();
        let one = "1".to_string();
        assert_eq!(
            moore.run(["a", "b", "a"]),
            vec![Some(&zero), Some(&zero), Some(&one), Some(&zero)]
        );
        assert_eq!(moore.run(Vec::<&str>::new()), vec![Some(&zero)]);
        // unknown symbols end the run
        assert_eq!(moore.run(["b", "c", "a"]), vec![Some(&zero), Some(&one)]);
    }

    #[test]
    fn runs_stop_at_undefined_transitions() {
        let moore: MooreMachine = MooreMachine::new(
            ["q0", "q1"],
            ["a"],
            [None, Some("1")],
            [[Some("q1")], [None]],
        )
        .unwrap();
        let one = "1".to_string();
        assert_eq!(moore.run(["a", "a", "a"]), vec![None, Some(&one)]);
        assert_eq!(moore.output_of("q0"), None);
    }

    #[test]
    fn display_lists_every_state() {
        let rendered = crate::tests::merging_moore().to_string();
        assert!(rendered.contains("q0 | 0"));
        assert!(rendered.contains("q2 | 1"));
    }
}
