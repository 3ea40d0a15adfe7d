use thiserror::Error;

/// Errors that can arise when constructing or minimizing a machine.
///
/// [`AutomatonError::MalformedAutomaton`] and [`AutomatonError::UnknownStateReference`] are
/// caused by bad input and are detected when a machine is constructed, i.e. before any
/// minimization work is done. [`AutomatonError::InconsistentPartition`] signals that a
/// partition handed to [`crate::DTS::quotient`] is not a congruence, which cannot happen for
/// partitions produced by [`crate::DTS::refine`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AutomatonError {
    /// The structure of the machine is broken, e.g. it has no states or a row of the
    /// transition table does not match the alphabet.
    #[error("malformed automaton: {0}")]
    MalformedAutomaton(String),
    /// A transition points to a state that was never declared.
    #[error("transition from `{state}` on `{input}` leads to unknown state `{target}`")]
    UnknownStateReference {
        /// The source of the offending transition.
        state: String,
        /// The input symbol of the offending transition.
        input: String,
        /// The undeclared target.
        target: String,
    },
    /// Two states in the same class of a partition behave differently, or the partition does
    /// not cover the states exactly once.
    #[error("state `{state}` does not agree with class {class:?} of the partition")]
    InconsistentPartition {
        /// Position of the class in the partition, `None` if the state is not covered.
        class: Option<usize>,
        /// The state that disagrees.
        state: String,
    },
}

impl AutomatonError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedAutomaton(msg.into())
    }
}
