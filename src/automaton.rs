//! A Moore machine emits an output for every state it visits, a Mealy machine emits an output for
//! every transition it takes. Both are deterministic and may be partial, i.e. some transitions
//! can be undefined.
//!
//! The two kinds of machine are type aliases for [`crate::DTS`], which differ only in where the
//! output is stored. For a Moore machine the state color is an `Option<O>` and the edge color is
//! [`crate::Void`], for a Mealy machine it is the other way around. In both cases `None` stands for
//! "no output", which is distinct from every actual output.

mod moore;
pub use moore::MooreMachine;

mod mealy;
pub use mealy::MealyMachine;

/// Turns a word given as names of input symbols into input indices, stopping at the first
/// symbol that is not part of the alphabet.
pub(crate) fn resolve_word<Q, C, W, S>(
    ts: &crate::DTS<Q, C>,
    word: W,
) -> Vec<crate::transition_system::InputIndex>
where
    W: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    word.into_iter()
        .map_while(|sym| ts.input_index(sym.as_ref()))
        .collect()
}
