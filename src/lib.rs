//! Library for minimizing deterministic Mealy and Moore machines.
//!
//! Both kinds of machine are represented by the same deterministic transition system [`DTS`], which stores
//! a color on every state and a color on every edge. A Moore machine places its output on the states and leaves the
//! edges uncolored (see [`Void`]), whereas a Mealy machine does the opposite. Every algorithm in this crate is
//! written once against [`DTS`] and thus works for both variants.
//!
//! Minimization is a pipeline of three stages, each of which consumes a machine and produces a new one:
//! - [`DTS::prune`] removes all states that cannot be reached from the initial state,
//! - [`DTS::refine`] computes the coarsest partition of the states into classes of behaviorally
//!   equivalent states through partition refinement,
//! - [`DTS::quotient`] collapses each class into a single state with a canonical name.
//!
//! [`DTS::minimize`] runs all three in sequence. Transitions may be undefined (see [`Target::Undefined`]), an
//! undefined transition is never confused with a transition into some actual state.
//!
//! With the `table` feature (enabled by default), the [`table`] module reads and writes machines in a simple
//! `;`-separated tabular format.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_minimize::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        automaton::{MealyMachine, MooreMachine},
        error::AutomatonError,
        math::{self, Partition},
        minimization::PartitionRefinement,
        transition_system::{
            reachable::Reachable, Edge, InputIndex, StateIndex, Target, DTS,
        },
        Color, Void,
    };
    #[cfg(feature = "table")]
    pub use super::table::{self, TableError};
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Contains the error type for constructing and transforming machines.
pub mod error;
pub use error::AutomatonError;

/// This module defines the deterministic transition system that underlies both kinds of machine.
pub mod transition_system;
pub use transition_system::{Target, DTS};

/// Defines Mealy and Moore machines on top of [`DTS`].
pub mod automaton;
pub use automaton::{MealyMachine, MooreMachine};

/// Implements minimization through partition refinement.
pub mod minimization;

/// Reading and writing machines as `;`-separated tables. This is feature gated behind the `table` feature.
#[cfg(feature = "table")]
pub mod table;

use std::{fmt::Debug, hash::Hash};

/// A color is simply a type that can be used to color states or transitions. The outputs of
/// Mealy and Moore machines are colors.
pub trait Color: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Color for T {}

/// Represents the absence of a color. A Moore machine uses this for its edges and a Mealy
/// machine for its states, since neither of them observes anything there.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Void;

impl Debug for Void {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#")
    }
}

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;
