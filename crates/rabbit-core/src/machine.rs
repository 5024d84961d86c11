//! Transition Table Engine
//!
//! A generic table of `(state, action) -> state` edges. The table only says
//! *where* an action may lead; whether the move happens, and what it does, is
//! up to the entity being driven. That keeps "what triggers a move" apart from
//! "what the move does", so any stateful entity can reuse the same engine.
//!
//! # Example
//!
//! ```
//! use rabbit_core::machine::{Edge, Machine, Pattern, Stateful};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Door { Open, Closed }
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Push { Push }
//!
//! struct Hinge(Door);
//!
//! impl Stateful<()> for Hinge {
//!     type State = Door;
//!     type Action = Push;
//!
//!     fn state(&self) -> Door {
//!         self.0
//!     }
//!
//!     fn attempt(&mut self, edge: Edge<Door, Push>, _: &mut ()) -> bool {
//!         self.0 = edge.to;
//!         true
//!     }
//! }
//!
//! let mut machine: Machine<Door, Push> = Machine::new();
//! machine.add_transition(Door::Closed, Push::Push, Door::Open);
//! machine.add_transition(Door::Open, Pattern::Any, Door::Closed);
//!
//! let mut hinge = Hinge(Door::Closed);
//! assert!(machine.perform(&mut hinge, Push::Push, &mut ()));
//! assert_eq!(hinge.0, Door::Open);
//! ```

use std::collections::HashMap;
use std::hash::Hash;

/// Matches one specific token, or any token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern<T> {
    Any,
    Exactly(T),
}

impl<T> From<T> for Pattern<T> {
    fn from(value: T) -> Self {
        Pattern::Exactly(value)
    }
}

/// A resolved edge: the entity is in `from`, `action` was performed, and the
/// table says it may move to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<S, A> {
    pub from: S,
    pub action: A,
    pub to: S,
}

/// Something that can be driven through a [`Machine`].
///
/// `C` is whatever context the entity's guards and effects need to consult.
pub trait Stateful<C: ?Sized> {
    type State: Copy + Eq + Hash;
    type Action: Copy + Eq + Hash;

    fn state(&self) -> Self::State;

    /// Evaluates the guard for `edge` and, if it passes, applies the edge's
    /// effect and enters `edge.to`. Returns whether the transition happened.
    ///
    /// On `false` the entity must be left exactly as it was.
    fn attempt(&mut self, edge: Edge<Self::State, Self::Action>, ctx: &mut C) -> bool;
}

/// Transition table over state tokens `S` and action tokens `A`.
///
/// Lookup order is fixed: an exact `(state, action)` edge wins, then an edge
/// registered for the state with any action, then one registered for the
/// action from any state, then the catch-all.
#[derive(Debug, Clone)]
pub struct Machine<S, A> {
    transitions: HashMap<(S, A), S>,
    any_action: HashMap<S, S>,
    any_state: HashMap<A, S>,
    catch_all: Option<S>,
}

impl<S, A> Default for Machine<S, A> {
    fn default() -> Self {
        Self {
            transitions: HashMap::new(),
            any_action: HashMap::new(),
            any_state: HashMap::new(),
            catch_all: None,
        }
    }
}

impl<S, A> Machine<S, A>
where
    S: Copy + Eq + Hash,
    A: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an edge. Re-registering the same pattern replaces its target.
    pub fn add_transition(
        &mut self,
        from: impl Into<Pattern<S>>,
        action: impl Into<Pattern<A>>,
        to: S,
    ) -> &mut Self {
        match (from.into(), action.into()) {
            (Pattern::Exactly(from), Pattern::Exactly(action)) => {
                self.transitions.insert((from, action), to);
            }
            (Pattern::Exactly(from), Pattern::Any) => {
                self.any_action.insert(from, to);
            }
            (Pattern::Any, Pattern::Exactly(action)) => {
                self.any_state.insert(action, to);
            }
            (Pattern::Any, Pattern::Any) => {
                self.catch_all = Some(to);
            }
        }
        self
    }

    /// Removes the edge registered under exactly this pattern. A wildcard
    /// pattern only removes the wildcard entry, not every edge it would match.
    pub fn del_transition(&mut self, from: impl Into<Pattern<S>>, action: impl Into<Pattern<A>>) {
        match (from.into(), action.into()) {
            (Pattern::Exactly(from), Pattern::Exactly(action)) => {
                self.transitions.remove(&(from, action));
            }
            (Pattern::Exactly(from), Pattern::Any) => {
                self.any_action.remove(&from);
            }
            (Pattern::Any, Pattern::Exactly(action)) => {
                self.any_state.remove(&action);
            }
            (Pattern::Any, Pattern::Any) => {
                self.catch_all = None;
            }
        }
    }

    /// The state `action` would lead to from `state`, if any edge matches.
    pub fn next_state(&self, state: S, action: A) -> Option<S> {
        self.transitions
            .get(&(state, action))
            .or_else(|| self.any_action.get(&state))
            .or_else(|| self.any_state.get(&action))
            .or(self.catch_all.as_ref())
            .copied()
    }

    /// Performs `action` on `entity`.
    ///
    /// Returns `false` without touching the entity when no edge matches, and
    /// `false` when the entity's guard vetoes the edge.
    pub fn perform<E, C>(&self, entity: &mut E, action: A, ctx: &mut C) -> bool
    where
        E: Stateful<C, State = S, Action = A>,
        C: ?Sized,
    {
        let from = entity.state();
        match self.next_state(from, action) {
            Some(to) => entity.attempt(Edge { from, action, to }, ctx),
            None => false,
        }
    }

    /// Number of registered edges, wildcards included.
    pub fn len(&self) -> usize {
        self.transitions.len()
            + self.any_action.len()
            + self.any_state.len()
            + usize::from(self.catch_all.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
