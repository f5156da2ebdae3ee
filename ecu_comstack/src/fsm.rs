//! Transition-table state machines.
//!
//! A state machine is a pure function `(state, event) -> (next, effect)`
//! plus a holder for the current state. The network state machine is
//! expressed this way; callers that must check a transition before doing
//! I/O use [`StateMachine::evaluate`] and then replay the event.

use std::fmt::Debug;

/// Result of evaluating one event against a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult<S, F> {
    /// Transition accepted.
    Ok {
        /// State after the transition.
        next: S,
        /// Side effect the owner must carry out.
        effect: F,
    },
    /// Transition not valid from the current state.
    Rejected(&'static str),
}

impl<S, F> TransitionResult<S, F> {
    /// True if the transition was accepted.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Transition function of a state machine.
pub trait TransitionTable {
    /// Enumerated state.
    type State: Copy + Eq + Debug;
    /// Input alphabet.
    type Event: Copy + Debug;
    /// Side effects produced by accepted transitions.
    type Effect: Debug;

    /// Evaluate `event` in `state`. Must be pure.
    fn transition(
        state: Self::State,
        event: Self::Event,
    ) -> TransitionResult<Self::State, Self::Effect>;
}

/// Current state of a table-driven machine.
#[derive(Debug, Clone)]
pub struct StateMachine<T: TransitionTable> {
    state: T::State,
}

impl<T: TransitionTable> StateMachine<T> {
    /// Create a machine in `initial`.
    pub const fn new(initial: T::State) -> Self {
        Self { state: initial }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> T::State {
        self.state
    }

    /// Evaluate `event` without changing state.
    #[inline]
    pub fn evaluate(&self, event: T::Event) -> TransitionResult<T::State, T::Effect> {
        T::transition(self.state, event)
    }

    /// Evaluate `event` and commit the next state if accepted.
    pub fn handle_event(&mut self, event: T::Event) -> TransitionResult<T::State, T::Effect> {
        let result = T::transition(self.state, event);
        if let TransitionResult::Ok { next, .. } = &result {
            self.state = *next;
        }
        result
    }
}
