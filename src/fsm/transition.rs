//! Transitions: event-labelled edges between two states

use super::{StateId, TransitionId};

/// A transition between states.
///
/// Identified by the triple (from, event, to); the automaton never holds two
/// transitions with the same triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    id: TransitionId,
    from: StateId,
    event: String,
    to: StateId,
}

impl Transition {
    pub(crate) fn new(id: TransitionId, from: StateId, event: impl Into<String>, to: StateId) -> Self {
        Self {
            id,
            from,
            event: event.into(),
            to,
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn from(&self) -> StateId {
        self.from
    }

    pub fn to(&self) -> StateId {
        self.to
    }

    /// The triggering event; empty for epsilon transitions
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn is_epsilon(&self) -> bool {
        self.event.is_empty()
    }

    pub(crate) fn links(&self, from: StateId, event: &str, to: StateId) -> bool {
        self.from == from && self.to == to && self.event == event
    }
}
