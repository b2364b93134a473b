//! States: named, positioned graph nodes

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::notify::{ListenerId, Registry, StateChange, StateListener};
use super::{StateId, TransitionId};

/// A state in the automaton.
///
/// Only the owning [`Automaton`](super::Automaton) creates, mutates and
/// destroys states; callers get shared references.
#[derive(Debug)]
pub struct State {
    id: StateId,
    name: String,
    x: i32,
    y: i32,
    initial: bool,
    accepting: bool,
    current: bool,
    outgoing: BTreeSet<TransitionId>,
    incoming: BTreeSet<TransitionId>,
    listeners: Registry<dyn StateListener>,
}

impl State {
    pub(crate) fn new(id: StateId, name: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            id,
            name: name.into(),
            x,
            y,
            initial: false,
            accepting: false,
            current: false,
            outgoing: BTreeSet::new(),
            incoming: BTreeSet::new(),
            listeners: Registry::new(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn is_final(&self) -> bool {
        self.accepting
    }

    /// Whether the simulation currently considers this state active
    pub fn is_current(&self) -> bool {
        self.current
    }

    /// Transitions leaving this state
    pub fn transitions_from(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.outgoing.iter().copied()
    }

    /// Transitions entering this state
    pub fn transitions_to(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.incoming.iter().copied()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn set_initial(&mut self, initial: bool) {
        self.initial = initial;
        self.notify(StateChange::Initial(initial));
    }

    pub(crate) fn set_final(&mut self, accepting: bool) {
        self.accepting = accepting;
        self.notify(StateChange::Final(accepting));
    }

    pub(crate) fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.notify(StateChange::Moved { x, y });
    }

    // Simulation bookkeeping; not announced to listeners.
    pub(crate) fn set_current(&mut self, current: bool) {
        self.current = current;
    }

    pub(crate) fn attach_outgoing(&mut self, transition: TransitionId) {
        self.outgoing.insert(transition);
    }

    pub(crate) fn attach_incoming(&mut self, transition: TransitionId) {
        self.incoming.insert(transition);
    }

    pub(crate) fn detach(&mut self, transition: TransitionId) {
        self.outgoing.remove(&transition);
        self.incoming.remove(&transition);
    }

    pub(crate) fn incident(&self) -> BTreeSet<TransitionId> {
        self.outgoing.union(&self.incoming).copied().collect()
    }

    pub(crate) fn add_listener(&mut self, listener: Arc<dyn StateListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub(crate) fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn notify(&self, change: StateChange) {
        for listener in self.listeners.iter() {
            listener.on_state_change(self, &change);
        }
    }
}

/// `name(x,y)jk`, with `j`/`k` being 1 or 0 for initial/final
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{}){}{}",
            self.name,
            self.x,
            self.y,
            u8::from(self.initial),
            u8::from(self.accepting)
        )
    }
}

/// Check a state name: a letter followed by letters, digits or underscores.
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("name is empty"),
        Some(first) if !first.is_alphabetic() => return Err("name must start with a letter"),
        Some(_) => {}
    }

    if chars.all(|c| c.is_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err("name may only contain letters, digits and underscores")
    }
}

/// Check a named event: letters only. The empty string is epsilon.
pub fn validate_event(event: &str) -> bool {
    event.chars().all(char::is_alphabetic)
}
