//! Change Notification
//! Listener traits, typed change payloads and the subscription registry

use std::fmt;
use std::sync::{Arc, Weak};

use super::{Automaton, State, StateId, TransitionId};

/// Handle returned when a listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Structural change announced to automaton listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatonChange {
    /// A state was added (or removed, when removals are announced)
    StatesChanged { state: StateId },
    /// A transition was added (or removed, when removals are announced)
    TransitionsChanged { transition: TransitionId },
}

/// Change to a single state, announced to that state's own listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Initial(bool),
    Final(bool),
    Moved { x: i32, y: i32 },
}

/// Observer of structural changes to an automaton.
///
/// Called synchronously, after the mutation has been applied.
pub trait AutomatonListener: Send + Sync {
    fn on_change(&self, automaton: &Automaton, change: &AutomatonChange);
}

/// Observer of flag and position changes on one state
pub trait StateListener: Send + Sync {
    fn on_state_change(&self, state: &State, change: &StateChange);
}

impl<F> AutomatonListener for F
where
    F: Fn(&Automaton, &AutomatonChange) + Send + Sync,
{
    fn on_change(&self, automaton: &Automaton, change: &AutomatonChange) {
        self(automaton, change)
    }
}

impl<F> StateListener for F
where
    F: Fn(&State, &StateChange) + Send + Sync,
{
    fn on_state_change(&self, state: &State, change: &StateChange) {
        self(state, change)
    }
}

/// Ordered set of listeners keyed by pointer identity.
///
/// Entries are weak: a listener whose last `Arc` is dropped is skipped and
/// pruned on the next registration.
pub(crate) struct Registry<L: ?Sized> {
    entries: Vec<(ListenerId, Weak<L>)>,
    next_id: u64,
}

impl<L: ?Sized> Registry<L> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Register `listener`, or return its existing id if already present
    pub(crate) fn add(&mut self, listener: Arc<L>) -> ListenerId {
        self.entries.retain(|(_, existing)| existing.strong_count() > 0);
        if let Some((id, _)) = self.entries.iter().find(|(_, existing)| {
            existing
                .upgrade()
                .is_some_and(|existing| same_listener(&existing, &listener))
        }) {
            return *id;
        }

        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Arc::downgrade(&listener)));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    /// Live listeners, in registration order
    pub(crate) fn iter(&self) -> impl Iterator<Item = Arc<L>> + '_ {
        self.entries.iter().filter_map(|(_, listener)| listener.upgrade())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, listener)| listener.strong_count() > 0)
            .count()
    }
}

impl<L: ?Sized> Default for Registry<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for Registry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("listeners", &self.len())
            .finish()
    }
}

// Compare data pointers only; vtable pointers of the same object may differ.
fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
