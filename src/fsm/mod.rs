//! FSA Data Structures
//! The automaton arena: states, transitions, listeners and the simulation cursor

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::{debug, trace};

use crate::config::AutomatonConfig;
use crate::error::{FsaError, FsaResult};

mod notify;
mod simulation;
mod snapshot;
mod state;
mod transition;


pub use notify::{AutomatonChange, AutomatonListener, ListenerId, StateChange, StateListener};
pub use snapshot::{AutomatonSnapshot, StateRecord, TransitionRecord};
pub use state::{validate_event, validate_name, State};
pub use transition::Transition;

use notify::Registry;

// Tags ids with the automaton that issued them.
static NEXT_OWNER: AtomicU32 = AtomicU32::new(1);

/// Handle to a state owned by one particular automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId {
    owner: u32,
    index: u32,
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state #{}", self.index)
    }
}

/// Handle to a transition owned by one particular automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId {
    owner: u32,
    index: u32,
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transition #{}", self.index)
    }
}

/// A finite-state automaton.
///
/// Owns every state and transition and keeps the cross references between
/// them consistent. States and transitions iterate in creation order.
#[derive(Debug)]
pub struct Automaton {
    owner: u32,
    config: AutomatonConfig,
    states: BTreeMap<StateId, State>,
    transitions: BTreeMap<TransitionId, Transition>,
    next_state: u32,
    next_transition: u32,
    input_events: BTreeSet<String>,
    steps_since_reset: usize,
    listeners: Registry<dyn AutomatonListener>,
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

impl Automaton {
    pub fn new() -> Self {
        Self::with_config(AutomatonConfig::default())
    }

    pub fn with_config(config: AutomatonConfig) -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            config,
            states: BTreeMap::new(),
            transitions: BTreeMap::new(),
            next_state: 0,
            next_transition: 0,
            input_events: BTreeSet::new(),
            steps_since_reset: 0,
            listeners: Registry::new(),
        }
    }

    pub fn config(&self) -> &AutomatonConfig {
        &self.config
    }

    // ========================================================================
    // STATES
    // ========================================================================

    /// Create a state and add it to this automaton.
    ///
    /// Fails with [`FsaError::InvalidName`] if the name is malformed or
    /// already taken.
    pub fn new_state(&mut self, name: &str, x: i32, y: i32) -> FsaResult<StateId> {
        validate_name(name).map_err(|reason| FsaError::InvalidName {
            name: name.to_string(),
            reason,
        })?;
        if self.find_state(name).is_some() {
            return Err(FsaError::InvalidName {
                name: name.to_string(),
                reason: "a state with this name already exists",
            });
        }

        let id = StateId {
            owner: self.owner,
            index: self.next_state,
        };
        self.next_state += 1;
        self.states.insert(id, State::new(id, name, x, y));
        debug!("Added state '{}' at ({}, {})", name, x, y);

        self.notify(AutomatonChange::StatesChanged { state: id });
        Ok(id)
    }

    /// Remove a state and every transition touching it.
    ///
    /// Absent states are ignored.
    pub fn remove_state(&mut self, id: StateId) {
        let Some(state) = self.states.get(&id) else {
            return;
        };

        for transition in state.incident() {
            self.remove_transition(transition);
        }

        if let Some(state) = self.states.remove(&id) {
            debug!("Removed state '{}'", state.name());
        }
        if self.config.notify_on_remove {
            self.notify(AutomatonChange::StatesChanged { state: id });
        }
    }

    /// Find the state with the given name
    pub fn find_state(&self, name: &str) -> Option<&State> {
        self.states.values().find(|s| s.name() == name)
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.values()
    }

    pub fn contains_state(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn initial_states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.values().filter(|s| s.is_initial())
    }

    pub fn final_states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.values().filter(|s| s.is_final())
    }

    pub fn current_states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.values().filter(|s| s.is_current())
    }

    pub fn set_initial(&mut self, id: StateId, initial: bool) -> FsaResult<()> {
        self.state_mut(id)?.set_initial(initial);
        Ok(())
    }

    pub fn set_final(&mut self, id: StateId, accepting: bool) -> FsaResult<()> {
        self.state_mut(id)?.set_final(accepting);
        Ok(())
    }

    /// Move a state by (dx, dy) from its current position
    pub fn move_state_by(&mut self, id: StateId, dx: i32, dy: i32) -> FsaResult<()> {
        let state = self.state_mut(id)?;
        let (x, y) = (state.x().saturating_add(dx), state.y().saturating_add(dy));
        state.move_to(x, y);
        Ok(())
    }

    pub fn move_state_to(&mut self, id: StateId, x: i32, y: i32) -> FsaResult<()> {
        self.state_mut(id)?.move_to(x, y);
        Ok(())
    }

    /// Subscribe to flag and position changes of a single state.
    ///
    /// Held weakly, like automaton listeners.
    pub fn add_state_listener(
        &mut self,
        id: StateId,
        listener: Arc<dyn StateListener>,
    ) -> FsaResult<ListenerId> {
        Ok(self.state_mut(id)?.add_listener(listener))
    }

    pub fn remove_state_listener(&mut self, id: StateId, listener: ListenerId) -> bool {
        self.states
            .get_mut(&id)
            .is_some_and(|state| state.remove_listener(listener))
    }

    fn state_mut(&mut self, id: StateId) -> FsaResult<&mut State> {
        self.states.get_mut(&id).ok_or(FsaError::UnknownState(id))
    }

    fn require_state(&self, id: StateId) -> FsaResult<&State> {
        self.states.get(&id).ok_or(FsaError::UnknownState(id))
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Create a transition from `from` to `to`.
    ///
    /// `None` (or an empty event) makes an epsilon transition. Named events
    /// must consist of letters only.
    pub fn new_transition(
        &mut self,
        from: StateId,
        to: StateId,
        event: Option<&str>,
    ) -> FsaResult<TransitionId> {
        let source = self.require_state(from)?;
        let target = self.require_state(to)?;

        let event = event.unwrap_or_default();
        if !validate_event(event) {
            return Err(FsaError::InvalidEventName(event.to_string()));
        }

        let duplicate = source
            .transitions_from()
            .filter_map(|t| self.transitions.get(&t))
            .any(|t| t.links(from, event, to));
        if duplicate {
            return Err(FsaError::DuplicateTransition {
                from: source.name().to_string(),
                event: event.to_string(),
                to: target.name().to_string(),
            });
        }

        let id = TransitionId {
            owner: self.owner,
            index: self.next_transition,
        };
        self.next_transition += 1;
        self.transitions
            .insert(id, Transition::new(id, from, event, to));
        if let Some(source) = self.states.get_mut(&from) {
            source.attach_outgoing(id);
        }
        if let Some(target) = self.states.get_mut(&to) {
            target.attach_incoming(id);
        }
        debug!("Added {}", self.describe(id));

        self.notify(AutomatonChange::TransitionsChanged { transition: id });
        Ok(id)
    }

    /// Remove a transition; absent transitions are ignored
    pub fn remove_transition(&mut self, id: TransitionId) {
        let Some(transition) = self.transitions.remove(&id) else {
            return;
        };

        for endpoint in [transition.from(), transition.to()] {
            if let Some(state) = self.states.get_mut(&endpoint) {
                state.detach(id);
            }
        }
        debug!("Removed {}", id);

        if self.config.notify_on_remove {
            self.notify(AutomatonChange::TransitionsChanged { transition: id });
        }
    }

    /// All transitions leading from `from` to `to` (direction matters)
    pub fn find_transitions(&self, from: StateId, to: StateId) -> FsaResult<Vec<&Transition>> {
        let source = self.require_state(from)?;
        self.require_state(to)?;

        Ok(source
            .transitions_from()
            .filter_map(|t| self.transitions.get(&t))
            .filter(|t| t.to() == to)
            .collect())
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(&id)
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions.values()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// `from(event)to` using state names
    pub fn describe_transition(&self, id: TransitionId) -> Option<String> {
        let transition = self.transitions.get(&id)?;
        let from = self.states.get(&transition.from())?;
        let to = self.states.get(&transition.to())?;
        Some(format!("{}({}){}", from.name(), transition.event(), to.name()))
    }

    fn describe(&self, id: TransitionId) -> String {
        self.describe_transition(id)
            .unwrap_or_else(|| id.to_string())
    }

    // ========================================================================
    // LISTENERS
    // ========================================================================

    /// Register an automaton listener.
    ///
    /// The automaton only holds a weak reference: the listener is notified for
    /// as long as the caller keeps an `Arc` to it. Registering the same
    /// listener twice returns the existing id.
    pub fn add_listener(&mut self, listener: Arc<dyn AutomatonListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&self, change: AutomatonChange) {
        trace!(
            "Notifying {} listener(s) of {:?}",
            self.listeners.len(),
            change
        );
        for listener in self.listeners.iter() {
            listener.on_change(self, &change);
        }
    }

    /// Describe the automaton as `STATE`, `TRANSITION`, `INITIAL` and `FINAL`
    /// lines, in that order
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for state in self.states() {
            writeln!(f, "STATE {}", state)?;
        }
        for transition in self.transitions() {
            writeln!(f, "TRANSITION {}", self.describe(transition.id()))?;
        }
        for state in self.initial_states() {
            writeln!(f, "INITIAL {}", state.name())?;
        }
        for state in self.final_states() {
            writeln!(f, "FINAL {}", state.name())?;
        }
        Ok(())
    }
}
