//! Step-by-step simulation over the automaton's current-state set

use std::collections::BTreeSet;

use log::trace;

use super::{Automaton, State, StateId};

impl Automaton {
    /// Make exactly the initial states current.
    ///
    /// The accumulated input-event history is kept.
    pub fn reset(&mut self) {
        for state in self.states.values_mut() {
            let initial = state.is_initial();
            state.set_current(initial);
        }
        self.steps_since_reset = 0;
        trace!("Reset simulation to {} initial state(s)", self.initial_states().count());
    }

    /// Advance every current state by one hop along transitions labelled `event`.
    ///
    /// `None` is the epsilon event. States without a matching transition drop
    /// out of the current set. Targets are not examined again within the same
    /// step.
    pub fn step(&mut self, event: Option<&str>) {
        let event = event.unwrap_or_default();
        self.input_events.insert(event.to_string());
        self.steps_since_reset += 1;

        let active: Vec<StateId> = self.current_states().map(State::id).collect();
        let targets: BTreeSet<StateId> = active
            .iter()
            .filter_map(|id| self.states.get(id))
            .flat_map(|state| state.transitions_from())
            .filter_map(|t| self.transitions.get(&t))
            .filter(|t| t.event() == event)
            .map(|t| t.to())
            .collect();

        for id in &active {
            if let Some(state) = self.states.get_mut(id) {
                state.set_current(false);
            }
        }
        for id in &targets {
            if let Some(state) = self.states.get_mut(id) {
                state.set_current(true);
            }
        }

        trace!(
            "Step '{}': {} active -> {} active",
            event,
            active.len(),
            targets.len()
        );
    }

    /// Whether every event ever passed to [`step`](Self::step) labels some
    /// transition of this automaton.
    ///
    /// This looks at the set of observed events only. It ignores their order
    /// and the current-state set, so it does not tell whether a final state
    /// was reached.
    pub fn is_recognised(&self) -> bool {
        self.input_events
            .iter()
            .all(|input| self.transitions.values().any(|t| t.event() == input))
    }

    /// Distinct events observed by `step`, epsilon as the empty string
    pub fn input_events(&self) -> impl Iterator<Item = &str> + '_ {
        self.input_events.iter().map(String::as_str)
    }

    pub fn clear_input_events(&mut self) {
        self.input_events.clear();
    }

    /// Number of `step` calls since the last `reset`
    pub fn steps_since_reset(&self) -> usize {
        self.steps_since_reset
    }
}
