//! Name-based, serializable view of an automaton

use serde::Serialize;

use super::Automaton;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct StateRecord {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub initial: bool,
    #[serde(rename = "final")]
    pub accepting: bool,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TransitionRecord {
    pub from: String,
    /// `None` for epsilon
    pub event: Option<String>,
    pub to: String,
}

/// States and transitions by name, in the automaton's iteration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutomatonSnapshot {
    pub states: Vec<StateRecord>,
    pub transitions: Vec<TransitionRecord>,
}

impl AutomatonSnapshot {
    /// Sort both lists so snapshots compare as sets
    pub fn sorted(mut self) -> Self {
        self.states.sort();
        self.transitions.sort();
        self
    }
}

impl Automaton {
    pub fn snapshot(&self) -> AutomatonSnapshot {
        let states = self
            .states()
            .map(|s| StateRecord {
                name: s.name().to_string(),
                x: s.x(),
                y: s.y(),
                initial: s.is_initial(),
                accepting: s.is_final(),
                current: s.is_current(),
            })
            .collect();

        let transitions = self
            .transitions()
            .filter_map(|t| {
                let from = self.state(t.from())?;
                let to = self.state(t.to())?;
                Some(TransitionRecord {
                    from: from.name().to_string(),
                    event: (!t.is_epsilon()).then(|| t.event().to_string()),
                    to: to.name().to_string(),
                })
            })
            .collect();

        AutomatonSnapshot {
            states,
            transitions,
        }
    }
}
