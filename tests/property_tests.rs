//! Property-based tests for the automaton and its text format.

use std::collections::BTreeSet;

use fsakit::{parse_fsa, to_text, Automaton, FsaError, State, StateId};
use proptest::prelude::*;

prop_compose! {
    fn arbitrary_automaton()(
        states in prop::collection::vec(
            (-1000i32..1000, -1000i32..1000, any::<bool>(), any::<bool>()),
            1..8,
        ),
        edges in prop::collection::vec(
            (0usize..8, 0usize..8, prop::option::of("[a-c]")),
            0..20,
        ),
    ) -> Automaton {
        let mut fsa = Automaton::new();
        let mut ids = Vec::new();
        for (i, (x, y, initial, accepting)) in states.into_iter().enumerate() {
            let id = fsa.new_state(&format!("s{}", i), x, y).unwrap();
            fsa.set_initial(id, initial).unwrap();
            fsa.set_final(id, accepting).unwrap();
            ids.push(id);
        }
        for (from, to, event) in edges {
            // Duplicates are rejected; that is fine here
            let _ = fsa.new_transition(ids[from % ids.len()], ids[to % ids.len()], event.as_deref());
        }
        fsa
    }
}

fn check_cross_references(fsa: &Automaton) -> Result<(), TestCaseError> {
    for t in fsa.transitions() {
        let from = fsa.state(t.from());
        let to = fsa.state(t.to());
        prop_assert!(from.is_some_and(|s| s.transitions_from().any(|id| id == t.id())));
        prop_assert!(to.is_some_and(|s| s.transitions_to().any(|id| id == t.id())));
    }
    for s in fsa.states() {
        for id in s.transitions_from() {
            prop_assert_eq!(fsa.transition(id).map(|t| t.from()), Some(s.id()));
        }
        for id in s.transitions_to() {
            prop_assert_eq!(fsa.transition(id).map(|t| t.to()), Some(s.id()));
        }
    }
    Ok(())
}

fn current_ids(fsa: &Automaton) -> BTreeSet<StateId> {
    fsa.current_states().map(State::id).collect()
}

proptest! {
    #[test]
    fn well_formed_names_are_accepted(name in "[A-Za-z][A-Za-z0-9_]{0,12}") {
        let mut fsa = Automaton::new();
        prop_assert!(fsa.new_state(&name, 0, 0).is_ok());
        let duplicate_rejected = matches!(
            fsa.new_state(&name, 1, 1),
            Err(FsaError::InvalidName { .. })
        );
        prop_assert!(duplicate_rejected);
    }

    #[test]
    fn names_not_starting_with_a_letter_are_rejected(name in "[0-9_][A-Za-z0-9_]{0,12}") {
        let mut fsa = Automaton::new();
        let rejected = matches!(fsa.new_state(&name, 0, 0), Err(FsaError::InvalidName { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn text_round_trip_preserves_the_automaton(fsa in arbitrary_automaton()) {
        let copy = parse_fsa(&to_text(&fsa)).unwrap();
        prop_assert_eq!(copy.snapshot().sorted(), fsa.snapshot().sorted());
    }

    #[test]
    fn removing_states_keeps_cross_references_exact(
        fsa in arbitrary_automaton(),
        victims in prop::collection::vec(0usize..8, 0..4),
    ) {
        let mut fsa = fsa;
        let ids: Vec<StateId> = fsa.states().map(State::id).collect();
        for victim in victims {
            fsa.remove_state(ids[victim % ids.len()]);
            check_cross_references(&fsa)?;
        }
        let survivors: BTreeSet<StateId> = fsa.states().map(State::id).collect();
        for t in fsa.transitions() {
            prop_assert!(survivors.contains(&t.from()) && survivors.contains(&t.to()));
        }
    }

    #[test]
    fn step_advances_exactly_one_hop(
        fsa in arbitrary_automaton(),
        events in prop::collection::vec(prop::option::of("[a-d]"), 0..10),
    ) {
        let mut fsa = fsa;
        fsa.reset();
        let initial: BTreeSet<StateId> = fsa.initial_states().map(State::id).collect();
        prop_assert_eq!(current_ids(&fsa), initial);

        for event in &events {
            let label = event.as_deref().unwrap_or_default();
            let before = current_ids(&fsa);
            let expected: BTreeSet<StateId> = fsa
                .transitions()
                .filter(|t| before.contains(&t.from()) && t.event() == label)
                .map(|t| t.to())
                .collect();

            fsa.step(event.as_deref());
            prop_assert_eq!(current_ids(&fsa), expected);
        }
        prop_assert_eq!(fsa.steps_since_reset(), events.len());
    }

    #[test]
    fn recognised_iff_every_input_labels_a_transition(
        fsa in arbitrary_automaton(),
        events in prop::collection::vec(prop::option::of("[a-d]"), 0..10),
    ) {
        let mut fsa = fsa;
        for event in &events {
            fsa.step(event.as_deref());
        }
        let labels: BTreeSet<&str> = fsa.transitions().map(|t| t.event()).collect();
        let expected = events
            .iter()
            .all(|e| labels.contains(e.as_deref().unwrap_or_default()));
        prop_assert_eq!(fsa.is_recognised(), expected);
    }
}
