//! Property-based tests for the conversation store
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::title::NEW_CHAT_TITLE;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_turn() -> impl Strategy<Value = Turn> {
    (any::<bool>(), "[a-zA-Z ]{0,70}").prop_map(|(is_user, content)| {
        if is_user {
            Turn::user(content)
        } else {
            Turn::assistant(content)
        }
    })
}

fn arb_event() -> impl Strategy<Value = SessionEvent> {
    prop_oneof![
        Just(SessionEvent::NewChat),
        (0usize..6).prop_map(|index| SessionEvent::LoadChat { index }),
        (0usize..6, "[a-zA-Z ]{0,80}")
            .prop_map(|(index, title)| SessionEvent::RenameChat { index, title }),
        (0usize..6).prop_map(|index| SessionEvent::DeleteChat { index }),
        Just(SessionEvent::ClearAll),
        arb_turn().prop_map(|turn| SessionEvent::AppendTurn { turn }),
        arb_turn().prop_map(|turn| SessionEvent::AppendTurn { turn }),
    ]
}

fn arb_events() -> impl Strategy<Value = Vec<SessionEvent>> {
    proptest::collection::vec(arb_event(), 0..40)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Every reachable store satisfies the structural invariants
    #[test]
    fn prop_invariants_hold(events in arb_events()) {
        let mut store = ConversationStore::new();
        for event in events {
            let _ = store.apply(event);
            store.check_invariants();
        }
    }

    /// The store is a pure function of its event history
    #[test]
    fn prop_replay_is_deterministic(events in arb_events()) {
        let first = ConversationStore::replay(events.clone());
        let second = ConversationStore::replay(events);
        prop_assert_eq!(first.history().len(), second.history().len());
        prop_assert_eq!(first.transcript(), second.transcript());
        prop_assert_eq!(first, second);
    }

    /// Once the transcript is empty, each NewChat adds exactly one placeholder
    #[test]
    fn prop_new_chat_on_empty_grows_by_one(events in arb_events(), repeats in 1usize..5) {
        let mut store = ConversationStore::replay(events);
        store.apply(SessionEvent::NewChat).unwrap();

        for _ in 0..repeats {
            let before = store.history().len();
            store.apply(SessionEvent::NewChat).unwrap();
            prop_assert_eq!(store.history().len(), before + 1);
            prop_assert!(store.transcript().is_empty());
            let last = store.history().last().unwrap();
            prop_assert_eq!(last.title.as_str(), NEW_CHAT_TITLE);
            prop_assert!(last.transcript.is_empty());
        }
    }

    /// NewChat grows history by one or two and always empties the transcript
    #[test]
    fn prop_new_chat_growth(events in arb_events()) {
        let mut store = ConversationStore::replay(events);
        let before = store.history().len();
        store.new_chat();
        let grew = store.history().len() - before;
        prop_assert!(grew == 1 || grew == 2);
        prop_assert!(store.transcript().is_empty());
    }

    /// Appending touches only the active entry
    #[test]
    fn prop_append_touches_only_active_entry(events in arb_events(), turn in arb_turn()) {
        let mut store = ConversationStore::replay(events);
        let before = store.history().to_vec();
        let active_before = store.active_index();

        store.append_turn(turn.clone());
        let active = store.active_index().unwrap();
        prop_assert_eq!(store.transcript().last(), Some(&turn));

        match active_before {
            Some(index) => {
                prop_assert_eq!(index, active);
                prop_assert_eq!(store.history().len(), before.len());
            }
            None => prop_assert_eq!(store.history().len(), before.len() + 1),
        }
        for (i, entry) in before.iter().enumerate() {
            if i != active {
                prop_assert_eq!(&store.history()[i], entry);
            }
        }
    }

    /// Derived titles never exceed 50 characters
    #[test]
    fn prop_derived_titles_bounded(content in "\\PC{0,120}") {
        let mut store = ConversationStore::new();
        store.append_turn(Turn::user(content.clone()));
        let title = &store.history()[0].title;
        prop_assert!(title.chars().count() <= 50);
        if !content.is_empty() {
            prop_assert!(content.starts_with(title.as_str()));
        }
    }
}
