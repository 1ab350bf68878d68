//! Property-based tests for the mood model.
//!
//! Zone partitioning, homeostasis convergence and the bounds invariant must
//! hold for every mood value and every sequence of events.

use neko_core::{ConversationState, MoodConfig, MoodZone, MOOD_MAX, MOOD_MIN, MOOD_TARGET};
use neko_limbic::{homeostasis_step, mood_zone, MoodEvent, MoodModel};
use proptest::prelude::*;

fn arb_event() -> impl Strategy<Value = MoodEvent> {
    prop_oneof![
        any::<i32>().prop_map(|delta| MoodEvent::TemplateSelected { delta }),
        Just(MoodEvent::UnknownIntent),
        Just(MoodEvent::NameSpam),
    ]
}

/// Every zone is reachable, and walking the mood range visits them in
/// declaration order.
#[test]
fn zones_are_visited_in_order() {
    let mut visited: Vec<MoodZone> = Vec::new();
    for mood in MOOD_MIN..=MOOD_MAX {
        let zone = mood_zone(mood);
        if visited.last() != Some(&zone) {
            visited.push(zone);
        }
    }
    assert_eq!(visited, MoodZone::ALL.to_vec());
}

proptest! {
    /// Exactly one zone per mood, and the zones are ordered with mood.
    #[test]
    fn zones_partition_the_domain(mood in MOOD_MIN..=MOOD_MAX) {
        let zone = mood_zone(mood);
        let expected = if mood <= -50 {
            MoodZone::Angry
        } else if mood <= -10 {
            MoodZone::Lazy
        } else if mood >= 50 {
            MoodZone::Playful
        } else {
            MoodZone::Neutral
        };
        prop_assert_eq!(zone, expected);
        if mood < MOOD_MAX {
            prop_assert!(mood_zone(mood + 1) >= zone);
        }
    }

    /// Homeostasis never moves mood further from the target, and never
    /// leaves the bounds.
    #[test]
    fn homeostasis_converges(mood in MOOD_MIN..=MOOD_MAX) {
        let cfg = MoodConfig::default();
        let next = homeostasis_step(mood, &cfg);
        prop_assert!((next - MOOD_TARGET).abs() <= (mood - MOOD_TARGET).abs(),
            "{} -> {} moved away from {}", mood, next, MOOD_TARGET);
        prop_assert!(next >= MOOD_MIN && next <= MOOD_MAX);
    }

    /// Enough homeostasis steps settle within one of the target.
    #[test]
    fn homeostasis_settles(mood in MOOD_MIN..=MOOD_MAX) {
        let model = MoodModel::default();
        let mut state = ConversationState::new(mood);
        for _ in 0..250 {
            model.apply_homeostasis(&mut state);
        }
        prop_assert!((state.mood - MOOD_TARGET).abs() <= 1, "settled at {}", state.mood);
    }

    /// Any sequence of events keeps mood in bounds after each one.
    #[test]
    fn events_keep_mood_in_bounds(
        start in MOOD_MIN..=MOOD_MAX,
        events in prop::collection::vec(arb_event(), 0..64),
    ) {
        let model = MoodModel::default();
        let mut state = ConversationState::new(start);
        for event in events {
            let change = model.apply(&mut state, event);
            prop_assert!(change.abs() <= 9);
            prop_assert!(state.mood >= MOOD_MIN && state.mood <= MOOD_MAX);
            model.apply_homeostasis(&mut state);
            prop_assert!(state.mood >= MOOD_MIN && state.mood <= MOOD_MAX);
        }
    }

    /// The name streak counts consecutive mentions and nothing else.
    #[test]
    fn name_streak_counts_consecutive_mentions(mentions in prop::collection::vec(any::<bool>(), 0..32)) {
        let model = MoodModel::default();
        let mut state = ConversationState::new(0);
        let mut expected = 0u32;
        for mentioned in mentions {
            let fired = model.observe_name(&mut state, mentioned);
            expected = if mentioned { expected + 1 } else { 0 };
            prop_assert_eq!(state.repeat_name_count, expected);
            prop_assert_eq!(fired, expected >= 3);
        }
    }
}
