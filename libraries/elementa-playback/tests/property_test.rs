//! Property-based tests for history, favorites and presentation helpers
//!
//! Uses proptest to verify invariants across many random inputs.

use elementa_core::ItemId;
use elementa_playback::{format_millis, Favorites, History, SessionSnapshot};
use proptest::prelude::*;
use std::collections::HashSet;

// ===== Helpers =====

fn arbitrary_plays() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..40, 0..200)
}

// ===== Property Tests =====

proptest! {
    /// Property: history never exceeds its capacity and never holds duplicates
    #[test]
    fn history_bounded_and_unique(plays in arbitrary_plays(), capacity in 1usize..60) {
        let mut history = History::new(capacity);
        for id in &plays {
            history.push(ItemId::new(*id));
        }

        let entries = history.get_all();
        let unique: HashSet<_> = entries.iter().collect();

        prop_assert!(entries.len() <= capacity);
        prop_assert_eq!(unique.len(), entries.len());
    }

    /// Property: the last played item is always at the front
    #[test]
    fn last_play_is_front(plays in prop::collection::vec(0u32..40, 1..200)) {
        let mut history = History::new(50);
        for id in &plays {
            history.push(ItemId::new(*id));
        }

        prop_assert_eq!(history.peek(), plays.last().copied().map(ItemId::new));
    }

    /// Property: history order matches the order of each item's latest play
    #[test]
    fn history_order_is_latest_play_order(plays in arbitrary_plays()) {
        let mut history = History::new(usize::MAX);
        for id in &plays {
            history.push(ItemId::new(*id));
        }

        let mut expected = Vec::new();
        for id in plays.iter().rev() {
            if !expected.contains(id) {
                expected.push(*id);
            }
        }
        let actual: Vec<u32> = history.get_all().iter().map(|id| id.get()).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Property: toggling the same id twice is the identity
    #[test]
    fn double_toggle_is_identity(initial in prop::collection::vec(0u32..20, 0..20), id in 0u32..20) {
        let mut favorites = Favorites::new();
        for i in initial {
            favorites.toggle(ItemId::new(i));
        }
        let before = favorites.clone();

        favorites.toggle(ItemId::new(id));
        favorites.toggle(ItemId::new(id));

        prop_assert_eq!(favorites, before);
    }

    /// Property: progress stays within [0, 1]
    #[test]
    fn progress_in_unit_range(position in any::<u64>(), duration in any::<u64>()) {
        let snapshot = SessionSnapshot {
            position_ms: position,
            duration_ms: duration,
            ..Default::default()
        };
        let progress = snapshot.progress();
        prop_assert!((0.0..=1.0).contains(&progress));
    }

    /// Property: formatted seconds are always two digits
    #[test]
    fn formatted_seconds_are_two_digits(ms in 1u64..10_000_000) {
        let text = format_millis(ms);
        let (_, seconds) = text.split_once(':').unwrap();
        prop_assert_eq!(seconds.len(), 2);
    }
}
