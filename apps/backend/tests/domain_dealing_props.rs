//! Property tests for deck shuffling and dealing (pure domain, no store).

use std::collections::HashSet;

use backend::config::GameConfig;
use backend::domain::deck::{build_shuffled_deck, deal, deck_codes, determine_first_turn};
use backend::domain::{Player, Session};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn session_with_players(n: usize) -> Session {
    let mut session = Session::new("PROP01", 2, 7, 1800);
    for i in 0..n {
        session.players.push(Player::new(
            format!("p{i}"),
            format!("u{i}"),
            format!("name{i}"),
            (i + 1) as u8,
        ));
    }
    session
}

proptest! {
    /// Dealt hands partition the deck: every card in exactly one hand.
    #[test]
    fn dealt_hands_partition_the_deck(players in 2usize..=7, seed in any::<u64>()) {
        let config = GameConfig::default();
        let codes = deck_codes(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let deck = build_shuffled_deck(&codes, &mut rng);

        let mut session = session_with_players(players);
        deal(&mut session, &deck);

        let mut dealt: Vec<&String> = session.players.iter().flat_map(|p| p.hand.iter()).collect();
        prop_assert_eq!(dealt.len(), codes.len());
        let unique: HashSet<&String> = dealt.drain(..).collect();
        prop_assert_eq!(unique.len(), codes.len());
    }

    /// Hand sizes differ by at most one card.
    #[test]
    fn dealing_is_fair(players in 2usize..=7, seed in any::<u64>()) {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let deck = build_shuffled_deck(&deck_codes(&config), &mut rng);

        let mut session = session_with_players(players);
        deal(&mut session, &deck);

        let sizes: Vec<usize> = session.players.iter().map(|p| p.hand.len()).collect();
        let max = sizes.iter().max().unwrap();
        let min = sizes.iter().min().unwrap();
        prop_assert!(max - min <= 1);
    }

    /// The first turn always lands on whoever holds the earliest priority
    /// code, and repeated determination agrees.
    #[test]
    fn first_turn_is_deterministic(players in 2usize..=7, seed in any::<u64>()) {
        let config = GameConfig::default();
        let codes = deck_codes(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let deck = build_shuffled_deck(&codes, &mut rng);

        let mut session = session_with_players(players);
        deal(&mut session, &deck);

        let first = determine_first_turn(&session, &codes);
        prop_assert!(first.is_some());
        prop_assert_eq!(first.clone(), determine_first_turn(&session, &codes));

        // The full deck is dealt, so someone must hold the top priority
        // code and that someone takes the turn.
        let holder = session
            .players
            .iter()
            .find(|p| p.hand.iter().any(|c| c == &codes[0]))
            .map(|p| p.id.clone());
        prop_assert_eq!(first, holder);
    }
}
