//! Deck construction, dealing, and first-turn determination.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GameConfig;
use crate::domain::session::{PlayerId, Session};

/// All card codes for a deck shape, in ascending pack-then-letter order
/// (`1A, 1B, .., 1H, 2A, .., 4H` for the default 4x A..H deck). This is
/// also the fixed priority order used to pick the first turn.
pub fn deck_codes(config: &GameConfig) -> Vec<String> {
    let mut codes = Vec::with_capacity(config.deck_size());
    for pack in 1..=config.deck_packs {
        for letter in config.pack_first..=config.pack_last {
            codes.push(format!("{pack}{letter}"));
        }
    }
    codes
}

/// Uniform random permutation of the available codes. Every code appears
/// exactly once; length is preserved.
pub fn build_shuffled_deck<R: Rng>(codes: &[String], rng: &mut R) -> Vec<String> {
    let mut deck = codes.to_vec();
    deck.shuffle(rng);
    deck
}

/// Deal the deck round-robin across all current players in seat order.
/// Tolerates a deck size that does not divide evenly: later seats simply
/// receive one card fewer. Card-count caches are refreshed afterwards.
pub fn deal(session: &mut Session, deck: &[String]) {
    session.players.sort_by_key(|p| p.seat_order);
    let player_count = session.players.len();
    if player_count == 0 {
        return;
    }
    for (idx, code) in deck.iter().enumerate() {
        session.players[idx % player_count].hand.push(code.clone());
    }
    for player in &mut session.players {
        player.refresh_count();
    }
}

/// Deterministic first-turn pick: scan the fixed priority order and return
/// the first player (in seat order) holding the earliest priority code found
/// in any hand. Falls back to the first player when no priority code is
/// present, and to None only for an empty session.
pub fn determine_first_turn(session: &Session, priority: &[String]) -> Option<PlayerId> {
    for code in priority {
        for player in &session.players {
            if player.hand.iter().any(|c| c == code) {
                return Some(player.id.clone());
            }
        }
    }
    session.players.first().map(|p| p.id.clone())
}
