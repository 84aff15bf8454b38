//! Pure round-outcome determination.
//!
//! Deciding who won a round (or whether it tied) is a pure function of the
//! table contents, kept free of session bookkeeping so it can be tested
//! exhaustively. The service layer owns the resulting card transfers.

use crate::domain::session::{CardOnTable, Player, PlayerId};

/// Outcome of comparing a full table of plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Exactly one player reached the maximum value.
    Winner { player_id: PlayerId, value: i32 },
    /// Two or more distinct players tied at the maximum.
    Tie { value: i32 },
}

/// Determine the round outcome from the cards on the table. Returns None
/// for an empty table, which callers treat as an internal invariant breach.
pub fn determine_outcome(table: &[CardOnTable]) -> Option<RoundOutcome> {
    let max = table.iter().map(|c| c.value).max()?;
    let mut top_players = table
        .iter()
        .filter(|c| c.value == max)
        .map(|c| c.player_id.as_str());

    let first = top_players.next()?;
    let tied = top_players.any(|p| p != first);
    if tied {
        Some(RoundOutcome::Tie { value: max })
    } else {
        Some(RoundOutcome::Winner {
            player_id: first.to_string(),
            value: max,
        })
    }
}

/// Time-limit ending: the largest hand wins; a shared maximum is a tie.
/// Returns `(winner, tie)`.
pub fn timeout_outcome(players: &[Player]) -> (Option<PlayerId>, bool) {
    let Some(max) = players.iter().map(|p| p.hand.len()).max() else {
        return (None, true);
    };
    let mut at_max = players.iter().filter(|p| p.hand.len() == max);
    let first = at_max.next();
    if at_max.next().is_some() {
        (None, true)
    } else {
        (first.map(|p| p.id.clone()), false)
    }
}
