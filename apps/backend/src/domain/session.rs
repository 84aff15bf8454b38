//! Session and player data model.
//!
//! A `Session` is the single unit of consistency: every mutating command
//! loads it from the store, changes it in memory under the session lock,
//! and saves it back. Nothing outside this aggregate is touched.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::{DomainError, NotFoundKind};

pub type PlayerId = String;

/// Session lifecycle. `Finished` is terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Waiting,
    InProgress,
    Finished,
}

/// One participant in a session. Owned exclusively by its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// External user key; identity issuance happens outside the engine.
    pub user_ref: String,
    pub name: String,
    /// Ordered hand of card codes. Index 0 is the current card.
    pub hand: Vec<String>,
    /// Cache of `hand.len()`, kept in sync via `refresh_count`.
    pub card_count: usize,
    /// Dense 1..N seat order, reassigned when someone leaves.
    pub seat_order: u8,
    pub connected: bool,
    /// Active transformation name, if any.
    pub active_transformation: Option<String>,
    /// Index into the card's transformation list; -1 means none.
    pub transformation_index: i32,
}

impl Player {
    pub fn new(id: PlayerId, user_ref: impl Into<String>, name: impl Into<String>, seat_order: u8) -> Self {
        Self {
            id,
            user_ref: user_ref.into(),
            name: name.into(),
            hand: Vec::new(),
            card_count: 0,
            seat_order,
            connected: true,
            active_transformation: None,
            transformation_index: -1,
        }
    }

    /// The card the player would play next (top of hand).
    pub fn current_card(&self) -> Option<&str> {
        self.hand.first().map(String::as_str)
    }

    /// Re-sync the card-count cache after any hand mutation.
    pub fn refresh_count(&mut self) {
        self.card_count = self.hand.len();
    }

    pub fn clear_transformation(&mut self) {
        self.active_transformation = None;
        self.transformation_index = -1;
    }
}

/// One card played into the current round. Cleared when the round resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardOnTable {
    pub player_id: PlayerId,
    pub card_code: String,
    /// Comparison value for the selected attribute, multiplier already applied.
    pub value: i32,
}

/// Immutable history record of a resolved round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    /// None on a tied round.
    pub winner: Option<PlayerId>,
    pub attribute: String,
    pub card_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique 6-character alphanumeric code, immutable after creation.
    pub code: String,
    pub state: SessionState,
    pub players: Vec<Player>,
    pub table: Vec<CardOnTable>,
    pub turn_player: Option<PlayerId>,
    pub selected_attribute: Option<String>,
    /// Cards held in escrow across tied rounds.
    pub tie_pool: Vec<String>,
    pub rounds: Vec<Round>,
    pub winner: Option<PlayerId>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    pub time_limit_secs: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub min_players: usize,
    pub max_players: usize,
}

impl Session {
    pub fn new(code: impl Into<String>, min_players: usize, max_players: usize, time_limit_secs: u64) -> Self {
        Self {
            code: code.into(),
            state: SessionState::Waiting,
            players: Vec::new(),
            table: Vec::new(),
            turn_player: None,
            selected_attribute: None,
            tie_pool: Vec::new(),
            rounds: Vec::new(),
            winner: None,
            started_at: None,
            time_limit_secs,
            created_at: OffsetDateTime::now_utc(),
            min_players,
            max_players,
        }
    }

    pub fn player(&self, player_id: &str) -> Result<&Player, DomainError> {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, format!("Player {player_id} not in session {}", self.code)))
    }

    pub fn player_mut(&mut self, player_id: &str) -> Result<&mut Player, DomainError> {
        let code = self.code.clone();
        self.players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, format!("Player {player_id} not in session {code}")))
    }

    pub fn has_user(&self, user_ref: &str) -> bool {
        self.players.iter().any(|p| p.user_ref == user_ref)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    /// Players still holding cards, in seat order. Only these participate
    /// in the round rotation.
    pub fn active_players(&self) -> Vec<&Player> {
        let mut active: Vec<&Player> = self.players.iter().filter(|p| !p.hand.is_empty()).collect();
        active.sort_by_key(|p| p.seat_order);
        active
    }

    /// The rotation for the current round: participating players in seat
    /// order, rotated so the turn holder comes first. The player expected
    /// to act is `rotation[table.len()]`.
    ///
    /// A player whose hand emptied by playing this round stays in the
    /// rotation (their card is on the table); otherwise the expected-index
    /// arithmetic would shift mid-round.
    pub fn round_rotation(&self) -> Vec<&Player> {
        let mut rotation: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| !p.hand.is_empty() || self.table.iter().any(|c| c.player_id == p.id))
            .collect();
        rotation.sort_by_key(|p| p.seat_order);
        if let Some(turn) = &self.turn_player {
            if let Some(pos) = rotation.iter().position(|p| &p.id == turn) {
                rotation.rotate_left(pos);
            }
        }
        rotation
    }

    /// Dynamic total of cards in play: hands + table + tie pool. The win
    /// check compares hand sizes against this, never against a constant,
    /// so catalog size changes cannot break it.
    pub fn total_cards_in_play(&self) -> usize {
        let in_hands: usize = self.players.iter().map(|p| p.hand.len()).sum();
        in_hands + self.table.len() + self.tie_pool.len()
    }

    /// Re-number seats to a dense 1..N range after a departure.
    pub fn compact_seat_orders(&mut self) {
        self.players.sort_by_key(|p| p.seat_order);
        for (idx, player) in self.players.iter_mut().enumerate() {
            player.seat_order = (idx + 1) as u8;
        }
    }

    /// Seconds left before the time limit ends the session; 0 when not
    /// started or already finished.
    pub fn time_remaining_secs(&self, now: OffsetDateTime) -> u64 {
        if self.state == SessionState::Finished {
            return 0;
        }
        let Some(started) = self.started_at else {
            return 0;
        };
        let elapsed = (now - started).whole_seconds().max(0) as u64;
        self.time_limit_secs.saturating_sub(elapsed)
    }

    pub fn time_limit_exceeded(&self, now: OffsetDateTime) -> bool {
        match self.started_at {
            Some(started) => (now - started).whole_seconds() >= self.time_limit_secs as i64,
            None => false,
        }
    }
}
