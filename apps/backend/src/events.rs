//! Event contract between the engine and connected clients.
//!
//! One tagged union covers every payload kind; the `type` field is the wire
//! discriminator. Session-wide events go to `session/{code}`, card-count
//! snapshots to the `session/{code}/counts` sub-topic (observers may watch
//! counts without learning which cards exist), and rejection notices to the
//! originating client's private error channel.

use serde::{Deserialize, Serialize};

use crate::domain::player_view::PlayerPublic;
use crate::domain::session::{PlayerId, SessionState};

/// Topic carrying all session-wide events.
pub fn session_topic(code: &str) -> String {
    format!("session/{code}")
}

/// Sub-topic carrying card-count snapshots only.
pub fn counts_topic(code: &str) -> String {
    format!("session/{code}/counts")
}

/// Per-user channel for private error events.
pub fn error_channel(code: &str) -> String {
    format!("queue/session/{code}/errors")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRoundResult {
    pub player_id: PlayerId,
    pub name: String,
    pub card_code: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCardCount {
    pub player_id: PlayerId,
    pub name: String,
    pub count: usize,
    pub order: u8,
}

/// Why a session reached `Finished`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// One player gathered every card in play.
    AllCards,
    /// The session time limit expired.
    TimeLimit,
    /// Departures left fewer than two players holding cards.
    Abandonment,
    /// A tie drained every hand into the escrow pool; nobody can play on.
    Stalemate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined {
        player_id: PlayerId,
        name: String,
        player_count: usize,
        max_players: usize,
    },
    SessionStarted {
        first_turn_player: PlayerId,
        first_turn_name: String,
        time_limit_seconds: u64,
    },
    AttributeSelected {
        player_id: PlayerId,
        attribute: String,
    },
    CardPlayed {
        player_id: PlayerId,
        card_code: String,
        value: i32,
    },
    TransformationActivated {
        player_id: PlayerId,
        name: String,
        transformation: String,
        multiplier: f64,
    },
    TransformationDeactivated {
        player_id: PlayerId,
        name: String,
    },
    RoundResolved {
        winner_id: Option<PlayerId>,
        attribute: String,
        winning_value: i32,
        results: Vec<PlayerRoundResult>,
        tie: bool,
    },
    GameFinished {
        winner_id: Option<PlayerId>,
        reason: FinishReason,
        tie: bool,
    },
    SessionDeleted {
        code: String,
    },
    /// Full public snapshot, broadcast on connection-state transitions so
    /// late or reconnecting observers resynchronise.
    SessionState {
        code: String,
        state: SessionState,
        turn_player: Option<PlayerId>,
        players: Vec<PlayerPublic>,
    },
    CardCounts {
        counts: Vec<PlayerCardCount>,
    },
    /// Private rejection notice; never broadcast on the session topic.
    Error {
        code: String,
        message: String,
    },
}
