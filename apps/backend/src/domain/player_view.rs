//! Client-facing projections of session state.
//!
//! The detail view enforces the hand-privacy boundary: the requesting
//! player sees their own hand, everyone else is reduced to card counts.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::session::{Player, PlayerId, Session, SessionState};

/// What any observer may know about a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPublic {
    pub id: PlayerId,
    pub name: String,
    pub card_count: usize,
    pub seat_order: u8,
    pub connected: bool,
    pub active_transformation: Option<String>,
    pub transformation_index: i32,
}

/// The requesting player's own view, hand included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPrivate {
    #[serde(flatten)]
    pub public: PlayerPublic,
    pub hand: Vec<String>,
    pub current_card: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub code: String,
    pub state: SessionState,
    /// Set when the summary answers a create/join command.
    pub player_id: Option<PlayerId>,
    pub players: Vec<PlayerPublic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub code: String,
    pub state: SessionState,
    pub turn_player: Option<PlayerId>,
    pub selected_attribute: Option<String>,
    pub players: Vec<PlayerPublic>,
    pub me: Option<PlayerPrivate>,
    pub time_remaining_secs: u64,
}

pub fn public_view(player: &Player) -> PlayerPublic {
    PlayerPublic {
        id: player.id.clone(),
        name: player.name.clone(),
        card_count: player.card_count,
        seat_order: player.seat_order,
        connected: player.connected,
        active_transformation: player.active_transformation.clone(),
        transformation_index: player.transformation_index,
    }
}

pub fn private_view(player: &Player) -> PlayerPrivate {
    PlayerPrivate {
        public: public_view(player),
        hand: player.hand.clone(),
        current_card: player.current_card().map(str::to_string),
    }
}

pub fn summary(session: &Session, player_id: Option<PlayerId>) -> SessionSummary {
    SessionSummary {
        code: session.code.clone(),
        state: session.state,
        player_id,
        players: session.players.iter().map(public_view).collect(),
    }
}

/// Detail view for one requesting player. Other players' hands never leave
/// the engine through this projection.
pub fn detail(session: &Session, player_id: &str, now: OffsetDateTime) -> SessionDetail {
    let mut me = None;
    let mut others = Vec::with_capacity(session.players.len());
    for player in &session.players {
        if player.id == player_id {
            me = Some(private_view(player));
        } else {
            others.push(public_view(player));
        }
    }
    SessionDetail {
        code: session.code.clone(),
        state: session.state,
        turn_player: session.turn_player.clone(),
        selected_attribute: session.selected_attribute.clone(),
        players: others,
        me,
        time_remaining_secs: session.time_remaining_secs(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_hides_other_hands() {
        let mut session = Session::new("VIEW01", 2, 7, 1800);
        let mut p1 = Player::new("p1".into(), "u1", "Ana", 1);
        p1.hand = vec!["1A".into(), "2B".into()];
        p1.refresh_count();
        let mut p2 = Player::new("p2".into(), "u2", "Bruno", 2);
        p2.hand = vec!["3C".into()];
        p2.refresh_count();
        session.players = vec![p1, p2];

        let view = detail(&session, "p1", OffsetDateTime::now_utc());
        let me = view.me.expect("requesting player present");
        assert_eq!(me.hand, vec!["1A".to_string(), "2B".to_string()]);
        assert_eq!(me.current_card.as_deref(), Some("1A"));
        assert_eq!(view.players.len(), 1);
        assert_eq!(view.players[0].id, "p2");
        assert_eq!(view.players[0].card_count, 1);
    }

    #[test]
    fn detail_for_unknown_player_has_no_private_section() {
        let session = Session::new("VIEW02", 2, 7, 1800);
        let view = detail(&session, "ghost", OffsetDateTime::now_utc());
        assert!(view.me.is_none());
    }
}
