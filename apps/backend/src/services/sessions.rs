//! Session lifecycle: creation, joining, views, hand reordering, leaving,
//! and connection tracking with the disconnect grace window.

use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::player_view::{self, SessionDetail, SessionSummary};
use crate::domain::session::{Player, PlayerId, Session, SessionState};
use crate::errors::DomainError;
use crate::events::{counts_topic, session_topic, FinishReason, GameEvent};
use crate::services::game_flow;
use crate::services::{card_counts_event, load_session, report_rejection, session_state_event};
use crate::state::AppState;
use crate::utils::session_code::generate_session_code;

const CODE_ATTEMPTS: usize = 8;

#[derive(Clone)]
pub struct SessionService {
    state: AppState,
}

impl SessionService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Create a session with the caller seated as its creator (seat 1).
    pub async fn create_session(
        &self,
        user_ref: &str,
        name: &str,
    ) -> Result<SessionSummary, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument("Player name must not be empty"));
        }
        let code = self.unused_code().await?;
        let cfg = self.state.config();
        let mut session = Session::new(code.clone(), cfg.min_players, cfg.max_players, cfg.time_limit_secs);
        let player_id = Uuid::new_v4().to_string();
        session.players.push(Player::new(player_id.clone(), user_ref, name, 1));
        self.state.store().save(&session).await?;

        info!(session = %code, player = %player_id, "session created");
        self.state.publisher().publish(
            &session_topic(&code),
            GameEvent::PlayerJoined {
                player_id: player_id.clone(),
                name: name.to_string(),
                player_count: 1,
                max_players: session.max_players,
            },
        );
        Ok(player_view::summary(&session, Some(player_id)))
    }

    async fn unused_code(&self) -> Result<String, DomainError> {
        for _ in 0..CODE_ATTEMPTS {
            let code = generate_session_code();
            if self.state.store().find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(DomainError::internal("could not allocate an unused session code"))
    }

    /// Join a waiting session. Filling the last seat starts the game
    /// immediately, still under the same lock acquisition.
    pub async fn join_session(
        &self,
        code: &str,
        user_ref: &str,
        name: &str,
    ) -> Result<SessionSummary, DomainError> {
        self.state
            .locks()
            .with_session_lock(code, || self.join_locked(code, user_ref, name))
            .await
    }

    async fn join_locked(
        &self,
        code: &str,
        user_ref: &str,
        name: &str,
    ) -> Result<SessionSummary, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument("Player name must not be empty"));
        }
        let mut session = load_session(&self.state, code).await?;
        if session.state != SessionState::Waiting {
            return Err(DomainError::invalid_state(format!("Session {code} already started")));
        }
        if session.is_full() {
            return Err(DomainError::invalid_state(format!("Session {code} is full")));
        }
        if session.has_user(user_ref) {
            return Err(DomainError::invalid_state(format!(
                "User already seated in session {code}"
            )));
        }

        let player_id = Uuid::new_v4().to_string();
        let seat = (session.players.len() + 1) as u8;
        session.players.push(Player::new(player_id.clone(), user_ref, name, seat));
        self.state.store().save(&session).await?;

        info!(session = code, player = %player_id, seat, "player joined");
        self.state.publisher().publish(
            &session_topic(code),
            GameEvent::PlayerJoined {
                player_id: player_id.clone(),
                name: name.to_string(),
                player_count: session.players.len(),
                max_players: session.max_players,
            },
        );

        if session.is_full() {
            game_flow::start_in_place(&self.state, &mut session).await?;
        }
        Ok(player_view::summary(&session, Some(player_id)))
    }

    /// Public summary of a session; no hand data.
    pub async fn session_summary(&self, code: &str) -> Result<SessionSummary, DomainError> {
        let session = load_session(&self.state, code).await?;
        Ok(player_view::summary(&session, None))
    }

    /// Detail view for one player: their own hand plus everyone else's
    /// public face. Unknown requesters get the public face only.
    pub async fn session_detail(
        &self,
        code: &str,
        player_id: &str,
    ) -> Result<SessionDetail, DomainError> {
        let session = load_session(&self.state, code).await?;
        Ok(player_view::detail(&session, player_id, OffsetDateTime::now_utc()))
    }

    /// Rearrange the player's own hand. `new_order` maps new positions to
    /// old indices and must be a permutation of the full hand.
    pub async fn reorder_hand(
        &self,
        code: &str,
        player_id: &str,
        new_order: &[usize],
    ) -> Result<(), DomainError> {
        let result = self
            .state
            .locks()
            .with_session_lock(code, || self.reorder_hand_locked(code, player_id, new_order))
            .await;
        if let Err(err) = &result {
            report_rejection(&self.state, code, player_id, err);
        }
        result
    }

    async fn reorder_hand_locked(
        &self,
        code: &str,
        player_id: &str,
        new_order: &[usize],
    ) -> Result<(), DomainError> {
        let mut session = load_session(&self.state, code).await?;
        if session.state != SessionState::InProgress {
            return Err(DomainError::invalid_state("Hand reordering requires a session in progress"));
        }
        let player = session.player_mut(player_id)?;

        let len = player.hand.len();
        if new_order.len() != len {
            return Err(DomainError::invalid_argument(
                "Reorder must list every card position exactly once",
            ));
        }
        let mut seen = vec![false; len];
        for &i in new_order {
            if i >= len || seen[i] {
                return Err(DomainError::invalid_argument(
                    "Reorder must list every card position exactly once",
                ));
            }
            seen[i] = true;
        }

        let old = player.hand.clone();
        player.hand = new_order.iter().map(|&i| old[i].clone()).collect();
        self.state.store().save(&session).await?;
        debug!(session = code, player = player_id, "hand reordered");
        Ok(())
    }

    /// Idempotent reconnection: cancels any pending grace timer, marks the
    /// player connected, and rebroadcasts the session snapshot either way.
    pub async fn reconnect(&self, code: &str, player_id: &str) -> Result<(), DomainError> {
        self.state.grace().cancel(player_id);
        self.state
            .locks()
            .with_session_lock(code, || async {
                let mut session = load_session(&self.state, code).await?;
                let player = session.player_mut(player_id)?;
                player.connected = true;
                self.state.store().save(&session).await?;

                info!(session = code, player = player_id, "player reconnected");
                self.state
                    .publisher()
                    .publish(&session_topic(code), session_state_event(&session));
                Ok(())
            })
            .await
    }

    /// Arm the grace timer for a dropped connection. If the player does not
    /// reconnect in time they are marked disconnected, but keep their seat
    /// and cards.
    pub fn handle_disconnect(&self, code: &str, player_id: &str) {
        let delay = Duration::from_secs(self.state.config().grace_secs);
        let state = self.state.clone();
        let code = code.to_string();
        let pid = player_id.to_string();
        self.state.grace().schedule(player_id, delay, move || async move {
            let service = SessionService::new(state);
            if let Err(err) = service.mark_disconnected(&code, &pid).await {
                warn!(session = %code, player = %pid, error = %err, "grace expiry update failed");
            }
        });
    }

    /// Flag a player as disconnected and broadcast the new snapshot. No-op
    /// when already flagged.
    pub async fn mark_disconnected(&self, code: &str, player_id: &str) -> Result<(), DomainError> {
        self.state
            .locks()
            .with_session_lock(code, || async {
                let mut session = load_session(&self.state, code).await?;
                let player = session.player_mut(player_id)?;
                if !player.connected {
                    return Ok(());
                }
                player.connected = false;
                self.state.store().save(&session).await?;

                info!(session = code, player = player_id, "player marked disconnected");
                self.state
                    .publisher()
                    .publish(&session_topic(code), session_state_event(&session));
                Ok(())
            })
            .await
    }

    /// Leave a session for good. The creator leaving dissolves the whole
    /// session; anyone else is removed, seats are compacted, and their
    /// cards (hand and any table play) leave the game with them.
    pub async fn leave(&self, code: &str, player_id: &str) -> Result<(), DomainError> {
        self.state.grace().cancel(player_id);
        let evict = self
            .state
            .locks()
            .with_session_lock(code, || self.leave_locked(code, player_id))
            .await?;
        if evict {
            self.state.locks().evict(code);
        }
        Ok(())
    }

    async fn leave_locked(&self, code: &str, player_id: &str) -> Result<bool, DomainError> {
        let mut session = load_session(&self.state, code).await?;
        let leaver_seat = session.player(player_id)?.seat_order;

        if leaver_seat == 1 {
            self.state.store().delete(code).await?;
            info!(session = code, "session dissolved by creator departure");
            self.state.publisher().publish(
                &session_topic(code),
                GameEvent::SessionDeleted { code: code.to_string() },
            );
            return Ok(true);
        }

        // Pass the turn before removal so the shortened rotation stays
        // anchored on a seated player.
        if session.turn_player.as_deref() == Some(player_id) {
            session.turn_player = next_turn_after(&session, player_id);
        }
        session.players.retain(|p| p.id != player_id);
        session.table.retain(|c| c.player_id != player_id);
        session.compact_seat_orders();
        self.state.store().save(&session).await?;

        info!(session = code, player = player_id, "player left");
        self.state
            .publisher()
            .publish(&session_topic(code), session_state_event(&session));
        self.state
            .publisher()
            .publish(&counts_topic(code), card_counts_event(&session));

        if session.state != SessionState::InProgress {
            return Ok(false);
        }

        // Fewer than two players still holding cards cannot continue; the
        // remaining holder takes the game.
        let engaged: Vec<PlayerId> = session
            .players
            .iter()
            .filter(|p| {
                !p.hand.is_empty() || session.table.iter().any(|c| c.player_id == p.id)
            })
            .map(|p| p.id.clone())
            .collect();
        if engaged.len() < 2 {
            session.state = SessionState::Finished;
            session.winner = engaged.first().cloned();
            self.state.store().save(&session).await?;

            info!(session = code, winner = ?session.winner, "session finished by abandonment");
            self.state.publisher().publish(
                &session_topic(code),
                GameEvent::GameFinished {
                    winner_id: session.winner.clone(),
                    reason: FinishReason::Abandonment,
                    tie: session.winner.is_none(),
                },
            );
            return Ok(true);
        }

        // The departure may have completed the round: everyone still
        // seated has a card on the table.
        if !session.table.is_empty() && session.table.len() >= session.round_rotation().len() {
            return game_flow::resolve_round_in_place(&self.state, &mut session).await;
        }
        Ok(false)
    }
}

/// Next seat in rotation after the leaver, wrapping; None when nobody else
/// remains.
fn next_turn_after(session: &Session, leaving: &str) -> Option<PlayerId> {
    session
        .round_rotation()
        .iter()
        .map(|p| p.id.clone())
        .find(|id| id != leaving)
        .or_else(|| {
            session
                .players
                .iter()
                .find(|p| p.id != leaving)
                .map(|p| p.id.clone())
        })
}
