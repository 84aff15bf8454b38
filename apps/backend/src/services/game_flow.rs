//! Gameplay commands: starting a session, attribute selection, card play
//! and round resolution.
//!
//! The `*_in_place` free functions hold the actual logic and expect the
//! caller to already own the session lock; the service methods wrap them
//! with locking and rejection reporting. `sessions::join_session` reuses
//! `start_in_place` for the auto-start on a filling join, and `leave`
//! reuses `resolve_round_in_place` when a departure completes the round.

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::domain::deck;
use crate::domain::power::{apply_multiplier, transformation_multiplier, NO_TRANSFORMATION_MULTIPLIER};
use crate::domain::resolve::{determine_outcome, timeout_outcome, RoundOutcome};
use crate::domain::session::{CardOnTable, Round, Session, SessionState};
use crate::errors::DomainError;
use crate::events::{counts_topic, session_topic, FinishReason, GameEvent, PlayerRoundResult};
use crate::services::{card_counts_event, load_session, report_rejection};
use crate::state::AppState;

#[derive(Clone)]
pub struct GameFlowService {
    state: AppState,
}

impl GameFlowService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Start a waiting session: shuffle, deal, pick the first turn.
    pub async fn start(&self, code: &str) -> Result<(), DomainError> {
        self.state
            .locks()
            .with_session_lock(code, || async {
                let mut session = load_session(&self.state, code).await?;
                start_in_place(&self.state, &mut session).await
            })
            .await
    }

    /// Choose the attribute the next round will compare on. Only the turn
    /// holder may do this.
    pub async fn select_attribute(
        &self,
        code: &str,
        player_id: &str,
        attribute: &str,
    ) -> Result<(), DomainError> {
        let result = self
            .state
            .locks()
            .with_session_lock(code, || self.select_attribute_locked(code, player_id, attribute))
            .await;
        if let Err(err) = &result {
            report_rejection(&self.state, code, player_id, err);
        }
        result
    }

    async fn select_attribute_locked(
        &self,
        code: &str,
        player_id: &str,
        attribute: &str,
    ) -> Result<(), DomainError> {
        let mut session = load_session(&self.state, code).await?;
        if session.state != SessionState::InProgress {
            return Err(DomainError::invalid_state(
                "Attribute selection requires a session in progress",
            ));
        }
        session.player(player_id)?;
        match &session.turn_player {
            Some(turn) if turn == player_id => {}
            Some(turn) => {
                let name = session
                    .player(turn)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|_| turn.clone());
                return Err(DomainError::not_your_turn(format!("It is {name}'s turn")));
            }
            None => return Err(DomainError::invalid_state("Session has no turn holder")),
        }
        if attribute.trim().is_empty() {
            return Err(DomainError::invalid_argument("Attribute name must not be empty"));
        }

        session.selected_attribute = Some(attribute.to_string());
        self.state.store().save(&session).await?;

        debug!(session = code, player = player_id, attribute, "attribute selected");
        self.state.publisher().publish(
            &session_topic(code),
            GameEvent::AttributeSelected {
                player_id: player_id.to_string(),
                attribute: attribute.to_string(),
            },
        );
        Ok(())
    }

    /// Play a card into the current round. `card_index` picks from the
    /// player's hand; out-of-range or absent indices fall back to the top
    /// card. Resolves the round when the last expected card lands.
    pub async fn play_card(
        &self,
        code: &str,
        player_id: &str,
        card_index: Option<usize>,
    ) -> Result<(), DomainError> {
        let result = self
            .state
            .locks()
            .with_session_lock(code, || self.play_card_locked(code, player_id, card_index))
            .await;
        match result {
            Err(err) => {
                report_rejection(&self.state, code, player_id, &err);
                Err(err)
            }
            Ok(finished) => {
                if finished {
                    self.state.locks().evict(code);
                }
                Ok(())
            }
        }
    }

    async fn play_card_locked(
        &self,
        code: &str,
        player_id: &str,
        card_index: Option<usize>,
    ) -> Result<bool, DomainError> {
        let mut session = load_session(&self.state, code).await?;
        if session.state != SessionState::InProgress {
            return Err(DomainError::invalid_state("Card play requires a session in progress"));
        }

        let (round_size, expected_id, expected_name) = {
            let rotation = session.round_rotation();
            let expected = rotation.get(session.table.len()).ok_or_else(|| {
                DomainError::internal("table already holds a full round")
            })?;
            (rotation.len(), expected.id.clone(), expected.name.clone())
        };
        if expected_id != player_id {
            return Err(DomainError::not_your_turn(format!(
                "It is {expected_name}'s turn to play"
            )));
        }
        // Cleared on every resolution, so a set attribute here always
        // belongs to the round being played.
        let attribute = match &session.selected_attribute {
            Some(a) => a.clone(),
            None => {
                return Err(DomainError::attribute_not_selected(
                    "An attribute must be selected before the round's first card",
                ))
            }
        };

        // All checks passed; mutations start here.
        let player = session.player_mut(player_id)?;
        if player.hand.is_empty() {
            return Err(DomainError::internal("rotation admitted an empty hand"));
        }
        let idx = card_index.filter(|i| *i < player.hand.len()).unwrap_or(0);
        let card_code = player.hand.remove(idx);
        player.refresh_count();
        let transformation_index = player.transformation_index;

        // A code the catalog cannot answer for plays at value 0 rather
        // than wedging the round.
        let value = match self.state.catalog().lookup(&card_code) {
            Some(info) => {
                let base = info.attributes.get(&attribute).copied().unwrap_or(0);
                let multiplier = if transformation_index >= 0 {
                    info.transformations
                        .get(transformation_index as usize)
                        .map(|t| transformation_multiplier(&info.base_power, &t.raw_power))
                        .unwrap_or(NO_TRANSFORMATION_MULTIPLIER)
                } else {
                    NO_TRANSFORMATION_MULTIPLIER
                };
                apply_multiplier(base, multiplier)
            }
            None => 0,
        };

        session.table.push(CardOnTable {
            player_id: player_id.to_string(),
            card_code: card_code.clone(),
            value,
        });
        let round_complete = session.table.len() >= round_size;
        self.state.store().save(&session).await?;

        debug!(session = code, player = player_id, card = %card_code, value, "card played");
        self.state.publisher().publish(
            &session_topic(code),
            GameEvent::CardPlayed {
                player_id: player_id.to_string(),
                card_code,
                value,
            },
        );
        self.state
            .publisher()
            .publish(&counts_topic(code), card_counts_event(&session));

        if round_complete {
            resolve_round_in_place(&self.state, &mut session).await
        } else {
            Ok(false)
        }
    }
}

/// Start logic shared with the auto-start on a filling join. The caller
/// already holds the session lock.
pub(crate) async fn start_in_place(state: &AppState, session: &mut Session) -> Result<(), DomainError> {
    if session.state != SessionState::Waiting {
        return Err(DomainError::invalid_state(format!(
            "Session {} already started",
            session.code
        )));
    }
    if session.players.len() < session.min_players {
        return Err(DomainError::invalid_state(format!(
            "Need at least {} players to start",
            session.min_players
        )));
    }

    let codes = state.catalog().available_codes();
    let shuffled = {
        let mut rng = rand::rng();
        deck::build_shuffled_deck(&codes, &mut rng)
    };
    deck::deal(session, &shuffled);
    session.state = SessionState::InProgress;
    session.started_at = Some(OffsetDateTime::now_utc());
    let priority = deck::deck_codes(state.config());
    session.turn_player = deck::determine_first_turn(session, &priority);
    state.store().save(session).await?;

    let first_turn_player = session
        .turn_player
        .clone()
        .ok_or_else(|| DomainError::internal("started session has no turn holder"))?;
    let first_turn_name = session.player(&first_turn_player)?.name.clone();
    info!(session = %session.code, first_turn = %first_turn_player, "session started");
    state.publisher().publish(
        &session_topic(&session.code),
        GameEvent::SessionStarted {
            first_turn_player,
            first_turn_name,
            time_limit_seconds: session.time_limit_secs,
        },
    );
    state
        .publisher()
        .publish(&counts_topic(&session.code), card_counts_event(session));
    Ok(())
}

/// Resolve a full table. Returns true when the session finished, so the
/// caller can evict the session lock once it is released.
///
/// The time limit is checked first: past it, the round comparison is
/// skipped entirely and the largest hand wins.
pub(crate) async fn resolve_round_in_place(
    state: &AppState,
    session: &mut Session,
) -> Result<bool, DomainError> {
    if session.time_limit_exceeded(OffsetDateTime::now_utc()) {
        finish_by_timeout_in_place(state, session).await?;
        return Ok(true);
    }

    let outcome = determine_outcome(&session.table)
        .ok_or_else(|| DomainError::internal("round resolution with an empty table"))?;
    let attribute = session.selected_attribute.clone().unwrap_or_default();
    let results: Vec<PlayerRoundResult> = session
        .table
        .iter()
        .map(|c| PlayerRoundResult {
            player_id: c.player_id.clone(),
            name: session
                .player(&c.player_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|_| c.player_id.clone()),
            card_code: c.card_code.clone(),
            value: c.value,
        })
        .collect();
    let card_codes: Vec<String> = session.table.iter().map(|c| c.card_code.clone()).collect();

    let (winner_id, winning_value, tie) = match outcome {
        RoundOutcome::Winner { player_id, value } => {
            let mut won = card_codes.clone();
            won.append(&mut session.tie_pool);
            let winner = session.player_mut(&player_id)?;
            winner.hand.extend(won);
            winner.refresh_count();
            session.turn_player = Some(player_id.clone());
            (Some(player_id), value, false)
        }
        RoundOutcome::Tie { value } => {
            // Cards stay in escrow; the next round's winner takes them.
            // The turn holder keeps the turn.
            session.tie_pool.extend(card_codes.iter().cloned());
            (None, value, true)
        }
    };

    session.rounds.push(Round {
        number: (session.rounds.len() + 1) as u32,
        winner: winner_id.clone(),
        attribute: attribute.clone(),
        card_codes,
    });
    session.table.clear();
    session.selected_attribute = None;

    // Win check against the live total, so departures that shrank the
    // card pool still let the game end.
    let total = session.total_cards_in_play();
    let game_winner = session
        .players
        .iter()
        .find(|p| total > 0 && p.hand.len() == total)
        .map(|p| p.id.clone());
    if let Some(w) = &game_winner {
        session.state = SessionState::Finished;
        session.winner = Some(w.clone());
    }
    // A tie on everyone's last card drains every hand into escrow and
    // leaves no legal move; end the session as a stalemate instead of
    // wedging it in progress.
    let stalemate =
        game_winner.is_none() && tie && session.players.iter().all(|p| p.hand.is_empty());
    if stalemate {
        session.state = SessionState::Finished;
    }
    state.store().save(session).await?;

    info!(session = %session.code, winner = ?winner_id, tie, "round resolved");
    let topic = session_topic(&session.code);
    state.publisher().publish(
        &topic,
        GameEvent::RoundResolved {
            winner_id,
            attribute,
            winning_value,
            results,
            tie,
        },
    );
    state
        .publisher()
        .publish(&counts_topic(&session.code), card_counts_event(session));

    if game_winner.is_some() {
        info!(session = %session.code, winner = ?game_winner, "game finished");
        state.publisher().publish(
            &topic,
            GameEvent::GameFinished {
                winner_id: game_winner,
                reason: FinishReason::AllCards,
                tie: false,
            },
        );
        return Ok(true);
    }
    if stalemate {
        info!(session = %session.code, "game finished in a stalemate");
        state.publisher().publish(
            &topic,
            GameEvent::GameFinished {
                winner_id: None,
                reason: FinishReason::Stalemate,
                tie: true,
            },
        );
        return Ok(true);
    }
    Ok(false)
}

async fn finish_by_timeout_in_place(state: &AppState, session: &mut Session) -> Result<(), DomainError> {
    let (winner, tie) = timeout_outcome(&session.players);
    session.state = SessionState::Finished;
    session.winner = winner.clone();
    state.store().save(session).await?;

    info!(session = %session.code, winner = ?winner, tie, "time limit reached");
    state.publisher().publish(
        &session_topic(&session.code),
        GameEvent::GameFinished {
            winner_id: winner,
            reason: FinishReason::TimeLimit,
            tie,
        },
    );
    Ok(())
}
