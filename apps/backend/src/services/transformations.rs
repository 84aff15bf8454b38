//! Transformation activation for a player's current card.
//!
//! An active transformation multiplies the value of the card the player
//! eventually plays; it stays active until deactivated or until the hand
//! changes underneath it (playing a card clears nothing by itself, the
//! multiplier binds at play time to whatever card is current).

use tracing::info;

use crate::domain::power::transformation_multiplier;
use crate::domain::session::SessionState;
use crate::errors::{DomainError, NotFoundKind};
use crate::events::{session_topic, GameEvent};
use crate::services::{load_session, report_rejection};
use crate::state::AppState;

#[derive(Clone)]
pub struct TransformationService {
    state: AppState,
}

impl TransformationService {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Activate one of the current card's transformations by index.
    pub async fn activate(
        &self,
        code: &str,
        player_id: &str,
        transformation_index: usize,
    ) -> Result<(), DomainError> {
        let result = self
            .state
            .locks()
            .with_session_lock(code, || self.activate_locked(code, player_id, transformation_index))
            .await;
        if let Err(err) = &result {
            report_rejection(&self.state, code, player_id, err);
        }
        result
    }

    async fn activate_locked(
        &self,
        code: &str,
        player_id: &str,
        transformation_index: usize,
    ) -> Result<(), DomainError> {
        let mut session = load_session(&self.state, code).await?;
        if session.state != SessionState::InProgress {
            return Err(DomainError::invalid_state(
                "Transformations require a session in progress",
            ));
        }
        let (card_code, player_name) = {
            let player = session.player(player_id)?;
            (player.current_card().map(str::to_string), player.name.clone())
        };
        let Some(card_code) = card_code else {
            return Err(DomainError::invalid_state("Player has no current card"));
        };
        let info = self.state.catalog().lookup(&card_code).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Card, format!("Card {card_code} missing from catalog"))
        })?;
        if info.transformations.is_empty() {
            return Err(DomainError::invalid_state(format!(
                "Card {card_code} has no transformations"
            )));
        }
        let transformation = info.transformations.get(transformation_index).ok_or_else(|| {
            DomainError::invalid_argument(format!(
                "Transformation index {transformation_index} out of range for card {card_code}"
            ))
        })?;
        let multiplier = transformation_multiplier(&info.base_power, &transformation.raw_power);

        let player = session.player_mut(player_id)?;
        player.active_transformation = Some(transformation.name.clone());
        player.transformation_index = transformation_index as i32;
        self.state.store().save(&session).await?;

        info!(
            session = code,
            player = player_id,
            transformation = %transformation.name,
            multiplier,
            "transformation activated"
        );
        self.state.publisher().publish(
            &session_topic(code),
            GameEvent::TransformationActivated {
                player_id: player_id.to_string(),
                name: player_name,
                transformation: transformation.name.clone(),
                multiplier,
            },
        );
        Ok(())
    }

    /// Drop the player's active transformation; a no-op error when none is
    /// active.
    pub async fn deactivate(&self, code: &str, player_id: &str) -> Result<(), DomainError> {
        let result = self
            .state
            .locks()
            .with_session_lock(code, || self.deactivate_locked(code, player_id))
            .await;
        if let Err(err) = &result {
            report_rejection(&self.state, code, player_id, err);
        }
        result
    }

    async fn deactivate_locked(&self, code: &str, player_id: &str) -> Result<(), DomainError> {
        let mut session = load_session(&self.state, code).await?;
        let player = session.player_mut(player_id)?;
        if player.active_transformation.is_none() {
            return Err(DomainError::invalid_state("No active transformation"));
        }
        let player_name = player.name.clone();
        player.clear_transformation();
        self.state.store().save(&session).await?;

        info!(session = code, player = player_id, "transformation deactivated");
        self.state.publisher().publish(
            &session_topic(code),
            GameEvent::TransformationDeactivated {
                player_id: player_id.to_string(),
                name: player_name,
            },
        );
        Ok(())
    }
}
