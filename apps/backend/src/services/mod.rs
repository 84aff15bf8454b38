//! Service layer: every command the engine accepts lives here.
//!
//! Public service methods acquire the session lock, delegate to an
//! internal variant, and on rejection push a private `Error` event to the
//! acting player before returning the error to the transport layer.

pub mod game_flow;
pub mod sessions;
pub mod transformations;

pub use game_flow::GameFlowService;
pub use sessions::SessionService;
pub use transformations::TransformationService;

use tracing::warn;

use crate::domain::{player_view, Session};
use crate::errors::{DomainError, NotFoundKind};
use crate::events::{error_channel, GameEvent, PlayerCardCount};
use crate::state::AppState;

pub(crate) async fn load_session(state: &AppState, code: &str) -> Result<Session, DomainError> {
    state.store().find_by_code(code).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Session, format!("Session {code} does not exist"))
    })
}

/// Card-count snapshot in seat order; hands stay private, only sizes leave.
pub(crate) fn card_counts_event(session: &Session) -> GameEvent {
    let mut counts: Vec<PlayerCardCount> = session
        .players
        .iter()
        .map(|p| PlayerCardCount {
            player_id: p.id.clone(),
            name: p.name.clone(),
            count: p.hand.len(),
            order: p.seat_order,
        })
        .collect();
    counts.sort_by_key(|c| c.order);
    GameEvent::CardCounts { counts }
}

pub(crate) fn session_state_event(session: &Session) -> GameEvent {
    GameEvent::SessionState {
        code: session.code.clone(),
        state: session.state,
        turn_player: session.turn_player.clone(),
        players: session.players.iter().map(player_view::public_view).collect(),
    }
}

/// Notify the acting player that their command was rejected. The notice is
/// private; the session topic never carries another player's mistakes.
pub(crate) fn report_rejection(state: &AppState, code: &str, player_id: &str, err: &DomainError) {
    warn!(
        session = code,
        player = player_id,
        code = err.code(),
        error = %err,
        "command rejected"
    );
    state.publisher().publish_to_user(
        player_id,
        &error_channel(code),
        GameEvent::Error {
            code: err.code().to_string(),
            message: err.public_message(),
        },
    );
}
