//! Pure domain model and logic: no I/O, no locks, no event publishing.

pub mod deck;
pub mod player_view;
pub mod power;
pub mod resolve;
pub mod session;

pub use session::{CardOnTable, Player, PlayerId, Round, Session, SessionState};
