//! Session engine for a real-time, turn-based top-trumps card game.
//!
//! Players gather in code-addressed sessions, get dealt a shuffled deck,
//! and play rounds where the turn holder picks an attribute and the
//! highest value takes every card on the table. The engine owns the rules,
//! the per-session locking, and the event stream; transports (HTTP,
//! WebSocket) and persistence backends plug in at the trait seams in
//! [`infra`].

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod infra;
pub mod logging;
pub mod services;
pub mod state;
pub mod utils;
