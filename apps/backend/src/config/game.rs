//! Game tuning knobs, read from the environment with sensible defaults.

use std::env;

/// Runtime configuration for session rules.
///
/// Values come from `GAME_*` environment variables; anything missing or
/// unparseable falls back to the default so a bare process still runs.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Minimum players required to start a session.
    pub min_players: usize,
    /// Maximum players a session accepts; joining the last seat auto-starts.
    pub max_players: usize,
    /// Session time limit in seconds, checked at round-resolution time.
    pub time_limit_secs: u64,
    /// Grace window before a dropped player is marked disconnected.
    pub grace_secs: u64,
    /// Deck shape: `deck_packs` packs of cards lettered `pack_first..=pack_last`.
    pub deck_packs: u8,
    pub pack_first: char,
    pub pack_last: char,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 7,
            time_limit_secs: 1800,
            grace_secs: 5,
            deck_packs: 4,
            pack_first: 'A',
            pack_last: 'H',
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_players: env_or("GAME_MIN_PLAYERS", defaults.min_players),
            max_players: env_or("GAME_MAX_PLAYERS", defaults.max_players),
            time_limit_secs: env_or("GAME_TIME_LIMIT_SECS", defaults.time_limit_secs),
            grace_secs: env_or("GAME_DISCONNECT_GRACE_SECS", defaults.grace_secs),
            deck_packs: env_or("GAME_DECK_PACKS", defaults.deck_packs),
            pack_first: defaults.pack_first,
            pack_last: defaults.pack_last,
        }
    }

    /// Total number of cards in a full deck for this configuration.
    pub fn deck_size(&self) -> usize {
        let per_pack = (self.pack_last as u8 - self.pack_first as u8 + 1) as usize;
        self.deck_packs as usize * per_pack
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
