//! Shared fixtures for integration tests: a scripted catalog with known
//! values, an app state wired to a capturable in-process bus, and helpers
//! to put a session into an exact mid-game position.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use backend::config::GameConfig;
use backend::domain::Session;
use backend::events::GameEvent;
use backend::infra::{CardCatalog, CardInfo, InProcessEventBus, TransformationInfo};
use backend::state::AppState;
use tokio::sync::broadcast;

/// Catalog with hand-picked cards so tests control every comparison.
#[derive(Default)]
pub struct ScriptedCatalog {
    cards: HashMap<String, CardInfo>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card whose `poder` value is `poder` (other attributes derive
    /// from it), with no transformations.
    pub fn card(self, code: &str, poder: i32) -> Self {
        self.card_full(code, poder, "10 Million", &[])
    }

    pub fn card_full(
        mut self,
        code: &str,
        poder: i32,
        base_power: &str,
        transformations: &[(&str, &str)],
    ) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert("poder".to_string(), poder);
        attributes.insert("velocidad".to_string(), poder / 2);
        self.cards.insert(
            code.to_string(),
            CardInfo {
                code: code.to_string(),
                name: format!("Test {code}"),
                attributes,
                base_power: base_power.to_string(),
                transformations: transformations
                    .iter()
                    .map(|(name, raw_power)| TransformationInfo {
                        name: name.to_string(),
                        raw_power: raw_power.to_string(),
                    })
                    .collect(),
            },
        );
        self
    }
}

impl CardCatalog for ScriptedCatalog {
    fn lookup(&self, code: &str) -> Option<CardInfo> {
        self.cards.get(code).cloned()
    }

    fn available_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.cards.keys().cloned().collect();
        codes.sort();
        codes
    }
}

pub struct TestApp {
    pub state: AppState,
    pub bus: Arc<InProcessEventBus>,
}

pub fn test_app(config: GameConfig, catalog: ScriptedCatalog) -> TestApp {
    backend::logging::init_for_tests();
    let bus = Arc::new(InProcessEventBus::new());
    let state = AppState::builder()
        .with_config(config)
        .with_catalog(Arc::new(catalog))
        .with_publisher(bus.clone())
        .build();
    TestApp { state, bus }
}

/// Two seats, so the second join auto-starts the game.
pub fn two_player_config() -> GameConfig {
    GameConfig {
        min_players: 2,
        max_players: 2,
        ..GameConfig::default()
    }
}

pub fn config_with_max(max_players: usize) -> GameConfig {
    GameConfig {
        min_players: 2,
        max_players,
        ..GameConfig::default()
    }
}

pub async fn load(state: &AppState, code: &str) -> Session {
    state
        .store()
        .find_by_code(code)
        .await
        .expect("store lookup")
        .expect("session exists")
}

pub async fn save(state: &AppState, session: &Session) {
    state.store().save(session).await.expect("store save");
}

/// Overwrite dealt hands and the turn holder so a round plays out on known
/// cards. Clears any table or attribute left from earlier rounds.
pub async fn script_round(state: &AppState, code: &str, turn: &str, hands: &[(&str, &[&str])]) {
    let mut session = load(state, code).await;
    for (player_id, hand) in hands {
        let player = session.player_mut(player_id).expect("player exists");
        player.hand = hand.iter().map(|c| c.to_string()).collect();
        player.refresh_count();
    }
    session.turn_player = Some(turn.to_string());
    session.table.clear();
    session.selected_attribute = None;
    save(state, &session).await;
}

/// Everything published so far on a subscription, without blocking.
pub fn drain(rx: &mut broadcast::Receiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
