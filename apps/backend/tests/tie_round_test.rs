//! Tied rounds: cards go into escrow, the turn holder keeps the turn, and
//! the next decided round pays the whole pool out.

mod support;

use backend::domain::SessionState;
use backend::events::{session_topic, FinishReason, GameEvent};
use backend::services::{GameFlowService, SessionService};
use support::*;

fn catalog() -> ScriptedCatalog {
    ScriptedCatalog::new()
        .card("1A", 5000)
        .card("1B", 5000)
        .card("2A", 9000)
        .card("2B", 100)
}

async fn tied_first_round() -> (TestApp, String, String, String) {
    let app = test_app(two_player_config(), catalog());
    let sessions = SessionService::new(app.state.clone());
    let flow = GameFlowService::new(app.state.clone());

    let created = sessions.create_session("user-a", "Ana").await.unwrap();
    let code = created.code.clone();
    let p1 = created.player_id.clone().unwrap();
    let joined = sessions.join_session(&code, "user-b", "Bruno").await.unwrap();
    let p2 = joined.player_id.clone().unwrap();

    script_round(&app.state, &code, &p1, &[(&p1, &["1A", "2A"]), (&p2, &["1B", "2B"])]).await;
    flow.select_attribute(&code, &p1, "poder").await.unwrap();
    flow.play_card(&code, &p1, None).await.unwrap();
    flow.play_card(&code, &p2, None).await.unwrap();

    (app, code, p1, p2)
}

#[tokio::test]
async fn tied_cards_wait_in_escrow_and_the_turn_stays() {
    let (app, code, p1, p2) = tied_first_round().await;

    let session = load(&app.state, &code).await;
    assert_eq!(session.tie_pool, vec!["1A".to_string(), "1B".to_string()]);
    assert_eq!(session.player(&p1).unwrap().hand, vec!["2A".to_string()]);
    assert_eq!(session.player(&p2).unwrap().hand, vec!["2B".to_string()]);
    assert_eq!(session.turn_player.as_deref(), Some(p1.as_str()));
    assert_eq!(session.rounds.len(), 1);
    assert!(session.rounds[0].winner.is_none());
    // Nothing was lost: 2 in hands + 2 in escrow.
    assert_eq!(session.total_cards_in_play(), 4);
}

#[tokio::test]
async fn next_winner_collects_the_escrow_pool() {
    let (app, code, p1, p2) = tied_first_round().await;
    let flow = GameFlowService::new(app.state.clone());
    let mut rx = app.bus.subscribe(&session_topic(&code));

    flow.select_attribute(&code, &p1, "poder").await.unwrap();
    flow.play_card(&code, &p1, None).await.unwrap();
    flow.play_card(&code, &p2, None).await.unwrap();

    let session = load(&app.state, &code).await;
    // 2A (9000) beats 2B (100); table plus pool all land with p1.
    assert!(session.tie_pool.is_empty());
    assert_eq!(session.player(&p1).unwrap().hand.len(), 4);
    assert!(session.player(&p2).unwrap().hand.is_empty());
    assert_eq!(session.state, SessionState::Finished);
    assert_eq!(session.winner.as_deref(), Some(p1.as_str()));

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::RoundResolved { tie: false, winning_value: 9000, .. }
    )));
}

#[tokio::test]
async fn tie_on_everyones_last_card_finishes_as_a_stalemate() {
    let app = test_app(two_player_config(), catalog());
    let sessions = SessionService::new(app.state.clone());
    let flow = GameFlowService::new(app.state.clone());

    let created = sessions.create_session("user-a", "Ana").await.unwrap();
    let code = created.code.clone();
    let p1 = created.player_id.clone().unwrap();
    let joined = sessions.join_session(&code, "user-b", "Bruno").await.unwrap();
    let p2 = joined.player_id.clone().unwrap();

    script_round(&app.state, &code, &p1, &[(&p1, &["1A"]), (&p2, &["1B"])]).await;
    let mut rx = app.bus.subscribe(&session_topic(&code));

    flow.select_attribute(&code, &p1, "poder").await.unwrap();
    flow.play_card(&code, &p1, None).await.unwrap();
    flow.play_card(&code, &p2, None).await.unwrap();

    // Both last cards tied into escrow; nobody holds a card to play, so
    // the session must not stay in progress.
    let session = load(&app.state, &code).await;
    assert_eq!(session.state, SessionState::Finished);
    assert!(session.winner.is_none());
    assert_eq!(session.tie_pool, vec!["1A".to_string(), "1B".to_string()]);
    assert!(session.players.iter().all(|p| p.hand.is_empty()));

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::GameFinished {
            winner_id: None,
            reason: FinishReason::Stalemate,
            tie: true,
        }
    )));
}
