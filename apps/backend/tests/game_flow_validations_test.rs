//! Rejected gameplay commands: nothing mutates, the caller gets the error
//! back, and a private notice lands on their error channel only.

mod support;

use backend::errors::DomainError;
use backend::events::{error_channel, session_topic, GameEvent};
use backend::services::{GameFlowService, SessionService};
use support::*;

fn catalog() -> ScriptedCatalog {
    ScriptedCatalog::new()
        .card("1A", 9000)
        .card("1B", 8000)
        .card("2A", 7000)
        .card("2B", 6000)
}

async fn started_session() -> (TestApp, String, String, String) {
    let app = test_app(two_player_config(), catalog());
    let sessions = SessionService::new(app.state.clone());

    let created = sessions.create_session("user-a", "Ana").await.unwrap();
    let code = created.code.clone();
    let p1 = created.player_id.clone().unwrap();
    let joined = sessions.join_session(&code, "user-b", "Bruno").await.unwrap();
    let p2 = joined.player_id.clone().unwrap();

    script_round(&app.state, &code, &p1, &[(&p1, &["1A", "2A"]), (&p2, &["1B", "2B"])]).await;
    (app, code, p1, p2)
}

#[tokio::test]
async fn selecting_out_of_turn_is_rejected_privately() {
    let (app, code, _p1, p2) = started_session().await;
    let flow = GameFlowService::new(app.state.clone());

    let mut topic_rx = app.bus.subscribe(&session_topic(&code));
    let mut error_rx = app.bus.subscribe_user(&p2, &error_channel(&code));

    let err = flow.select_attribute(&code, &p2, "poder").await.unwrap_err();
    assert!(matches!(err, DomainError::NotYourTurn(_)));

    // Nothing changed, nothing broadcast; only the private notice.
    let session = load(&app.state, &code).await;
    assert!(session.selected_attribute.is_none());
    assert!(drain(&mut topic_rx).is_empty());
    let private = drain(&mut error_rx);
    assert!(matches!(
        private.as_slice(),
        [GameEvent::Error { code, .. }] if code == "NOT_YOUR_TURN"
    ));
}

#[tokio::test]
async fn playing_before_an_attribute_is_selected_is_rejected() {
    let (app, code, p1, _p2) = started_session().await;
    let flow = GameFlowService::new(app.state.clone());

    let err = flow.play_card(&code, &p1, None).await.unwrap_err();
    assert!(matches!(err, DomainError::AttributeNotSelected(_)));

    let session = load(&app.state, &code).await;
    assert_eq!(session.player(&p1).unwrap().hand.len(), 2);
    assert!(session.table.is_empty());
}

#[tokio::test]
async fn playing_out_of_order_leaves_hands_untouched() {
    let (app, code, p1, p2) = started_session().await;
    let flow = GameFlowService::new(app.state.clone());

    flow.select_attribute(&code, &p1, "poder").await.unwrap();
    let err = flow.play_card(&code, &p2, None).await.unwrap_err();
    assert!(matches!(err, DomainError::NotYourTurn(_)));

    let session = load(&app.state, &code).await;
    assert_eq!(session.player(&p2).unwrap().hand.len(), 2);
    assert!(session.table.is_empty());
}

#[tokio::test]
async fn out_of_range_card_index_falls_back_to_the_top_card() {
    let (app, code, p1, _p2) = started_session().await;
    let flow = GameFlowService::new(app.state.clone());

    flow.select_attribute(&code, &p1, "poder").await.unwrap();
    flow.play_card(&code, &p1, Some(99)).await.unwrap();

    let session = load(&app.state, &code).await;
    assert_eq!(session.table.len(), 1);
    assert_eq!(session.table[0].card_code, "1A");
    assert_eq!(session.player(&p1).unwrap().hand, vec!["2A".to_string()]);
}

#[tokio::test]
async fn empty_attribute_name_is_rejected() {
    let (app, code, p1, _p2) = started_session().await;
    let flow = GameFlowService::new(app.state.clone());

    let err = flow.select_attribute(&code, &p1, "  ").await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidArgument(_)));
}

#[tokio::test]
async fn commands_on_an_unknown_session_are_not_found() {
    let app = test_app(two_player_config(), catalog());
    let flow = GameFlowService::new(app.state.clone());

    let err = flow.play_card("NOSUCH", "ghost", None).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(..)));
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn starting_twice_is_an_invalid_state() {
    let (app, code, _p1, _p2) = started_session().await;
    let flow = GameFlowService::new(app.state.clone());

    let err = flow.start(&code).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidState(_)));
}
