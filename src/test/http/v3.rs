use super::*;
use crate::pbx::{ScriptedPbx, Terminal, TerminalMode};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn test_state(pbx_name: &str) -> (AppState, ScriptedPbx) {
    let (terminal, pbx) = Terminal::scripted(Some(TerminalMode::Ossi), Duration::from_millis(100));
    let state = AppState {
        terminal: Arc::new(Mutex::new(terminal)),
        pbx_name: pbx_name.to_string(),
    };
    (state, pbx)
}

#[tokio::test]
async fn the_wrong_pbx_name_is_a_500_without_touching_the_session() {
    let (state, pbx) = test_state("uw01");

    let result = pbx_command(
        State(state),
        Path("other".to_string()),
        r#"{"termtype": "ossi", "command": "display time"}"#.to_string(),
    )
    .await;

    let (status, _) = result.expect_err("wrong pbx rejected");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(pbx.sent_text(), "");
}

#[tokio::test]
async fn unparseable_json_is_a_400() {
    let (state, pbx) = test_state("uw01");

    let result = pbx_command(State(state), Path("uw01".to_string()), "not json".to_string()).await;

    let (status, _) = result.expect_err("bad body rejected");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(pbx.sent_text(), "");
}

#[tokio::test]
async fn a_missing_command_key_is_a_400() {
    let (state, pbx) = test_state("uw01");

    let result = pbx_command(State(state), Path("uw01".to_string()), r#"{"termtype": "ossi"}"#.to_string()).await;

    let (status, _) = result.expect_err("incomplete body rejected");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(pbx.sent_text(), "");
}

#[tokio::test]
async fn a_command_round_trips_as_json() {
    let (state, pbx) = test_state("uw01");
    pbx.feed(b"f0005ff00\t0006ff00\t0007ff00\nd12\t34\t56\nt\n");

    let body = r#"{"termtype": "ossi", "command": "display time", "fields": {"0007ff00": ""}}"#.to_string();
    let Json(response) = pbx_command(State(state), Path("uw01".to_string()), body).await.expect("command runs");

    assert_eq!(
        serde_json::to_string(&response).expect("serializes"),
        r#"{"ossi_objects":[{"0005ff00":"12","0006ff00":"34","0007ff00":"56"}]}"#
    );
    assert_eq!(pbx.sent_text(), "c display time\nf0007ff00\nd\nt\n");
}

#[tokio::test]
async fn an_unknown_termtype_reports_the_rejection_in_the_body() {
    let (state, pbx) = test_state("uw01");

    let body = r#"{"termtype": "4410", "command": "display time"}"#.to_string();
    let Json(response) = pbx_command(State(state), Path("uw01".to_string()), body).await.expect("rejection is a 200");

    assert_eq!(
        serde_json::to_string(&response).expect("serializes"),
        r#"{"error":"Unknown termtype. Must be ossi or vt220."}"#
    );
    assert_eq!(pbx.sent_text(), "");
}
