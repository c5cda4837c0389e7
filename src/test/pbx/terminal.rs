use super::*;

const TICK: Duration = Duration::from_millis(100);

const TERMTYPE_PROMPT_BYTES: &[u8] = b"Terminal Type (513, 715, 4410, 4425, VT220, NTT, W2KTT, SUNT): [513] ";
const VT220_ENTRY_BYTES: &[u8] = b"\x1b[2;1Hdisplay\r\n\x1b[KCommand: ";
const OSSI_ENTRY_BYTES: &[u8] = b"t\r\n";

#[test]
fn ensure_mode_is_idempotent() {
    let (mut terminal, pbx) = Terminal::scripted(Some(TerminalMode::Ossi), TICK);
    terminal.ensure_mode(TerminalMode::Ossi).expect("already in ossi mode");
    // No transition was issued.
    assert_eq!(pbx.sent_text(), "");
    assert_eq!(terminal.connected_mode(), Some(TerminalMode::Ossi));
}

#[test]
fn switching_from_ossi_to_vt220_runs_the_newterm_dance() {
    let (mut terminal, pbx) = Terminal::scripted(Some(TerminalMode::Ossi), TICK);
    pbx.feed(TERMTYPE_PROMPT_BYTES);
    pbx.feed(VT220_ENTRY_BYTES);

    terminal.ensure_mode(TerminalMode::Vt220).expect("mode switch succeeds");

    assert_eq!(pbx.sent_text(), "c newterm\nt\nvt220\n");
    assert_eq!(terminal.connected_mode(), Some(TerminalMode::Vt220));
}

#[test]
fn switching_from_vt220_to_ossi_sends_newterm() {
    let (mut terminal, pbx) = Terminal::scripted(Some(TerminalMode::Vt220), TICK);
    pbx.feed(TERMTYPE_PROMPT_BYTES);
    pbx.feed(OSSI_ENTRY_BYTES);

    terminal.ensure_mode(TerminalMode::Ossi).expect("mode switch succeeds");

    assert_eq!(pbx.sent_text(), "newterm\nossi4\n");
    assert_eq!(terminal.connected_mode(), Some(TerminalMode::Ossi));
}

#[test]
fn mode_switch_times_out_into_a_mode_switch_error() {
    let (mut terminal, _pbx) = Terminal::scripted(Some(TerminalMode::Ossi), TICK);

    let err = terminal.ensure_mode(TerminalMode::Vt220).expect_err("no termtype prompt arrives");
    assert!(matches!(err, PbxError::ModeSwitchFailed(_)));
    // The mode did not silently flip.
    assert_eq!(terminal.connected_mode(), Some(TerminalMode::Ossi));
}

#[test]
fn mode_switch_eof_carries_the_last_output_line() {
    let (mut terminal, mut pbx) = Terminal::scripted(Some(TerminalMode::Ossi), TICK);
    pbx.feed(b"goodbye\r\nConnection closed by remote host\r\n");
    pbx.hang_up();

    let err = terminal.ensure_mode(TerminalMode::Vt220).expect_err("EOF at the termtype prompt");
    match err {
        PbxError::ModeSwitchFailed(msg) => assert!(msg.contains("Connection closed by remote host")),
        other => panic!("expected ModeSwitchFailed, got {:?}", other),
    }
}

#[test]
fn unknown_termtype_is_rejected_without_touching_the_session() {
    let (mut terminal, pbx) = Terminal::scripted(Some(TerminalMode::Ossi), TICK);

    let response = terminal.send_pbx_command("4410", "display time", None, false).expect("rejection is not an error");
    match response {
        PbxResponse::Rejected { error } => {
            assert_eq!(error, "Unknown termtype. Must be ossi or vt220.");
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
    assert_eq!(pbx.sent_text(), "");
}

#[test]
fn disconnect_from_ossi_logs_off_and_confirms() {
    let (mut terminal, pbx) = Terminal::scripted(Some(TerminalMode::Ossi), TICK);
    pbx.feed(b"Proceed With Logoff [n]? ");

    terminal.disconnect();

    assert_eq!(pbx.sent_text(), "c logoff\nt\ny\n");
    assert_eq!(terminal.connected_mode(), None);
    assert!(terminal.session.is_none());
}

#[test]
fn disconnect_from_vt220_cancels_first() {
    let (mut terminal, pbx) = Terminal::scripted(Some(TerminalMode::Vt220), TICK);
    pbx.feed(b"Proceed With Logoff [n]? ");

    terminal.disconnect();

    assert_eq!(pbx.sent_text(), "\x1b[3~logoff\ny\n");
    assert_eq!(terminal.connected_mode(), None);
}

#[test]
fn disconnect_survives_a_silent_pbx() {
    let (mut terminal, _pbx) = Terminal::scripted(Some(TerminalMode::Ossi), TICK);

    terminal.disconnect();

    assert_eq!(terminal.connected_mode(), None);
    assert!(terminal.session.is_none());
}

#[test]
fn last_line_picks_the_final_non_empty_line() {
    assert_eq!(last_line("one\r\ntwo\r\n\r\n"), "two");
    assert_eq!(last_line("Too many logins"), "Too many logins");
    assert_eq!(last_line(""), "");
}
