use super::*;

#[test]
fn password_prompt_matches_login_banner() {
    assert!(PASSWORD_PROMPT.is_match("login\r\nPassword: "));
}

#[test]
fn termtype_prompt_matches_the_sat_menu() {
    let prompt = "Terminal Type (513, 715, 4410, 4425, VT220, NTT, W2KTT, SUNT): [513]";
    assert!(TERMTYPE_PROMPT.is_match(prompt));
    assert!(!TERMTYPE_PROMPT.is_match("Terminal Type"));
}

#[test]
fn vt220_mode_prompt_spans_escape_sequences_and_lines() {
    let stream = "\x1b[2;1Hdisplay time\r\n\x1b[3;1H\x1b[KCommand: ";
    assert!(VT220_MODE_PROMPT.is_match(stream));
}

#[test]
fn ossi_field_line_needs_a_payload() {
    assert!(OSSI_FIELD_LINE.is_match("f0005ff00\t0006ff00\r\n"));
    assert!(!OSSI_FIELD_LINE.is_match("f\r\n"));
}

#[test]
fn ossi_data_line_may_be_empty() {
    assert!(OSSI_DATA_LINE.is_match("d\r\n"));
    assert!(OSSI_DATA_LINE.is_match("d12\t \t34\r\n"));
}

#[test]
fn ossi_boundary_lines_need_their_newlines() {
    assert!(OSSI_NEXT_LINE.is_match("n\r\n"));
    assert!(!OSSI_NEXT_LINE.is_match("n"));
    assert!(OSSI_TERM_LINE.is_match("t\n"));
    assert!(!OSSI_TERM_LINE.is_match("t"));
}

#[test]
fn ossi_echo_line_matches_the_echoed_command() {
    assert!(OSSI_ECHO_LINE.is_match("c display time\r\n"));
    assert!(!OSSI_ECHO_LINE.is_match("cdisplay\r\n"));
}

#[test]
fn end_of_page_cursor_needs_a_two_digit_column() {
    assert!(VT220_END_OF_PAGE.is_match("\x1b[9;22H\x1b[0m"));
    assert!(!VT220_END_OF_PAGE.is_match("\x1b[9;2H\x1b[0m"));
}

#[test]
fn end_of_monitor_matches_the_bottom_right_park() {
    assert!(VT220_END_OF_MONITOR.is_match("\x1b[23;80H"));
}

#[test]
fn page_of_captures_both_page_numbers() {
    let captures = PAGE_OF.captures("station  Page   2 of   5   ").expect("paging marker");
    assert_eq!(&captures[1], "2");
    assert_eq!(&captures[2], "5");
}

#[test]
fn paging_banner_requires_the_double_space() {
    assert!(VT220_PAGING.is_match("press CANCEL to quit --  press NEXT PAGE to continue"));
    assert!(!VT220_PAGING.is_match("press CANCEL to quit -- press NEXT PAGE to continue"));
}
