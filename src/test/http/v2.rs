use super::*;
use crate::pbx::{OssiRecord, OssiResponse, ScriptedPbx, Terminal, TerminalMode, Vt220Response};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn request_fixture() -> V2Command {
    V2Command {
        pbx_name: "uw01".to_string(),
        termtype: "ossi".to_string(),
        command: "display time".to_string(),
        fields: IndexMap::new(),
    }
}

fn record(pairs: &[(&str, &str)]) -> OssiRecord {
    pairs.iter().map(|(fid, value)| (fid.to_string(), value.to_string())).collect()
}

#[test]
fn parses_a_command_with_one_field() {
    let xml = r#"<command pbxName="uw01" cmdType="ossi" cmd="display time"><field fid="0007ff00">56</field></command>"#;
    let request = parse_command_xml(xml).expect("parses");

    assert_eq!(request.pbx_name, "uw01");
    assert_eq!(request.termtype, "ossi");
    assert_eq!(request.command, "display time");
    assert_eq!(request.fields.len(), 1);
    assert_eq!(request.fields["0007ff00"], "56");
}

#[test]
fn parses_multiple_fields_in_document_order() {
    let xml = r#"<command pbxName="uw01" cmdType="ossi" cmd="change station 1234">
        <field fid="8003ff00">61234</field>
        <field fid="0031ff00">ext</field>
    </command>"#;
    let request = parse_command_xml(xml).expect("parses");

    let fids: Vec<&String> = request.fields.keys().collect();
    assert_eq!(fids, vec!["8003ff00", "0031ff00"]);
}

#[test]
fn a_field_without_text_means_clear() {
    let xml = r#"<command pbxName="uw01" cmdType="ossi" cmd="change station 1234"><field fid="8003ff00"></field><field fid="8004ff00"/></command>"#;
    let request = parse_command_xml(xml).expect("parses");

    assert_eq!(request.fields["8003ff00"], " ");
    assert_eq!(request.fields["8004ff00"], " ");
}

#[test]
fn a_command_element_without_fields_parses_empty() {
    let xml = r#"<command pbxName="uw01" cmdType="vt220" cmd="display time"/>"#;
    let request = parse_command_xml(xml).expect("parses");

    assert!(request.fields.is_empty());
    assert_eq!(request.termtype, "vt220");
}

#[test]
fn escaped_attribute_and_text_values_are_unescaped() {
    let xml = r#"<command pbxName="uw01" cmdType="ossi" cmd="list station &amp; more"><field fid="0001ff00">a &lt; b</field></command>"#;
    let request = parse_command_xml(xml).expect("parses");

    assert_eq!(request.command, "list station & more");
    assert_eq!(request.fields["0001ff00"], "a < b");
}

#[test]
fn missing_command_attributes_are_rejected() {
    let xml = r#"<command pbxName="uw01" cmdType="ossi"><field fid="0001ff00">x</field></command>"#;
    assert!(matches!(parse_command_xml(xml), Err(XmlError::MissingAttribute("cmd"))));

    let xml = r#"<command cmdType="ossi" cmd="display time"/>"#;
    assert!(matches!(parse_command_xml(xml), Err(XmlError::MissingAttribute("pbxName"))));
}

#[test]
fn malformed_xml_is_rejected() {
    assert!(parse_command_xml("<command").is_err());
    assert!(parse_command_xml("not xml at all").is_err());
}

#[test]
fn renders_ossi_objects_with_numbered_indexes() {
    let response = PbxResponse::Ossi(OssiResponse {
        ossi_objects: vec![record(&[("0005ff00", "12"), ("0006ff00", "34")]), record(&[("0005ff00", "56")])],
        error: None,
        debug: None,
    });
    let xml = render_command_xml(&request_fixture(), &response).expect("renders");

    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
    assert!(xml.contains(r#"<command cmd="display time" cmdType="ossi" pbxName="uw01">"#));
    assert!(xml.contains(r#"<ossi_object i="1">"#));
    assert!(xml.contains(r#"<ossi_object i="2">"#));
    assert!(xml.contains(r#"<field fid="0005ff00">12</field>"#));
    assert!(xml.contains(r#"<field fid="0006ff00">34</field>"#));
    assert!(xml.contains(r#"<field fid="0005ff00">56</field>"#));
    assert!(!xml.contains("<error>"));
}

#[test]
fn renders_an_empty_object_element_when_nothing_matched() {
    let response = PbxResponse::Ossi(OssiResponse::default());
    let xml = render_command_xml(&request_fixture(), &response).expect("renders");

    assert!(xml.contains("<ossi_object/>"));
}

#[test]
fn renders_screens_with_page_numbers() {
    let response = PbxResponse::Vt220(Vt220Response {
        screens: vec!["first page".to_string(), "second page".to_string()],
        error: None,
    });
    let xml = render_command_xml(&request_fixture(), &response).expect("renders");

    assert!(xml.contains(r#"<screen page="1">first page</screen>"#));
    assert!(xml.contains(r#"<screen page="2">second page</screen>"#));
}

#[test]
fn an_error_suppresses_objects_and_carries_the_prefix() {
    let response = PbxResponse::Ossi(OssiResponse {
        ossi_objects: vec![record(&[("0005ff00", "12")])],
        error: Some("00000000 unknown is an invalid entry; please press HELP".to_string()),
        debug: None,
    });
    let xml = render_command_xml(&request_fixture(), &response).expect("renders");

    assert!(xml.contains("<error>ERROR: 00000000 unknown is an invalid entry; please press HELP</error>"));
    assert!(!xml.contains("<ossi_object"));
}

#[test]
fn screen_text_is_escaped_on_the_way_out() {
    let response = PbxResponse::Vt220(Vt220Response {
        screens: vec!["a < b & c".to_string()],
        error: None,
    });
    let xml = render_command_xml(&request_fixture(), &response).expect("renders");

    assert!(xml.contains("a &lt; b &amp; c"));
}

fn test_state() -> (AppState, ScriptedPbx) {
    let (terminal, pbx) = Terminal::scripted(Some(TerminalMode::Ossi), Duration::from_millis(100));
    let state = AppState {
        terminal: Arc::new(Mutex::new(terminal)),
        pbx_name: "uw01".to_string(),
    };
    (state, pbx)
}

#[tokio::test]
async fn the_handler_answers_in_xml() {
    let (state, pbx) = test_state();
    pbx.feed(b"f0005ff00\t0006ff00\t0007ff00\nd12\t34\t56\nt\n");

    let mut form = HashMap::new();
    form.insert(
        "request".to_string(),
        r#"<command pbxName="uw01" cmdType="ossi" cmd="display time"><field fid="0007ff00"></field></command>"#.to_string(),
    );
    let response = legacy_xml_post(State(state), Path("uw01".to_string()), Form(form)).await.expect("command runs");

    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/xml");
    // A cleared field still reaches the wire as a single space.
    assert_eq!(pbx.sent_text(), "c display time\nf0007ff00\nd \nt\n");
}

#[tokio::test]
async fn the_wrong_pbx_name_is_a_500_without_touching_the_session() {
    let (state, pbx) = test_state();

    let mut form = HashMap::new();
    form.insert(
        "request".to_string(),
        r#"<command pbxName="wrong-pbx" cmdType="ossi" cmd="display time"/>"#.to_string(),
    );
    let result = legacy_xml_post(State(state), Path("wrong-pbx".to_string()), Form(form)).await;

    let (status, _) = result.expect_err("wrong pbx rejected");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(pbx.sent_text(), "");
}

#[tokio::test]
async fn a_missing_request_field_is_a_400() {
    let (state, pbx) = test_state();

    let result = legacy_xml_post(State(state), Path("uw01".to_string()), Form(HashMap::new())).await;

    let (status, _) = result.expect_err("missing form field rejected");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(pbx.sent_text(), "");
}

#[tokio::test]
async fn bad_xml_in_the_request_field_is_a_400() {
    let (state, pbx) = test_state();

    let mut form = HashMap::new();
    form.insert("request".to_string(), "<command".to_string());
    let result = legacy_xml_post(State(state), Path("uw01".to_string()), Form(form)).await;

    let (status, _) = result.expect_err("bad xml rejected");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(pbx.sent_text(), "");
}

#[test]
fn v2_and_v3_encodings_carry_the_same_payload() {
    let pairs = [("0005ff00", "12"), ("0007ff00", "56")];
    let response = PbxResponse::Ossi(OssiResponse {
        ossi_objects: vec![record(&pairs)],
        error: None,
        debug: None,
    });

    let json = serde_json::to_value(&response).expect("serializes");
    let xml = render_command_xml(&request_fixture(), &response).expect("renders");

    for (fid, value) in pairs {
        assert_eq!(json["ossi_objects"][0][fid], serde_json::Value::String(value.to_string()));
        assert!(xml.contains(&format!(r#"<field fid="{}">{}</field>"#, fid, value)));
    }
}

#[test]
fn v2_and_v3_encodings_carry_the_same_error_string() {
    let error = "00000000 unknown is an invalid entry; please press HELP";
    let response = PbxResponse::Ossi(OssiResponse {
        ossi_objects: Vec::new(),
        error: Some(error.to_string()),
        debug: None,
    });

    let json = serde_json::to_value(&response).expect("serializes");
    let xml = render_command_xml(&request_fixture(), &response).expect("renders");

    assert_eq!(json["error"], serde_json::Value::String(error.to_string()));
    assert!(xml.contains(&format!("<error>ERROR: {}</error>", error)));
}
