use super::*;
use secrecy::ExposeSecret;

const SAMPLE: &str = r#"{
    "connection_command": "/usr/bin/ssh -o \"StrictHostKeyChecking no\" sat@pbx.example.edu",
    "pbx_username": "sat",
    "pbx_password": "hunter2"
}"#;

#[test]
fn parses_the_connection_file() {
    let file_config = parse_file_config(SAMPLE).expect("parses");

    assert_eq!(file_config.connection_command, "/usr/bin/ssh -o \"StrictHostKeyChecking no\" sat@pbx.example.edu");
    assert_eq!(file_config.pbx_username, "sat");
    assert_eq!(file_config.pbx_password, "hunter2");
}

#[test]
fn a_missing_key_is_a_parse_error() {
    let incomplete = r#"{"connection_command": "/usr/bin/ssh sat@pbx"}"#;
    assert!(matches!(parse_file_config(incomplete), Err(ConfigError::ParseError(_))));
}

#[test]
fn garbage_is_a_parse_error() {
    assert!(matches!(parse_file_config("not json"), Err(ConfigError::ParseError(_))));
}

#[test]
fn the_command_timeout_defaults_to_five_minutes() {
    assert_eq!(resolve_command_timeout(None).expect("default applies"), Duration::from_secs(300));
}

#[test]
fn the_command_timeout_reads_whole_seconds() {
    assert_eq!(resolve_command_timeout(Some("120".to_string())).expect("parses"), Duration::from_secs(120));
    assert_eq!(resolve_command_timeout(Some(" 45 ".to_string())).expect("tolerates spaces"), Duration::from_secs(45));
}

#[test]
fn a_non_numeric_timeout_is_rejected() {
    assert!(matches!(resolve_command_timeout(Some("soon".to_string())), Err(ConfigError::InvalidTimeout(_))));
}

#[test]
fn the_application_root_defaults_to_slash() {
    assert_eq!(resolve_application_root(None), "/");
    assert_eq!(resolve_application_root(Some("".to_string())), "/");
    assert_eq!(resolve_application_root(Some("/pbx/uw01".to_string())), "/pbx/uw01");
}

#[test]
fn the_loader_needs_a_path_from_somewhere() {
    // With a CLI path the loader takes it as given.
    let loader = ConfigLoader::new(Some(PathBuf::from("/tmp/pbxd-test.json"))).expect("explicit path accepted");
    assert_eq!(loader.config_path, PathBuf::from("/tmp/pbxd-test.json"));
}

#[test]
fn the_password_is_wrapped_before_it_leaves_the_loader() {
    let file_config = parse_file_config(SAMPLE).expect("parses");
    let secret = secrecy::SecretBox::new(Box::new(file_config.pbx_password));
    assert_eq!(secret.expose_secret(), "hunter2");
    // Debug formatting must not leak the password.
    assert!(!format!("{:?}", secret).contains("hunter2"));
}
