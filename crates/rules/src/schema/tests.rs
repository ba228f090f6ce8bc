//! Tests for schema types.

use std::path::PathBuf;

use super::*;

const FULL_DEFINITION_YAML: &str = r#"
bot_mode: first_last
clean_filter: "[^\\p{L}\\p{N}\\s]"
remove_duplicate_letters: true
reply_delimiter: " | "
secrets: secrets.yaml
service_port: 9090
log_settings:
  level: debug
rules:
  - text: greeting
    pattern: "^hi"
    response: "hello!"
  - pattern: "bye$"
    response: "goodbye!"
"#;

#[test]
fn parse_full_definition() {
    let def: Definition = serde_yaml::from_str(FULL_DEFINITION_YAML).unwrap();

    assert_eq!(def.bot_mode, MatchMode::FirstLast);
    assert_eq!(def.clean_filter, r"[^\p{L}\p{N}\s]");
    assert!(def.remove_duplicates);
    assert_eq!(def.reply_delimiter, " | ");
    assert_eq!(def.secrets_path(), Some(PathBuf::from("secrets.yaml").as_path()));
    assert_eq!(def.rules.len(), 2);
    assert_eq!(def.rules[0].label(), "greeting");
}

#[test]
fn defaults_apply_to_minimal_definition() {
    let def: Definition = serde_yaml::from_str("rules: []").unwrap();

    assert_eq!(def, Definition::default());
    assert_eq!(def.bot_mode, MatchMode::FirstLast);
    assert_eq!(def.reply_delimiter, DEFAULT_REPLY_DELIMITER);
    assert!(def.secrets_path().is_none());
}

#[test]
fn empty_secrets_value_is_ignored() {
    let def: Definition = serde_yaml::from_str("secrets: \"\"\nrules: []").unwrap();
    assert!(def.secrets_path().is_none());
}

#[test]
fn rule_label_falls_back_to_pattern() {
    let def: Definition = serde_yaml::from_str(FULL_DEFINITION_YAML).unwrap();
    assert_eq!(def.rules[1].label(), "bye$");
}

#[test]
fn rule_without_response_is_rejected() {
    let yaml = r#"
rules:
  - text: broken
    pattern: "x"
"#;
    assert!(serde_yaml::from_str::<Definition>(yaml).is_err());
}

// -- MatchMode ---------------------------------------------------------

#[test]
fn mode_parses_known_names() {
    assert_eq!("first_last".parse::<MatchMode>().unwrap(), MatchMode::FirstLast);
    assert_eq!("all".parse::<MatchMode>().unwrap(), MatchMode::All);
    assert_eq!(" ALL ".parse::<MatchMode>().unwrap(), MatchMode::All);
    assert_eq!("".parse::<MatchMode>().unwrap(), MatchMode::FirstLast);
}

#[test]
fn mode_keeps_unrecognized_name() {
    let mode: MatchMode = "everywhere".parse().unwrap();
    assert_eq!(mode, MatchMode::Unrecognized("everywhere".to_string()));
    assert!(!mode.is_boundary_only());
    assert_eq!(mode.to_string(), "everywhere");
}

#[test]
fn mode_deserializes_from_yaml() {
    let def: Definition = serde_yaml::from_str("bot_mode: all").unwrap();
    assert_eq!(def.bot_mode, MatchMode::All);

    let def: Definition = serde_yaml::from_str("bot_mode:\nrules: []").unwrap();
    assert_eq!(def.bot_mode, MatchMode::FirstLast);

    let def: Definition = serde_yaml::from_str("bot_mode: sideways").unwrap();
    assert_eq!(def.bot_mode, MatchMode::Unrecognized("sideways".to_string()));
}

#[test]
fn mode_roundtrips_through_yaml() {
    let yaml = serde_yaml::to_string(&MatchMode::All).unwrap();
    assert_eq!(yaml.trim(), "all");
}

// -- Secrets -----------------------------------------------------------

#[test]
fn secrets_document_parses_token() {
    let doc: SecretsDocument = serde_yaml::from_str("telegram:\n  token: abc:123").unwrap();
    assert_eq!(doc.telegram.token, "abc:123");
}

#[test]
fn secrets_debug_redacts_token() {
    let doc: SecretsDocument = serde_yaml::from_str("telegram:\n  token: abc:123").unwrap();
    let printed = format!("{:?}", doc);
    assert!(!printed.contains("abc:123"));
    assert!(printed.contains("redacted"));
}

#[test]
fn secrets_ref_reads_only_the_path() {
    let path = SecretsRef::from_definition_bytes(FULL_DEFINITION_YAML.as_bytes());
    assert_eq!(path, Some(PathBuf::from("secrets.yaml")));

    assert_eq!(SecretsRef::from_definition_bytes(b"rules: []"), None);
    assert_eq!(SecretsRef::from_definition_bytes(b"rules: [unclosed"), None);
}
