#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn default_matches_constants() {
    let config = EditorConfig::default();
    assert_eq!(config.min_size, 20.0);
    assert_eq!(config.handle_threshold, 10.0);
    assert_eq!(config.rotate_handle_offset, 25.0);
    assert_eq!(config.duplicate_offset, 10.0);
    assert_eq!(config.history_limit, 100);
}

#[test]
fn default_is_valid() {
    assert!(EditorConfig::default().validate().is_ok());
}

#[test]
fn from_json_empty_object_uses_defaults() {
    let config = EditorConfig::from_json("{}");
    assert!(matches!(config, Ok(c) if c == EditorConfig::default()));
}

#[test]
fn from_json_overrides_single_key() {
    let Ok(config) = EditorConfig::from_json(r#"{ "min_size": 32 }"#) else {
        panic!("expected valid config");
    };
    assert_eq!(config.min_size, 32.0);
    assert_eq!(config.handle_threshold, 10.0);
}

#[test]
fn from_json_malformed_is_parse_error() {
    let result = EditorConfig::from_json("{ min_size: ");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn from_json_rejects_zero_min_size() {
    let result = EditorConfig::from_json(r#"{ "min_size": 0 }"#);
    assert!(matches!(result, Err(ConfigError::Invalid { key: "min_size", .. })));
}

#[test]
fn from_json_rejects_negative_threshold() {
    let result = EditorConfig::from_json(r#"{ "handle_threshold": -4 }"#);
    assert!(matches!(result, Err(ConfigError::Invalid { key: "handle_threshold", .. })));
}

#[test]
fn from_json_rejects_blank_color() {
    let result = EditorConfig::from_json(r#"{ "accent_color": "  " }"#);
    assert!(matches!(result, Err(ConfigError::Invalid { key: "accent_color", .. })));
}

#[test]
fn zero_history_limit_is_allowed() {
    let Ok(config) = EditorConfig::from_json(r#"{ "history_limit": 0 }"#) else {
        panic!("expected valid config");
    };
    assert_eq!(config.history_limit, 0);
}

#[test]
fn invalid_error_message_names_key() {
    let err = ConfigError::Invalid { key: "min_size", reason: "bad".into() };
    assert_eq!(err.to_string(), "invalid config value for min_size: bad");
}
