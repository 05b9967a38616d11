//! Tests for YAML configuration loading and filter construction.

use std::sync::Arc;
use std::time::Duration;

use pii_filter::config::{ActionKind, FilterConfig};
use pii_filter::filter::TracingLogger;
use pii_filter::pipeline::PayloadFilter;
use pii_filter::PiiError;
use serde_json::json;
use tempfile::TempDir;

fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = FilterConfig::load_from(&dir.path().join("nope.yml")).unwrap();

    assert_eq!(config.event.max_depth, None);
    assert_eq!(config.event.actions.len(), 7);
    assert_eq!(config.event.actions[0], ActionKind::Depth);
    assert!(config.custom_patterns.is_empty());
    assert_eq!(config.pruner.prune_interval(), Duration::from_secs(3600));
    assert_eq!(config.pruner.max_token_age(), Duration::ZERO);
}

#[test]
fn full_config_parses() {
    let (_dir, path) = write_config(
        r#"
event:
  max_depth: 4
  actions: [depth, email, pii_keys]
queue:
  actions: [email]
custom_patterns:
  - name: account-number
    pattern: 'acct-\d+'
  - name: secret-key
    pattern: '^secret$'
    scope: keys
    replacement: "[Redacted]"
pruner:
  prune_interval_ms: 1000
  max_token_age_ms: 86400000
"#,
    );
    let config = FilterConfig::load_from(&path).unwrap();

    assert_eq!(config.event.max_depth, Some(4));
    assert_eq!(
        config.event.actions,
        vec![ActionKind::Depth, ActionKind::Email, ActionKind::PiiKeys]
    );
    assert_eq!(config.queue.actions, vec![ActionKind::Email]);
    assert_eq!(config.custom_patterns.len(), 2);
    assert_eq!(config.pruner.prune_interval(), Duration::from_secs(1));
    assert_eq!(config.pruner.max_token_age(), Duration::from_secs(86_400));
    assert_eq!(config.pruner.max_code_age(), Duration::ZERO);
}

#[test]
fn bad_yaml_is_config_parse_error() {
    let (_dir, path) = write_config("event: [unterminated");
    let err = FilterConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, PiiError::ConfigParse { .. }), "got {err}");
}

#[test]
fn unknown_action_is_config_parse_error() {
    let (_dir, path) = write_config("event:\n  actions: [telepathy]\n");
    let err = FilterConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, PiiError::ConfigParse { .. }), "got {err}");
}

// ---------------------------------------------------------------------------
// Building filters
// ---------------------------------------------------------------------------

#[test]
fn invalid_custom_regex_is_rejected() {
    let (_dir, path) = write_config(
        r#"
custom_patterns:
  - name: broken
    pattern: '(unclosed'
"#,
    );
    let config = FilterConfig::load_from(&path).unwrap();
    let err = match config.event_filter(Arc::new(TracingLogger)) {
        Ok(_) => panic!("broken pattern should not build"),
        Err(err) => err,
    };
    assert!(matches!(err, PiiError::InvalidPattern { .. }), "got {err}");
}

#[test]
fn custom_patterns_run_after_builtins() {
    let (_dir, path) = write_config(
        r#"
event:
  actions: [email]
custom_patterns:
  - name: account-number
    pattern: 'acct-\d+'
  - name: secret-key
    pattern: '^secret$'
    scope: keys
    replacement: "[Redacted]"
"#,
    );
    let config = FilterConfig::load_from(&path).unwrap();
    let filter = config.event_filter(Arc::new(TracingLogger)).unwrap();

    assert_eq!(
        filter.pipeline().action_names(),
        vec!["email", "account-number", "secret-key"]
    );
    let out = filter.filter(json!({
        "extra": {"note": "acct-991 owned by x@y.com", "secret": {"v": 1}}
    }));
    assert_eq!(
        out,
        json!({"extra": {"note": "[Filtered] owned by [Filtered]", "secret": "[Redacted]"}})
    );
}

#[test]
fn queue_filter_uses_depth_three_by_default() {
    let config = FilterConfig::default();
    let filter = config.queue_filter(Arc::new(TracingLogger)).unwrap();
    let out = filter.filter(json!({"Body": {"a": {"b": {"c": "x"}}}}));
    assert_eq!(out, json!({"Body": {"a": {"b": {"c": "[Truncated]"}}}}));
}

#[test]
fn generic_pipeline_depth_override() {
    let config = FilterConfig::default();
    let pipeline = config
        .generic_pipeline(Some(1), Arc::new(TracingLogger))
        .unwrap();
    let out = pipeline.filter(json!({"a": {"b": 1}, "c": 2}));
    assert_eq!(out, json!({"a": "[Truncated]", "c": "[Truncated]"}));
}
