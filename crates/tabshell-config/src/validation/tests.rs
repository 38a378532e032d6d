//! Tests for configuration validation.

use super::*;

#[test]
fn default_config_validates() {
    let config = ShellConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_pool_size_too_large() {
    let mut config = ShellConfig::default();
    config.views.pool_size = 9;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("views.pool_size"));
}

#[test]
fn zero_pool_size_is_allowed() {
    let mut config = ShellConfig::default();
    config.views.pool_size = 0;
    config.overlay.pool_size = 0;
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_readiness_timeout_too_small() {
    let mut config = ShellConfig::default();
    config.views.readiness_timeout_ms = 10;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("views.readiness_timeout_ms"));
}

#[test]
fn catches_empty_partition() {
    let mut config = ShellConfig::default();
    config.views.partition = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("views.partition"));
}

#[test]
fn catches_zero_closed_stack() {
    let mut config = ShellConfig::default();
    config.tabs.closed_stack_capacity = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("tabs.closed_stack_capacity"));
}

#[test]
fn catches_debounce_too_long() {
    let mut config = ShellConfig::default();
    config.tabs.persist_debounce_ms = 10_000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("tabs.persist_debounce_ms"));
}

#[test]
fn catches_relative_default_url() {
    let mut config = ShellConfig::default();
    config.tabs.default_url = "new-tab".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("tabs.default_url"));
}

#[test]
fn accepts_web_default_url() {
    let mut config = ShellConfig::default();
    config.tabs.default_url = "https://example.com".into();
    assert!(validate(&config).is_ok());
}

#[test]
fn collects_multiple_errors() {
    let mut config = ShellConfig::default();
    config.views.pool_size = 10;
    config.overlay.pool_size = 10;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("views.pool_size"));
    assert!(err.contains("overlay.pool_size"));
    assert!(err.contains("; "));
}
