//! Full configuration validation.
//!
//! Validates numeric ranges and URL fields, collecting every error into a
//! single `ConfigError`.

mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::ShellConfig;
use tabshell_common::ConfigError;

use helpers::{validate_range, validate_url};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ShellConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range(&mut errors, "views.pool_size", config.views.pool_size, 0, 4);
    validate_range(
        &mut errors,
        "views.readiness_timeout_ms",
        config.views.readiness_timeout_ms,
        100,
        60_000,
    );
    if config.views.partition.trim().is_empty() {
        errors.push("views.partition must not be empty".to_string());
    }

    validate_range(
        &mut errors,
        "tabs.closed_stack_capacity",
        config.tabs.closed_stack_capacity,
        1,
        1024,
    );
    validate_range(
        &mut errors,
        "tabs.persist_debounce_ms",
        config.tabs.persist_debounce_ms,
        0,
        5000,
    );
    validate_url(&mut errors, "tabs.default_url", &config.tabs.default_url);

    validate_range(&mut errors, "overlay.pool_size", config.overlay.pool_size, 0, 2);
    validate_url(&mut errors, "overlay.url", &config.overlay.url);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
