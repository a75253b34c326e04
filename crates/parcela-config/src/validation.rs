// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Collects every problem instead of failing fast.

use std::collections::HashSet;

use parcela_core::{Category, find_model};

use crate::diagnostic::ConfigError;
use crate::model::ParcelaConfig;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &ParcelaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    for (key, id) in [
        ("routing.low_cost_model", &config.routing.low_cost_model),
        ("routing.fallback_model", &config.routing.fallback_model),
    ] {
        if find_model(id).is_none() {
            errors.push(ConfigError::validation(format!(
                "{key} `{id}` is not a known model identifier"
            )));
        }
    }

    let mut seen = HashSet::new();
    for (i, rule) in config.routing.rules.iter().enumerate() {
        if rule.category == Category::General {
            errors.push(ConfigError::validation(format!(
                "routing.rules[{i}]: `general` is the catch-all and cannot have a rule"
            )));
        }
        if !seen.insert(rule.category) {
            errors.push(ConfigError::validation(format!(
                "routing.rules[{i}]: duplicate rule for category `{}`",
                rule.category
            )));
        }
        if let Err(e) = regex::Regex::new(&rule.pattern) {
            errors.push(ConfigError::validation(format!(
                "routing.rules[{i}].pattern is not a valid regex: {e}"
            )));
        }
    }

    if config.retry.max_attempts == 0 {
        errors.push(ConfigError::validation(
            "retry.max_attempts must be at least 1",
        ));
    }

    if config.knowledge.index_dir.trim().is_empty() {
        errors.push(ConfigError::validation(
            "knowledge.index_dir must not be empty",
        ));
    }

    if config.knowledge.top_k == 0 {
        errors.push(ConfigError::validation("knowledge.top_k must be at least 1"));
    }

    if config.providers.max_tokens == 0 {
        errors.push(ConfigError::validation(
            "providers.max_tokens must be at least 1",
        ));
    }

    if config.session.nudge_after_secs == 0 || config.session.close_after_secs == 0 {
        errors.push(ConfigError::validation(
            "session.nudge_after_secs and session.close_after_secs must be positive",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
