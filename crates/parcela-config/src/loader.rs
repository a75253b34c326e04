// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Lookup order: `./parcela.toml` > `~/.config/parcela/parcela.toml` > `/etc/parcela/parcela.toml`,
//! with `PARCELA_` environment variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ParcelaConfig;

const SYSTEM_CONFIG: &str = "/etc/parcela/parcela.toml";
const LOCAL_CONFIG: &str = "parcela.toml";

/// Section prefixes recognised in `PARCELA_*` variable names.
///
/// Ordered so that `providers_openai_` is tried before `providers_`.
const ENV_SECTIONS: &[&str] = &[
    "providers_openai_",
    "providers_anthropic_",
    "providers_openrouter_",
    "providers_mistral_",
    "agent_",
    "telegram_",
    "providers_",
    "knowledge_",
    "routing_",
    "retry_",
    "session_",
    "persona_",
    "ingest_",
];

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<ParcelaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<ParcelaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParcelaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ParcelaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParcelaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ParcelaConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Paths of every config file in the hierarchy, lowest priority first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    paths.extend(user_config_path());
    paths.push(std::env::current_dir().unwrap_or_default().join(LOCAL_CONFIG));
    paths
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("parcela/parcela.toml"))
}

/// Map a lowercased, prefix-stripped env var name to a dotted config key.
///
/// Only the section boundary becomes a dot, so `telegram_bot_token`
/// maps to `telegram.bot_token` rather than `telegram.bot.token`.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section) {
            let dotted = section.trim_end_matches('_').replacen('_', ".", 1);
            return format!("{dotted}.{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("PARCELA_").map(|key| map_env_key(key.as_str()).into())
}
