// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static catalog of the language models the assistant can route to.

use serde::Serialize;
use strum::Display;

/// Vendor API family serving a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    OpenRouter,
    Mistral,
}

/// A routable model: identity, provider binding, and routing attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelProfile {
    /// Stable identifier used by routing and configuration.
    pub id: &'static str,
    /// API family that serves the model.
    pub provider: ProviderKind,
    /// Model name sent on the wire to the provider.
    pub provider_model: &'static str,
    /// Relative cost per request in USD.
    pub cost: f64,
    /// Typical latency in seconds.
    pub latency: f64,
    /// What the model is good at.
    pub strength: &'static str,
}

pub const OPENAI_GPT4: &str = "openai_gpt4";
pub const OPENAI_GPT35: &str = "openai_gpt3.5";
pub const CLAUDE_3_OPUS: &str = "claude_3_opus";
pub const LLAMA3_70B: &str = "llama3_70b";
pub const MISTRAL_7B_INSTRUCT: &str = "mistral_7b_instruct";

/// Every model known to the assistant. Read-only for the process lifetime.
pub const MODEL_CATALOG: &[ModelProfile] = &[
    ModelProfile {
        id: OPENAI_GPT4,
        provider: ProviderKind::OpenAi,
        provider_model: "gpt-4-turbo",
        cost: 0.03,
        latency: 3.0,
        strength: "reasoning",
    },
    ModelProfile {
        id: OPENAI_GPT35,
        provider: ProviderKind::OpenAi,
        provider_model: "gpt-3.5-turbo",
        cost: 0.01,
        latency: 2.0,
        strength: "reasoning at low cost",
    },
    ModelProfile {
        id: CLAUDE_3_OPUS,
        provider: ProviderKind::Anthropic,
        provider_model: "claude-3-opus-20240229",
        cost: 0.04,
        latency: 3.0,
        strength: "long context",
    },
    ModelProfile {
        id: LLAMA3_70B,
        provider: ProviderKind::OpenRouter,
        provider_model: "meta-llama/llama-3-70b-instruct",
        cost: 0.0,
        latency: 1.5,
        strength: "short, objective answers",
    },
    ModelProfile {
        id: MISTRAL_7B_INSTRUCT,
        provider: ProviderKind::Mistral,
        provider_model: "mistral-small-latest",
        cost: 0.0,
        latency: 1.0,
        strength: "short answers and fallback",
    },
];

/// Look up a model profile by identifier.
pub fn find_model(id: &str) -> Option<&'static ModelProfile> {
    MODEL_CATALOG.iter().find(|m| m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<&str> = MODEL_CATALOG.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), MODEL_CATALOG.len());
    }

    #[test]
    fn find_known_and_unknown() {
        let opus = find_model(CLAUDE_3_OPUS).unwrap();
        assert_eq!(opus.provider, ProviderKind::Anthropic);
        assert_eq!(opus.provider_model, "claude-3-opus-20240229");
        assert!(find_model("gpt-9").is_none());
    }

    #[test]
    fn provider_kind_display() {
        assert_eq!(ProviderKind::OpenRouter.to_string(), "openrouter");
    }
}
