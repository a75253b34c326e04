// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Parcela workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a message delivered by a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`PluginAdapter`](crate::PluginAdapter).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Embedding,
}

/// Topical category of a customer question.
///
/// Derived per question by keyword rules; never persisted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Account, sign-up and contact questions.
    Simple,
    /// Payouts, invoices, delinquency, balances.
    Financial,
    /// Integrations, API, dashboards.
    Technical,
    /// Contracts, terms, compliance.
    Legal,
    /// Mission, impact, patient stories.
    Emotional,
    /// Anything not matched by a rule.
    General,
}

/// Strategy controlling how a question maps to a model.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// Category-driven choice between quality tiers.
    #[default]
    Balanced,
    /// Always the configured low-cost model.
    LowCost,
}

// --- Channel types ---

/// An inbound user message received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Channel-specific message identifier.
    pub id: String,
    /// Stable identifier of the sending user.
    pub user_id: String,
    /// Conversation to reply into.
    pub chat_id: String,
    /// Raw message text.
    pub text: String,
    /// Sender's display name (first name on Telegram).
    pub display_name: String,
}

/// An outbound reply to be sent via a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub content: String,
}

impl OutboundMessage {
    pub fn new(chat_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            content: content.into(),
        }
    }
}

// --- Provider types ---

/// A single-turn completion request to an LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Provider-side model name (e.g. `gpt-4-turbo`).
    pub model: String,
    /// System instructions, including any retrieved context.
    pub system_prompt: String,
    /// The user's question.
    pub message: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// A completion returned by an LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text.
    pub content: String,
    /// Model that actually served the request, as reported by the provider.
    pub model: String,
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter, one vector per input text.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}
