// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for Parcela.

pub mod client;
pub mod types;

use async_trait::async_trait;
use parcela_config::model::ProvidersConfig;
use parcela_core::ParcelaError;
use parcela_core::traits::{PluginAdapter, ProviderAdapter};
use parcela_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};
use tracing::info;

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic provider implementing [`ProviderAdapter`].
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }

    /// Build from configuration. `Ok(None)` when no API key is available.
    pub fn from_config(config: &ProvidersConfig) -> Result<Option<Self>, ParcelaError> {
        let Some(api_key) = config.anthropic.resolved_api_key(API_KEY_ENV) else {
            return Ok(None);
        };
        let client = AnthropicClient::new(&api_key, &config.anthropic_version)?
            .with_base_url(config.anthropic.base_url.clone());
        info!(base_url = client.base_url(), "anthropic provider initialized");
        Ok(Some(Self::new(client)))
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ParcelaError> {
        let api_request = to_message_request(request);
        let response = self.client.complete_message(&api_request).await?;
        Ok(ProviderResponse {
            content: response.text(),
            model: response.model,
        })
    }
}

fn to_message_request(request: ProviderRequest) -> MessageRequest {
    MessageRequest {
        model: request.model,
        messages: vec![ApiMessage {
            role: "user".to_string(),
            content: request.message,
        }],
        system: Some(request.system_prompt).filter(|s| !s.is_empty()),
        max_tokens: request.max_tokens,
    }
}
