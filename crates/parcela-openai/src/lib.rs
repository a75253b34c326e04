// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider adapter for Parcela.
//!
//! OpenAI, OpenRouter and Mistral all speak the Chat Completions protocol,
//! so one adapter serves the three; only the endpoint and key differ.

pub mod client;
pub mod types;

use async_trait::async_trait;
use parcela_config::model::{EndpointConfig, ProvidersConfig};
use parcela_core::ParcelaError;
use parcela_core::catalog::ProviderKind;
use parcela_core::traits::{PluginAdapter, ProviderAdapter};
use parcela_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};
use tracing::info;

use crate::client::ChatClient;
use crate::types::{ChatMessage, ChatRequest};

/// Chat Completions provider for one backend.
pub struct OpenAiCompatProvider {
    name: String,
    client: ChatClient,
}

impl OpenAiCompatProvider {
    pub fn new(name: impl Into<String>, client: ChatClient) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    /// Build the provider for `kind` from configuration.
    ///
    /// `Ok(None)` when no API key is configured or set in the environment.
    /// Anthropic is not a Chat Completions backend and is rejected.
    pub fn from_config(
        kind: ProviderKind,
        config: &ProvidersConfig,
    ) -> Result<Option<Self>, ParcelaError> {
        let endpoint = endpoint_for(kind, config)?;
        let Some(api_key) = endpoint.resolved_api_key(api_key_env(kind)) else {
            return Ok(None);
        };
        let client = ChatClient::new(&api_key, endpoint.base_url.clone())?;
        info!(provider = %kind, url = client.url(), "chat provider initialized");
        Ok(Some(Self::new(kind.to_string(), client)))
    }
}

fn endpoint_for(kind: ProviderKind, config: &ProvidersConfig) -> Result<&EndpointConfig, ParcelaError> {
    match kind {
        ProviderKind::OpenAi => Ok(&config.openai),
        ProviderKind::OpenRouter => Ok(&config.openrouter),
        ProviderKind::Mistral => Ok(&config.mistral),
        ProviderKind::Anthropic => Err(ParcelaError::Config(
            "anthropic is not an OpenAI-compatible provider".to_string(),
        )),
    }
}

/// Conventional environment variable holding the key for `kind`.
pub fn api_key_env(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "OPENAI_API_KEY",
        ProviderKind::OpenRouter => "OPENROUTER_API_KEY",
        ProviderKind::Mistral => "MISTRAL_API_KEY",
        ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
    }
}

fn to_chat_request(request: ProviderRequest) -> ChatRequest {
    let mut messages = Vec::with_capacity(2);
    if !request.system_prompt.is_empty() {
        messages.push(ChatMessage::new("system", request.system_prompt));
    }
    messages.push(ChatMessage::new("user", request.message));
    ChatRequest {
        model: request.model,
        messages,
        max_tokens: request.max_tokens,
    }
}

#[async_trait]
impl PluginAdapter for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
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
impl ProviderAdapter for OpenAiCompatProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ParcelaError> {
        let requested = request.model.clone();
        let response = self.client.chat(&to_chat_request(request)).await?;
        Ok(ProviderResponse {
            content: response.text(),
            model: response.model.clone().unwrap_or(requested),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "mistral-small-latest".into(),
            system_prompt: "persona\n\nContexto anterior:\nPERGUNTA: a\nRESPOSTA: b".into(),
            message: "Qual o limite?".into(),
            max_tokens: 128,
        }
    }

    #[test]
    fn system_then_user() {
        let chat = to_chat_request(request());
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].content.as_deref(), Some("Qual o limite?"));
    }

    #[test]
    fn anthropic_kind_is_rejected() {
        let result = OpenAiCompatProvider::from_config(
            ProviderKind::Anthropic,
            &ProvidersConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn env_var_names() {
        assert_eq!(api_key_env(ProviderKind::OpenRouter), "OPENROUTER_API_KEY");
        assert_eq!(api_key_env(ProviderKind::Mistral), "MISTRAL_API_KEY");
    }

    #[tokio::test]
    async fn mistral_preset_hits_configured_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer m-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "mistral-small-latest",
                "messages": [{"role": "system"}, {"role": "user", "content": "Qual o limite?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Depende do score."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ProvidersConfig::default();
        config.mistral.api_key = Some("m-key".into());
        config.mistral.base_url = server.uri();
        let provider = OpenAiCompatProvider::from_config(ProviderKind::Mistral, &config)
            .unwrap()
            .unwrap();
        assert_eq!(provider.name(), "mistral");
        let resp = provider.complete(request()).await.unwrap();
        assert_eq!(resp.content, "Depende do score.");
        assert_eq!(resp.model, "mistral-small-latest");
    }
}
