// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answer generation with retrieval, retries, and a fallback model.
//!
//! The selected model gets `max_attempts` tries with exponential backoff.
//! If all fail, the fallback model gets the same treatment. Every successful
//! answer is written back to the knowledge base before it is returned.

use std::time::Duration;

use parcela_config::ParcelaConfig;
use parcela_core::ParcelaError;
use parcela_core::types::ProviderRequest;
use parcela_knowledge::KnowledgeBase;
use tracing::{error, info, warn};

use crate::prompt;
use crate::registry::{ProviderRegistry, ResolvedModel};

/// Exponential backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (0-based): `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Tunables for [`Responder`].
#[derive(Debug, Clone)]
pub struct ResponderSettings {
    pub persona: String,
    pub retry: RetryPolicy,
    pub fallback_model: String,
    pub top_k: usize,
    pub max_tokens: u32,
}

impl ResponderSettings {
    pub fn from_config(config: &ParcelaConfig) -> Self {
        Self {
            persona: config.persona.system_prompt.clone(),
            retry: RetryPolicy {
                max_attempts: config.retry.max_attempts,
                base_delay: Duration::from_millis(config.retry.base_delay_ms),
            },
            fallback_model: config.routing.fallback_model.clone(),
            top_k: config.knowledge.top_k,
            max_tokens: config.providers.max_tokens,
        }
    }
}

/// Produces answers for routed questions.
pub struct Responder {
    registry: ProviderRegistry,
    knowledge: KnowledgeBase,
    settings: ResponderSettings,
}

impl Responder {
    pub fn new(
        registry: ProviderRegistry,
        knowledge: KnowledgeBase,
        settings: ResponderSettings,
    ) -> Self {
        Self {
            registry,
            knowledge,
            settings,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Answer `question` with `model_id`, falling back on repeated failure.
    ///
    /// Model failures never surface as `Err`: they end in a user-facing
    /// message. `Err` means the knowledge base could not be read or written.
    pub async fn generate(&self, question: &str, model_id: &str) -> Result<String, ParcelaError> {
        info!(model = model_id, "generating answer");

        let Some(primary) = self.registry.resolve(model_id) else {
            warn!(model = model_id, "unrecognized model");
            return Ok(unknown_model_message(model_id));
        };

        let context = self.knowledge.query(question, self.settings.top_k).await?;
        if !context.is_empty() {
            info!("retrieved context added to system prompt");
        }
        let system_prompt = prompt::system_prompt(&self.settings.persona, &context);

        let last_error = match self.try_model(&primary, &system_prompt, question).await {
            Ok(answer) => return self.remember(question, answer).await,
            Err(e) => e,
        };
        error!(model = model_id, error = %last_error, "model failed on every attempt");

        let fallback_id = self.settings.fallback_model.as_str();
        warn!(fallback = fallback_id, "switching to fallback model");

        let last_error = match self.registry.resolve(fallback_id) {
            Some(fallback) => match self.try_model(&fallback, &system_prompt, question).await {
                Ok(answer) => return self.remember(question, answer).await,
                Err(e) => e,
            },
            None => unknown_model_message(fallback_id),
        };

        error!(
            critical = true,
            model = model_id,
            fallback = fallback_id,
            error = %last_error,
            "fallback model also failed"
        );
        Ok(format!("Erro em ambos os modelos. Detalhes: {last_error}"))
    }

    /// Up to `max_attempts` calls. Returns the trimmed answer or the last error text.
    async fn try_model(
        &self,
        model: &ResolvedModel,
        system_prompt: &str,
        question: &str,
    ) -> Result<String, String> {
        let retry = self.settings.retry;
        let mut last_error = String::from("no attempts made");

        for attempt in 0..retry.max_attempts {
            let request = ProviderRequest {
                model: model.profile.provider_model.to_string(),
                system_prompt: system_prompt.to_string(),
                message: question.to_string(),
                max_tokens: self.settings.max_tokens,
            };
            match model.provider.complete(request).await {
                Ok(response) if !response.content.trim().is_empty() => {
                    return Ok(response.content.trim().to_string());
                }
                Ok(_) => last_error = "empty response from model".to_string(),
                Err(e) => last_error = e.to_string(),
            }

            let delay = retry.delay_for(attempt);
            warn!(
                model = model.profile.id,
                attempt = attempt + 1,
                max_attempts = retry.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %last_error,
                "attempt failed, backing off"
            );
            tokio::time::sleep(delay).await;
        }

        Err(last_error)
    }

    async fn remember(&self, question: &str, answer: String) -> Result<String, ParcelaError> {
        self.knowledge.add(question, &answer).await?;
        Ok(answer)
    }
}

fn unknown_model_message(model_id: &str) -> String {
    format!("Modelo '{model_id}' não reconhecido.")
}
