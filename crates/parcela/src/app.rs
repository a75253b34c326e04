// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component construction shared by every subcommand.

use std::path::Path;
use std::sync::Arc;

use parcela_agent::{ProviderRegistry, Responder, ResponderSettings};
use parcela_config::ParcelaConfig;
use parcela_config::model::ProvidersConfig;
use parcela_core::{ParcelaError, ProviderKind};
use parcela_knowledge::{KnowledgeBase, ModelManager, OnnxEmbedder};
use tracing::{info, warn};

#[cfg(feature = "anthropic")]
use parcela_anthropic::AnthropicProvider;

#[cfg(feature = "openai")]
use parcela_openai::OpenAiCompatProvider;

/// Initializes the tracing subscriber with an env filter.
///
/// `RUST_LOG` wins; otherwise every `parcela*` target logs at `log_level`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parcela={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Registers every provider that has an API key.
///
/// Models whose provider is missing resolve as unrecognized at answer time.
pub fn build_registry(config: &ProvidersConfig) -> Result<ProviderRegistry, ParcelaError> {
    #[allow(unused_mut)]
    let mut registry = ProviderRegistry::new();

    #[cfg(feature = "anthropic")]
    if let Some(provider) = AnthropicProvider::from_config(config)? {
        registry.insert(ProviderKind::Anthropic, Arc::new(provider));
    }

    #[cfg(feature = "openai")]
    for kind in [ProviderKind::OpenAi, ProviderKind::OpenRouter, ProviderKind::Mistral] {
        if let Some(provider) = OpenAiCompatProvider::from_config(kind, config)? {
            registry.insert(kind, Arc::new(provider));
        }
    }

    let available = registry.available_models();
    if available.is_empty() {
        warn!("no provider API keys configured; every model will be unrecognized");
    } else {
        info!(models = ?available, "providers registered");
    }
    Ok(registry)
}

/// Opens the persisted knowledge base, downloading the embedding model on first use.
pub async fn open_knowledge(config: &ParcelaConfig) -> Result<KnowledgeBase, ParcelaError> {
    let manager = ModelManager::new(config.knowledge.data_dir.clone());
    let model_path = manager.ensure_model().await?;
    let embedder = OnnxEmbedder::new(&model_path)?;
    KnowledgeBase::open(
        Path::new(&config.knowledge.index_dir),
        &config.knowledge.placeholder,
        Arc::new(embedder),
    )
    .await
}

pub fn build_responder(
    config: &ParcelaConfig,
    registry: ProviderRegistry,
    knowledge: KnowledgeBase,
) -> Responder {
    Responder::new(registry, knowledge, ResponderSettings::from_config(config))
}
