// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parcela serve` command implementation.
//!
//! Opens the knowledge base, registers the providers that have keys,
//! connects to Telegram and runs the conversation loop until SIGINT/SIGTERM.

use std::sync::Arc;

use parcela_agent::{AgentLoop, GatewaySettings, InMemorySessionStore, shutdown};
use parcela_config::ParcelaConfig;
use parcela_core::ParcelaError;
use parcela_core::traits::ChannelAdapter;
use parcela_router::ModelRouter;
use tracing::{error, info};

#[cfg(feature = "telegram")]
use parcela_telegram::TelegramChannel;

/// Runs the `parcela serve` command.
pub async fn run_serve(config: ParcelaConfig) -> Result<(), ParcelaError> {
    info!(agent = %config.agent.name, "starting parcela serve");

    let router = ModelRouter::new(&config.routing)?;
    info!(policy = %router.policy(), "model router ready");

    let knowledge = crate::app::open_knowledge(&config).await?;
    info!(documents = knowledge.len().await?, "knowledge base opened");

    let registry = crate::app::build_registry(&config.providers)?;
    let responder = crate::app::build_responder(&config, registry, knowledge);

    let channel = connect_channel(&config).await?;

    let agent = AgentLoop::new(
        channel,
        router,
        responder,
        Arc::new(InMemorySessionStore::new()),
        GatewaySettings::from_config(&config.session, &config.persona),
    );

    let cancel = shutdown::install_signal_handler();
    info!("parcela bot started and waiting for messages");
    agent.run(cancel).await?;

    info!("parcela serve shutdown complete");
    Ok(())
}

#[cfg(feature = "telegram")]
async fn connect_channel(config: &ParcelaConfig) -> Result<Arc<dyn ChannelAdapter>, ParcelaError> {
    let mut telegram = TelegramChannel::new(&config.telegram).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram channel");
        eprintln!(
            "error: Telegram bot token required. Set telegram.bot_token in parcela.toml or the TELEGRAM_TOKEN env var"
        );
        e
    })?;
    telegram.connect().await?;
    Ok(Arc::new(telegram))
}

#[cfg(not(feature = "telegram"))]
async fn connect_channel(_config: &ParcelaConfig) -> Result<Arc<dyn ChannelAdapter>, ParcelaError> {
    error!("no channel adapter compiled in");
    Err(ParcelaError::Config(
        "parcela serve requires the 'telegram' feature".to_string(),
    ))
}
