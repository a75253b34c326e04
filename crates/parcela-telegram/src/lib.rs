// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Parcela assistant.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide
//! long polling. Replies are sent as MarkdownV2 with a plain-text fallback.

pub mod handler;
pub mod markdown;

use async_trait::async_trait;
use parcela_config::model::TelegramConfig;
use parcela_core::ParcelaError;
use parcela_core::traits::{ChannelAdapter, PluginAdapter};
use parcela_core::types::{AdapterType, HealthStatus, InboundMessage, MessageId, OutboundMessage};
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Capacity of the buffer between the poller and the agent loop.
const INBOUND_BUFFER: usize = 100;

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// The token comes from `telegram.bot_token` or the `TELEGRAM_TOKEN` env var.
    pub fn new(config: &TelegramConfig) -> Result<Self, ParcelaError> {
        let token = config.resolved_token().ok_or_else(|| {
            ParcelaError::Config(format!(
                "telegram.bot_token (or {}) is required for the Telegram adapter",
                TelegramConfig::TOKEN_ENV
            ))
        })?;

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);
        Ok(Self {
            bot: Bot::new(token),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelaError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), ParcelaError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                async move {
                    match handler::to_inbound_message(&msg) {
                        Some(inbound) => {
                            if tx.send(inbound).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => {
                            debug!(msg_id = msg.id.0, "ignoring non-text or command message");
                        }
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ParcelaError> {
        let chat_id = parse_chat_id(&msg.chat_id)?;
        let formatted = markdown::format_for_telegram(&msg.content);

        let sent = match self
            .bot
            .send_message(Recipient::Id(chat_id), &formatted)
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                warn!(error = %e, "MarkdownV2 failed, sending as plain text");
                self.bot
                    .send_message(Recipient::Id(chat_id), &msg.content)
                    .await
                    .map_err(|e| ParcelaError::Channel {
                        message: format!("failed to send message: {e}"),
                        source: Some(Box::new(e)),
                    })?
            }
        };

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundMessage, ParcelaError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| ParcelaError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

fn parse_chat_id(chat_id: &str) -> Result<ChatId, ParcelaError> {
    chat_id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| ParcelaError::Channel {
            message: format!("invalid chat_id '{chat_id}': {e}"),
            source: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(String::from),
        }
    }

    #[test]
    fn new_accepts_configured_token() {
        assert!(TelegramChannel::new(&config(Some("123456:ABC-DEF1234ghIkl"))).is_ok());
    }

    #[test]
    fn new_without_any_token_fails() {
        // Only meaningful when the env var is absent in the test environment.
        if std::env::var(TelegramConfig::TOKEN_ENV).is_err() {
            assert!(TelegramChannel::new(&config(None)).is_err());
            assert!(TelegramChannel::new(&config(Some("  "))).is_err());
        }
    }

    #[test]
    fn parse_chat_id_accepts_negative_group_ids() {
        assert_eq!(parse_chat_id("-100123").unwrap(), ChatId(-100123));
        assert!(parse_chat_id("telegram").is_err());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let channel = TelegramChannel::new(&config(Some("test:token"))).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }
}
