// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging front-ends (Telegram).

use async_trait::async_trait;

use crate::error::ParcelaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundMessage, MessageId, OutboundMessage};

/// Adapter for bidirectional messaging channel integrations.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), ParcelaError>;

    /// Sends a text reply through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ParcelaError>;

    /// Receives the next inbound message from the channel.
    ///
    /// Returns a [`ParcelaError::Channel`] once the channel is closed.
    async fn receive(&self) -> Result<InboundMessage, ParcelaError>;
}
