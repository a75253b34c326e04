// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter with injectable inbound messages and captured replies.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parcela_core::ParcelaError;
use parcela_core::traits::{ChannelAdapter, PluginAdapter};
use parcela_core::types::{
    AdapterType, HealthStatus, InboundMessage, MessageId, OutboundMessage,
};
use tokio::sync::{Mutex, Notify};

/// Build an inbound message where user and chat share the same id.
pub fn inbound(user_id: &str, name: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        chat_id: user_id.to_string(),
        text: text.to_string(),
        display_name: name.to_string(),
    }
}

#[derive(Default)]
struct Inbox {
    queue: VecDeque<InboundMessage>,
    closed: bool,
}

/// In-memory channel for driving the agent loop in tests.
#[derive(Clone, Default)]
pub struct MockChannel {
    inbox: Arc<Mutex<Inbox>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    inbound_ready: Arc<Notify>,
    sent_ready: Arc<Notify>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbox.lock().await.queue.push_back(msg);
        self.inbound_ready.notify_one();
    }

    /// After the queue drains, `receive()` reports the channel as closed.
    pub async fn close(&self) {
        self.inbox.lock().await.closed = true;
        self.inbound_ready.notify_one();
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Contents of every sent message, in order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|m| m.content.clone())
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Wait until at least `n` messages have been sent.
    pub async fn wait_for_sent(&self, n: usize) -> Vec<OutboundMessage> {
        loop {
            let notified = self.sent_ready.notified();
            {
                let sent = self.sent.lock().await;
                if sent.len() >= n {
                    return sent.clone();
                }
            }
            notified.await;
        }
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), ParcelaError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ParcelaError> {
        self.sent.lock().await.push(msg);
        self.sent_ready.notify_waiters();
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }

    async fn receive(&self) -> Result<InboundMessage, ParcelaError> {
        loop {
            {
                let mut inbox = self.inbox.lock().await;
                if let Some(msg) = inbox.queue.pop_front() {
                    return Ok(msg);
                }
                if inbox.closed {
                    return Err(ParcelaError::Channel {
                        message: "mock channel closed".to_string(),
                        source: None,
                    });
                }
            }
            self.inbound_ready.notified().await;
        }
    }
}
