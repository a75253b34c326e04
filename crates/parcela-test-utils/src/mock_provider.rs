// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider with a scripted reply queue.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use parcela_core::ParcelaError;
use parcela_core::traits::{PluginAdapter, ProviderAdapter};
use parcela_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};

/// One scripted provider outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    Fail(String),
}

impl MockReply {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    pub fn fail(s: &str) -> Self {
        Self::Fail(s.to_string())
    }
}

#[derive(Debug)]
struct State {
    script: VecDeque<MockReply>,
    requests: Vec<ProviderRequest>,
}

/// A provider that pops replies from a FIFO script.
///
/// Once the script runs out every call gets `default_reply`.
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    state: Mutex<State>,
    default_reply: MockReply,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<MockReply>) -> Self {
        Self {
            name: "mock-provider".to_string(),
            state: Mutex::new(State {
                script: script.into(),
                requests: Vec::new(),
            }),
            default_reply: MockReply::text("mock response"),
        }
    }

    /// Every call fails with `message`.
    pub fn always_failing(message: &str) -> Self {
        Self::with_script(Vec::new()).default_reply(MockReply::fail(message))
    }

    /// Reply used after the script is exhausted.
    pub fn default_reply(mut self, reply: MockReply) -> Self {
        self.default_reply = reply;
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn push(&self, reply: MockReply) {
        self.lock().script.push_back(reply);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Calls whose provider-side model name equals `model`.
    pub fn calls_for(&self, model: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.model == model)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
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
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ParcelaError> {
        let reply = {
            let mut state = self.lock();
            state.requests.push(request.clone());
            state
                .script
                .pop_front()
                .unwrap_or_else(|| self.default_reply.clone())
        };
        match reply {
            MockReply::Text(content) => Ok(ProviderResponse {
                content,
                model: request.model,
            }),
            MockReply::Fail(message) => Err(ParcelaError::provider(message)),
        }
    }
}
