// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-authenticated client for any Chat Completions endpoint.

use std::time::Duration;

use parcela_core::ParcelaError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

fn http_err(context: &str, e: reqwest::Error) -> ParcelaError {
    ParcelaError::Provider {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    url: String,
}

impl ChatClient {
    /// `url` is the full completions endpoint, e.g. `https://api.openai.com/v1/chat/completions`.
    pub fn new(api_key: &str, url: impl Into<String>) -> Result<Self, ParcelaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| ParcelaError::Config(format!("invalid API key header value: {e}")))?,
        );
        // Attribution header read by OpenRouter; ignored elsewhere.
        headers.insert("X-Title", HeaderValue::from_static("Parcela"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| http_err("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ParcelaError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| http_err("HTTP request failed", e))?;

        let status = response.status();
        debug!(%status, model = %request.model, url = %self.url, "chat response received");

        let body = response
            .text()
            .await
            .map_err(|e| http_err("failed to read response body", e))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("API error ({status}): {}", api_err.error.message),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(ParcelaError::provider(message));
        }

        serde_json::from_str(&body).map_err(|e| ParcelaError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
