// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parcela support assistant.

use thiserror::Error;

/// The primary error type used across all Parcela adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ParcelaError {
    /// Configuration errors (invalid TOML, unknown model ids, bad classifier rules).
    #[error("configuration error: {0}")]
    Config(String),

    /// Similarity index errors (database open, query failure, persistence).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Embedding model errors (tokenization, inference, model download).
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Channel adapter errors (connection failure, send failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM provider errors (API failure, empty completion, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParcelaError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        ParcelaError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
