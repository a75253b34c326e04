// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parcela.
//!
//! Deterministic stand-ins for the external collaborators so tests run
//! without network access or model files.
//!
//! - [`MockProvider`] - scripted LLM replies and failures, with call recording
//! - [`MockEmbedder`] - hashed bag-of-words embeddings
//! - [`MockChannel`] - injectable inbound messages and captured replies

pub mod mock_channel;
pub mod mock_embedder;
pub mod mock_provider;

pub use mock_channel::{MockChannel, inbound};
pub use mock_embedder::MockEmbedder;
pub use mock_provider::{MockProvider, MockReply};
