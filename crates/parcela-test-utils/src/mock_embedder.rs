// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedder for tests.
//!
//! Each lower-cased word is hashed into one of [`MOCK_DIM`] buckets, so texts
//! sharing words end up close together and unrelated texts are orthogonal.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parcela_core::ParcelaError;
use parcela_core::traits::{EmbeddingAdapter, PluginAdapter};
use parcela_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

pub const MOCK_DIM: usize = 256;

#[derive(Debug, Default)]
pub struct MockEmbedder {
    fail: bool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An embedder whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn embed_text(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; MOCK_DIM];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            v[bucket(word)] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

// FNV-1a
fn bucket(word: &str) -> usize {
    let hash = word.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
        (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    });
    (hash % MOCK_DIM as u64) as usize
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelaError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ParcelaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ParcelaError::Embedding("mock embedder failure".to_string()));
        }
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| Self::embed_text(t)).collect(),
            dimensions: MOCK_DIM,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn identical_text_identical_vector() {
        assert_eq!(
            MockEmbedder::embed_text("Prazo do repasse"),
            MockEmbedder::embed_text("prazo do REPASSE")
        );
    }

    #[test]
    fn shared_words_are_closer() {
        let q = MockEmbedder::embed_text("prazo do repasse");
        let near = MockEmbedder::embed_text("PERGUNTA: prazo do repasse RESPOSTA: 48h");
        let far = MockEmbedder::embed_text("mensagem inicial temporária");
        assert!(dot(&q, &near) > dot(&q, &far));
    }

    #[tokio::test]
    async fn failing_embedder_errors() {
        let e = MockEmbedder::failing();
        let input = EmbeddingInput {
            texts: vec!["x".to_string()],
        };
        assert!(e.embed(input).await.is_err());
        assert_eq!(e.call_count(), 1);
    }
}
