// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local sentence embeddings with all-MiniLM-L6-v2 on ONNX Runtime.
//!
//! Produces 384-dimensional, mean-pooled, L2-normalized vectors on CPU.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;
use parcela_core::ParcelaError;
use parcela_core::traits::{EmbeddingAdapter, PluginAdapter};
use parcela_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

/// Output width of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

fn embed_err<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> ParcelaError + '_ {
    move |e| ParcelaError::Embedding(format!("{context}: {e}"))
}

/// Sentence embedder backed by an ONNX session and a HuggingFace tokenizer.
///
/// `tokenizer.json` must sit next to the model file.
pub struct OnnxEmbedder {
    // ort sessions need `&mut` to run.
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

// SAFETY: the session is only reached through the Mutex; tokenizer encoding is read-only.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl OnnxEmbedder {
    pub fn new(model_path: &Path) -> Result<Self, ParcelaError> {
        let tokenizer_path = model_path
            .parent()
            .ok_or_else(|| ParcelaError::Embedding("model path has no parent".to_string()))?
            .join("tokenizer.json");
        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            ParcelaError::Embedding(format!(
                "loading tokenizer {}: {e}",
                tokenizer_path.display()
            ))
        })?;

        let session = Session::builder()
            .map_err(embed_err("creating session builder"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(embed_err("setting optimization level"))?
            .with_intra_threads(1)
            .map_err(embed_err("setting thread count"))?
            .commit_from_file(model_path)
            .map_err(embed_err("loading model"))?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Embed one text into a normalized vector.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, ParcelaError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ParcelaError::Embedding(format!("tokenization: {e}")))?;

        let ids = to_row(encoding.get_ids())?;
        let mask = to_row(encoding.get_attention_mask())?;
        let type_ids = to_row(encoding.get_type_ids())?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ParcelaError::Embedding(format!("session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => TensorRef::from_array_view(&ids).map_err(embed_err("input_ids"))?,
                "attention_mask" => TensorRef::from_array_view(&mask).map_err(embed_err("attention_mask"))?,
                "token_type_ids" => TensorRef::from_array_view(&type_ids).map_err(embed_err("token_type_ids"))?
            ])
            .map_err(embed_err("inference"))?;

        // [1, seq_len, hidden]
        let (shape, hidden_states) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(embed_err("extracting output"))?;
        let hidden = shape[shape.len() - 1] as usize;

        let pooled = mean_pool(hidden_states, encoding.get_attention_mask(), hidden);
        Ok(l2_normalize(pooled))
    }
}

fn to_row(values: &[u32]) -> Result<Array2<i64>, ParcelaError> {
    let row: Vec<i64> = values.iter().map(|&v| i64::from(v)).collect();
    Array2::from_shape_vec((1, row.len()), row)
        .map_err(|e| ParcelaError::Embedding(format!("building input tensor: {e}")))
}

/// Average the token vectors whose attention mask is set.
fn mean_pool(hidden_states: &[f32], mask: &[u32], hidden: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden];
    let mut count = 0usize;
    for (token, _) in hidden_states
        .chunks_exact(hidden)
        .zip(mask)
        .filter(|(_, m)| **m > 0)
    {
        for (acc, v) in sum.iter_mut().zip(token) {
            *acc += v;
        }
        count += 1;
    }
    if count > 0 {
        sum.iter_mut().for_each(|v| *v /= count as f32);
    }
    sum
}

fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx-minilm"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ParcelaError> {
        Ok(match self.session.lock() {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(format!("session lock poisoned: {e}")),
        })
    }
}

#[async_trait]
impl EmbeddingAdapter for OnnxEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ParcelaError> {
        let embeddings = input
            .texts
            .iter()
            .map(|t| self.embed_text(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: EMBEDDING_DIM,
        })
    }
}
