// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge base: embeds Q&A exchanges and retrieves similar ones as prompt context.

use std::path::Path;
use std::sync::Arc;

use parcela_core::ParcelaError;
use parcela_core::traits::EmbeddingAdapter;
use parcela_core::types::EmbeddingInput;
use tracing::{debug, info};

use crate::index::{MemoryIndex, SqliteIndex, VectorIndex};
use crate::types::{IndexedDocument, QaEntry};

/// Separator placed between retrieved documents.
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Default number of documents retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Append-only store of past exchanges searchable by semantic similarity.
#[derive(Clone)]
pub struct KnowledgeBase {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingAdapter>,
}

impl KnowledgeBase {
    /// Open the persisted index in `index_dir`.
    ///
    /// An empty index, new or left empty by an earlier failed seed, gets
    /// `placeholder` as its only document so the first query always has
    /// something to compare against.
    pub async fn open(
        index_dir: &Path,
        placeholder: &str,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Self, ParcelaError> {
        let index = SqliteIndex::open(index_dir).await?;
        let kb = Self::with_index(Arc::new(index), embedder);
        if kb.index.len().await? == 0 {
            info!(dir = %index_dir.display(), "creating knowledge index");
            kb.insert_text(placeholder.to_string()).await?;
        }
        Ok(kb)
    }

    /// A non-persistent knowledge base holding only `placeholder`.
    pub async fn in_memory(
        placeholder: &str,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Self, ParcelaError> {
        let kb = Self::with_index(Arc::new(MemoryIndex::new()), embedder);
        kb.insert_text(placeholder.to_string()).await?;
        Ok(kb)
    }

    /// Build a knowledge base over an already-open index.
    pub fn with_index(index: Arc<dyn VectorIndex>, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self { index, embedder }
    }

    /// Index a new exchange. Durable once this returns.
    pub async fn add(&self, question: &str, answer: &str) -> Result<(), ParcelaError> {
        self.add_entry(&QaEntry::new(question, answer)).await
    }

    pub async fn add_entry(&self, entry: &QaEntry) -> Result<(), ParcelaError> {
        self.insert_text(entry.document_text()).await
    }

    /// Raw text of the `k` most similar documents joined by [`CONTEXT_SEPARATOR`].
    ///
    /// Empty when the index holds no documents.
    pub async fn query(&self, question: &str, k: usize) -> Result<String, ParcelaError> {
        if self.index.len().await? == 0 {
            return Ok(String::new());
        }
        let vector = self.embed_one(question.to_string()).await?;
        let docs = self.index.similarity_search(&vector, k).await?;
        debug!(hits = docs.len(), k, "context retrieved");
        Ok(docs.join(CONTEXT_SEPARATOR))
    }

    pub async fn len(&self) -> Result<usize, ParcelaError> {
        self.index.len().await
    }

    async fn insert_text(&self, text: String) -> Result<(), ParcelaError> {
        let embedding = self.embed_one(text.clone()).await?;
        self.index
            .add_documents(vec![IndexedDocument { text, embedding }])
            .await
    }

    async fn embed_one(&self, text: String) -> Result<Vec<f32>, ParcelaError> {
        let output = self
            .embedder
            .embed(EmbeddingInput { texts: vec![text] })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ParcelaError::Embedding("embedder returned no vectors".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcela_test_utils::MockEmbedder;

    const PLACEHOLDER: &str = "mensagem inicial temporária";

    async fn open(dir: &Path) -> KnowledgeBase {
        KnowledgeBase::open(dir, PLACEHOLDER, Arc::new(MockEmbedder::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fresh_index_holds_only_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let kb = open(&dir.path().join("db_index")).await;
        assert_eq!(kb.len().await.unwrap(), 1);
        assert_eq!(kb.query("qualquer pergunta", 3).await.unwrap(), PLACEHOLDER);
    }

    #[tokio::test]
    async fn in_memory_store_starts_with_placeholder() {
        let kb = KnowledgeBase::in_memory(PLACEHOLDER, Arc::new(MockEmbedder::new()))
            .await
            .unwrap();
        assert_eq!(kb.query("oi", 3).await.unwrap(), PLACEHOLDER);
        kb.add("prazo", "48 horas").await.unwrap();
        assert_eq!(kb.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn add_then_query_returns_answer() {
        let dir = tempfile::tempdir().unwrap();
        let kb = open(dir.path()).await;
        kb.add("Qual o prazo do repasse?", "Até 48 horas após a nota fiscal.")
            .await
            .unwrap();
        let context = kb.query("Qual o prazo do repasse?", 3).await.unwrap();
        assert!(context.contains("Até 48 horas após a nota fiscal."));
        assert!(context.starts_with("PERGUNTA: Qual o prazo do repasse?"));
        assert!(context.contains(CONTEXT_SEPARATOR));
    }

    #[tokio::test]
    async fn query_returns_at_most_k_documents() {
        let dir = tempfile::tempdir().unwrap();
        let kb = open(dir.path()).await;
        for i in 0..5 {
            kb.add(&format!("pergunta {i}"), &format!("resposta {i}"))
                .await
                .unwrap();
        }
        let context = kb.query("pergunta 2", 3).await.unwrap();
        assert_eq!(context.split(CONTEXT_SEPARATOR).count(), 3);
    }

    #[tokio::test]
    async fn reopening_does_not_reseed() {
        let dir = tempfile::tempdir().unwrap();
        {
            let kb = open(dir.path()).await;
            kb.add("p", "r").await.unwrap();
        }
        let kb = open(dir.path()).await;
        assert_eq!(kb.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn failed_seed_is_retried_on_next_open() {
        let dir = tempfile::tempdir().unwrap();
        let first =
            KnowledgeBase::open(dir.path(), PLACEHOLDER, Arc::new(MockEmbedder::failing())).await;
        assert!(first.is_err());

        let kb = open(dir.path()).await;
        assert_eq!(kb.len().await.unwrap(), 1);
        assert_eq!(kb.query("oi", 3).await.unwrap(), PLACEHOLDER);
    }

    #[tokio::test]
    async fn empty_index_yields_empty_context() {
        let dir = tempfile::tempdir().unwrap();
        let index = SqliteIndex::open(dir.path()).await.unwrap();
        let kb = KnowledgeBase::with_index(Arc::new(index), Arc::new(MockEmbedder::new()));
        assert_eq!(kb.query("oi", 3).await.unwrap(), "");
    }

    #[tokio::test]
    async fn embedding_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let kb = open(dir.path()).await;
        let failing = KnowledgeBase {
            index: kb.index.clone(),
            embedder: Arc::new(MockEmbedder::failing()),
        };
        let err = failing.add("p", "r").await.unwrap_err();
        assert!(matches!(err, ParcelaError::Embedding(_)));
        assert_eq!(kb.len().await.unwrap(), 1);
    }
}
