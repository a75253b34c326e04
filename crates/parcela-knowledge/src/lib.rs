// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge store for the Parcela assistant.
//!
//! Past question/answer exchanges are embedded with a local ONNX model,
//! persisted in a SQLite similarity index, and retrieved as prompt context
//! for new questions.

pub mod embedder;
pub mod index;
pub mod ingest;
pub mod model_manager;
pub mod store;
pub mod types;

pub use embedder::{EMBEDDING_DIM, OnnxEmbedder};
pub use index::{MemoryIndex, SqliteIndex, VectorIndex};
pub use ingest::{
    DirectorySource, SourceLoader, StaticSource, default_sources, ingest_all, seed, seed_entries,
};
pub use model_manager::ModelManager;
pub use store::{CONTEXT_SEPARATOR, DEFAULT_TOP_K, KnowledgeBase};
pub use types::QaEntry;
