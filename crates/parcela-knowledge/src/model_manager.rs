// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-run download of the embedding model into the data directory.

use std::path::{Path, PathBuf};

use parcela_core::ParcelaError;
use tokio::sync::Mutex;
use tracing::{info, warn};

const MODEL_URL: &str = "https://huggingface.co/onnx-community/all-MiniLM-L6-v2-ONNX/resolve/main/onnx/model_quantized.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

const MODEL_FILE: &str = "model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Resolves and, if needed, fetches the embedding model files.
pub struct ModelManager {
    data_dir: PathBuf,
    // Serializes concurrent first-run downloads.
    download_lock: Mutex<()>,
}

impl ModelManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            download_lock: Mutex::new(()),
        }
    }

    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join("models").join("all-MiniLM-L6-v2")
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join(MODEL_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir().join(TOKENIZER_FILE)
    }

    pub fn is_model_available(&self) -> bool {
        self.model_path().exists() && self.tokenizer_path().exists()
    }

    /// Return the model path, downloading missing files first.
    pub async fn ensure_model(&self) -> Result<PathBuf, ParcelaError> {
        let _guard = self.download_lock.lock().await;
        if self.is_model_available() {
            return Ok(self.model_path());
        }

        let dir = self.model_dir();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            ParcelaError::Embedding(format!("creating {}: {e}", dir.display()))
        })?;

        for (file, url) in [(MODEL_FILE, MODEL_URL), (TOKENIZER_FILE, TOKENIZER_URL)] {
            let dest = dir.join(file);
            if dest.exists() {
                continue;
            }
            info!(file, "downloading embedding model file");
            match download(url, &dest).await {
                Ok(bytes) => info!(file, bytes, "download complete"),
                Err(e) => {
                    if let Err(cleanup) = tokio::fs::remove_file(&dest).await {
                        warn!(file, error = %cleanup, "could not remove partial download");
                    }
                    return Err(e);
                }
            }
        }

        info!(dir = %dir.display(), "embedding model ready");
        Ok(self.model_path())
    }
}

async fn download(url: &str, dest: &Path) -> Result<usize, ParcelaError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ParcelaError::Embedding(format!("downloading {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(ParcelaError::Embedding(format!(
            "downloading {url}: HTTP {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ParcelaError::Embedding(format!("reading {url}: {e}")))?;
    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| ParcelaError::Embedding(format!("writing {}: {e}", dest.display())))?;
    Ok(bytes.len())
}
