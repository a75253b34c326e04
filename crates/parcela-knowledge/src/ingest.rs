// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk loading of historical exchanges into the knowledge base.
//!
//! Each [`SourceLoader`] yields question/answer pairs; [`ingest_all`] indexes
//! them one by one.

use std::path::PathBuf;

use async_trait::async_trait;
use parcela_core::ParcelaError;
use tracing::{info, warn};

use crate::store::KnowledgeBase;
use crate::types::QaEntry;

/// A source of historical exchanges.
#[async_trait]
pub trait SourceLoader: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Vec<QaEntry>, ParcelaError>;
}

/// Fixed in-memory exchanges, standing in for an external export.
pub struct StaticSource {
    name: String,
    entries: Vec<QaEntry>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, entries: Vec<QaEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn slack() -> Self {
        Self::new(
            "slack",
            vec![QaEntry::new(
                "Cliente no Slack pergunta sobre antecipação de valores.",
                "O cliente deseja saber se pode receber os valores antes da data prevista.",
            )],
        )
    }

    pub fn email() -> Self {
        Self::new(
            "email",
            vec![QaEntry::new(
                "O que acontece em caso de inadimplência do paciente?",
                "Em caso de inadimplência, a Parcela Saúde aciona os mecanismos de cobrança previstos em contrato.",
            )],
        )
    }

    pub fn whatsapp() -> Self {
        Self::new(
            "whatsapp",
            vec![QaEntry::new(
                "Qual é o prazo para o repasse à clínica?",
                "O repasse ocorre em até 48h após emissão da nota fiscal.",
            )],
        )
    }

    pub fn drive() -> Self {
        Self::new(
            "drive",
            vec![QaEntry::new(
                "Como é feita a integração com o sistema da clínica?",
                "A integração pode ser feita via API ou planilha automatizada.",
            )],
        )
    }
}

#[async_trait]
impl SourceLoader for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<QaEntry>, ParcelaError> {
        Ok(self.entries.clone())
    }
}

/// Plain-text files in a directory: first line is the question, the rest the answer.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Split file content into a pair. `None` when there is no line break.
fn parse_pair(content: &str) -> Option<QaEntry> {
    let (question, answer) = content.split_once('\n')?;
    Some(QaEntry::new(question.trim(), answer.trim()))
}

#[async_trait]
impl SourceLoader for DirectorySource {
    fn name(&self) -> &str {
        "files"
    }

    async fn load(&self) -> Result<Vec<QaEntry>, ParcelaError> {
        let io_err = |e: std::io::Error| ParcelaError::Storage {
            source: Box::new(e),
        };
        let mut reader = tokio::fs::read_dir(&self.dir).await.map_err(io_err)?;

        let mut paths = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(io_err)? {
            if entry.file_type().await.map_err(io_err)?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let content = tokio::fs::read_to_string(&path).await.map_err(io_err)?;
            match parse_pair(&content) {
                Some(entry) => entries.push(entry),
                None => warn!(file = %path.display(), "skipping file without a question line"),
            }
        }
        Ok(entries)
    }
}

/// The four built-in static sources plus the local context directory.
pub fn default_sources(context_dir: impl Into<PathBuf>) -> Vec<Box<dyn SourceLoader>> {
    vec![
        Box::new(StaticSource::slack()),
        Box::new(StaticSource::email()),
        Box::new(StaticSource::whatsapp()),
        Box::new(StaticSource::drive()),
        Box::new(DirectorySource::new(context_dir)),
    ]
}

/// Index every pair from every source. Returns the number of pairs indexed.
pub async fn ingest_all(
    kb: &KnowledgeBase,
    sources: &[Box<dyn SourceLoader>],
) -> Result<usize, ParcelaError> {
    let mut count = 0;
    for source in sources {
        info!(source = source.name(), "importing exchanges");
        for entry in source.load().await? {
            kb.add_entry(&entry).await?;
            info!(question = %entry.question, "exchange indexed");
            count += 1;
        }
    }
    Ok(count)
}

/// Bootstrap exchanges for a new deployment.
pub fn seed_entries() -> Vec<QaEntry> {
    vec![
        QaEntry::new(
            "Após emitir a nota fiscal, quanto tempo demora para o valor cair na conta da clínica?",
            "O repasse é feito em até 48 horas após a emissão da nota fiscal pela clínica.",
        ),
        QaEntry::new(
            "Quais critérios são usados para aprovar o financiamento de um paciente?",
            "São analisados score de crédito, profissão, renda declarada e histórico financeiro com base em consultas aos bureaus como Serasa e SPC.",
        ),
        QaEntry::new(
            "Qual o diferencial da Parcela Mais em relação a outros financiamentos?",
            "A Parcela Mais oferece integração total com a clínica, repasse rápido, ausência de glosas e taxas reduzidas.",
        ),
    ]
}

/// Index the bootstrap exchanges. Returns how many were added.
pub async fn seed(kb: &KnowledgeBase) -> Result<usize, ParcelaError> {
    let entries = seed_entries();
    for entry in &entries {
        kb.add_entry(entry).await?;
    }
    info!(count = entries.len(), "knowledge base seeded");
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pair_splits_on_first_newline() {
        let entry = parse_pair("Qual o prazo?\nAté 48h.\nSem glosas.\n").unwrap();
        assert_eq!(entry.question, "Qual o prazo?");
        assert_eq!(entry.answer, "Até 48h.\nSem glosas.");
    }

    #[test]
    fn parse_pair_without_newline_is_none() {
        assert!(parse_pair("só uma linha").is_none());
    }

    #[tokio::test]
    async fn static_sources_yield_one_pair_each() {
        for source in [
            StaticSource::slack(),
            StaticSource::email(),
            StaticSource::whatsapp(),
            StaticSource::drive(),
        ] {
            assert_eq!(source.load().await.unwrap().len(), 1, "{}", source.name());
        }
    }

    #[tokio::test]
    async fn directory_source_skips_single_line_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "Pergunta A\nResposta A").unwrap();
        std::fs::write(dir.path().join("b.txt"), "sem resposta").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let entries = DirectorySource::new(dir.path()).load().await.unwrap();
        assert_eq!(entries, vec![QaEntry::new("Pergunta A", "Resposta A")]);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let source = DirectorySource::new("/nonexistent/contextos");
        assert!(source.load().await.is_err());
    }

    #[test]
    fn three_seed_entries() {
        assert_eq!(seed_entries().len(), 3);
    }
}
