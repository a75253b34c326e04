// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `ask`, `route`, `ingest` and `seed`.

use std::path::PathBuf;

use parcela_config::ParcelaConfig;
use parcela_core::ParcelaError;
use parcela_knowledge::{default_sources, ingest_all, seed};
use parcela_router::{ModelRouter, RoutingDecision};
use tracing::info;

use crate::app;

/// Routes and answers a single question, printing the answer.
pub async fn run_ask(config: &ParcelaConfig, question: &str) -> Result<(), ParcelaError> {
    let router = ModelRouter::new(&config.routing)?;
    let knowledge = app::open_knowledge(config).await?;
    let registry = app::build_registry(&config.providers)?;
    let responder = app::build_responder(config, registry, knowledge);

    let question = question.trim().to_lowercase();
    let decision = router.route(&question);
    let answer = responder.generate(&question, &decision.model_id).await?;
    println!("{answer}");
    Ok(())
}

/// Prints the routing decision without calling any model.
pub fn run_route(config: &ParcelaConfig, question: &str) -> Result<(), ParcelaError> {
    let router = ModelRouter::new(&config.routing)?;
    let decision = router.route(&question.trim().to_lowercase());
    println!("{}", format_decision(&decision));
    Ok(())
}

fn format_decision(decision: &RoutingDecision) -> String {
    format!(
        "category: {}\nmodel:    {}\nreason:   {}",
        decision.category, decision.model_id, decision.reason
    )
}

/// Feeds the built-in sources and the context directory into the knowledge base.
pub async fn run_ingest(config: &ParcelaConfig, dir: Option<PathBuf>) -> Result<(), ParcelaError> {
    let dir = dir.unwrap_or_else(|| PathBuf::from(&config.ingest.context_dir));
    let knowledge = app::open_knowledge(config).await?;
    let count = ingest_all(&knowledge, &default_sources(dir)).await?;
    info!(count, "ingestion finished");
    println!("{count} exchanges indexed");
    Ok(())
}

pub async fn run_seed(config: &ParcelaConfig) -> Result<(), ParcelaError> {
    let knowledge = app::open_knowledge(config).await?;
    let count = seed(&knowledge).await?;
    println!("{count} bootstrap exchanges indexed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcela_core::Category;

    #[test]
    fn decision_is_printed_on_three_lines() {
        let decision = RoutingDecision {
            model_id: "openai_gpt4".to_string(),
            category: Category::Financial,
            reason: "financial question".to_string(),
        };
        assert_eq!(
            format_decision(&decision),
            "category: financial\nmodel:    openai_gpt4\nreason:   financial question"
        );
    }

    #[test]
    fn route_works_without_providers() {
        let config = parcela_config::load_and_validate_str("").unwrap();
        assert!(run_route(&config, "Posso parcelar em 12x?").is_ok());
    }
}
