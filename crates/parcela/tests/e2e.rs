// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the assembled pipeline: configuration, routing,
//! retrieval, generation and the conversation loop, with mock adapters.

use std::path::Path;
use std::sync::Arc;

use parcela_agent::{
    AgentLoop, GatewaySettings, InMemorySessionStore, ProviderRegistry, Responder,
    ResponderSettings,
};
use parcela_config::ParcelaConfig;
use parcela_core::{Category, ProviderKind};
use parcela_knowledge::{KnowledgeBase, StaticSource, QaEntry, ingest_all, seed};
use parcela_router::ModelRouter;
use parcela_test_utils::{MockChannel, MockEmbedder, MockProvider, MockReply, inbound};
use tokio_util::sync::CancellationToken;

fn config(toml: &str) -> ParcelaConfig {
    parcela_config::load_and_validate_str(toml).expect("test config should be valid")
}

async fn persistent_kb(dir: &Path, config: &ParcelaConfig) -> KnowledgeBase {
    KnowledgeBase::open(dir, &config.knowledge.placeholder, Arc::new(MockEmbedder::new()))
        .await
        .unwrap()
}

// ---- Routing through configuration ----

#[test]
fn balanced_policy_routes_by_category() {
    let router = ModelRouter::new(&config("").routing).unwrap();

    let financial = router.route("quando cai o repasse da nota fiscal?");
    assert_eq!(financial.category, Category::Financial);
    assert_eq!(financial.model_id, "openai_gpt4");

    let legal = router.route("preciso revisar o contrato");
    assert_eq!(legal.category, Category::Legal);
    assert_eq!(legal.model_id, "claude_3_opus");
}

#[test]
fn low_cost_policy_from_toml_ignores_category() {
    let router = ModelRouter::new(
        &config("[routing]\npolicy = \"low_cost\"\nlow_cost_model = \"openai_gpt3.5\"\n").routing,
    )
    .unwrap();
    for question in ["preciso revisar o contrato", "qual o saldo?", "bom dia"] {
        assert_eq!(router.route(question).model_id, "openai_gpt3.5");
    }
}

// ---- Question to stored answer ----

#[tokio::test]
async fn routed_answer_is_generated_and_remembered() {
    let dir = tempfile::tempdir().unwrap();
    let config = config("[retry]\nbase_delay_ms = 1\n");
    let knowledge = persistent_kb(dir.path(), &config).await;
    seed(&knowledge).await.unwrap();

    let openai = Arc::new(MockProvider::with_script(vec![MockReply::text(
        "O repasse acontece em até 48 horas.",
    )]));
    let registry = ProviderRegistry::new().with(ProviderKind::OpenAi, openai.clone());
    let responder = Responder::new(registry, knowledge.clone(), ResponderSettings::from_config(&config));
    let router = ModelRouter::new(&config.routing).unwrap();

    let question = "quando recebo o repasse?";
    let decision = router.route(question);
    let answer = responder.generate(question, &decision.model_id).await.unwrap();
    assert_eq!(answer, "O repasse acontece em até 48 horas.");

    // Seeded exchanges reached the prompt.
    let request = &openai.requests()[0];
    assert!(request.system_prompt.contains("Contexto anterior:"));
    assert!(request.system_prompt.contains("PERGUNTA:"));

    // 1 placeholder + 3 seeds + 1 new exchange, and it survives a reopen.
    assert_eq!(knowledge.len().await.unwrap(), 5);
    drop(responder);
    drop(knowledge);
    let reopened = persistent_kb(dir.path(), &config).await;
    assert_eq!(reopened.len().await.unwrap(), 5);
    let context = reopened.query(question, 1).await.unwrap();
    assert!(context.contains("O repasse acontece em até 48 horas."));
}

#[tokio::test]
async fn unconfigured_provider_is_reported_as_unrecognized() {
    let dir = tempfile::tempdir().unwrap();
    let config = config("");
    let knowledge = persistent_kb(dir.path(), &config).await;
    let responder = Responder::new(
        ProviderRegistry::new(),
        knowledge,
        ResponderSettings::from_config(&config),
    );
    let answer = responder.generate("contrato", "claude_3_opus").await.unwrap();
    assert_eq!(answer, "Modelo 'claude_3_opus' não reconhecido.");
}

#[tokio::test]
async fn bulk_ingestion_feeds_retrieval() {
    let dir = tempfile::tempdir().unwrap();
    let config = config("");
    let knowledge = persistent_kb(dir.path(), &config).await;

    let sources: Vec<Box<dyn parcela_knowledge::SourceLoader>> = vec![
        Box::new(StaticSource::new(
            "planilha",
            vec![QaEntry::new("aceitam boleto?", "Sim, boleto e cartão.")],
        )),
        Box::new(StaticSource::slack()),
    ];
    let count = ingest_all(&knowledge, &sources).await.unwrap();
    assert!(count >= 2);
    assert_eq!(knowledge.len().await.unwrap(), count + 1);

    let context = knowledge.query("aceitam boleto?", 1).await.unwrap();
    assert!(context.contains("Sim, boleto e cartão."));
}

// ---- Full conversation through the channel ----

#[tokio::test]
async fn conversation_over_mock_channel() {
    let config = config("[retry]\nbase_delay_ms = 1\n");
    let knowledge =
        KnowledgeBase::in_memory(&config.knowledge.placeholder, Arc::new(MockEmbedder::new()))
            .await
            .unwrap();

    // Primary always fails; the fallback answers.
    let openai = Arc::new(MockProvider::always_failing("HTTP 503"));
    let mistral = Arc::new(MockProvider::with_script(vec![MockReply::text(
        "Pelo painel da clínica.",
    )]));
    let registry = ProviderRegistry::new()
        .with(ProviderKind::OpenAi, openai.clone())
        .with(ProviderKind::Mistral, mistral.clone());

    let channel = MockChannel::new();
    let settings = GatewaySettings::from_config(&config.session, &config.persona);
    let agent = AgentLoop::new(
        Arc::new(channel.clone()),
        ModelRouter::new(&config.routing).unwrap(),
        Responder::new(registry, knowledge.clone(), ResponderSettings::from_config(&config)),
        Arc::new(InMemorySessionStore::new()),
        settings.clone(),
    );

    channel.inject_message(inbound("42", "Carla", "Oi")).await;
    channel
        .inject_message(inbound("42", "Carla", "Como vejo o saldo da nota fiscal?"))
        .await;
    channel.close().await;
    agent.run(CancellationToken::new()).await.unwrap();

    assert_eq!(
        channel.sent_texts().await,
        vec![
            settings.welcome_for("Carla"),
            settings.acknowledgement.clone(),
            "Pelo painel da clínica.".to_string(),
        ]
    );
    assert_eq!(openai.call_count(), 5);
    assert_eq!(mistral.call_count(), 1);
    assert_eq!(knowledge.len().await.unwrap(), 2);
}
