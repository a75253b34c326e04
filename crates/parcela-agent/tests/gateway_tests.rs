// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation gateway behavior driven through a mock channel.

use std::sync::Arc;
use std::time::Duration;

use parcela_agent::{
    AgentLoop, GatewaySettings, InMemorySessionStore, ProviderRegistry, Responder,
    ResponderSettings,
};
use parcela_config::ParcelaConfig;
use parcela_core::ProviderKind;
use parcela_knowledge::{KnowledgeBase, MemoryIndex};
use parcela_router::ModelRouter;
use parcela_test_utils::{MockChannel, MockEmbedder, MockProvider, MockReply, inbound};
use tokio_util::sync::CancellationToken;

struct Harness {
    channel: MockChannel,
    provider: Arc<MockProvider>,
    knowledge: KnowledgeBase,
    agent: Arc<AgentLoop>,
    settings: GatewaySettings,
}

async fn harness(provider: MockProvider) -> Harness {
    let config = ParcelaConfig::default();
    let knowledge =
        KnowledgeBase::in_memory(&config.knowledge.placeholder, Arc::new(MockEmbedder::new()))
            .await
            .unwrap();
    build(provider, knowledge)
}

fn build(provider: MockProvider, knowledge: KnowledgeBase) -> Harness {
    let config = ParcelaConfig::default();
    let provider = Arc::new(provider);
    let registry = ProviderRegistry::new()
        .with(ProviderKind::OpenAi, provider.clone())
        .with(ProviderKind::Anthropic, provider.clone())
        .with(ProviderKind::OpenRouter, provider.clone())
        .with(ProviderKind::Mistral, provider.clone());
    let responder = Responder::new(
        registry,
        knowledge.clone(),
        ResponderSettings::from_config(&config),
    );
    let router = ModelRouter::new(&config.routing).unwrap();
    let settings = GatewaySettings::from_config(&config.session, &config.persona);

    let channel = MockChannel::new();
    let agent = AgentLoop::new(
        Arc::new(channel.clone()),
        router,
        responder,
        Arc::new(InMemorySessionStore::new()),
        settings.clone(),
    );

    Harness {
        channel,
        provider,
        knowledge,
        agent: Arc::new(agent),
        settings,
    }
}

impl Harness {
    /// Run the loop until the injected messages are handled and the channel closes.
    async fn run_to_completion(&self) {
        self.channel.close().await;
        self.agent.run(CancellationToken::new()).await.unwrap();
    }

    fn spawn_loop(&self) -> (CancellationToken, tokio::task::JoinHandle<()>) {
        let cancel = CancellationToken::new();
        let agent = self.agent.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            agent.run(token).await.unwrap();
        });
        (cancel, handle)
    }
}

#[tokio::test(start_paused = true)]
async fn greeting_only_first_message_gets_only_the_welcome() {
    let h = harness(MockProvider::new()).await;
    h.channel.inject_message(inbound("7", "Ana", "  Oi ")).await;
    h.run_to_completion().await;

    assert_eq!(h.channel.sent_texts().await, vec![h.settings.welcome_for("Ana")]);
    assert_eq!(h.provider.call_count(), 0);
    assert_eq!(h.knowledge.len().await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn new_session_question_gets_welcome_ack_and_answer() {
    let h = harness(MockProvider::with_script(vec![MockReply::text("Em até 48 horas.")])).await;
    h.channel
        .inject_message(inbound("7", "Ana", "Qual o PRAZO do repasse?"))
        .await;
    h.run_to_completion().await;

    let sent = h.channel.sent_messages().await;
    let texts: Vec<&str> = sent.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            h.settings.welcome_for("Ana").as_str(),
            h.settings.acknowledgement.as_str(),
            "Em até 48 horas.",
        ]
    );
    assert!(sent.iter().all(|m| m.chat_id == "7"));

    let requests = h.provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].message, "qual o prazo do repasse?");
    assert_eq!(h.knowledge.len().await.unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn greeting_inside_live_session_is_answered() {
    let h = harness(MockProvider::new()).await;
    h.channel.inject_message(inbound("7", "Ana", "como funciona o crédito?")).await;
    h.channel.inject_message(inbound("7", "Ana", "oi")).await;
    h.run_to_completion().await;

    let texts = h.channel.sent_texts().await;
    let welcomes = texts.iter().filter(|t| **t == h.settings.welcome_for("Ana")).count();
    assert_eq!(welcomes, 1);
    assert_eq!(h.provider.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn one_users_messages_are_answered_in_order() {
    let h = harness(MockProvider::with_script(vec![
        MockReply::text("primeira"),
        MockReply::text("segunda"),
    ]))
    .await;
    h.channel.inject_message(inbound("7", "Ana", "pergunta um")).await;
    h.channel.inject_message(inbound("7", "Ana", "pergunta dois")).await;
    h.run_to_completion().await;

    let ack = h.settings.acknowledgement.clone();
    assert_eq!(
        h.channel.sent_texts().await,
        vec![
            h.settings.welcome_for("Ana"),
            ack.clone(),
            "primeira".to_string(),
            ack,
            "segunda".to_string(),
        ]
    );
    let questions: Vec<String> = h.provider.requests().into_iter().map(|r| r.message).collect();
    assert_eq!(questions, vec!["pergunta um", "pergunta dois"]);
}

#[tokio::test(start_paused = true)]
async fn different_users_each_get_a_welcome() {
    let h = harness(MockProvider::new()).await;
    h.channel.inject_message(inbound("1", "Ana", "oi")).await;
    h.channel.inject_message(inbound("2", "Bruno", "bom dia")).await;
    h.run_to_completion().await;

    let sent = h.channel.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().any(|m| m.chat_id == "1" && m.content.contains("Ana")));
    assert!(sent.iter().any(|m| m.chat_id == "2" && m.content.contains("Bruno")));
}

#[tokio::test(start_paused = true)]
async fn storage_failure_ends_processing_without_reply() {
    // Empty index skips retrieval, so the failure surfaces when storing the answer.
    let knowledge =
        KnowledgeBase::with_index(Arc::new(MemoryIndex::new()), Arc::new(MockEmbedder::failing()));
    let h = build(MockProvider::new(), knowledge);
    h.channel.inject_message(inbound("7", "Ana", "qual o saldo?")).await;
    h.run_to_completion().await;

    assert_eq!(
        h.channel.sent_texts().await,
        vec![h.settings.welcome_for("Ana"), h.settings.acknowledgement.clone()]
    );
    assert_eq!(h.provider.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn inactivity_sends_nudge_then_closing_and_evicts() {
    let h = harness(MockProvider::with_script(vec![MockReply::text("resposta")])).await;
    let (cancel, handle) = h.spawn_loop();

    h.channel.inject_message(inbound("7", "Ana", "qual o prazo?")).await;
    h.channel.wait_for_sent(3).await;
    let answered_at = tokio::time::Instant::now();
    assert_eq!(h.agent.sessions().len(), 1);

    let sent = h.channel.wait_for_sent(4).await;
    assert_eq!(sent[3].content, h.settings.nudge_message);
    assert!(answered_at.elapsed() >= Duration::from_secs(120));

    let sent = h.channel.wait_for_sent(5).await;
    assert_eq!(sent[4].content, h.settings.closing_message);
    assert!(answered_at.elapsed() >= Duration::from_secs(180));
    assert!(h.agent.sessions().is_empty());

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn greeting_only_session_is_closed_when_idle() {
    let h = harness(MockProvider::new()).await;
    let (cancel, handle) = h.spawn_loop();

    h.channel.inject_message(inbound("7", "Ana", "oi")).await;
    h.channel.wait_for_sent(1).await;
    assert_eq!(h.agent.sessions().len(), 1);

    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert!(h.agent.sessions().is_empty());
    assert_eq!(
        h.channel.sent_texts().await,
        vec![
            h.settings.welcome_for("Ana"),
            h.settings.nudge_message.clone(),
            h.settings.closing_message.clone(),
        ]
    );

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_answer_session_is_closed_when_idle() {
    let knowledge =
        KnowledgeBase::with_index(Arc::new(MemoryIndex::new()), Arc::new(MockEmbedder::failing()));
    let h = build(MockProvider::new(), knowledge);
    let (cancel, handle) = h.spawn_loop();

    h.channel.inject_message(inbound("7", "Ana", "qual o saldo?")).await;
    h.channel.wait_for_sent(2).await;

    let sent = h.channel.wait_for_sent(4).await;
    assert_eq!(sent[2].content, h.settings.nudge_message);
    assert_eq!(sent[3].content, h.settings.closing_message);
    assert!(h.agent.sessions().is_empty());

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn new_activity_cancels_the_pending_nudge() {
    let h = harness(MockProvider::new()).await;
    let (cancel, handle) = h.spawn_loop();

    h.channel.inject_message(inbound("7", "Ana", "primeira pergunta")).await;
    h.channel.wait_for_sent(3).await;

    tokio::time::sleep(Duration::from_secs(60)).await;
    h.channel.inject_message(inbound("7", "Ana", "segunda pergunta")).await;
    h.channel.wait_for_sent(5).await;

    // Only the second answer's monitor may nudge and close.
    let sent = h.channel.wait_for_sent(7).await;
    let nudges = sent
        .iter()
        .filter(|m| m.content == h.settings.nudge_message)
        .count();
    assert_eq!(nudges, 1);
    assert_eq!(sent[6].content, h.settings.closing_message);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn message_after_close_starts_a_new_session() {
    let h = harness(MockProvider::new()).await;
    let (cancel, handle) = h.spawn_loop();

    h.channel.inject_message(inbound("7", "Ana", "primeira pergunta")).await;
    h.channel.wait_for_sent(5).await;
    assert!(h.agent.sessions().is_empty());

    h.channel.inject_message(inbound("7", "Ana", "oi")).await;
    let sent = h.channel.wait_for_sent(6).await;
    assert_eq!(sent[5].content, h.settings.welcome_for("Ana"));

    cancel.cancel();
    handle.await.unwrap();
    assert_eq!(h.channel.sent_count().await, 6);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_pending_monitors() {
    let h = harness(MockProvider::new()).await;
    let (cancel, handle) = h.spawn_loop();

    h.channel.inject_message(inbound("7", "Ana", "uma pergunta")).await;
    h.channel.wait_for_sent(3).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(h.channel.sent_count().await, 3);
    assert_eq!(h.agent.sessions().len(), 1);
}
