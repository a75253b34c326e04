// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation gateway and answer generation for the Parcela assistant.
//!
//! The [`AgentLoop`] is the central coordinator that:
//! - Receives messages from a channel adapter
//! - Welcomes new sessions and filters bare greetings
//! - Routes each question to a model and generates the answer
//! - Nudges and finally closes idle sessions
//! - Handles graceful shutdown

pub mod prompt;
pub mod registry;
pub mod responder;
pub mod session;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use parcela_config::model::{PersonaConfig, SessionConfig};
use parcela_core::ParcelaError;
use parcela_core::traits::ChannelAdapter;
use parcela_core::types::{InboundMessage, OutboundMessage};
use parcela_router::ModelRouter;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

pub use registry::{ProviderRegistry, ResolvedModel};
pub use responder::{Responder, ResponderSettings, RetryPolicy};
pub use session::{InMemorySessionStore, SessionStore, Touch};

/// How long shutdown waits for in-flight messages.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Session timings and the fixed texts the gateway sends.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub nudge_after: Duration,
    pub close_after: Duration,
    pub greetings: Vec<String>,
    pub welcome_template: String,
    pub acknowledgement: String,
    pub nudge_message: String,
    pub closing_message: String,
}

impl GatewaySettings {
    pub fn from_config(session: &SessionConfig, persona: &PersonaConfig) -> Self {
        Self {
            nudge_after: Duration::from_secs(session.nudge_after_secs),
            close_after: Duration::from_secs(session.close_after_secs),
            greetings: session.greetings.iter().map(|g| g.to_lowercase()).collect(),
            welcome_template: persona.welcome_template.clone(),
            acknowledgement: persona.acknowledgement.clone(),
            nudge_message: persona.nudge_message.clone(),
            closing_message: persona.closing_message.clone(),
        }
    }

    /// Idle time after which the next message starts a new session.
    pub fn session_expiry(&self) -> Duration {
        self.nudge_after + self.close_after
    }

    pub fn welcome_for(&self, name: &str) -> String {
        self.welcome_template.replace("{name}", name)
    }

    pub fn is_greeting(&self, text: &str) -> bool {
        self.greetings.iter().any(|g| g == text)
    }
}

struct Shared {
    channel: Arc<dyn ChannelAdapter>,
    router: ModelRouter,
    responder: Responder,
    sessions: Arc<dyn SessionStore>,
    settings: GatewaySettings,
    tracker: TaskTracker,
}

/// Receives messages from a channel and answers them.
///
/// Each message runs in its own task. Messages from one user are handled
/// in arrival order; different users proceed concurrently.
pub struct AgentLoop {
    shared: Arc<Shared>,
}

impl AgentLoop {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        router: ModelRouter,
        responder: Responder,
        sessions: Arc<dyn SessionStore>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                channel,
                router,
                responder,
                sessions,
                settings,
                tracker: TaskTracker::new(),
            }),
        }
    }

    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        self.shared.sessions.clone()
    }

    /// Runs until `cancel` fires or the channel closes, then drains tasks.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ParcelaError> {
        info!("agent loop running");

        loop {
            tokio::select! {
                msg = self.shared.channel.receive() => {
                    match msg {
                        Ok(inbound) => self.dispatch(inbound, cancel.clone()),
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }

        // Idle monitors exit early on cancellation; they must not hold up shutdown.
        cancel.cancel();
        shutdown::drain_tasks(&self.shared.tracker, DRAIN_TIMEOUT).await;

        info!("agent loop stopped");
        Ok(())
    }

    fn dispatch(&self, inbound: InboundMessage, cancel: CancellationToken) {
        let shared = self.shared.clone();
        self.shared
            .tracker
            .spawn(async move { handle_message(shared, inbound, cancel).await });
    }
}

async fn handle_message(shared: Arc<Shared>, inbound: InboundMessage, cancel: CancellationToken) {
    let question = inbound.text.trim().to_lowercase();
    let user_id = inbound.user_id.as_str();
    let chat_id = inbound.chat_id.as_str();
    let settings = &shared.settings;

    let lock = shared.sessions.user_lock(user_id);
    let _guard = lock.lock().await;

    let touch = shared
        .sessions
        .touch(user_id, Instant::now(), settings.session_expiry());

    if touch.is_new {
        info!(user = user_id, "new session");
        send(&shared, chat_id, settings.welcome_for(&inbound.display_name)).await;
        if settings.is_greeting(&question) {
            debug!(user = user_id, "bare greeting, waiting for a question");
            arm_monitor(&shared, user_id, chat_id, touch.seq, cancel);
            return;
        }
    }

    send(&shared, chat_id, settings.acknowledgement.clone()).await;

    let decision = shared.router.route(&question);
    info!(
        user = user_id,
        category = %decision.category,
        model = %decision.model_id,
        reason = %decision.reason,
        "question routed"
    );

    let answer = match shared.responder.generate(&question, &decision.model_id).await {
        Ok(answer) => answer,
        Err(e) => {
            error!(user = user_id, error = %e, "answer generation failed");
            arm_monitor(&shared, user_id, chat_id, touch.seq, cancel);
            return;
        }
    };
    send(&shared, chat_id, answer).await;

    arm_monitor(&shared, user_id, chat_id, touch.seq, cancel);
}

/// Every touched session gets a monitor, whatever the outcome of its message.
fn arm_monitor(
    shared: &Arc<Shared>,
    user_id: &str,
    chat_id: &str,
    seq: u64,
    cancel: CancellationToken,
) {
    let monitor = shared.clone();
    let user = user_id.to_string();
    let chat = chat_id.to_string();
    shared.tracker.spawn(async move {
        watch_inactivity(monitor, user, chat, seq, cancel).await;
    });
}

/// Nudge, then close, a session that stays idle after its last message.
async fn watch_inactivity(
    shared: Arc<Shared>,
    user_id: String,
    chat_id: String,
    seq: u64,
    cancel: CancellationToken,
) {
    let settings = &shared.settings;

    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(settings.nudge_after) => {}
    }
    if shared.sessions.activity_seq(&user_id) != Some(seq) {
        return;
    }
    send(&shared, &chat_id, settings.nudge_message.clone()).await;

    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(settings.close_after) => {}
    }
    if shared.sessions.evict_if_idle(&user_id, seq) {
        info!(user = %user_id, "session closed for inactivity");
        send(&shared, &chat_id, settings.closing_message.clone()).await;
    }
}

async fn send(shared: &Shared, chat_id: &str, content: String) {
    if let Err(e) = shared
        .channel
        .send(OutboundMessage::new(chat_id, content))
        .await
    {
        warn!(chat = chat_id, error = %e, "failed to send message");
    }
}
