// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parcela support assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use parcela_core::catalog::MISTRAL_7B_INSTRUCT;
use parcela_core::{Category, RoutingPolicy};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParcelaConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// LLM provider credentials and endpoints.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Knowledge store (similarity index) settings.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Classification rules and routing policy.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Retry/backoff settings for model invocation.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Conversation session timing and greetings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Persona prompt and user-facing copy.
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Bulk ingestion settings.
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Assistant identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "parcela".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Falls back to the `TELEGRAM_TOKEN` env var.
    #[serde(default)]
    pub bot_token: Option<String>,
}

impl TelegramConfig {
    /// Env var consulted when no token is configured.
    pub const TOKEN_ENV: &'static str = "TELEGRAM_TOKEN";

    /// Configured token, else `TELEGRAM_TOKEN`. Empty values count as unset.
    pub fn resolved_token(&self) -> Option<String> {
        self.bot_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(Self::TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Credentials and endpoints for every LLM provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_openai_endpoint")]
    pub openai: EndpointConfig,

    #[serde(default = "default_anthropic_endpoint")]
    pub anthropic: EndpointConfig,

    #[serde(default = "default_openrouter_endpoint")]
    pub openrouter: EndpointConfig,

    #[serde(default = "default_mistral_endpoint")]
    pub mistral: EndpointConfig,

    /// Anthropic API version header value.
    #[serde(default = "default_anthropic_version")]
    pub anthropic_version: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            openai: default_openai_endpoint(),
            anthropic: default_anthropic_endpoint(),
            openrouter: default_openrouter_endpoint(),
            mistral: default_mistral_endpoint(),
            anthropic_version: default_anthropic_version(),
        }
    }
}

/// One provider endpoint. A missing key disables the provider's models.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// API key. `None` falls back to the provider's conventional env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Full URL of the completion endpoint.
    pub base_url: String,
}

impl EndpointConfig {
    /// The configured key, else the value of `env_var`. Empty strings count as unset.
    pub fn resolved_api_key(&self, env_var: &str) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(env_var).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_openai_endpoint() -> EndpointConfig {
    EndpointConfig {
        api_key: None,
        base_url: "https://api.openai.com/v1/chat/completions".to_string(),
    }
}

fn default_anthropic_endpoint() -> EndpointConfig {
    EndpointConfig {
        api_key: None,
        base_url: "https://api.anthropic.com/v1/messages".to_string(),
    }
}

fn default_openrouter_endpoint() -> EndpointConfig {
    EndpointConfig {
        api_key: None,
        base_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
    }
}

fn default_mistral_endpoint() -> EndpointConfig {
    EndpointConfig {
        api_key: None,
        base_url: "https://api.mistral.ai/v1/chat/completions".to_string(),
    }
}

fn default_anthropic_version() -> String {
    "2023-06-01".to_string()
}

/// Knowledge store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfig {
    /// Directory holding the persisted similarity index.
    #[serde(default = "default_index_dir")]
    pub index_dir: String,

    /// Directory where the embedding model files are cached.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Number of prior exchanges retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Text of the document seeded into a freshly created index.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            data_dir: default_data_dir(),
            top_k: default_top_k(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_index_dir() -> String {
    "db_index".to_string()
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("parcela"))
        .unwrap_or_else(|| std::path::PathBuf::from(".parcela"))
        .to_string_lossy()
        .into_owned()
}

fn default_top_k() -> usize {
    3
}

fn default_placeholder() -> String {
    "mensagem inicial temporária".to_string()
}

/// One classification rule: questions matching `pattern` belong to `category`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryRule {
    pub category: Category,
    /// Regular expression tested against the lower-cased question.
    pub pattern: String,
}

impl CategoryRule {
    pub fn new(category: Category, pattern: &str) -> Self {
        Self {
            category,
            pattern: pattern.to_string(),
        }
    }
}

/// Classification and routing configuration.
///
/// Rules are evaluated in array order; the first match wins.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// `balanced` (category-driven) or `low_cost` (always the cheap model).
    #[serde(default)]
    pub policy: RoutingPolicy,

    /// Model returned for every question under the `low_cost` policy.
    #[serde(default = "default_low_cost_model")]
    pub low_cost_model: String,

    /// Model tried after the selected model exhausts its retries.
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Ordered classification rules.
    #[serde(default = "default_rules")]
    pub rules: Vec<CategoryRule>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            policy: RoutingPolicy::default(),
            low_cost_model: default_low_cost_model(),
            fallback_model: default_fallback_model(),
            rules: default_rules(),
        }
    }
}

fn default_low_cost_model() -> String {
    MISTRAL_7B_INSTRUCT.to_string()
}

fn default_fallback_model() -> String {
    MISTRAL_7B_INSTRUCT.to_string()
}

/// Default rule table in priority order: simple, financial, technical, legal, emotional.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            Category::Simple,
            r"(cadastrar|login|cadastro|parceira|contato|telefone|site|email)",
        ),
        CategoryRule::new(
            Category::Financial,
            r"(nota\s+fiscal|repasse|valor|pagamento|pix|transferência|antecipação|inadimplência|saldo|limite)",
        ),
        CategoryRule::new(
            Category::Technical,
            r"(webhook|api|token|sistema|xano|dashboard|integração|formulário|backoffice|json)",
        ),
        CategoryRule::new(
            Category::Legal,
            r"(contrato|termo|jurídico|assinatura|validade legal|compliance)",
        ),
        CategoryRule::new(
            Category::Emotional,
            r"(sonhos|ajudar|impacto|missão|sorrisos|pacientes|mudança|história)",
        ),
    ]
}

/// Retry/backoff configuration for model invocation.
///
/// The delay after failed attempt `n` (0-based) is `base_delay_ms * 2^n`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Attempts per model before giving up on it.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

/// Conversation session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Idle seconds after a reply before the "still there?" nudge.
    #[serde(default = "default_nudge_after_secs")]
    pub nudge_after_secs: u64,

    /// Further idle seconds after the nudge before the session is closed.
    #[serde(default = "default_close_after_secs")]
    pub close_after_secs: u64,

    /// Bare greetings that only trigger the welcome message on a new session.
    #[serde(default = "default_greetings")]
    pub greetings: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            nudge_after_secs: default_nudge_after_secs(),
            close_after_secs: default_close_after_secs(),
            greetings: default_greetings(),
        }
    }
}

fn default_nudge_after_secs() -> u64 {
    120
}

fn default_close_after_secs() -> u64 {
    60
}

fn default_greetings() -> Vec<String> {
    [
        "oi", "olá", "bom dia", "boa tarde", "boa noite", "hey", "e aí", "oiê", "opa",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Persona prompt and user-facing copy.
///
/// `welcome_template` may contain `{name}`, replaced by the user's display name.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_welcome_template")]
    pub welcome_template: String,

    #[serde(default = "default_acknowledgement")]
    pub acknowledgement: String,

    #[serde(default = "default_nudge_message")]
    pub nudge_message: String,

    #[serde(default = "default_closing_message")]
    pub closing_message: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            welcome_template: default_welcome_template(),
            acknowledgement: default_acknowledgement(),
            nudge_message: default_nudge_message(),
            closing_message: default_closing_message(),
        }
    }
}

fn default_system_prompt() -> String {
    "\
Você é um analista da Parcela Saúde, uma health-fintech especializada em financiamento \
de procedimentos médicos. Responda com base no funcionamento da empresa, nas regras do \
financiamento, no processo de crédito e nos benefícios para clínicas e pacientes.

Seu tom é empático, informativo e profissional, sempre priorizando clareza e confiança. \
Considere o seguinte contexto:

- Clínicas oferecem financiamento direto aos pacientes, com análise de crédito instantânea \
e repasse em até 48 horas após a emissão da nota fiscal.
- O crédito é aprovado com base em score, renda, profissão e histórico do paciente, com \
consulta a bureaus como Serasa, SPC e Boa Vista.
- Diferenciais: preservação do fluxo de caixa da clínica, ausência de glosas, taxas \
reduzidas e integração fluida ao processo da clínica.
- Especialidades mais atendidas: cirurgia plástica, odontologia, oftalmologia e cirurgia \
bariátrica, mas qualquer área da saúde pode se beneficiar.
- A empresa conecta clínicas e instituições financeiras por meio de uma plataforma \
white-label 100% online.
- Se não souber a resposta, diga que não pode ajudar com a pergunta. Não invente respostas.

Nunca diga que está gerando texto nem que é uma IA. Posicione-se sempre como um analista \
da Parcela Saúde, disponível para esclarecer dúvidas com autoridade e simpatia."
        .to_string()
}

fn default_welcome_template() -> String {
    "Olá, {name}! 👋\n\n\
Eu sou um analista da Parcela Mais, especialista em financiamento para procedimentos médicos.\n\
Pode perguntar sobre crédito, repasses, contratos ou qualquer dúvida sobre nossa plataforma!\n\n\
Como posso te ajudar hoje?"
        .to_string()
}

fn default_acknowledgement() -> String {
    "🔎 Só um instante enquanto analiso sua pergunta...".to_string()
}

fn default_nudge_message() -> String {
    "👋 Você ainda está por aí? Posso te ajudar com mais alguma coisa 😊".to_string()
}

fn default_closing_message() -> String {
    "💤 Conversa encerrada por inatividade. Quando quiser, é só me chamar novamente! 👋"
        .to_string()
}

/// Bulk ingestion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Directory of plain-text Q&A files (first line question, rest answer).
    #[serde(default = "default_context_dir")]
    pub context_dir: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            context_dir: default_context_dir(),
        }
    }
}

fn default_context_dir() -> String {
    "contextos".to_string()
}
