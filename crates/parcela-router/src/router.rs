// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy-driven model selection.
//!
//! Classification feeds a fixed category table under the `balanced` policy;
//! `low_cost` ignores the category and always picks the configured cheap model.

use parcela_config::model::RoutingConfig;
use parcela_core::catalog::{CLAUDE_3_OPUS, LLAMA3_70B, OPENAI_GPT4, OPENAI_GPT35};
use parcela_core::{Category, ParcelaError, RoutingPolicy};
use tracing::debug;

use crate::classifier::QueryClassifier;

/// Outcome of routing one question.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    /// Catalog identifier of the selected model.
    pub model_id: String,
    /// Category the classifier assigned.
    pub category: Category,
    /// Human-readable reason for the choice.
    pub reason: String,
}

/// Selects a model for each question according to a fixed policy.
#[derive(Debug, Clone)]
pub struct ModelRouter {
    classifier: QueryClassifier,
    policy: RoutingPolicy,
    low_cost_model: String,
}

impl ModelRouter {
    /// Build a router from configuration. The policy is fixed for the router's lifetime.
    pub fn new(config: &RoutingConfig) -> Result<Self, ParcelaError> {
        Ok(Self {
            classifier: QueryClassifier::from_rules(&config.rules)?,
            policy: config.policy,
            low_cost_model: config.low_cost_model.clone(),
        })
    }

    pub fn policy(&self) -> RoutingPolicy {
        self.policy
    }

    /// Route a question. Never fails.
    pub fn route(&self, question: &str) -> RoutingDecision {
        let category = self.classifier.classify(question);

        let (model_id, reason) = match self.policy {
            RoutingPolicy::LowCost => (self.low_cost_model.as_str(), "cost policy"),
            RoutingPolicy::Balanced => balanced_choice(category),
        };

        debug!(%category, model = model_id, policy = %self.policy, reason, "model selected");

        RoutingDecision {
            model_id: model_id.to_string(),
            category,
            reason: reason.to_string(),
        }
    }
}

/// Category table of the balanced policy.
fn balanced_choice(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::Technical => (OPENAI_GPT35, "good cost-benefit for technical questions"),
        Category::Financial => (OPENAI_GPT4, "more precise for financial questions"),
        Category::Legal => (CLAUDE_3_OPUS, "handles long legal context well"),
        Category::Emotional => (LLAMA3_70B, "warm, empathetic tone"),
        Category::Simple => (LLAMA3_70B, "fast for objective answers"),
        Category::General => (OPENAI_GPT35, "default for general questions"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcela_core::catalog::MISTRAL_7B_INSTRUCT;
    use proptest::prelude::*;

    fn router(policy: RoutingPolicy) -> ModelRouter {
        let config = RoutingConfig {
            policy,
            ..RoutingConfig::default()
        };
        ModelRouter::new(&config).unwrap()
    }

    #[test]
    fn balanced_maps_every_category() {
        let r = router(RoutingPolicy::Balanced);
        let cases = [
            ("Esqueci meu login", Category::Simple, LLAMA3_70B),
            ("Qual o saldo disponível?", Category::Financial, OPENAI_GPT4),
            ("Como configuro o dashboard?", Category::Technical, OPENAI_GPT35),
            ("O termo tem validade?", Category::Legal, CLAUDE_3_OPUS),
            ("Quero ajudar mais pacientes", Category::Emotional, LLAMA3_70B),
            ("Vocês atendem em Recife?", Category::General, OPENAI_GPT35),
        ];
        for (question, category, model) in cases {
            let decision = r.route(question);
            assert_eq!(decision.category, category, "{question}");
            assert_eq!(decision.model_id, model, "{question}");
            assert!(!decision.reason.is_empty());
        }
    }

    #[test]
    fn financial_and_technical_goes_to_financial_model() {
        let decision = router(RoutingPolicy::Balanced).route("repasse via api atrasado");
        assert_eq!(decision.category, Category::Financial);
        assert_eq!(decision.model_id, OPENAI_GPT4);
    }

    #[test]
    fn low_cost_reports_cost_policy() {
        let decision = router(RoutingPolicy::LowCost).route("contrato de antecipação");
        assert_eq!(decision.model_id, MISTRAL_7B_INSTRUCT);
        assert_eq!(decision.reason, "cost policy");
        assert_eq!(decision.category, Category::Financial);
    }

    #[test]
    fn low_cost_model_is_configurable() {
        let config = RoutingConfig {
            policy: RoutingPolicy::LowCost,
            low_cost_model: LLAMA3_70B.to_string(),
            ..RoutingConfig::default()
        };
        let r = ModelRouter::new(&config).unwrap();
        assert_eq!(r.route("qualquer coisa").model_id, LLAMA3_70B);
    }

    proptest! {
        #[test]
        fn low_cost_always_returns_cheap_model(question in ".{0,120}") {
            let decision = router(RoutingPolicy::LowCost).route(&question);
            prop_assert_eq!(decision.model_id, MISTRAL_7B_INSTRUCT);
        }

        #[test]
        fn balanced_always_returns_catalog_model(question in ".{0,120}") {
            let decision = router(RoutingPolicy::Balanced).route(&question);
            prop_assert!(parcela_core::find_model(&decision.model_id).is_some());
        }
    }
}
