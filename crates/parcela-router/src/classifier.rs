// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword classification of customer questions.
//!
//! One compiled regex per category, tested in rule order against the
//! lower-cased question. No LLM pre-call, no network, no latency.

use parcela_config::model::CategoryRule;
use parcela_core::{Category, ParcelaError};
use regex::Regex;
use tracing::info;

/// Ordered rule-based question classifier.
#[derive(Debug, Clone)]
pub struct QueryClassifier {
    rules: Vec<(Category, Regex)>,
}

impl QueryClassifier {
    /// Compile a classifier from ordered rules.
    ///
    /// Fails on an invalid pattern or a rule targeting `general`, which is
    /// reserved for questions no rule matches.
    pub fn from_rules(rules: &[CategoryRule]) -> Result<Self, ParcelaError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.category == Category::General {
                return Err(ParcelaError::Config(
                    "`general` cannot have a classification rule".to_string(),
                ));
            }
            let regex = Regex::new(&rule.pattern).map_err(|e| {
                ParcelaError::Config(format!(
                    "invalid pattern for category `{}`: {e}",
                    rule.category
                ))
            })?;
            compiled.push((rule.category, regex));
        }
        Ok(Self { rules: compiled })
    }

    /// Classify a question. The first matching rule wins.
    pub fn classify(&self, question: &str) -> Category {
        let lowered = question.to_lowercase();
        let category = self
            .rules
            .iter()
            .find(|(_, regex)| regex.is_match(&lowered))
            .map(|(category, _)| *category)
            .unwrap_or(Category::General);
        info!(%category, "question classified");
        category
    }
}
