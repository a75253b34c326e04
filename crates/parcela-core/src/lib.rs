// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parcela support assistant.
//!
//! This crate provides the trait definitions, error type, and common types
//! shared by every other crate in the workspace. External collaborators
//! (LLM providers, the embedding model, the messaging channel) implement
//! the traits defined here.

pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

pub use catalog::{MODEL_CATALOG, ModelProfile, ProviderKind, find_model};
pub use error::ParcelaError;
pub use types::{AdapterType, Category, HealthStatus, MessageId, RoutingPolicy};

pub use traits::{ChannelAdapter, EmbeddingAdapter, PluginAdapter, ProviderAdapter};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_display_and_parse_round_trip() {
        let variants = [
            Category::Simple,
            Category::Financial,
            Category::Technical,
            Category::Legal,
            Category::Emotional,
            Category::General,
        ];
        for variant in variants {
            let s = variant.to_string();
            assert_eq!(s, s.to_lowercase());
            assert_eq!(Category::from_str(&s).unwrap(), variant);
        }
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Financial).unwrap();
        assert_eq!(json, "\"financial\"");
    }

    #[test]
    fn routing_policy_names() {
        assert_eq!(RoutingPolicy::LowCost.to_string(), "low_cost");
        assert_eq!(RoutingPolicy::default(), RoutingPolicy::Balanced);
        let parsed: RoutingPolicy = serde_json::from_str("\"low_cost\"").unwrap();
        assert_eq!(parsed, RoutingPolicy::LowCost);
    }

    #[test]
    fn health_status_variants() {
        assert_eq!(HealthStatus::Healthy, HealthStatus::Healthy);
        assert_ne!(HealthStatus::Degraded("slow".into()), HealthStatus::Healthy);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_channel<T: ChannelAdapter>() {}
        fn _assert_provider<T: ProviderAdapter>() {}
        fn _assert_embedding<T: EmbeddingAdapter>() {}
    }
}
