// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binding of catalog models to live provider adapters.

use std::collections::HashMap;
use std::sync::Arc;

use parcela_core::catalog::{MODEL_CATALOG, ModelProfile, ProviderKind, find_model};
use parcela_core::traits::ProviderAdapter;

/// A catalog model together with the adapter that serves it.
#[derive(Clone)]
pub struct ResolvedModel {
    pub profile: &'static ModelProfile,
    pub provider: Arc<dyn ProviderAdapter>,
}

/// Provider adapters keyed by API family.
///
/// A model is usable only when its provider has been registered.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ProviderKind, provider: Arc<dyn ProviderAdapter>) {
        self.providers.insert(kind, provider);
    }

    pub fn with(mut self, kind: ProviderKind, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.insert(kind, provider);
        self
    }

    /// `None` when the id is not in the catalog or its provider is missing.
    pub fn resolve(&self, model_id: &str) -> Option<ResolvedModel> {
        let profile = find_model(model_id)?;
        let provider = self.providers.get(&profile.provider)?.clone();
        Some(ResolvedModel { profile, provider })
    }

    /// Ids of every catalog model that can currently be served.
    pub fn available_models(&self) -> Vec<&'static str> {
        MODEL_CATALOG
            .iter()
            .filter(|m| self.providers.contains_key(&m.provider))
            .map(|m| m.id)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
