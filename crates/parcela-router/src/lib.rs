// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Question classification and model routing for the Parcela assistant.
//!
//! - [`QueryClassifier`]: ordered keyword rules mapping a question to a [`Category`](parcela_core::Category)
//! - [`ModelRouter`]: policy-driven choice of a catalog model for that category

pub mod classifier;
pub mod router;

pub use classifier::QueryClassifier;
pub use router::{ModelRouter, RoutingDecision};
