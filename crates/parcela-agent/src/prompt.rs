// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly.

/// Heading placed before retrieved exchanges.
pub const CONTEXT_HEADING: &str = "Contexto anterior:";

/// Persona text, followed by retrieved context when there is any.
pub fn system_prompt(persona: &str, context: &str) -> String {
    if context.is_empty() {
        persona.to_string()
    } else {
        format!("{persona}\n\n{CONTEXT_HEADING}\n{context}")
    }
}
