// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filtering and conversion of incoming Telegram updates.
//!
//! Only plain text messages reach the assistant. Commands, media and
//! service messages are dropped here.

use parcela_core::types::InboundMessage;
use teloxide::types::Message;

/// Whether the text is a bot command such as `/start`.
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Converts a Telegram message into an [`InboundMessage`].
///
/// Returns `None` for non-text messages and commands.
pub fn to_inbound_message(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text()?;
    if is_command(text) {
        return None;
    }

    let chat_id = msg.chat.id.0.to_string();
    let (user_id, display_name) = match msg.from.as_ref() {
        Some(user) => (user.id.0.to_string(), user.first_name.clone()),
        // Channel posts have no sender; the chat is the only identity.
        None => (chat_id.clone(), String::new()),
    };

    Some(InboundMessage {
        id: msg.id.0.to_string(),
        user_id,
        chat_id,
        text: text.to_string(),
        display_name,
    })
}
