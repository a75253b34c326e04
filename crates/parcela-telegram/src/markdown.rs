// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MarkdownV2 formatting for Telegram Bot API.
//!
//! Outgoing copy uses `*bold*` the way classic Telegram Markdown does.
//! MarkdownV2 requires escaping 18 special characters, so everything except
//! balanced bold markers is escaped.

/// Characters that must be escaped in MarkdownV2.
const SPECIAL_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escapes text for MarkdownV2, keeping `*` as bold markers when they pair up.
///
/// An odd number of asterisks cannot be balanced, so all of them are escaped.
pub fn format_for_telegram(text: &str) -> String {
    let keep_bold = text.matches('*').count() % 2 == 0;
    let mut result = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if ch == '*' && keep_bold {
            result.push(ch);
        } else if SPECIAL_CHARS.contains(&ch) || ch == '\\' {
            result.push('\\');
            result.push(ch);
        } else {
            result.push(ch);
        }
    }
    result
}
