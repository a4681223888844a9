//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use uuid::Uuid;

/// Telegram refuses text messages longer than this
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Generate a new opaque login token
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

/// Join first and last name the way Telegram displays them
pub fn display_name(first_name: &str, last_name: Option<&str>) -> String {
    match last_name {
        Some(last) if !last.trim().is_empty() => format!("{} {}", first_name, last).trim().to_string(),
        _ => first_name.trim().to_string(),
    }
}

/// Collapse blank optional text into `None`
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Truncate HTML text to a maximum number of characters with ellipsis.
///
/// The cut never lands inside a tag or an entity, and tags left open by the
/// cut are closed again so the platform still accepts the markup.
pub fn truncate_html(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut budget = max_chars.saturating_sub(3);
    loop {
        let kept = html_prefix(text, budget);
        let closers = closing_tags(kept);
        let len = kept.chars().count() + 3 + closers.chars().count();
        if len <= max_chars || budget == 0 {
            return format!("{}...{}", kept, closers);
        }
        budget = budget.saturating_sub(len - max_chars);
    }
}

fn html_prefix(text: &str, max_chars: usize) -> &str {
    let end = text.char_indices().nth(max_chars).map_or(text.len(), |(i, _)| i);
    let kept = cut_dangling(&text[..end], '<', '>');
    cut_dangling(kept, '&', ';')
}

fn cut_dangling(text: &str, open: char, close: char) -> &str {
    match text.rfind(open) {
        Some(start) if !text[start..].contains(close) => &text[..start],
        _ => text,
    }
}

fn closing_tags(html: &str) -> String {
    let mut open: Vec<&str> = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else { break };
        let tag = &rest[start + 1..start + len];
        match tag.strip_prefix('/') {
            Some(name) => {
                if let Some(pos) = open.iter().rposition(|t| *t == name.trim()) {
                    open.truncate(pos);
                }
            }
            None => open.extend(tag.split_whitespace().next()),
        }
        rest = &rest[start + len + 1..];
    }
    open.iter().rev().map(|name| format!("</{}>", name)).collect()
}
