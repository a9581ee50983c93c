use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn truncate_text_unicode(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: &str = "...";
    let ellipsis_width = ELLIPSIS.width();

    if max_width <= ellipsis_width {
        return ELLIPSIS[..max_width].to_string();
    }

    let target_width = max_width - ellipsis_width;
    let mut result = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }

    result.push_str(ELLIPSIS);
    result
}

/// Display form of a JSON value: strings unquoted, null empty, the rest compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First two and last two characters of a token, or `*none*`.
pub fn abbreviate_token(token: Option<&str>) -> String {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => {
            let chars: Vec<char> = token.chars().collect();
            let head: String = chars.iter().take(2).collect();
            let tail: String = chars[chars.len().saturating_sub(2)..].iter().collect();
            format!("{}...{}", head, tail)
        }
        None => "*none*".to_string(),
    }
}
