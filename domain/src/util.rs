//! Shared utility functions.

/// Shorten `s` to at most `max_chars` characters for one-line display.
///
/// Newlines are flattened to spaces and a trailing `…` marks truncation.
pub fn preview(s: &str, max_chars: usize) -> String {
    let flat: String = s
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let flat = flat.trim();
    if flat.chars().count() <= max_chars {
        return flat.to_string();
    }
    let mut out: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_text_unchanged() {
        assert_eq!(preview("hello", 10), "hello");
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        assert_eq!(preview("hello world", 6), "hello…");
    }

    #[test]
    fn preview_flattens_newlines() {
        assert_eq!(preview("a\nb\r\nc", 20), "a b  c");
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        assert_eq!(preview("あのね", 3), "あのね");
        assert_eq!(preview("あのねこ", 3), "あの…");
    }
}
