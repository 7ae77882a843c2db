//! Shared utilities for gateway implementations.

/// Split a long message into chunks that respect a platform's length limit.
///
/// Boundaries are aligned to UTF-8 char boundaries so Cyrillic and emoji
/// never get cut in half. Prefers splitting after a newline.
pub fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            end += text[start..].chars().next().map_or(1, char::len_utf8);
        }
        let break_at = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .map(|i| start + i + 1)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(&text[start..break_at]);
        start = break_at;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_message("hello", 4096), vec!["hello"]);
    }

    #[test]
    fn test_split_prefers_newlines() {
        let text = "a\n".repeat(3000);
        let chunks = split_message(&text, 4096);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 4096);
            assert!(chunk.ends_with('\n'));
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_multibyte_safe() {
        // Each Cyrillic letter is two bytes; an odd limit lands mid-char.
        let text = "\u{0436}".repeat(100);
        let chunks = split_message(&text, 7);
        assert!(chunks.iter().all(|c| c.len() <= 7 && !c.is_empty()));
        assert_eq!(chunks.concat(), text);
    }
}
