/// Pure utility functions for listing text.
///
/// These functions contain NO side effects - they take inputs and return outputs
/// without touching databases, making API calls, or performing I/O.

/// Truncate text to at most `max_chars` characters, respecting UTF-8 boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Normalize a tag list into a set: trimmed, blanks dropped, duplicates removed.
///
/// The first occurrence of each tag keeps its position.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || normalized.iter().any(|existing| existing == tag) {
            continue;
        }
        normalized.push(tag.to_string());
    }
    normalized
}

/// Collapse runs of whitespace (including newlines from HTML text nodes) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_text() {
        assert_eq!(truncate_chars("Short description", 500), "Short description");
    }

    #[test]
    fn test_truncate_chars_long_text() {
        let long = "a".repeat(600);
        assert_eq!(truncate_chars(&long, 500).len(), 500);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        let text = "héllo wörld";
        assert_eq!(truncate_chars(text, 4), "héll");
    }

    #[test]
    fn test_normalize_tags_dedupes_and_trims() {
        let tags = normalize_tags(["unstop", " hackathon ", "unstop", "", "hackathon", "online"]);
        assert_eq!(tags, vec!["unstop", "hackathon", "online"]);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  AI \n\n Hackathon\t2025 "), "AI Hackathon 2025");
    }
}
