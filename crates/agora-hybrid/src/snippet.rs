//! Display snippets centred on the first query term found in a post body.

pub const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy)]
pub struct SnippetWindow {
    /// Maximum characters taken from the body.
    pub chars: usize,
    /// Characters of context kept before the matched term.
    pub context: usize,
}

impl Default for SnippetWindow {
    fn default() -> Self {
        Self { chars: 240, context: 60 }
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn find_folded(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w.iter().zip(needle).all(|(a, b)| fold(*a) == *b))
}

/// Build a snippet of `body` around the earliest occurrence of any query term.
///
/// Positions are in characters, not bytes. Without a match the snippet is the
/// head of the body.
pub fn build_snippet(body: &str, query: &str, window: SnippetWindow) -> String {
    let chars: Vec<char> = body.chars().collect();
    let hit = query
        .split_whitespace()
        .filter_map(|term| {
            let needle: Vec<char> = term.chars().map(fold).collect();
            find_folded(&chars, &needle)
        })
        .min();

    let start = hit.map_or(0, |pos| pos.saturating_sub(window.context));
    let end = (start + window.chars).min(chars.len());

    let mut out = String::with_capacity(window.chars + 2);
    if start > 0 {
        out.push(ELLIPSIS);
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push(ELLIPSIS);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_is_returned_whole() {
        assert_eq!(build_snippet("A short post.", "post", SnippetWindow::default()), "A short post.");
    }

    #[test]
    fn no_match_returns_head_with_trailing_ellipsis() {
        let body = "x".repeat(300);
        let s = build_snippet(&body, "dream", SnippetWindow::default());
        assert_eq!(s.chars().count(), 241);
        assert!(s.ends_with(ELLIPSIS));
        assert!(!s.starts_with(ELLIPSIS));
    }

    #[test]
    fn match_is_centred_with_left_context() {
        let body = format!("{}Dream journal{}", "a".repeat(100), "b".repeat(300));
        let s = build_snippet(&body, "dream", SnippetWindow::default());
        assert!(s.starts_with(ELLIPSIS));
        assert!(s.ends_with(ELLIPSIS));
        // 60 chars of context precede the match
        let inner: String = s.chars().skip(1).take(65).collect();
        assert_eq!(inner, format!("{}Dream", "a".repeat(60)));
        assert_eq!(s.chars().count(), 240 + 2);
    }

    #[test]
    fn earliest_term_wins() {
        let body = format!("{}journal then later dream", "z".repeat(70));
        let s = build_snippet(&body, "dream journal", SnippetWindow { chars: 20, context: 0 });
        assert_eq!(s, format!("{ELLIPSIS}journal then later d{ELLIPSIS}"));
    }

    #[test]
    fn match_near_start_has_no_leading_ellipsis() {
        let s = build_snippet("Dreams are strange", "DREAMS", SnippetWindow { chars: 6, context: 60 });
        assert_eq!(s, format!("Dreams{ELLIPSIS}"));
    }

    #[test]
    fn multibyte_text_is_sliced_by_chars() {
        let body = "ééééé rêve ééééé";
        let s = build_snippet(body, "RÊVE", SnippetWindow { chars: 4, context: 0 });
        assert_eq!(s, format!("{ELLIPSIS}rêve{ELLIPSIS}"));
    }
}
