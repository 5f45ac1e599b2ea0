//! String cleanup for generated titles and quoted snippets.

use rand::Rng;

pub const UNTITLED: &str = "Untitled discussion";
pub const ELLIPSIS: char = '…';

const QUOTE_PAIRS: [(char, char); 5] = [('"', '"'), ('\'', '\''), ('`', '`'), ('“', '”'), ('«', '»')];

/// Turn raw model output into a single-line title of at most `max_chars`
/// characters.
pub fn normalize_title(raw: &str, max_chars: usize) -> String {
    let candidate = extract_json_title(raw).unwrap_or_else(|| raw.to_string());
    let collapsed = collapse_whitespace(&candidate);
    let unquoted = collapse_whitespace(strip_wrapping_quotes(&collapsed));
    if unquoted.is_empty() {
        return UNTITLED.to_string();
    }
    truncate_chars(&unquoted, max_chars)
}

/// Pull `title` out of a JSON object embedded anywhere in `raw`.
fn extract_json_title(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(&raw[start..=end]).ok()?;
    value.get("title")?.as_str().map(str::to_string)
}

fn strip_wrapping_quotes(mut s: &str) -> &str {
    loop {
        let trimmed = s.trim();
        let stripped = QUOTE_PAIRS.iter().find_map(|(open, close)| {
            trimmed.strip_prefix(*open).and_then(|rest| rest.strip_suffix(*close))
        });
        match stripped {
            Some(inner) => s = inner,
            None => return trimmed,
        }
    }
}

/// Newlines, tabs and runs of spaces become single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut to `max_chars` characters in total, ending with `…` when shortened.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.truncate(out.trim_end().len());
    out.push(ELLIPSIS);
    out
}

/// Single-line excerpt of a message for quoting in a reply prompt.
pub fn quote_snippet(text: &str, max_chars: usize) -> String {
    truncate_chars(&collapse_whitespace(text), max_chars)
}

/// Random token appended to retry prompts so the model does not repeat itself.
pub fn uniqueness_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:08x}", rng.gen::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_title_is_kept() {
        assert_eq!(normalize_title("Best hiking boots?", 120), "Best hiking boots?");
    }

    #[test]
    fn json_title_is_extracted() {
        let raw = "Sure! Here you go:\n{\"title\": \"Night  shifts and\\nsleep\"}";
        assert_eq!(normalize_title(raw, 120), "Night shifts and sleep");
    }

    #[test]
    fn broken_json_falls_back_to_raw_text() {
        assert_eq!(normalize_title("{\"title\": \"oops", 120), "{\"title\": \"oops");
    }

    #[test]
    fn wrapping_quotes_are_removed() {
        assert_eq!(normalize_title("  \"'Lucid dreaming basics'\"  ", 120), "Lucid dreaming basics");
        assert_eq!(normalize_title("“Curly quotes”", 120), "Curly quotes");
    }

    #[test]
    fn newlines_are_flattened() {
        assert_eq!(normalize_title("Line one\n\n  line   two", 120), "Line one line two");
    }

    #[test]
    fn empty_output_becomes_untitled() {
        assert_eq!(normalize_title("   ", 120), UNTITLED);
        assert_eq!(normalize_title("\"\"", 120), UNTITLED);
        assert_eq!(normalize_title("{\"title\": \"  \"}", 120), UNTITLED);
    }

    #[test]
    fn long_titles_are_truncated_to_the_limit() {
        let raw = "word ".repeat(60);
        let title = normalize_title(&raw, 120);
        assert_eq!(title.chars().count(), 120);
        assert!(title.ends_with(ELLIPSIS));

        let cut = truncate_chars("abcdefghij", 5);
        assert_eq!(cut, "abcd…");
    }

    #[test]
    fn snippet_is_single_line() {
        let s = quote_snippet("first line\nsecond line", 12);
        assert_eq!(s, "first line…");
        assert_eq!(s.chars().count(), 11);
    }

    #[test]
    fn tokens_are_hex() {
        let mut rng = rand::thread_rng();
        let token = uniqueness_token(&mut rng);
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
