//! Query splitting.
//!
//! A query is a literal prefix followed by an optional regular expression.
//! The literal part (the safe subquery) drives the trie lookup; the whole
//! query is applied afterwards as a regex filter.

/// Characters that end the literal part of a query.
const REGEX_START: [char; 3] = ['[', '(', '\\'];

/// Turn escaped dots into literal dots, and the first escaped `?` into `?`.
pub fn unescape_literals(q: &str) -> String {
    q.replace(r"\.", ".").replacen(r"\?", "?", 1)
}

/// Longest literal prefix of `q` usable as a trie lookup.
pub fn safe_subquery(q: &str) -> String {
    let mut q = unescape_literals(q);
    if let Some(end) = q.find(REGEX_START) {
        q.truncate(end);
    }
    q
}

/// Parse a result-limit parameter, falling back to `default` when it is
/// absent, not a number, or negative.
pub fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.parse::<usize>().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_query_is_its_own_subquery() {
        assert_eq!(safe_subquery("example.com"), "example.com");
        assert_eq!(safe_subquery("http://a.example.com/x?y=1"), "http://a.example.com/x?y=1");
    }

    #[test]
    fn test_subquery_stops_at_regex() {
        assert_eq!(safe_subquery(r"example\.com(/x)?"), "example.com");
        assert_eq!(safe_subquery("example.com/[a-z]+"), "example.com/");
        assert_eq!(safe_subquery(r"example.com/\d+"), "example.com/");
        assert_eq!(safe_subquery("(www|m).example.com"), "");
    }

    #[test]
    fn test_only_first_escaped_question_mark_is_unescaped() {
        assert_eq!(unescape_literals(r"a\?b\?c"), r"a?b\?c");
        assert_eq!(safe_subquery(r"a.com/p\?x=1\?y"), "a.com/p?x=1");
    }

    #[test]
    fn test_parse_limit_fallbacks() {
        assert_eq!(parse_limit(None, 10), 10);
        assert_eq!(parse_limit(Some(""), 10), 10);
        assert_eq!(parse_limit(Some("abc"), 10), 10);
        assert_eq!(parse_limit(Some("-3"), 10), 10);
        assert_eq!(parse_limit(Some("0"), 10), 0);
        assert_eq!(parse_limit(Some("25"), 10), 25);
    }
}
