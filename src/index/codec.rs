//! Reverse-key codec.
//!
//! # Responsibilities
//! - Rewrite a URL so its hostname labels run root-to-leaf
//!   (`http://www.example.com/a` → `http://com.example.www/a`)
//! - Restore the original URL from such a key
//! - Turn a literal search fragment into the trie prefixes it scopes
//!
//! # Design Decisions
//! - Only the host bytes move; scheme, userinfo, port, path, query and
//!   fragment are copied verbatim, so `decode(encode(u)) == u`
//! - Fails open: input is passed through unchanged unless both it and its
//!   reversal parse as URLs whose host is exactly the span being moved
//! - Encode and decode are the same involution, so no two inputs share a key

use std::ops::Range;

use url::Url;

/// Encode a raw URL into its reversed-domain key.
///
/// Returns `raw` unchanged when it has no reversible hostname.
pub fn encode(raw: &str) -> String {
    swap_host(raw)
}

/// Decode a reversed-domain key back into the URL it was built from.
pub fn decode(key: &str) -> String {
    swap_host(key)
}

/// Expand the literal part of a search query into trie prefixes.
///
/// A fragment carrying its own `scheme://` is encoded like a URL and yields
/// a single prefix. A bare host fragment (`example.com/x`) is reversed
/// (`com.example/x`) and placed under every scheme in `schemes`, alongside
/// the fragment itself for keys stored verbatim. A fragment that is still a
/// prefix of some `scheme://` is returned as is. The prefixes never overlap.
pub fn encode_query_prefix(fragment: &str, schemes: &[String]) -> Vec<String> {
    if fragment.is_empty() {
        return vec![String::new()];
    }

    if let Some(sep) = fragment.find("://") {
        if is_scheme(&fragment[..sep]) {
            return vec![encode(fragment)];
        }
    }

    let partial_scheme = schemes
        .iter()
        .any(|s| format!("{s}://").starts_with(fragment));
    if partial_scheme {
        return vec![fragment.to_string()];
    }

    let host_len = fragment
        .find(['/', '?', '#', ':'])
        .unwrap_or(fragment.len());
    let (host, rest) = fragment.split_at(host_len);
    let reversed = reverse_labels(host);

    // Input without a hostname is stored verbatim, so the fragment itself
    // is a prefix too.
    std::iter::once(fragment.to_string())
        .chain(
            schemes
                .iter()
                .map(|scheme| format!("{scheme}://{reversed}{rest}")),
        )
        .collect()
}

/// Reverse the host labels of `input` when both sides of the swap agree
/// with the URL parser, else return `input` as is.
///
/// The swap keeps the host span in place, so checking `input` and its
/// reversal with the same predicate makes the result an involution.
fn swap_host(input: &str) -> String {
    let Some(span) = host_span(input) else {
        return input.to_string();
    };

    let mut swapped = String::with_capacity(input.len());
    swapped.push_str(&input[..span.start]);
    swapped.push_str(&reverse_labels(&input[span.clone()]));
    swapped.push_str(&input[span.end..]);

    if parsed_host_matches(input, &span) && parsed_host_matches(&swapped, &span) {
        swapped
    } else {
        input.to_string()
    }
}

/// Whether `input` parses and its parsed host is the text at `span`.
///
/// Rejects hosts the parser reads differently from the raw text: other
/// delimiters (`\` in special schemes), IPv4 shorthand, IDNA and
/// percent-encoded labels.
fn parsed_host_matches(input: &str, span: &Range<usize>) -> bool {
    let Ok(url) = Url::parse(input) else {
        return false;
    };
    url.host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(&input[span.clone()]))
}

fn reverse_labels(host: &str) -> String {
    host.split('.').rev().collect::<Vec<_>>().join(".")
}

/// Byte range of the hostname inside `input`, if it has one.
fn host_span(input: &str) -> Option<Range<usize>> {
    let sep = input.find("://")?;
    if !is_scheme(&input[..sep]) {
        return None;
    }

    let start = sep + 3;
    let rest = &input[start..];
    let authority = &rest[..rest.find(['/', '?', '#']).unwrap_or(rest.len())];
    let host_start = authority.rfind('@').map_or(0, |i| i + 1);
    let host = &authority[host_start..];

    // IPv6 literals have no dotted labels to reorder.
    if host.contains(['[', ']']) {
        return None;
    }

    let host_len = host.find(':').unwrap_or(host.len());
    if host_len == 0 {
        return None;
    }

    let begin = start + host_start;
    Some(begin..begin + host_len)
}

/// Whether `s` is a syntactically valid URL scheme.
pub(crate) fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
