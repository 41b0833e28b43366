//! Text normalization applied before parsing: wrapping fences and math delimiters.
//!
//! Models often wrap a whole reply in a ```` ```markdown ```` fence, or emit
//! `\[ ... \]` / `\( ... \)` math that the parser only understands as `$$`.

mod delimiters;

pub use delimiters::{CANONICAL_DELIMITER, DELIMITER_RULES, DelimiterRule, normalize_delimiters};

/// Fence info strings that mark a whole-content wrapper (compared case-insensitively).
const WRAPPER_LANGS: &[&str] = &["", "markdown", "text"];

const FENCE: &str = "```";

/// Normalize optional content. `None` passes through unchanged.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_str)
}

/// Strip wrapping fences, then rewrite math delimiters. Total over all input.
pub fn normalize_str(raw: &str) -> String {
    normalize_delimiters(strip_fences(raw)).into_owned()
}

/// Peel whole-content fence wrappers until none is left.
///
/// Returns a subslice of `s`, so interior content is preserved byte-for-byte.
pub fn strip_fences(mut s: &str) -> &str {
    while let Some(inner) = strip_fence_once(s) {
        s = inner;
    }
    s
}

/// Remove one wrapper layer: an opener line (```` ``` ````, ```` ```markdown ````,
/// ```` ```text ````) as the first line and a bare ```` ``` ```` as the last line.
fn strip_fence_once(s: &str) -> Option<&str> {
    let (first, rest) = s.split_once('\n')?;
    if !is_wrapper_opener(first) {
        return None;
    }
    // Tolerate one line terminator after the closer.
    let body = rest.strip_suffix('\n').unwrap_or(rest);
    let body = body.strip_suffix('\r').unwrap_or(body);
    let (interior, last) = match body.rfind('\n') {
        Some(i) => (&body[..i], &body[i + 1..]),
        None => ("", body),
    };
    if last.trim() != FENCE {
        return None;
    }
    Some(interior.strip_suffix('\r').unwrap_or(interior))
}

fn is_wrapper_opener(line: &str) -> bool {
    line.trim_end()
        .strip_prefix(FENCE)
        .map(str::trim)
        .is_some_and(|lang| {
            WRAPPER_LANGS
                .iter()
                .any(|wrapper| lang.eq_ignore_ascii_case(wrapper))
        })
}
