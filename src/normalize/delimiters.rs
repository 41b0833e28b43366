//! LaTeX delimiter rules: every bracket/parenthesis math delimiter becomes `$$`.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Canonical block-math delimiter.
pub const CANONICAL_DELIMITER: &str = "$$";

/// One logical delimiter pair rewritten to [`CANONICAL_DELIMITER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterRule {
    pub name: &'static str,
    pub open: &'static str,
    pub close: &'static str,
}

impl DelimiterRule {
    /// Apply this rule alone. Used to check each rule in isolation; the
    /// pipeline goes through [`normalize_delimiters`].
    #[cfg(test)]
    fn apply(&self, s: &str) -> String {
        s.replace(self.open, CANONICAL_DELIMITER)
            .replace(self.close, CANONICAL_DELIMITER)
    }
}

/// Delimiter rules, most specific first. The escaped markers contain the bare
/// ones as substrings, so they must win at any position where both match.
pub const DELIMITER_RULES: [DelimiterRule; 4] = [
    DelimiterRule {
        name: "escaped-bracket",
        open: r"\\[",
        close: r"\\]",
    },
    DelimiterRule {
        name: "escaped-paren",
        open: r"\\(",
        close: r"\\)",
    },
    DelimiterRule {
        name: "bare-bracket",
        open: r"\[",
        close: r"\]",
    },
    DelimiterRule {
        name: "bare-paren",
        open: r"\(",
        close: r"\)",
    },
];

static DELIMITERS: OnceLock<Regex> = OnceLock::new();

/// All rule markers as one leftmost-first alternation, in rule order.
fn delimiter_pattern() -> &'static Regex {
    DELIMITERS.get_or_init(|| {
        let alternation = DELIMITER_RULES
            .iter()
            .flat_map(|rule| [rule.open, rule.close])
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&alternation).expect("delimiter alternation is a valid regex")
    })
}

/// Rewrite every recognized math delimiter to `$$` in a single pass.
/// Unmatched or partial delimiters are rewritten individually; nothing fails.
pub fn normalize_delimiters(s: &str) -> Cow<'_, str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }
    delimiter_pattern().replace_all(s, regex::NoExpand(CANONICAL_DELIMITER))
}
