//! Markdown stripping for template descriptions.
//!
//! Descriptions are rendered as plain text by dashboards, so markup is
//! removed with a fixed sequence of substitutions. Each pass sees the output
//! of the previous one; the order below is part of the output contract
//! (fenced blocks go before inline code so their backticks are not eaten,
//! images before links so the `!` does not survive).
//!
//! Nested constructs can interact across passes, so applying the sanitizer
//! twice is only guaranteed to be stable for flat markup.

use regex::Regex;
use std::sync::LazyLock;

struct Pass {
    pattern: Regex,
    replacement: &'static str,
}

impl Pass {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("markdown pattern compiles"),
            replacement,
        }
    }
}

static PASSES: LazyLock<Vec<Pass>> = LazyLock::new(|| {
    vec![
        // fenced code blocks
        Pass::new(r"(?s)```.*?```", ""),
        // images
        Pass::new(r"!\[([^\]]*)\]\([^)]*\)", "${1}"),
        // links
        Pass::new(r"\[([^\]]*)\]\([^)]*\)", "${1}"),
        // headers
        Pass::new(r"(?m)^[ \t]*#+[ \t]*", ""),
        // bold
        Pass::new(r"\*\*(.+?)\*\*", "${1}"),
        Pass::new(r"__(.+?)__", "${1}"),
        // italic
        Pass::new(r"\*(.+?)\*", "${1}"),
        Pass::new(r"_(.+?)_", "${1}"),
        // inline code
        Pass::new(r"`([^`]*)`", "${1}"),
        // blockquotes
        Pass::new(r"(?m)^[ \t]*>[ \t]?", ""),
        // horizontal rules
        Pass::new(r"(?m)^[ \t]*-{3,}[ \t]*$", ""),
    ]
});

/// Remove markdown syntax from `text`, returning trimmed plain text.
pub fn strip_markdown(text: &str) -> String {
    let mut current = text.to_string();
    for pass in PASSES.iter() {
        current = pass
            .pattern
            .replace_all(&current, pass.replacement)
            .into_owned();
    }
    current.trim().to_string()
}

/// Leading sentence of `text`: everything up to and including the first `.`,
/// `!` or `?`, trimmed. Text without a terminator is returned whole.
pub fn first_sentence(text: &str) -> &str {
    let end = text
        .find(['.', '!', '?'])
        .map(|idx| idx + 1)
        .unwrap_or(text.len());
    text[..end].trim()
}
