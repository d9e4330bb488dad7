use std::sync::LazyLock;

use regex::Regex;

/// `#` followed by one or more ASCII word characters
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_]+)").expect("tag pattern is valid"));

/// Result of splitting raw input into display text and tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTask {
    /// Input with every tag token removed, trimmed
    pub text: String,
    /// Tags in order of appearance, without `#`, duplicates kept
    pub tags: Vec<String>,
}

impl ParsedTask {
    /// Distinct tags in first-occurrence order. A task gets one copy per
    /// entry of this list.
    pub fn projects(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            if !seen.contains(&tag.as_str()) {
                seen.push(tag);
            }
        }
        seen
    }
}

/// Split raw task input into display text and `#tags`.
///
/// Tokens are removed in place; whitespace around a removed token is left
/// alone except at the ends of the string. Never fails.
pub fn parse_task(raw: &str) -> ParsedTask {
    let tags = TAG_RE
        .captures_iter(raw)
        .map(|caps| caps[1].to_string())
        .collect();
    let text = TAG_RE.replace_all(raw, "").trim().to_string();
    ParsedTask { text, tags }
}
