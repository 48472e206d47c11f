//! Content normalization for indexed documents.
//!
//! Source documents are markdown with embedded HTML. Normalization runs a
//! fixed pipeline where each step relies on the output of the previous one:
//!
//! 1. Strip the `---` front matter block
//! 2. Extract the title (markdown H1, then HTML `<h1>`)
//! 3. Collect keywords from hidden `display: none` blocks
//! 4. Remove the hidden blocks
//! 5. Rewrite the remaining markup ([`clean_markup`])
//!
//! Keywords must be collected before the hidden blocks are removed.

use std::sync::LazyLock;

use regex::Regex;

/// Hidden container holding search keywords, plus trailing whitespace.
static HIDDEN_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<div[^>]*display:\s*none[^>]*>(.*?)</div>\s*").unwrap());

/// Line-initial markdown level-1 heading.
static MARKDOWN_H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").unwrap());

/// HTML level-1 heading element.
static HTML_H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<h1[^>]*>(.*?)</h1>").unwrap());

/// Any HTML tag.
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// A single regex rewrite applied to the document body.
struct RewriteStage {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl RewriteStage {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            replacement,
        }
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

/// Markup rewrites, in application order.
static MARKUP_STAGES: LazyLock<Vec<RewriteStage>> = LazyLock::new(|| {
    vec![
        RewriteStage::new("h1", r"<h1[^>]*>(.*?)</h1>", "# $1"),
        RewriteStage::new("h2", r"<h2[^>]*>(.*?)</h2>", "## $1"),
        RewriteStage::new("h3", r"<h3[^>]*>(.*?)</h3>", "### $1"),
        RewriteStage::new("span", r"</?span[^>]*>", ""),
        RewriteStage::new("br", r"<br\s*/?>", "\n"),
        RewriteStage::new("kbd", r"<kbd>(.*?)</kbd>", "`$1`"),
        RewriteStage::new("sup", r"<sup>(.*?)</sup>", "$1"),
        RewriteStage::new("strong", r"<strong>(.*?)</strong>", "**$1**"),
        RewriteStage::new("div", r"</?div[^>]*>", ""),
    ]
});

/// Title, keywords and cleaned body of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDocument {
    /// First level-1 heading, empty if the document has none.
    pub title: String,
    /// Space-joined text of hidden keyword blocks.
    pub keywords: String,
    /// Body with front matter, hidden blocks and container markup removed.
    pub content: String,
}

/// Normalize raw document text.
#[must_use]
pub fn normalize_document(raw: &str) -> NormalizedDocument {
    let text = strip_front_matter(raw);
    let title = extract_title(text);
    let keywords = extract_keywords(text);
    let without_hidden = HIDDEN_BLOCK.replace_all(text, "");
    let content = clean_markup(&without_hidden);

    NormalizedDocument {
        title,
        keywords,
        content,
    }
}

/// Remove a leading `---` delimited metadata block and the blank lines after it.
///
/// Text without a complete block is returned unchanged.
#[must_use]
pub fn strip_front_matter(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("---") else {
        return text;
    };
    if !(rest.starts_with('\n') || rest.starts_with("\r\n")) {
        return text;
    }
    match rest.find("\n---") {
        Some(end) => rest[end + 4..].trim_start_matches(['\r', '\n']),
        None => text,
    }
}

/// Extract the document title.
///
/// Prefers the first markdown `# Heading`; falls back to the first HTML
/// `<h1>` with nested tags stripped. Returns an empty string if neither exists.
#[must_use]
pub fn extract_title(text: &str) -> String {
    if let Some(caps) = MARKDOWN_H1.captures(text) {
        return caps[1].trim().to_owned();
    }
    if let Some(caps) = HTML_H1.captures(text) {
        return HTML_TAG.replace_all(&caps[1], "").trim().to_owned();
    }
    String::new()
}

/// Collect the trimmed text of every hidden block, joined by single spaces.
#[must_use]
pub fn extract_keywords(text: &str) -> String {
    HIDDEN_BLOCK
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_owned())
        .filter(|keyword| !keyword.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rewrite HTML markup into markdown-compatible text.
///
/// Converts `<h1>`-`<h3>` to markdown headings, unwraps `<span>` and `<sup>`,
/// turns `<br>` into newlines, `<kbd>` into code spans, `<strong>` into bold,
/// and drops any remaining `<div>` tags. Running it on its own output is a no-op.
#[must_use]
pub fn clean_markup(text: &str) -> String {
    let mut out = text.to_owned();
    for stage in MARKUP_STAGES.iter() {
        let rewritten = stage.apply(&out);
        if rewritten != out {
            tracing::trace!(stage = stage.name, "Rewrote markup");
        }
        out = rewritten;
    }
    out
}
