//! Note metadata extraction: frontmatter and inline tags.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::frontmatter::{self, Frontmatter};

/// Metadata extracted from a note file, in the shape a host hands to the
/// record normalizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    /// Parsed frontmatter (if present and valid).
    pub frontmatter: Option<Frontmatter>,
    /// Inline `#tags` found in the body, in document order.
    pub tags: Vec<TagRef>,
}

/// An inline tag occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    /// The tag including its leading `#`.
    pub tag: String,
    /// Line number within the body (1-based).
    pub line: u32,
}

// Matches #tag preceded by start of line or whitespace.
static INLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/\-]+)").expect("inline tag pattern is valid")
});

/// Extract metadata from file content.
///
/// Invalid frontmatter is logged and treated as absent so that a single
/// malformed note never blocks indexing.
pub fn extract_metadata(content: &str, file_path: &Path) -> DocumentMetadata {
    let parsed = frontmatter::parse(content).unwrap_or_else(|e| {
        tracing::warn!("Ignoring frontmatter in {}: {}", file_path.display(), e);
        frontmatter::ParsedDocument { frontmatter: None, body: content.to_string() }
    });

    DocumentMetadata { frontmatter: parsed.frontmatter, tags: extract_inline_tags(&parsed.body) }
}

/// Find inline tags in a markdown body, skipping fenced code blocks.
pub fn extract_inline_tags(body: &str) -> Vec<TagRef> {
    let mut tags = Vec::new();
    let mut in_fence = false;

    for (line_num, line) in body.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        for cap in INLINE_TAG_RE.captures_iter(line) {
            let name = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            // Purely numeric tokens (issue numbers, "#1") are not tags
            if name.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            tags.push(TagRef { tag: format!("#{name}"), line: (line_num + 1) as u32 });
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_names(tags: &[TagRef]) -> Vec<&str> {
        tags.iter().map(|t| t.tag.as_str()).collect()
    }

    #[test]
    fn test_extract_inline_tags() {
        let body = "#inbox first line\nSome text with #project/alpha and #to-do.\n";
        let tags = extract_inline_tags(body);

        assert_eq!(tag_names(&tags), vec!["#inbox", "#project/alpha", "#to-do"]);
        assert_eq!(tags[0].line, 1);
        assert_eq!(tags[1].line, 2);
    }

    #[test]
    fn test_headings_and_numbers_are_not_tags() {
        let body = "# Heading\n## Sub heading\nFixes #123 and mentions #v2\n";
        let tags = extract_inline_tags(body);

        assert_eq!(tag_names(&tags), vec!["#v2"]);
    }

    #[test]
    fn test_tags_inside_words_are_ignored() {
        let tags = extract_inline_tags("email me at foo#bar or visit page#anchor");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_fenced_code_is_skipped() {
        let body = "#real\n```bash\n# comment\necho #notatag\n```\n#after\n";
        let tags = extract_inline_tags(body);

        assert_eq!(tag_names(&tags), vec!["#real", "#after"]);
    }

    #[test]
    fn test_extract_metadata_with_frontmatter() {
        let content = "---\ntags: [work]\n---\nBody with #inline\n";
        let meta = extract_metadata(content, Path::new("note.md"));

        assert!(meta.frontmatter.is_some());
        assert_eq!(tag_names(&meta.tags), vec!["#inline"]);
        assert_eq!(meta.tags[0].line, 1);
    }

    #[test]
    fn test_invalid_frontmatter_is_dropped() {
        let content = "---\ntags: [unclosed\n---\n#still-found\n";
        let meta = extract_metadata(content, Path::new("broken.md"));

        assert!(meta.frontmatter.is_none());
        // The whole document is treated as body, so the tag is still seen
        assert_eq!(tag_names(&meta.tags), vec!["#still-found"]);
    }
}
