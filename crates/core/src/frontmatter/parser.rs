//! Frontmatter parsing from markdown documents.

use super::types::{Frontmatter, ParsedDocument};
use thiserror::Error;

/// Errors that can occur during frontmatter parsing.
#[derive(Debug, Error)]
pub enum FrontmatterParseError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("frontmatter must be a mapping of keys to values")]
    NotAMapping,
}

/// Parse frontmatter from markdown content.
///
/// Frontmatter is delimited by `---` at the start of the document:
/// ```markdown
/// ---
/// key: value
/// ---
/// # Document content
/// ```
pub fn parse(content: &str) -> Result<ParsedDocument, FrontmatterParseError> {
    let Some((yaml_content, body)) = split(content) else {
        return Ok(ParsedDocument { frontmatter: None, body: content.to_string() });
    };

    let frontmatter = if yaml_content.trim().is_empty() {
        Frontmatter::default()
    } else {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml_content.trim())?;
        if !value.is_mapping() {
            return Err(FrontmatterParseError::NotAMapping);
        }
        serde_yaml::from_value(value)?
    };

    Ok(ParsedDocument { frontmatter: Some(frontmatter), body: body.to_string() })
}

/// Split a document into its raw frontmatter text and body.
///
/// Returns `None` when the document has no opening delimiter or the block is
/// never closed.
fn split(content: &str) -> Option<(&str, &str)> {
    let trimmed = content.trim_start();
    let after_first = trimmed.strip_prefix("---")?;

    // Skip the newline after opening ---
    let after_newline = after_first
        .strip_prefix('\n')
        .or_else(|| after_first.strip_prefix("\r\n"))?;

    // Look for --- at the start of a line
    let mut offset = 0;
    for line in after_newline.split_inclusive('\n') {
        if line.trim() == "---" {
            let yaml = &after_newline[..offset];
            let body = &after_newline[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}
