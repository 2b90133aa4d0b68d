//! Conversion from host documents into indexable records.

use serde_yaml::Value;

use super::types::DocumentRecord;
use crate::frontmatter::Frontmatter;
use crate::vault::{DocumentHandle, DocumentMetadata};

/// Build the canonical record for a document.
///
/// Pure: the same handle, metadata and content always yield the same record,
/// which the remove-then-add update path relies on.
pub fn normalize(
    handle: &DocumentHandle,
    metadata: &DocumentMetadata,
    content: String,
) -> DocumentRecord {
    let mut tags = frontmatter_tags(metadata.frontmatter.as_ref());
    tags.extend(metadata.tags.iter().filter_map(|t| normalize_tag(&t.tag)));

    let mut seen = std::collections::HashSet::new();
    tags.retain(|t| seen.insert(t.clone()));

    DocumentRecord {
        title: handle.basename.clone(),
        path: handle.path.clone(),
        content,
        created: handle.stat.ctime,
        modified: handle.stat.mtime,
        tags,
        frontmatter: metadata.frontmatter.clone(),
    }
}

/// Tags declared in frontmatter, as a comma-separated string or a list.
fn frontmatter_tags(fm: Option<&Frontmatter>) -> Vec<String> {
    let Some(value) = fm.and_then(|fm| fm.get("tags")) else {
        return Vec::new();
    };

    match value {
        Value::String(s) => s.split(',').filter_map(normalize_tag).collect(),
        Value::Sequence(items) => items
            .iter()
            .filter_map(scalar_string)
            .filter_map(|s| normalize_tag(&s))
            .collect(),
        other => scalar_string(other).and_then(|s| normalize_tag(&s)).into_iter().collect(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('#').trim();
    if trimmed.is_empty() { None } else { Some(format!("#{trimmed}")) }
}
