//! Rendering of individual record fields.

use serde_yaml::Value;
use thiserror::Error;

use super::fragment::{Element, Node};
use crate::index::{DocumentRecord, TimestampField};
use crate::query::{FieldKind, FieldSpec, QueryConfig};

#[derive(Debug, Error, PartialEq)]
pub enum RenderFieldError {
    #[error("field '{field}' is not present on {path}")]
    MissingField { field: String, path: String },

    #[error("field '{field}' on {path} is not a scalar or list of scalars")]
    NotScalar { field: String, path: String },

    #[error("timestamp {value} in '{field}' is out of range")]
    InvalidTimestamp { field: &'static str, value: i64 },

    #[error("No 'format' key specified in OQL.")]
    MissingFormat,
}

/// Nodes for one field of one record. `position` is zero-based.
pub fn render_field(
    record: &DocumentRecord,
    field: &FieldSpec,
    position: usize,
    config: &QueryConfig,
) -> Result<Vec<Node>, RenderFieldError> {
    let nodes = match &field.kind {
        FieldKind::Title => vec![link(record).into()],
        FieldKind::Tags => {
            let mut nodes = Vec::with_capacity(record.tags.len() * 2);
            for (i, t) in record.tags.iter().enumerate() {
                if i > 0 {
                    nodes.push(Node::Text(" ".to_string()));
                }
                nodes.push(tag(t).into());
            }
            nodes
        }
        FieldKind::Timestamp(which) => vec![Node::Text(timestamp(record, *which)?)],
        FieldKind::Format => {
            let format = config.format.as_deref().ok_or(RenderFieldError::MissingFormat)?;
            vec![Node::Text(format_record(format, record, position)?)]
        }
        FieldKind::Index => vec![Node::Text((position + 1).to_string())],
        FieldKind::Raw(name) => vec![Node::Text(raw_value(record, name)?)],
    };
    Ok(nodes)
}

/// Like [`render_field`], but a failing field is logged and left empty.
pub fn field_or_empty(
    record: &DocumentRecord,
    field: &FieldSpec,
    position: usize,
    config: &QueryConfig,
) -> Vec<Node> {
    render_field(record, field, position, config).unwrap_or_else(|e| {
        tracing::warn!("Skipping field '{}' of {}: {}", field.name, record.path, e);
        Vec::new()
    })
}

/// Internal link to the record's note.
pub fn link(record: &DocumentRecord) -> Element {
    Element::new("a")
        .class("internal-link")
        .attr("data-href", record.title.as_str())
        .attr("href", record.title.as_str())
        .attr("target", "_blank")
        .attr("rel", "noopener")
        .text(record.title.as_str())
}

pub fn tag(tag: &str) -> Element {
    Element::new("a")
        .class("tag")
        .attr("href", tag)
        .attr("target", "_blank")
        .attr("rel", "noopener")
        .text(tag)
}

/// Substitute `{title}`, `{path}`, `{modified}`, `{created}` and `{index}`.
///
/// The format is scanned once, so substituted values are never expanded again.
/// Unknown `{...}` text is kept as written.
pub fn format_record(
    format: &str,
    record: &DocumentRecord,
    position: usize,
) -> Result<String, RenderFieldError> {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = match after.find('}') {
            Some(close) => match &after[..close] {
                "title" => Some((record.title.clone(), close)),
                "path" => Some((record.path.clone(), close)),
                "modified" => Some((timestamp(record, TimestampField::Modified)?, close)),
                "created" => Some((timestamp(record, TimestampField::Created)?, close)),
                "index" => Some(((position + 1).to_string(), close)),
                _ => None,
            },
            None => None,
        };
        match value {
            Some((value, close)) => {
                out.push_str(&value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn timestamp(record: &DocumentRecord, field: TimestampField) -> Result<String, RenderFieldError> {
    record.iso_timestamp(field).ok_or(RenderFieldError::InvalidTimestamp {
        field: field.as_str(),
        value: record.timestamp(field),
    })
}

fn raw_value(record: &DocumentRecord, name: &str) -> Result<String, RenderFieldError> {
    match name {
        "path" => return Ok(record.path.clone()),
        "content" => return Ok(record.content.clone()),
        _ => {}
    }

    let missing = || RenderFieldError::MissingField {
        field: name.to_string(),
        path: record.path.clone(),
    };
    let value = record.frontmatter.as_ref().and_then(|fm| fm.get(name)).ok_or_else(missing)?;

    let not_scalar = || RenderFieldError::NotScalar {
        field: name.to_string(),
        path: record.path.clone(),
    };
    match value {
        Value::Sequence(items) => items
            .iter()
            .map(|v| scalar(v).ok_or_else(not_scalar))
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| parts.join(", ")),
        other => scalar(other).ok_or_else(not_scalar),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::Frontmatter;
    use std::collections::HashMap;

    fn record() -> DocumentRecord {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), Value::String("active".into()));
        fields.insert(
            "owners".to_string(),
            Value::Sequence(vec![Value::String("ana".into()), Value::String("bo".into())]),
        );
        fields.insert("meta".to_string(), Value::Mapping(Default::default()));
        DocumentRecord {
            title: "Plan".to_string(),
            path: "work/Plan.md".to_string(),
            content: "body".to_string(),
            created: 0,
            modified: 1_700_000_000_000,
            tags: vec!["#work".to_string(), "#q3".to_string()],
            frontmatter: Some(Frontmatter { fields }),
        }
    }

    fn config(format: Option<&str>) -> QueryConfig {
        let mut text = "query: x\ntemplate: list\n".to_string();
        if let Some(f) = format {
            text.push_str(&format!("format: '{f}'\n"));
        }
        QueryConfig::parse(&text).unwrap()
    }

    fn html(nodes: Vec<Node>) -> String {
        nodes
            .into_iter()
            .map(|n| match n {
                Node::Element(e) => e.to_html(),
                Node::Text(t) | Node::Html(t) => t,
            })
            .collect()
    }

    fn render(name: &str, cfg: &QueryConfig) -> Result<String, RenderFieldError> {
        render_field(&record(), &FieldSpec::new(name), 2, cfg).map(html)
    }

    #[test]
    fn test_title_is_internal_link() {
        let out = render("title", &config(None)).unwrap();
        assert_eq!(
            out,
            r#"<a class="internal-link" data-href="Plan" href="Plan" target="_blank" rel="noopener">Plan</a>"#
        );
    }

    #[test]
    fn test_tags_separated_by_spaces() {
        let out = render("tags", &config(None)).unwrap();
        assert_eq!(
            out,
            concat!(
                r##"<a class="tag" href="#work" target="_blank" rel="noopener">#work</a>"##,
                " ",
                r##"<a class="tag" href="#q3" target="_blank" rel="noopener">#q3</a>"##
            )
        );
    }

    #[test]
    fn test_timestamps_and_index() {
        assert_eq!(render("created", &config(None)).unwrap(), "1970-01-01T00:00:00.000Z");
        assert_eq!(render("modified", &config(None)).unwrap(), "2023-11-14T22:13:20.000Z");
        assert_eq!(render("index", &config(None)).unwrap(), "3");
    }

    #[test]
    fn test_format_replaces_every_placeholder() {
        let cfg = config(Some("{index}. {title} ({path}) {title} {created}"));
        assert_eq!(
            render("format", &cfg).unwrap(),
            "3. Plan (work/Plan.md) Plan 1970-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_format_does_not_expand_substituted_values() {
        let mut rec = record();
        rec.title = "Meeting {path}".to_string();
        assert_eq!(format_record("{title}", &rec, 0).unwrap(), "Meeting {path}");
    }

    #[test]
    fn test_format_keeps_unknown_braces() {
        let out = format_record("{{title}} {status} {index", &record(), 0).unwrap();
        assert_eq!(out, "{Plan} {status} {index");
    }

    #[test]
    fn test_raw_values() {
        let cfg = config(None);
        assert_eq!(render("status", &cfg).unwrap(), "active");
        assert_eq!(render("owners", &cfg).unwrap(), "ana, bo");
        assert_eq!(render("path", &cfg).unwrap(), "work/Plan.md");
    }

    #[test]
    fn test_field_errors() {
        let cfg = config(None);
        assert!(matches!(render("missing", &cfg), Err(RenderFieldError::MissingField { .. })));
        assert!(matches!(render("meta", &cfg), Err(RenderFieldError::NotScalar { .. })));

        let mut rec = record();
        rec.modified = i64::MAX;
        let err = render_field(&rec, &FieldSpec::new("modified"), 0, &cfg).unwrap_err();
        assert!(matches!(err, RenderFieldError::InvalidTimestamp { field: "modified", .. }));
    }

    #[test]
    fn test_failed_field_renders_empty() {
        let nodes = field_or_empty(&record(), &FieldSpec::new("missing"), 0, &config(None));
        assert!(nodes.is_empty());
    }
}
