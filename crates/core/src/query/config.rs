//! Parsing and validation of query block configuration.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

use crate::index::{QueryParseError, SearchQuery, TimestampField};

#[derive(Debug, Error, PartialEq)]
pub enum QueryConfigError {
    #[error("Malformed OQL block: {0}")]
    Malformed(String),

    #[error("The OQL block is empty")]
    Empty,

    #[error("No query defined in the OQL block")]
    MissingQuery,

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryParseError),

    #[error("No template defined in the OQL block")]
    MissingTemplate,

    #[error("Unknown template '{0}' (expected list, table or string)")]
    UnknownTemplate(String),

    #[error("No 'format' key specified in OQL.")]
    MissingFormat,

    #[error("Invalid sort '{0}'")]
    InvalidSort(String),

    #[error("Invalid wrapper element '{0}'")]
    InvalidWrapper(String),
}

/// How a result set is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    List,
    Table,
    /// A single formatted string with `{name}` and `{count}` substituted.
    Inline,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Table => "table",
            Self::Inline => "string",
        }
    }
}

/// What a configured field renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    Tags,
    Timestamp(TimestampField),
    Format,
    Index,
    /// Any other record field or frontmatter key.
    Raw(String),
}

/// A field as written in the block, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: &str) -> Self {
        let kind = match name {
            "title" => FieldKind::Title,
            "tags" => FieldKind::Tags,
            "created" => FieldKind::Timestamp(TimestampField::Created),
            "modified" => FieldKind::Timestamp(TimestampField::Modified),
            "format" => FieldKind::Format,
            "index" => FieldKind::Index,
            other => FieldKind::Raw(other.to_string()),
        };
        Self { name: name.to_string(), kind }
    }

    /// Header text: the name with its first letter upper-cased.
    pub fn header(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortSpec {
    Random,
    Ascending(String),
    Descending(String),
}

impl SortSpec {
    /// `random`, `-field` (ascending) or `field` (descending).
    pub fn parse(text: &str) -> Result<Self, QueryConfigError> {
        let trimmed = text.trim();
        let invalid = || QueryConfigError::InvalidSort(text.to_string());
        if trimmed == "random" {
            return Ok(Self::Random);
        }
        match trimmed.strip_prefix('-') {
            Some(field) if !field.trim().is_empty() => Ok(Self::Ascending(field.trim().to_string())),
            Some(_) => Err(invalid()),
            None if trimmed.is_empty() => Err(invalid()),
            None => Ok(Self::Descending(trimmed.to_string())),
        }
    }
}

/// A validated query block.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub query: SearchQuery,
    /// The query exactly as written, for debug output.
    pub raw_query: Value,
    pub template: TemplateKind,
    pub fields: Vec<FieldSpec>,
    pub format: Option<String>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
    pub wrapper: String,
    pub badge: bool,
    pub debug: bool,
    pub include_current_note: bool,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQueryConfig {
    query: Option<Value>,
    template: Option<String>,
    fields: Option<RawFields>,
    format: Option<String>,
    sort: Option<String>,
    limit: Option<i64>,
    wrapper: Option<String>,
    #[serde(default = "default_true")]
    badge: bool,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    include_current_note: bool,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFields {
    List(Vec<String>),
    Csv(String),
}

fn default_true() -> bool {
    true
}

static WRAPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("wrapper pattern is valid"));

impl QueryConfig {
    /// Parse the text of a query block.
    pub fn parse(text: &str) -> Result<Self, QueryConfigError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| QueryConfigError::Malformed(e.to_string()))?;
        match &value {
            Value::Null => return Err(QueryConfigError::Empty),
            Value::Mapping(map) if map.is_empty() => return Err(QueryConfigError::Empty),
            Value::Mapping(_) => {}
            _ => {
                return Err(QueryConfigError::Malformed(
                    "expected a mapping of keys to values".to_string(),
                ));
            }
        }

        let raw: RawQueryConfig = serde_yaml::from_value(value)
            .map_err(|e| QueryConfigError::Malformed(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawQueryConfig) -> Result<Self, QueryConfigError> {
        let raw_query = match raw.query {
            None | Some(Value::Null) => return Err(QueryConfigError::MissingQuery),
            Some(q) => q,
        };
        let query = SearchQuery::from_yaml(&raw_query)?;

        let template_name = raw.template.ok_or(QueryConfigError::MissingTemplate)?;
        let mut format = raw.format;
        let template = match template_name.trim() {
            "list" => TemplateKind::List,
            "table" => TemplateKind::Table,
            "string" => TemplateKind::Inline,
            "" => return Err(QueryConfigError::MissingTemplate),
            legacy if legacy.contains('{') => {
                if format.is_none() {
                    format = Some(template_name.clone());
                }
                TemplateKind::Inline
            }
            other => return Err(QueryConfigError::UnknownTemplate(other.to_string())),
        };

        let names: Vec<String> = match raw.fields {
            Some(RawFields::List(names)) => names,
            Some(RawFields::Csv(text)) => text.split(',').map(|s| s.trim().to_string()).collect(),
            None => match template {
                TemplateKind::List => vec!["title".to_string()],
                TemplateKind::Table => vec!["title".to_string(), "created".to_string()],
                TemplateKind::Inline => Vec::new(),
            },
        };
        let fields: Vec<FieldSpec> =
            names.iter().filter(|n| !n.is_empty()).map(|n| FieldSpec::new(n)).collect();

        let needs_format = template == TemplateKind::Inline
            || fields.iter().any(|f| f.kind == FieldKind::Format);
        if needs_format && format.is_none() {
            return Err(QueryConfigError::MissingFormat);
        }

        let sort = raw.sort.as_deref().map(SortSpec::parse).transpose()?;

        let wrapper = raw.wrapper.unwrap_or_else(|| "span".to_string());
        if !WRAPPER_RE.is_match(&wrapper) {
            return Err(QueryConfigError::InvalidWrapper(wrapper));
        }

        let config = Self {
            query,
            raw_query,
            template,
            fields,
            format,
            sort,
            limit: raw.limit.filter(|n| *n > 0).map(|n| n as usize),
            wrapper,
            badge: raw.badge,
            debug: raw.debug,
            include_current_note: raw.include_current_note,
            name: raw.name,
        };
        tracing::debug!(
            "Parsed OQL block: template={}, fields={}",
            config.template.as_str(),
            config.fields.len()
        );
        Ok(config)
    }
}
