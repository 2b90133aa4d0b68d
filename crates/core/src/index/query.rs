//! Extended search queries and fuzzy matching.
//!
//! A query string is a set of OR groups separated by ` | `; each group is a
//! whitespace-separated list of terms that must all match. Terms carry an
//! optional operator:
//!
//! | Token     | Match                                  |
//! |-----------|----------------------------------------|
//! | `jscript` | fuzzy                                  |
//! | `=scheme` | field value equals `scheme`            |
//! | `'python` | field contains `python`                |
//! | `!ruby`   | no field contains `ruby`               |
//! | `^java`   | field starts with `java`               |
//! | `!^earth` | no field starts with `earth`           |
//! | `.js$`    | field ends with `.js`                  |
//! | `!.go$`   | no field ends with `.go`               |
//!
//! Structured queries (`$and`, `$or`, `{field: pattern}`) arrive as YAML
//! values from the query block and compose the same patterns.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;
use thiserror::Error;

use super::types::{DocumentRecord, iso8601};

#[derive(Debug, Error, PartialEq)]
pub enum QueryParseError {
    #[error("unknown search field '{0}' (expected title, path, content, tags, created or modified)")]
    UnknownField(String),

    #[error("'{0}' expects a non-empty list of queries")]
    EmptyLogical(String),

    #[error("unsupported query value: {0}")]
    Unsupported(String),
}

/// Fields a query can search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Title,
    Path,
    Content,
    Tags,
    Created,
    Modified,
}

impl SearchField {
    pub const ALL: [SearchField; 6] = [
        Self::Title,
        Self::Path,
        Self::Content,
        Self::Tags,
        Self::Created,
        Self::Modified,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "path" => Some(Self::Path),
            "content" => Some(Self::Content),
            "tags" => Some(Self::Tags),
            "created" => Some(Self::Created),
            "modified" => Some(Self::Modified),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Path => "path",
            Self::Content => "content",
            Self::Tags => "tags",
            Self::Created => "created",
            Self::Modified => "modified",
        }
    }

    /// Added to a term's score so that hits in short, descriptive fields
    /// outrank hits buried in the body.
    fn penalty(&self) -> f64 {
        match self {
            Self::Title | Self::Tags => 0.0,
            Self::Path => 0.02,
            Self::Content | Self::Created | Self::Modified => 0.05,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Title => 0,
            Self::Path => 1,
            Self::Content => 2,
            Self::Tags => 3,
            Self::Created => 4,
            Self::Modified => 5,
        }
    }
}

/// Score of a substring hit that does not start at a word boundary.
const MID_WORD_SCORE: f64 = 0.05;

/// Operator attached to a single query term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOp {
    Fuzzy,
    Exact,
    Include,
    Prefix,
    Suffix,
    NotInclude,
    NotPrefix,
    NotSuffix,
}

impl TermOp {
    fn is_negated(&self) -> bool {
        matches!(self, Self::NotInclude | Self::NotPrefix | Self::NotSuffix)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub op: TermOp,
    /// Lowercased needle.
    pub text: String,
}

impl Term {
    fn parse(token: &str) -> Option<Self> {
        let (op, text) = if let Some(rest) = token.strip_prefix("!^") {
            (TermOp::NotPrefix, rest)
        } else if let Some(rest) = token.strip_prefix('!') {
            match rest.strip_suffix('$') {
                Some(mid) => (TermOp::NotSuffix, mid),
                None => (TermOp::NotInclude, rest),
            }
        } else if let Some(rest) = token.strip_prefix('^') {
            (TermOp::Prefix, rest)
        } else if let Some(rest) = token.strip_prefix('=') {
            (TermOp::Exact, rest)
        } else if let Some(rest) = token.strip_prefix('\'') {
            (TermOp::Include, rest)
        } else if let Some(rest) = token.strip_suffix('$') {
            (TermOp::Suffix, rest)
        } else {
            (TermOp::Fuzzy, token)
        };

        if text.is_empty() {
            return None;
        }
        Some(Self { op, text: text.to_lowercase() })
    }

    /// Distance of the best hit in one field, `None` if the field misses.
    fn score_field(&self, field: &FieldText, threshold: f64) -> Option<f64> {
        let needle = self.text.as_str();
        let hit = |ok: bool| ok.then_some(0.0);
        match self.op {
            TermOp::Exact => hit(field.values.iter().any(|v| v == needle)),
            TermOp::Include | TermOp::NotInclude => {
                hit(field.values.iter().any(|v| v.contains(needle)))
            }
            TermOp::Prefix | TermOp::NotPrefix => {
                hit(field.values.iter().any(|v| v.starts_with(needle)))
            }
            TermOp::Suffix | TermOp::NotSuffix => {
                hit(field.values.iter().any(|v| v.ends_with(needle)))
            }
            TermOp::Fuzzy => fuzzy_score(field, needle, threshold),
        }
    }

    fn score(&self, doc: &SearchableDocument, fields: &[SearchField], threshold: f64) -> Option<f64> {
        if self.op.is_negated() {
            let violated = fields
                .iter()
                .any(|f| self.score_field(doc.field(*f), threshold).is_some());
            return (!violated).then_some(0.0);
        }

        fields
            .iter()
            .filter_map(|f| {
                self.score_field(doc.field(*f), threshold).map(|s| (s + f.penalty()).min(1.0))
            })
            .min_by(f64::total_cmp)
    }
}

fn fuzzy_score(field: &FieldText, needle: &str, threshold: f64) -> Option<f64> {
    let substring = field
        .values
        .iter()
        .filter_map(|v| {
            v.find(needle).map(|pos| {
                let at_word_start =
                    v[..pos].chars().next_back().is_none_or(|c| !c.is_alphanumeric());
                if at_word_start { 0.0 } else { MID_WORD_SCORE }
            })
        })
        .min_by(f64::total_cmp);
    if substring.is_some() {
        return substring;
    }

    // A term with spaces can only match as a phrase
    if needle.contains(char::is_whitespace) {
        return None;
    }

    field
        .words
        .iter()
        .map(|w| 1.0 - strsim::normalized_levenshtein(w, needle))
        .filter(|score| *score <= threshold)
        .min_by(f64::total_cmp)
}

/// One pattern: OR groups of AND terms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pattern {
    pub groups: Vec<Vec<Term>>,
}

static OR_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\|\s+").expect("OR separator pattern is valid"));

impl Pattern {
    pub fn parse(text: &str) -> Self {
        let groups = OR_SEPARATOR_RE
            .split(text.trim())
            .map(|group| tokenize(group).iter().filter_map(|t| Term::parse(t)).collect::<Vec<_>>())
            .filter(|terms| !terms.is_empty())
            .collect();
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn score(&self, doc: &SearchableDocument, fields: &[SearchField], threshold: f64) -> Option<f64> {
        if self.groups.is_empty() {
            return Some(0.0);
        }

        self.groups
            .iter()
            .filter_map(|terms| {
                let mut total = 0.0;
                for term in terms {
                    total += term.score(doc, fields, threshold)?;
                }
                Some(total / terms.len() as f64)
            })
            .min_by(f64::total_cmp)
    }
}

/// Split on whitespace; double quotes group words and are dropped.
fn tokenize(group: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in group.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// A parsed search query.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    /// A pattern over one field, or over every field when `field` is `None`.
    Pattern { field: Option<SearchField>, pattern: Pattern },
    And(Vec<SearchQuery>),
    Or(Vec<SearchQuery>),
}

impl SearchQuery {
    /// Parse an extended search string matched against every field.
    pub fn parse(text: &str) -> Self {
        Self::Pattern { field: None, pattern: Pattern::parse(text) }
    }

    /// Build a query from the `query` value of a block.
    pub fn from_yaml(value: &Value) -> Result<Self, QueryParseError> {
        match value {
            Value::String(s) => Ok(Self::parse(s)),
            Value::Number(n) => Ok(Self::parse(&n.to_string())),
            Value::Bool(b) => Ok(Self::parse(&b.to_string())),
            Value::Mapping(map) => {
                let mut parts = Vec::with_capacity(map.len());
                for (key, val) in map {
                    let key = key.as_str().ok_or_else(|| {
                        QueryParseError::Unsupported(format!("non-string key {key:?}"))
                    })?;
                    parts.push(Self::from_entry(key, val)?);
                }
                match parts.len() {
                    0 => Err(QueryParseError::Unsupported("empty mapping".to_string())),
                    1 => Ok(parts.remove(0)),
                    _ => Ok(Self::And(parts)),
                }
            }
            Value::Null => Err(QueryParseError::Unsupported("null".to_string())),
            Value::Sequence(_) => Err(QueryParseError::Unsupported(
                "a bare list (wrap it in $and or $or)".to_string(),
            )),
            Value::Tagged(tagged) => {
                Err(QueryParseError::Unsupported(format!("tagged value {}", tagged.tag)))
            }
        }
    }

    fn from_entry(key: &str, value: &Value) -> Result<Self, QueryParseError> {
        match key {
            "$and" | "$or" => {
                let items = value
                    .as_sequence()
                    .filter(|items| !items.is_empty())
                    .ok_or_else(|| QueryParseError::EmptyLogical(key.to_string()))?;
                let children =
                    items.iter().map(Self::from_yaml).collect::<Result<Vec<_>, _>>()?;
                Ok(if key == "$and" { Self::And(children) } else { Self::Or(children) })
            }
            _ => {
                let field = SearchField::from_name(key)
                    .ok_or_else(|| QueryParseError::UnknownField(key.to_string()))?;
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(QueryParseError::Unsupported(format!(
                            "pattern for '{key}' must be a string, got {other:?}"
                        )));
                    }
                };
                Ok(Self::Pattern { field: Some(field), pattern: Pattern::parse(&text) })
            }
        }
    }

    /// Distance score for a document, `None` when it does not match.
    pub fn score(&self, doc: &SearchableDocument, threshold: f64) -> Option<f64> {
        match self {
            Self::Pattern { field: Some(field), pattern } => {
                pattern.score(doc, std::slice::from_ref(field), threshold)
            }
            Self::Pattern { field: None, pattern } => {
                pattern.score(doc, &SearchField::ALL, threshold)
            }
            Self::And(children) => {
                let mut total = 0.0;
                for child in children {
                    total += child.score(doc, threshold)?;
                }
                Some(total / children.len().max(1) as f64)
            }
            Self::Or(children) => {
                children.iter().filter_map(|c| c.score(doc, threshold)).min_by(f64::total_cmp)
            }
        }
    }
}

/// Lowercased text of one field, prepared for matching.
#[derive(Debug, Clone, Default)]
pub struct FieldText {
    /// Whole values (one per tag for `tags`, otherwise a single value).
    values: Vec<String>,
    /// Distinct words across the values, for fuzzy comparison.
    words: Vec<String>,
}

impl FieldText {
    fn new(values: Vec<String>) -> Self {
        let values: Vec<String> = values.into_iter().map(|v| v.to_lowercase()).collect();
        let mut words: Vec<String> = values
            .iter()
            .flat_map(|v| v.split(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        words.sort_unstable();
        words.dedup();
        Self { values, words }
    }
}

/// The searchable projection of a record.
#[derive(Debug, Clone)]
pub struct SearchableDocument {
    fields: [FieldText; 6],
}

impl SearchableDocument {
    pub fn from_record(record: &DocumentRecord) -> Self {
        let timestamp = |millis: i64| iso8601(millis).into_iter().collect::<Vec<_>>();
        Self {
            fields: [
                FieldText::new(vec![record.title.clone()]),
                FieldText::new(vec![record.path.clone()]),
                FieldText::new(vec![record.content.clone()]),
                FieldText::new(record.tags.clone()),
                FieldText::new(timestamp(record.created)),
                FieldText::new(timestamp(record.modified)),
            ],
        }
    }

    fn field(&self, field: SearchField) -> &FieldText {
        &self.fields[field.index()]
    }
}
