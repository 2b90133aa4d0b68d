//! Post-search processing: filtering, sorting and limiting results.

use std::cmp::Ordering;

use rand::Rng;
use rand::seq::SliceRandom;
use serde_yaml::Value;

use super::config::{QueryConfig, SortSpec};
use crate::index::{DocumentRecord, SearchResult};

/// Turn search results into the ordered records a renderer displays.
///
/// `current_path` is the path of the note holding the query block.
pub fn apply(
    results: Vec<SearchResult>,
    config: &QueryConfig,
    current_path: Option<&str>,
) -> Vec<DocumentRecord> {
    apply_with_rng(results, config, current_path, &mut rand::thread_rng())
}

/// [`apply`] with an explicit source of randomness for `sort: random`.
pub fn apply_with_rng<R: Rng + ?Sized>(
    results: Vec<SearchResult>,
    config: &QueryConfig,
    current_path: Option<&str>,
    rng: &mut R,
) -> Vec<DocumentRecord> {
    let mut records = order_with_rng(results, config, current_path, rng);
    truncate(&mut records, config);
    records
}

/// Filtering and sorting without the limit.
///
/// This is the list the debug trace reports on.
pub fn order(
    results: Vec<SearchResult>,
    config: &QueryConfig,
    current_path: Option<&str>,
) -> Vec<DocumentRecord> {
    order_with_rng(results, config, current_path, &mut rand::thread_rng())
}

pub fn order_with_rng<R: Rng + ?Sized>(
    results: Vec<SearchResult>,
    config: &QueryConfig,
    current_path: Option<&str>,
    rng: &mut R,
) -> Vec<DocumentRecord> {
    let mut records: Vec<DocumentRecord> = results
        .into_iter()
        .map(|r| r.record)
        .filter(|r| config.include_current_note || Some(r.path.as_str()) != current_path)
        .collect();

    match &config.sort {
        None => records,
        Some(SortSpec::Random) => {
            records.shuffle(rng);
            records
        }
        Some(SortSpec::Ascending(field)) => sort_by_field(records, field, false),
        Some(SortSpec::Descending(field)) => sort_by_field(records, field, true),
    }
}

/// Cut `records` down to the block's `limit`, if any.
pub fn truncate(records: &mut Vec<DocumentRecord>, config: &QueryConfig) {
    if let Some(limit) = config.limit {
        records.truncate(limit);
    }
}

#[derive(Debug)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

/// Stable sort on `field`; records without a value go last either way.
fn sort_by_field(records: Vec<DocumentRecord>, field: &str, descending: bool) -> Vec<DocumentRecord> {
    let mut keyed: Vec<(Option<SortKey>, DocumentRecord)> =
        records.into_iter().map(|r| (sort_key(&r, field), r)).collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) if descending => b.compare(a),
        (Some(a), Some(b)) => a.compare(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, r)| r).collect()
}

fn sort_key(record: &DocumentRecord, field: &str) -> Option<SortKey> {
    match field {
        "title" => Some(SortKey::Text(record.title.clone())),
        "path" => Some(SortKey::Text(record.path.clone())),
        "content" => Some(SortKey::Text(record.content.clone())),
        "tags" => Some(SortKey::Text(record.tags.join(", "))),
        "created" => Some(SortKey::Number(record.created as f64)),
        "modified" => Some(SortKey::Number(record.modified as f64)),
        key => record.frontmatter.as_ref().and_then(|fm| fm.get(key)).and_then(value_key),
    }
}

fn value_key(value: &Value) -> Option<SortKey> {
    match value {
        Value::Number(n) => n.as_f64().map(SortKey::Number),
        Value::String(s) => Some(SortKey::Text(s.clone())),
        Value::Bool(b) => Some(SortKey::Text(b.to_string())),
        Value::Tagged(tagged) => value_key(&tagged.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::Frontmatter;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn record(path: &str, modified: i64) -> DocumentRecord {
        DocumentRecord {
            title: path.trim_end_matches(".md").to_string(),
            path: path.to_string(),
            content: String::new(),
            created: 0,
            modified,
            tags: Vec::new(),
            frontmatter: None,
        }
    }

    fn with_priority(mut rec: DocumentRecord, priority: Option<i64>) -> DocumentRecord {
        let mut fields = HashMap::new();
        if let Some(p) = priority {
            fields.insert("priority".to_string(), Value::Number(serde_yaml::Number::from(p)));
        }
        rec.frontmatter = Some(Frontmatter { fields });
        rec
    }

    fn results(records: Vec<DocumentRecord>) -> Vec<SearchResult> {
        records.into_iter().map(|record| SearchResult { record, score: 0.0 }).collect()
    }

    fn config(extra: &str) -> QueryConfig {
        QueryConfig::parse(&format!("query: x\ntemplate: list\n{extra}")).unwrap()
    }

    fn modified(records: &[DocumentRecord]) -> Vec<i64> {
        records.iter().map(|r| r.modified).collect()
    }

    fn sample() -> Vec<SearchResult> {
        results(vec![record("c.md", 3), record("a.md", 1), record("b.md", 2)])
    }

    #[test]
    fn test_sort_ascending() {
        let out = apply(sample(), &config("sort: -modified\n"), None);
        assert_eq!(modified(&out), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_descending() {
        let out = apply(sample(), &config("sort: modified\n"), None);
        assert_eq!(modified(&out), vec![3, 2, 1]);
    }

    #[test]
    fn test_sort_by_title_text() {
        let out = apply(sample(), &config("sort: -title\n"), None);
        let titles: Vec<_> = out.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_sort_keeps_search_order() {
        let out = apply(sample(), &config(""), None);
        assert_eq!(modified(&out), vec![3, 1, 2]);
    }

    #[test]
    fn test_random_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let input: Vec<_> = (0..20).map(|i| record(&format!("{i}.md"), i)).collect();
        let out = apply_with_rng(results(input), &config("sort: random\n"), None, &mut rng);

        let mut seen = modified(&out);
        seen.sort();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_limit_truncates_after_sort() {
        let out = apply(sample(), &config("sort: -modified\nlimit: 2\n"), None);
        assert_eq!(modified(&out), vec![1, 2]);

        let out = apply(sample(), &config("limit: 10\n"), None);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_order_filters_and_sorts_but_ignores_limit() {
        let cfg = config("sort: -modified\nlimit: 1\n");
        let mut out = order(sample(), &cfg, Some("a.md"));
        assert_eq!(modified(&out), vec![2, 3]);

        truncate(&mut out, &cfg);
        assert_eq!(modified(&out), vec![2]);
    }

    #[test]
    fn test_current_note_excluded_by_default() {
        let out = apply(sample(), &config(""), Some("a.md"));
        assert!(out.iter().all(|r| r.path != "a.md"));
        assert_eq!(out.len(), 2);

        let out = apply(sample(), &config("includeCurrentNote: true\n"), Some("a.md"));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_missing_values_sort_last_both_ways() {
        let input = vec![
            with_priority(record("none.md", 0), None),
            with_priority(record("low.md", 0), Some(1)),
            with_priority(record("high.md", 0), Some(5)),
        ];

        let asc = apply(results(input.clone()), &config("sort: -priority\n"), None);
        let paths: Vec<_> = asc.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["low.md", "high.md", "none.md"]);

        let desc = apply(results(input), &config("sort: priority\n"), None);
        let paths: Vec<_> = desc.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["high.md", "low.md", "none.md"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let input = results(vec![record("first.md", 1), record("second.md", 1), record("third.md", 0)]);
        let out = apply(input, &config("sort: modified\n"), None);
        let paths: Vec<_> = out.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["first.md", "second.md", "third.md"]);
    }
}
