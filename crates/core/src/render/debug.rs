//! Debug output appended after a block's results.

use super::fragment::Element;
use crate::index::DocumentRecord;
use crate::query::QueryConfig;

/// `<pre>` listing the result count, the query and the matched titles.
pub fn render_debug(records: &[DocumentRecord], config: &QueryConfig) -> Element {
    let query = serde_json::to_string_pretty(&config.raw_query)
        .unwrap_or_else(|_| format!("{:?}", config.raw_query));
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();

    let text = format!(
        "// Debugging OQL, total results: {}\n// Query: \n{}\n// Results: \n\n{}",
        records.len(),
        query,
        titles.join("\n")
    );
    Element::new("pre").class("oql-debug").class("language-js").text(text)
}
