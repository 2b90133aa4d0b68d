//! The `table` template.

use super::fields::field_or_empty;
use super::fragment::Element;
use crate::index::DocumentRecord;
use crate::query::QueryConfig;

/// `<table>` with a header row of capitalised field names and one body row
/// per record.
pub fn render_table(records: &[DocumentRecord], config: &QueryConfig) -> Element {
    tracing::debug!("Rendering table, with {} results", records.len());

    let mut header = Element::new("tr");
    for field in &config.fields {
        header.push(Element::new("th").text(field.header()));
    }

    let mut body = Element::new("tbody");
    for (position, record) in records.iter().enumerate() {
        let mut row = Element::new("tr");
        for field in &config.fields {
            let mut cell = Element::new("td");
            cell.children = field_or_empty(record, field, position, config);
            row.push(cell);
        }
        body.push(row);
    }

    Element::new("table").child(Element::new("thead").child(header)).child(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::iso8601;

    fn record(title: &str, created: i64) -> DocumentRecord {
        DocumentRecord {
            title: title.to_string(),
            path: format!("{title}.md"),
            content: String::new(),
            created,
            modified: created,
            tags: Vec::new(),
            frontmatter: None,
        }
    }

    #[test]
    fn test_table_structure() {
        let config = QueryConfig::parse("query: x\ntemplate: table\n").unwrap();
        let created = 1_650_000_000_123;
        let table = render_table(&[record("A", created), record("B", created)], &config);

        let thead = table.find_all("thead")[0];
        let header_cells = thead.find_all("th");
        assert_eq!(thead.find_all("tr").len(), 1);
        let headers: Vec<_> = header_cells.iter().map(|c| c.text_content()).collect();
        assert_eq!(headers, vec!["Title", "Created"]);

        let tbody = table.find_all("tbody")[0];
        let rows = tbody.find_all("tr");
        assert_eq!(rows.len(), 2);
        for row in &rows {
            let cells = row.find_all("td");
            assert_eq!(cells.len(), 2);
            assert_eq!(cells[1].text_content(), iso8601(created).unwrap());
            assert_eq!(cells[1].text_content(), "2022-04-15T05:20:00.123Z");
        }
        assert_eq!(rows[0].find_all("td")[0].text_content(), "A");
    }

    #[test]
    fn test_custom_fields_header() {
        let config =
            QueryConfig::parse("query: x\ntemplate: table\nfields: [index, path]\n").unwrap();
        let table = render_table(&[record("A", 0)], &config);

        let headers: Vec<_> = table.find_all("th").iter().map(|c| c.text_content()).collect();
        assert_eq!(headers, vec!["Index", "Path"]);
        let cells: Vec<_> = table.find_all("td").iter().map(|c| c.text_content()).collect();
        assert_eq!(cells, vec!["1", "A.md"]);
    }
}
