//! The `list` template.

use super::fields::field_or_empty;
use super::fragment::{Element, Node};
use crate::index::DocumentRecord;
use crate::query::QueryConfig;

/// `<ul>` with one `<li>` per record and one `<span>` per field.
pub fn render_list(records: &[DocumentRecord], config: &QueryConfig) -> Element {
    tracing::debug!("Rendering list, with {} results", records.len());
    let mut list = Element::new("ul");
    for (position, record) in records.iter().enumerate() {
        let mut item = Element::new("li");
        for (i, field) in config.fields.iter().enumerate() {
            if i > 0 {
                item.push(Node::Text(" ".to_string()));
            }
            let mut span = Element::new("span");
            span.children = field_or_empty(record, field, position, config);
            item.push(span);
        }
        list.push(item);
    }
    list
}
