//! HTML rendering of query results.
//!
//! Each template turns the ordered records from the result pipeline into an
//! [`Element`]; [`notice`] covers the error and warning fragments shown
//! instead of results, and [`debug`] the optional trace appended after them.

pub mod debug;
pub mod fields;
pub mod fragment;
pub mod list;
pub mod notice;
pub mod string;
pub mod table;

use thiserror::Error;

pub use debug::render_debug;
pub use fields::{RenderFieldError, render_field};
pub use fragment::{Element, Node};
pub use list::render_list;
pub use string::render_string;
pub use table::render_table;

use crate::index::DocumentRecord;
use crate::query::{QueryConfig, TemplateKind};

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("No 'format' key specified in OQL.")]
    MissingFormat,
}

/// Render `records` with the block's template.
///
/// Records are displayed in the order given.
pub fn render(records: &[DocumentRecord], config: &QueryConfig) -> Result<Element, RenderError> {
    let mut element = match config.template {
        TemplateKind::List => render_list(records, config),
        TemplateKind::Table => render_table(records, config),
        TemplateKind::Inline => render_string(records, config)?,
    };
    if config.badge {
        element.add_class("oql-badge");
    }
    Ok(element)
}
