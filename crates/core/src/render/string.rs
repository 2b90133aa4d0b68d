//! The `string` template.

use super::RenderError;
use super::fragment::Element;
use crate::index::DocumentRecord;
use crate::query::QueryConfig;

/// The `format` text with `{name}` and `{count}` substituted, as the inner
/// HTML of the configured wrapper element.
pub fn render_string(records: &[DocumentRecord], config: &QueryConfig) -> Result<Element, RenderError> {
    tracing::debug!("Rendering string, with {} results", records.len());
    let format = config.format.as_deref().ok_or(RenderError::MissingFormat)?;

    let mut output = format.replace("{count}", &records.len().to_string());
    if let Some(name) = &config.name {
        output = output.replace("{name}", name);
    }
    Ok(Element::new(config.wrapper.as_str()).html(output))
}
