//! Rendering of a single query block.
//!
//! [`BlockRenderer`] is the entry point the markdown pipeline calls for each
//! `oql` block: parse the configuration, search the index, post-process the
//! results and render them. It never fails; problems become error or warning
//! fragments in place of the results.

use thiserror::Error;

use crate::index::{IndexError, SharedIndex};
use crate::query::{QueryConfig, QueryConfigError, order, truncate};
use crate::render::{Element, RenderError, notice, render, render_debug};

#[derive(Debug, Error)]
pub enum BlockError {
    #[error(transparent)]
    Config(#[from] QueryConfigError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The fragments produced for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub primary: Element,
    pub debug: Option<Element>,
}

impl RenderedBlock {
    fn only(primary: Element) -> Self {
        Self { primary, debug: None }
    }

    pub fn to_html(&self) -> String {
        let mut html = self.primary.to_html();
        if let Some(debug) = &self.debug {
            html.push_str(&debug.to_html());
        }
        html
    }
}

#[derive(Debug, Clone)]
pub struct BlockRenderer {
    index: SharedIndex,
}

impl BlockRenderer {
    pub fn new(index: SharedIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &SharedIndex {
        &self.index
    }

    /// Render the block text `source` found in the note at `source_path`.
    pub fn render(&self, source: &str, source_path: Option<&str>) -> RenderedBlock {
        let config = match QueryConfig::parse(source) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Invalid query block in {:?}: {}", source_path, err);
                // Without a parsed config the badge keeps its default
                return RenderedBlock::only(notice::error(&err.to_string()).class("oql-badge"));
            }
        };

        match self.render_config(&config, source_path) {
            Ok(block) => block,
            Err(err) => {
                let mut fragment = match &err {
                    BlockError::Index(IndexError::NotReady(_)) => {
                        tracing::debug!("Query block skipped: {}", err);
                        notice::warning(&err.to_string())
                    }
                    _ => {
                        tracing::error!("Failed to render query block in {:?}: {}", source_path, err);
                        notice::error(&err.to_string())
                    }
                };
                if config.badge {
                    fragment.add_class("oql-badge");
                }
                RenderedBlock::only(fragment)
            }
        }
    }

    /// Like [`render`](Self::render), but returns the failure instead of a
    /// fragment describing it.
    pub fn try_render(
        &self,
        source: &str,
        source_path: Option<&str>,
    ) -> Result<RenderedBlock, BlockError> {
        let config = QueryConfig::parse(source)?;
        self.render_config(&config, source_path)
    }

    fn render_config(
        &self,
        config: &QueryConfig,
        source_path: Option<&str>,
    ) -> Result<RenderedBlock, BlockError> {
        let results = self.index.read()?.search(&config.query)?;
        tracing::debug!("Query block matched {} documents", results.len());

        let mut records = order(results, config, source_path);
        let debug = config.debug.then(|| render_debug(&records, config));

        truncate(&mut records, config);
        let primary = render(&records, config)?;
        Ok(RenderedBlock { primary, debug })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DocumentRecord;

    fn record(title: &str, modified: i64) -> DocumentRecord {
        DocumentRecord {
            title: title.to_string(),
            path: format!("{title}.md"),
            content: format!("{title} mentions budget"),
            created: 0,
            modified,
            tags: Vec::new(),
            frontmatter: None,
        }
    }

    fn ready_renderer() -> BlockRenderer {
        let index = SharedIndex::default();
        index.write().unwrap().build_index(vec![
            record("Alpha", 2),
            record("Beta", 3),
            record("Gamma", 1),
        ]);
        BlockRenderer::new(index)
    }

    #[test]
    fn test_renders_list() {
        let block = ready_renderer().render(
            "query: \"'budget\"\ntemplate: list\nsort: -modified\n",
            Some("Home.md"),
        );

        let titles: Vec<_> =
            block.primary.find_all("li").iter().map(|li| li.text_content()).collect();
        assert_eq!(titles, vec!["Gamma", "Alpha", "Beta"]);
        assert!(block.primary.has_class("oql-badge"));
        assert!(block.debug.is_none());
    }

    #[test]
    fn test_current_note_is_excluded() {
        let block = ready_renderer().render("query: \"'budget\"\ntemplate: list\n", Some("Beta.md"));
        assert_eq!(block.primary.find_all("li").len(), 2);
        assert!(!block.to_html().contains(">Beta<"));
    }

    #[test]
    fn test_missing_template_is_error_fragment() {
        let block = ready_renderer().render("query: budget\n", None);

        assert_eq!(block.primary.tag, "div");
        assert!(block.primary.has_class("oql-error"));
        assert_eq!(block.primary.text_content(), "No template defined in the OQL block");
        assert!(block.primary.has_class("oql-badge"));
        assert!(block.primary.find_all("ul").is_empty());
        assert!(block.primary.find_all("table").is_empty());
    }

    #[test]
    fn test_not_ready_is_warning_fragment() {
        let renderer = BlockRenderer::new(SharedIndex::default());
        let block = renderer.render("query: budget\ntemplate: list\n", None);

        assert!(block.primary.has_class("oql-warning"));
        assert!(block.primary.has_class("oql-badge"));
        assert!(block.primary.text_content().contains("not ready"));
        assert!(matches!(
            renderer.try_render("query: budget\ntemplate: list\n", None),
            Err(BlockError::Index(IndexError::NotReady(_)))
        ));
    }

    #[test]
    fn test_debug_fragment_follows_results() {
        let block = ready_renderer().render(
            "query: \"'budget\"\ntemplate: string\nformat: '{count}'\ndebug: true\n",
            None,
        );

        let debug = block.debug.as_ref().unwrap();
        assert!(debug.text_content().starts_with("// Debugging OQL, total results: 3"));
        let html = block.to_html();
        assert!(html.starts_with(r#"<span class="oql-badge">3</span><pre"#));
    }

    #[test]
    fn test_malformed_yaml_is_error_fragment() {
        let block = ready_renderer().render("query: [oops\n", None);
        assert!(block.primary.has_class("oql-error"));
        assert!(block.debug.is_none());
    }

    #[test]
    fn test_debug_count_matches_primary_without_current_note() {
        let block = ready_renderer().render(
            "query: \"'budget\"\ntemplate: string\nformat: '{count}'\ndebug: true\n",
            Some("Beta.md"),
        );

        assert_eq!(block.primary.text_content(), "2");
        let debug = block.debug.as_ref().unwrap().text_content();
        assert!(debug.starts_with("// Debugging OQL, total results: 2"));
        assert!(debug.ends_with("// Results: \n\nAlpha\nGamma"));
    }

    #[test]
    fn test_debug_lists_sorted_results_before_limit() {
        let block = ready_renderer().render(
            "query: \"'budget\"\ntemplate: list\nsort: -modified\nlimit: 1\ndebug: true\n",
            None,
        );

        assert_eq!(block.primary.find_all("li").len(), 1);
        let debug = block.debug.as_ref().unwrap().text_content();
        assert!(debug.starts_with("// Debugging OQL, total results: 3"));
        assert!(debug.ends_with("Gamma\nAlpha\nBeta"));
    }

    #[test]
    fn test_badge_disabled_on_error_fragment() {
        let renderer = BlockRenderer::new(SharedIndex::default());
        let block = renderer.render("query: budget\ntemplate: list\nbadge: false\n", None);
        assert!(block.primary.has_class("oql-warning"));
        assert!(!block.primary.has_class("oql-badge"));
    }
}
