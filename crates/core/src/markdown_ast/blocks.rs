use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{Arena, Options, format_html, parse_document};

use crate::markdown_ast::types::*;

/// Every fenced block whose info string starts with `language`.
pub fn find_query_blocks(input: &str, language: &str) -> Vec<QueryBlock> {
    let arena = Arena::new();
    let options = default_options();
    let root = parse_document(&arena, input, &options);

    query_nodes(root, language).into_iter().map(|(_, block)| block).collect()
}

/// Render a note to HTML with each query block replaced by `render_block`'s
/// output.
pub fn render_note_html<F>(
    input: &str,
    language: &str,
    mut render_block: F,
) -> Result<String, MarkdownAstError>
where
    F: FnMut(&QueryBlock) -> String,
{
    let arena = Arena::new();
    let options = default_options();
    let root = parse_document(&arena, input, &options);

    for (node, block) in query_nodes(root, language) {
        let mut literal = render_block(&block);
        if !literal.ends_with('\n') {
            literal.push('\n');
        }
        // Type 6 blocks end at a blank line, which the literal never contains
        node.data.borrow_mut().value =
            NodeValue::HtmlBlock(NodeHtmlBlock { block_type: 6, literal });
    }

    let mut html = Vec::new();
    format_html(root, &options, &mut html)?;
    Ok(String::from_utf8(html)?)
}

fn query_nodes<'a>(root: &'a AstNode<'a>, language: &str) -> Vec<(&'a AstNode<'a>, QueryBlock)> {
    let mut found = Vec::new();
    for node in root.descendants() {
        let data = node.data.borrow();
        if let NodeValue::CodeBlock(ref code) = data.value
            && code.fenced
            && code.info.split_whitespace().next() == Some(language)
        {
            found.push((
                node,
                QueryBlock {
                    source: code.literal.clone(),
                    start_line: data.sourcepos.start.line,
                    end_line: data.sourcepos.end.line,
                },
            ));
        }
    }
    found
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();
    // Enable GFM extensions for compatibility
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.front_matter_delimiter = Some("---".to_string());

    options.parse.smart = false;

    options.render.github_pre_lang = true;
    options.render.unsafe_ = true; // Rendered query blocks are raw HTML

    options
}
