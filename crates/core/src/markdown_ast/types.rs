use thiserror::Error;

/// A fenced query block found in a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBlock {
    /// The block body, without fences.
    pub source: String,
    /// 1-based line of the opening fence.
    pub start_line: usize,
    /// 1-based line of the closing fence (or last line when unclosed).
    pub end_line: usize,
}

#[derive(Debug, Error)]
pub enum MarkdownAstError {
    #[error("failed to render markdown: {0}")]
    RenderError(#[from] std::io::Error),

    #[error("rendered markdown is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
