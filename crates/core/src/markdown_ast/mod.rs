//! Markdown parsing for notes that embed query blocks.

pub mod blocks;
pub mod types;

pub use blocks::{find_query_blocks, render_note_html};
pub use types::{MarkdownAstError, QueryBlock};
