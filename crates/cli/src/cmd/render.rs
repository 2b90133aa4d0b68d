//! Render a whole note to HTML.

use std::fs;
use std::path::Path;

use oql_core::markdown_ast::{MarkdownAstError, render_note_html};
use thiserror::Error;

use super::{Session, fail};
use crate::RenderArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: &RenderArgs) {
    let session = Session::open(config, profile);
    session.build();

    let html = render_note(&session, &args.note).unwrap_or_else(|e| fail("Error rendering note", e));
    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, html) {
                fail(&format!("Error writing {}", path.display()), e);
            }
            println!("Rendered {} to {}", args.note.display(), path.display());
        }
        None => print!("{html}"),
    }
}

#[derive(Debug, Error)]
pub enum RenderNoteError {
    #[error("failed to read {0}: {1}")]
    Read(String, #[source] std::io::Error),

    #[error(transparent)]
    Markdown(#[from] MarkdownAstError),
}

/// The note's HTML with every query block rendered against the current index.
pub fn render_note(session: &Session, note: &Path) -> Result<String, RenderNoteError> {
    let text = fs::read_to_string(note)
        .map_err(|e| RenderNoteError::Read(note.display().to_string(), e))?;
    let key = session.note_key(note);

    let html = render_note_html(&text, &session.config.search.block_language, |block| {
        tracing::debug!("Rendering block at line {}", block.start_line);
        session.renderer.render(&block.source, key.as_deref()).to_html()
    })?;
    Ok(html)
}
