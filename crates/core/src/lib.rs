pub mod config;
pub mod frontmatter;
pub mod index;
pub mod markdown_ast;
pub mod orchestrator;
pub mod query;
pub mod render;
pub mod vault;

pub use orchestrator::{BlockError, BlockRenderer, RenderedBlock};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
