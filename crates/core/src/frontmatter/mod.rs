//! Frontmatter parsing for markdown documents.
//!
//! Splits the leading `---` delimited YAML block from the markdown body and
//! parses it into a [`Frontmatter`] mapping.

pub mod parser;
pub mod types;

pub use parser::{FrontmatterParseError, parse};
pub use types::{Frontmatter, ParsedDocument};
