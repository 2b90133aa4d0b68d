//! Render a single query block.

use std::io::Read;
use std::path::Path;

use super::{Session, fail};
use crate::QueryArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: &QueryArgs) {
    let block = match &args.block {
        Some(text) => text.clone(),
        None => {
            let mut text = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut text) {
                fail("Error reading block from stdin", e);
            }
            text
        }
    };

    let session = Session::open(config, profile);
    session.build();

    let source = args.source.as_deref().and_then(|p| session.note_key(p));
    let rendered = session.renderer.render(&block, source.as_deref());
    println!("{}", rendered.to_html());
}
