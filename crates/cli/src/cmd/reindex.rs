//! Reindex command implementation.

use std::path::Path;

use super::Session;

/// Run the reindex command.
pub fn run(config: Option<&Path>, profile: Option<&str>, verbose: bool) {
    let session = Session::open(config, profile);

    println!("Indexing vault: {}", session.vault().root().display());
    let stats = session.build();

    if verbose {
        match session.renderer.index().read() {
            Ok(index) => {
                for record in index.records() {
                    println!("  {}", record.path);
                }
            }
            Err(e) => super::fail("Error reading index", e),
        }
    }

    println!();
    println!("Indexing complete:");
    println!("  Documents found:    {}", stats.documents_found);
    println!("  Documents indexed:  {}", stats.documents_indexed);
    if stats.documents_skipped > 0 {
        println!("  Documents skipped:  {}", stats.documents_skipped);
    }
    println!("  Duration:           {}ms", stats.duration_ms);
}
