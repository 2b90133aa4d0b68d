use oql_core::config::loader::{ConfigLoader, default_config_path};
use std::path::Path;

use crate::logging;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            logging::init(&rc);
            tracing::debug!("Configuration loaded for profile {}", rc.active_profile);

            println!("OK   oql doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("profile: {}", rc.active_profile);
            println!("vault_root: {}", rc.vault_root.display());
            for folder in &rc.excluded_folders {
                println!("excluded: {}", folder.display());
            }
            println!("logging.level: {}", rc.logging.level);
            if let Some(file) = &rc.logging.file {
                println!("logging.file: {}", file.display());
            }
            println!("search.threshold: {}", rc.search.threshold);
            println!("search.block_language: {}", rc.search.block_language);
        }
        Err(e) => {
            println!("FAIL oql doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
