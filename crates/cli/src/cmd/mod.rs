pub mod doctor;
pub mod query;
pub mod reindex;
pub mod render;
pub mod watch;

use std::fmt::Display;
use std::path::Path;

use oql_core::BlockRenderer;
use oql_core::config::loader::ConfigLoader;
use oql_core::config::types::ResolvedConfig;
use oql_core::index::{BuildStats, IndexMaintainer, SearchSettings, SharedIndex};
use oql_core::vault::FsVault;

use crate::logging;

/// Everything a command needs to render query blocks over the vault.
pub struct Session {
    pub config: ResolvedConfig,
    pub maintainer: IndexMaintainer<FsVault>,
    pub renderer: BlockRenderer,
}

impl Session {
    /// Load configuration, start logging and open the vault.
    pub fn open(config: Option<&Path>, profile: Option<&str>) -> Self {
        let rc = ConfigLoader::load(config, profile)
            .unwrap_or_else(|e| fail("Error loading config", e));
        logging::init(&rc);

        let vault = FsVault::open(&rc.vault_root, rc.excluded_folders.clone())
            .unwrap_or_else(|e| fail("Error opening vault", e));
        let index = SharedIndex::new(SearchSettings { threshold: rc.search.threshold });

        Self {
            maintainer: IndexMaintainer::new(vault, index.clone()),
            renderer: BlockRenderer::new(index),
            config: rc,
        }
    }

    /// Full rebuild of the index.
    pub fn build(&self) -> BuildStats {
        self.maintainer.rebuild().unwrap_or_else(|e| fail("Error during indexing", e))
    }

    pub fn vault(&self) -> &FsVault {
        self.maintainer.host()
    }

    /// Vault key of a note named on the command line, if it is in the vault.
    pub fn note_key(&self, note: &Path) -> Option<String> {
        let absolute = note.canonicalize().ok()?;
        self.vault().document_path(&absolute)
    }
}

/// Report a fatal error and exit.
pub fn fail(context: &str, err: impl Display) -> ! {
    eprintln!("{context}: {err}");
    std::process::exit(1);
}
