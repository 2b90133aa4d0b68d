//! The document host interface and its filesystem implementation.
//!
//! A host owns the document collection: it lists documents, hands out their
//! metadata, and reads their content. The index never touches storage
//! directly, so tests can substitute an in-memory host.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use super::extractor::{DocumentMetadata, extract_metadata};
use super::walker::{VaultWalker, VaultWalkerError, WalkedFile};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("vault walker error: {0}")]
    Walker(#[from] VaultWalkerError),

    #[error("failed to read document {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("document is outside the vault or not indexable: {0}")]
    NotADocument(String),
}

/// File timestamps in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStat {
    pub ctime: i64,
    pub mtime: i64,
}

/// A host-side reference to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    /// File name without extension.
    pub basename: String,
    /// Canonical vault-relative path with `/` separators.
    pub path: String,
    pub stat: DocumentStat,
}

/// Source of documents and their metadata.
pub trait DocumentHost {
    /// List every document currently in the collection.
    fn list_documents(&self) -> Result<Vec<DocumentHandle>, HostError>;

    /// Structured metadata (frontmatter and inline tags) for a document.
    fn metadata(&self, handle: &DocumentHandle) -> Result<DocumentMetadata, HostError>;

    /// Full text of a document.
    fn read_content(&self, handle: &DocumentHandle) -> Result<String, HostError>;

    /// Metadata and content taken from the same version of a document.
    fn read_document(
        &self,
        handle: &DocumentHandle,
    ) -> Result<(DocumentMetadata, String), HostError> {
        let content = self.read_content(handle)?;
        Ok((self.metadata(handle)?, content))
    }
}

/// A vault of markdown files on disk.
#[derive(Debug)]
pub struct FsVault {
    walker: VaultWalker,
}

impl FsVault {
    /// Open the vault rooted at `root`, skipping `excluded_folders`.
    pub fn open(root: &Path, excluded_folders: Vec<PathBuf>) -> Result<Self, HostError> {
        let excluded = excluded_folders
            .into_iter()
            .map(|p| p.strip_prefix(root).map(Path::to_path_buf).unwrap_or(p))
            .collect();
        Ok(Self { walker: VaultWalker::with_exclusions(root, excluded)? })
    }

    /// Canonical vault root.
    pub fn root(&self) -> &Path {
        self.walker.root()
    }

    /// Vault-relative key for an absolute path, if it names an indexable note.
    pub fn document_path(&self, absolute: &Path) -> Option<String> {
        self.walker.accepts(absolute).map(|rel| to_key(&rel))
    }

    /// Build a handle for an absolute path reported by a watcher.
    pub fn handle_for(&self, absolute: &Path) -> Result<DocumentHandle, HostError> {
        let relative = self
            .walker
            .accepts(absolute)
            .ok_or_else(|| HostError::NotADocument(absolute.display().to_string()))?;
        let metadata = absolute.metadata().map_err(|e| HostError::Read {
            path: absolute.display().to_string(),
            source: e,
        })?;
        let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        Ok(handle(&relative, metadata.created().unwrap_or(modified), modified))
    }

    fn absolute(&self, handle: &DocumentHandle) -> PathBuf {
        self.root().join(&handle.path)
    }
}

impl DocumentHost for FsVault {
    fn list_documents(&self) -> Result<Vec<DocumentHandle>, HostError> {
        let files = self.walker.walk()?;
        Ok(files.iter().map(WalkedFile::to_handle).collect())
    }

    fn metadata(&self, handle: &DocumentHandle) -> Result<DocumentMetadata, HostError> {
        let content = self.read_content(handle)?;
        Ok(extract_metadata(&content, Path::new(&handle.path)))
    }

    fn read_content(&self, handle: &DocumentHandle) -> Result<String, HostError> {
        let path = self.absolute(handle);
        std::fs::read_to_string(&path)
            .map_err(|e| HostError::Read { path: path.display().to_string(), source: e })
    }

    fn read_document(
        &self,
        handle: &DocumentHandle,
    ) -> Result<(DocumentMetadata, String), HostError> {
        let content = self.read_content(handle)?;
        Ok((extract_metadata(&content, Path::new(&handle.path)), content))
    }
}

impl WalkedFile {
    fn to_handle(&self) -> DocumentHandle {
        handle(&self.relative_path, self.created, self.modified)
    }
}

fn handle(relative: &Path, created: SystemTime, modified: SystemTime) -> DocumentHandle {
    DocumentHandle {
        basename: relative
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string(),
        path: to_key(relative),
        stat: DocumentStat { ctime: millis(created), mtime: millis(modified) },
    }
}

fn to_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_vault() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("alpha.md"), "---\ntags: work, urgent\n---\n# Alpha\n#inbox\n")
            .unwrap();
        fs::create_dir(root.join("projects")).unwrap();
        fs::write(root.join("projects/beta.md"), "# Beta\n").unwrap();
        fs::create_dir(root.join("templates")).unwrap();
        fs::write(root.join("templates/daily.md"), "# Template\n").unwrap();
        dir
    }

    #[test]
    fn test_list_documents() {
        let dir = create_test_vault();
        let vault = FsVault::open(dir.path(), vec![PathBuf::from("templates")]).unwrap();
        let docs = vault.list_documents().unwrap();

        let paths: Vec<_> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["alpha.md", "projects/beta.md"]);
        assert_eq!(docs[1].basename, "beta");
        assert!(docs[0].stat.mtime > 0);
    }

    #[test]
    fn test_absolute_exclusions_are_relativised() {
        let dir = create_test_vault();
        let excluded = vec![dir.path().join("projects")];
        let vault = FsVault::open(dir.path(), excluded).unwrap();
        let docs = vault.list_documents().unwrap();

        assert!(docs.iter().all(|d| !d.path.starts_with("projects")));
    }

    #[test]
    fn test_metadata_and_content() {
        let dir = create_test_vault();
        let vault = FsVault::open(dir.path(), Vec::new()).unwrap();
        let handle = vault.handle_for(&vault.root().join("alpha.md")).unwrap();

        let meta = vault.metadata(&handle).unwrap();
        let fm = meta.frontmatter.unwrap();
        assert_eq!(fm.get("tags").and_then(|v| v.as_str()), Some("work, urgent"));
        assert_eq!(meta.tags.len(), 1);
        assert_eq!(meta.tags[0].tag, "#inbox");

        let content = vault.read_content(&handle).unwrap();
        assert!(content.contains("# Alpha"));
    }

    #[test]
    fn test_read_document_matches_content() {
        let dir = create_test_vault();
        let vault = FsVault::open(dir.path(), Vec::new()).unwrap();
        let handle = vault.handle_for(&vault.root().join("alpha.md")).unwrap();

        let (meta, content) = vault.read_document(&handle).unwrap();
        assert!(content.starts_with("---\ntags: work, urgent"));
        assert_eq!(meta.tags[0].tag, "#inbox");
        assert!(meta.frontmatter.is_some());

        fs::remove_file(vault.root().join("alpha.md")).unwrap();
        assert!(matches!(vault.read_document(&handle), Err(HostError::Read { .. })));
    }

    #[test]
    fn test_handle_for_rejects_non_documents() {
        let dir = create_test_vault();
        let vault = FsVault::open(dir.path(), Vec::new()).unwrap();

        let err = vault.handle_for(&vault.root().join("notes.txt")).unwrap_err();
        assert!(matches!(err, HostError::NotADocument(_)));
        assert_eq!(
            vault.document_path(&vault.root().join("projects/beta.md")),
            Some("projects/beta.md".to_string())
        );
    }

    #[test]
    fn test_read_missing_document() {
        let dir = create_test_vault();
        let vault = FsVault::open(dir.path(), Vec::new()).unwrap();
        let handle = DocumentHandle {
            basename: "gone".to_string(),
            path: "gone.md".to_string(),
            stat: DocumentStat::default(),
        };

        assert!(matches!(vault.read_content(&handle), Err(HostError::Read { .. })));
    }
}
