//! Vault file discovery, metadata extraction, and the document host.
//!
//! This module provides utilities for walking vault directories, extracting
//! frontmatter and inline tags from markdown files, and the [`DocumentHost`]
//! interface through which the index reads documents.

pub mod extractor;
pub mod host;
pub mod walker;

pub use extractor::{DocumentMetadata, TagRef, extract_inline_tags, extract_metadata};
pub use host::{DocumentHandle, DocumentHost, DocumentStat, FsVault, HostError};
pub use walker::{VaultWalker, VaultWalkerError, WalkedFile};
