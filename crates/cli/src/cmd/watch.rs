//! Re-render a note as the vault changes.

use std::fs;
use std::path::Path;
use std::sync::mpsc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use oql_core::index::IndexEvent;
use oql_core::vault::{DocumentHandle, FsVault};

use super::render::render_note;
use super::{Session, fail};
use crate::WatchArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: &WatchArgs) {
    let mut session = Session::open(config, profile);
    session.build();
    write_output(&session, args);

    let (tx, rx) = mpsc::channel();
    let mut watcher =
        notify::recommended_watcher(tx).unwrap_or_else(|e| fail("Error starting watcher", e));
    let root = session.vault().root().to_path_buf();
    if let Err(e) = watcher.watch(&root, RecursiveMode::Recursive) {
        fail(&format!("Error watching {}", root.display()), e);
    }
    println!("Watching {} (Ctrl-C to stop)", root.display());

    while let Ok(first) = rx.recv() {
        // Coalesce bursts of notifications into one re-render
        let batch: Vec<_> = std::iter::once(first).chain(rx.try_iter()).collect();

        let mut queued = 0;
        for result in batch {
            match result {
                Ok(event) => {
                    for index_event in translate(session.vault(), &event) {
                        session.maintainer.enqueue(index_event);
                        queued += 1;
                    }
                }
                Err(e) => tracing::warn!("Watch error: {}", e),
            }
        }
        if queued == 0 {
            continue;
        }

        if let Err(e) = session.maintainer.process_pending() {
            fail("Index maintenance failed", e);
        }
        write_output(&session, args);
    }
}

fn write_output(session: &Session, args: &WatchArgs) {
    match render_note(session, &args.note) {
        Ok(html) => match fs::write(&args.output, html) {
            Ok(()) => tracing::info!("Rendered {} to {}", args.note.display(), args.output.display()),
            Err(e) => tracing::error!("Failed to write {}: {}", args.output.display(), e),
        },
        // The note may be mid-save; the next event renders it again
        Err(e) => tracing::error!("Failed to render {}: {}", args.note.display(), e),
    }
}

/// Index events for a filesystem notification.
pub fn translate(vault: &FsVault, event: &Event) -> Vec<IndexEvent> {
    let mut out = Vec::new();
    match event.kind {
        EventKind::Create(_) => {
            out.extend(event.paths.iter().filter_map(|p| handle(vault, p)).map(IndexEvent::Created));
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            if let [from, to] = event.paths.as_slice() {
                match (vault.document_path(from), handle(vault, to)) {
                    (Some(old_path), Some(handle)) => {
                        out.push(IndexEvent::Renamed { handle, old_path })
                    }
                    (Some(path), None) => out.push(IndexEvent::Deleted { path }),
                    (None, Some(handle)) => out.push(IndexEvent::Created(handle)),
                    (None, None) => {}
                }
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) | EventKind::Remove(_) => {
            out.extend(
                event
                    .paths
                    .iter()
                    .filter_map(|p| vault.document_path(p))
                    .map(|path| IndexEvent::Deleted { path }),
            );
        }
        EventKind::Modify(ModifyKind::Name(_)) => {
            for path in &event.paths {
                if path.exists() {
                    out.extend(handle(vault, path).map(IndexEvent::Created));
                } else if let Some(key) = vault.document_path(path) {
                    out.push(IndexEvent::Deleted { path: key });
                }
            }
        }
        EventKind::Modify(_) => {
            out.extend(event.paths.iter().filter_map(|p| handle(vault, p)).map(IndexEvent::Modified));
        }
        _ => {}
    }
    out
}

fn handle(vault: &FsVault, path: &Path) -> Option<DocumentHandle> {
    vault.document_path(path)?;
    match vault.handle_for(path) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::debug!("Ignoring {}: {}", path.display(), e);
            None
        }
    }
}
