//! Repackaging cards left in the output folder by a run whose packaging
//! step failed.

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveJob, ArchiveManifest, Archiver, PackagingError};
use crate::config::ResolvedConfig;
use crate::metrics;
use crate::render::OUTPUT_FILE_PREFIX;

/// Generated cards (`attendee-*.pdf`) directly inside `folder`, sorted by
/// name. A missing folder holds no cards.
pub fn pending_documents(folder: &Path) -> Result<Vec<PathBuf>, PackagingError> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PackagingError::io(folder, e)),
    };

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PackagingError::io(folder, e))?;
        let path = entry.path();
        let is_card = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(OUTPUT_FILE_PREFIX) && n.ends_with(".pdf"))
            .unwrap_or(false);
        if is_card && path.is_file() {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

/// Bundles every pending card in the output folder into a new archive and
/// removes the cards once it is verified.
///
/// Returns `Ok(None)` when there is nothing to package.
pub async fn package_pending<A: Archiver + ?Sized>(
    settings: &ResolvedConfig,
    archiver: &A,
) -> Result<Option<ArchiveManifest>, PackagingError> {
    let documents = pending_documents(&settings.output_folder)?;
    if documents.is_empty() {
        tracing::info!(
            "No pending cards in {}",
            settings.output_folder.display()
        );
        return Ok(None);
    }

    tracing::info!(
        "Packaging {} pending cards from {} with {}",
        documents.len(),
        settings.output_folder.display(),
        archiver.name()
    );
    let job = ArchiveJob {
        documents,
        destination_dir: settings.archive_folder.clone(),
        prefix: settings.archive_prefix.clone(),
        completed_at: Local::now(),
        cleanup_sources: true,
    };

    match archiver.package(job).await {
        Ok(manifest) => {
            metrics::ARCHIVES_WRITTEN.with_label_values(&["success"]).inc();
            metrics::DOCUMENTS_ARCHIVED.inc_by(manifest.entries.len() as u64);
            Ok(Some(manifest))
        }
        Err(e) => {
            metrics::ARCHIVES_WRITTEN.with_label_values(&["failed"]).inc();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_pending_documents_only_lists_cards() {
        let temp = TempDir::new().unwrap();
        for name in ["attendee-B2.pdf", "attendee-A1.pdf", "notes.pdf", "attendee-x.txt"] {
            fs::write(temp.path().join(name), "x").unwrap();
        }
        fs::create_dir(temp.path().join("attendee-dir.pdf")).unwrap();

        let documents = pending_documents(temp.path()).unwrap();

        assert_eq!(
            documents,
            vec![
                temp.path().join("attendee-A1.pdf"),
                temp.path().join("attendee-B2.pdf"),
            ]
        );
    }

    #[test]
    fn test_missing_folder_has_no_pending_documents() {
        let temp = TempDir::new().unwrap();
        let documents = pending_documents(&temp.path().join("absent")).unwrap();
        assert!(documents.is_empty());
    }
}
